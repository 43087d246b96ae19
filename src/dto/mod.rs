use serde::Serialize;

use crate::domain::{AuthSource, LogLevel};
use crate::services::settings::{OAuth2Provider, Settings};

/// Serializable login button for one OAuth2 provider.
#[derive(Clone, Debug, Serialize)]
pub struct LoginButtonDto {
    pub name: String,
    pub display_name: String,
    pub icon: Option<String>,
    pub button_color: Option<String>,
}

impl From<&OAuth2Provider> for LoginButtonDto {
    fn from(provider: &OAuth2Provider) -> Self {
        Self {
            name: provider.name().to_string(),
            display_name: provider.display_name().to_string(),
            icon: provider.icon().map(String::from),
            button_color: provider.button_color().map(|c| c.as_str().to_string()),
        }
    }
}

/// Buttons in configured order, empty unless oauth2 login is enabled.
pub fn login_buttons(settings: &Settings) -> Vec<LoginButtonDto> {
    if !settings.is_enabled(AuthSource::OAuth2) {
        return vec![];
    }
    settings
        .oauth2_providers()
        .iter()
        .map(LoginButtonDto::from)
        .collect()
}

/// Provider entry of [`SettingsSummaryDto`]. Carries no secret.
#[derive(Clone, Debug, Serialize)]
pub struct ProviderSummaryDto {
    pub name: String,
    pub display_name: String,
    pub client_id: String,
    pub token_url: String,
    pub authorization_url: String,
    pub server_metadata_url: String,
    pub api_base_url: Option<String>,
    pub userinfo_endpoint: String,
    pub logout_url: Option<String>,
    pub scope: String,
    pub username_claim: String,
    pub icon: Option<String>,
    pub button_color: Option<String>,
    pub ssl_cert_verification: bool,
}

impl From<&OAuth2Provider> for ProviderSummaryDto {
    fn from(provider: &OAuth2Provider) -> Self {
        Self {
            name: provider.name().to_string(),
            display_name: provider.display_name().to_string(),
            client_id: provider.client_id().to_string(),
            token_url: provider.token_url().to_string(),
            authorization_url: provider.authorization_url().to_string(),
            server_metadata_url: provider.server_metadata_url().to_string(),
            api_base_url: provider.api_base_url().map(|url| url.to_string()),
            userinfo_endpoint: provider.userinfo_endpoint().to_string(),
            logout_url: provider
                .logout_url_template()
                .map(|logout| logout.template().to_string()),
            scope: provider.scopes().as_str().to_string(),
            username_claim: provider.username_claim().to_string(),
            icon: provider.icon().map(String::from),
            button_color: provider.button_color().map(|c| c.as_str().to_string()),
            ssl_cert_verification: provider.ssl_cert_verification(),
        }
    }
}

/// Redacted view of the effective settings.
#[derive(Clone, Debug, Serialize)]
pub struct SettingsSummaryDto {
    pub file_log_level: LogLevel,
    pub console_log_level: LogLevel,
    pub server_mode: bool,
    pub master_password_required: bool,
    pub authentication_sources: Vec<AuthSource>,
    pub oauth2_providers: Vec<ProviderSummaryDto>,
}

impl From<&Settings> for SettingsSummaryDto {
    fn from(settings: &Settings) -> Self {
        Self {
            file_log_level: settings.file_log_level(),
            console_log_level: settings.console_log_level(),
            server_mode: settings.server_mode(),
            master_password_required: settings.master_password_required(),
            authentication_sources: settings.authentication_sources().to_vec(),
            oauth2_providers: settings
                .oauth2_providers()
                .iter()
                .map(ProviderSummaryDto::from)
                .collect(),
        }
    }
}
