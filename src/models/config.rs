//! Configuration model loaded from external sources.
//!
//! Keys keep the host application's upper-case names. Lower-case aliases
//! cover sources that normalise key case.

use serde::Deserialize;
use validator::Validate;

use crate::domain::{ClientSecret, LogLevel};

pub const DEFAULT_SCOPE: &str = "openid email profile";

fn default_log_level() -> LogLevel {
    LogLevel::Warning
}

fn default_true() -> bool {
    true
}

fn default_auth_sources() -> Vec<String> {
    vec!["internal".to_string()]
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

#[derive(Clone, Debug, Deserialize, Validate)]
/// Local settings as written in the settings file.
pub struct LocalConfig {
    #[serde(
        rename = "FILE_LOG_LEVEL",
        alias = "file_log_level",
        default = "default_log_level"
    )]
    pub file_log_level: LogLevel,
    #[serde(
        rename = "CONSOLE_LOG_LEVEL",
        alias = "console_log_level",
        default = "default_log_level"
    )]
    pub console_log_level: LogLevel,
    #[serde(rename = "SERVER_MODE", alias = "server_mode", default)]
    pub server_mode: bool,
    #[serde(
        rename = "MASTER_PASSWORD_REQUIRED",
        alias = "master_password_required",
        default = "default_true"
    )]
    pub master_password_required: bool,
    #[serde(
        rename = "AUTHENTICATION_SOURCES",
        alias = "authentication_sources",
        default = "default_auth_sources"
    )]
    #[validate(length(min = 1))]
    pub authentication_sources: Vec<String>,
    #[serde(rename = "OAUTH2_CONFIG", alias = "oauth2_config", default)]
    #[validate(nested)]
    pub oauth2_config: Vec<OAuth2ProviderConfig>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
/// One OAuth2 identity provider descriptor.
pub struct OAuth2ProviderConfig {
    #[serde(rename = "OAUTH2_NAME", alias = "oauth2_name")]
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "OAUTH2_DISPLAY_NAME", alias = "oauth2_display_name", default)]
    pub display_name: Option<String>,
    #[serde(rename = "OAUTH2_CLIENT_ID", alias = "oauth2_client_id")]
    #[validate(length(min = 1))]
    pub client_id: String,
    #[serde(rename = "OAUTH2_CLIENT_SECRET", alias = "oauth2_client_secret", default)]
    pub client_secret: Option<ClientSecret>,
    /// Name of an environment variable holding the client secret.
    #[serde(
        rename = "OAUTH2_CLIENT_SECRET_ENV",
        alias = "oauth2_client_secret_env",
        default
    )]
    pub client_secret_env: Option<String>,
    #[serde(rename = "OAUTH2_TOKEN_URL", alias = "oauth2_token_url")]
    #[validate(url)]
    pub token_url: String,
    #[serde(rename = "OAUTH2_AUTHORIZATION_URL", alias = "oauth2_authorization_url")]
    #[validate(url)]
    pub authorization_url: String,
    #[serde(
        rename = "OAUTH2_SERVER_METADATA_URL",
        alias = "oauth2_server_metadata_url"
    )]
    #[validate(url)]
    pub server_metadata_url: String,
    #[serde(rename = "OAUTH2_API_BASE_URL", alias = "oauth2_api_base_url", default)]
    #[validate(url)]
    pub api_base_url: Option<String>,
    #[serde(rename = "OAUTH2_USERINFO_ENDPOINT", alias = "oauth2_userinfo_endpoint")]
    #[validate(url)]
    pub userinfo_endpoint: String,
    #[serde(rename = "OAUTH2_LOGOUT_URL", alias = "oauth2_logout_url", default)]
    pub logout_url: Option<String>,
    #[serde(
        rename = "OAUTH2_SCOPE",
        alias = "oauth2_scope",
        default = "default_scope"
    )]
    #[validate(length(min = 1))]
    pub scope: String,
    #[serde(rename = "OAUTH2_USERNAME_CLAIM", alias = "oauth2_username_claim", default)]
    pub username_claim: Option<String>,
    #[serde(rename = "OAUTH2_ICON", alias = "oauth2_icon", default)]
    pub icon: Option<String>,
    #[serde(rename = "OAUTH2_BUTTON_COLOR", alias = "oauth2_button_color", default)]
    pub button_color: Option<String>,
    #[serde(
        rename = "OAUTH2_SSL_CERT_VERIFICATION",
        alias = "oauth2_ssl_cert_verification",
        default = "default_true"
    )]
    pub ssl_cert_verification: bool,
}
