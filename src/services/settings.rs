use std::collections::HashSet;
use std::path::PathBuf;

use config::Config;
use log::{debug, warn};
use validator::Validate;

use crate::domain::{
    AuthSource, ButtonColor, ClientSecret, EndpointUrl, LogLevel, LogoutUrl, ProviderName, Scopes,
    TypeConstraintError,
};
use crate::models::config::{LocalConfig, OAuth2ProviderConfig};
use crate::services::{ServiceError, ServiceResult};

/// Prefix of environment variables overriding settings file values.
pub const ENV_PREFIX: &str = "APP";

/// Claim used as user name when a provider does not name one.
pub const DEFAULT_USERNAME_CLAIM: &str = "email";

const SCALAR_KEYS: [&str; 4] = [
    "FILE_LOG_LEVEL",
    "CONSOLE_LOG_LEVEL",
    "SERVER_MODE",
    "MASTER_PASSWORD_REQUIRED",
];
const AUTH_SOURCES_KEY: &str = "AUTHENTICATION_SOURCES";

/// Reads layered settings sources into a validated [`Settings`] record.
///
/// Sources, lowest precedence first: `<dir>/default.*`, `<dir>/<profile>.*`
/// (optional) and `APP_*` environment variables. Every call to
/// [`SettingsLoader::load`] reads the sources again.
#[derive(Clone, Debug)]
pub struct SettingsLoader {
    config_dir: PathBuf,
    profile: String,
}

impl SettingsLoader {
    pub fn new(config_dir: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self {
            config_dir: config_dir.into(),
            profile: profile.into(),
        }
    }

    pub fn load(&self) -> ServiceResult<Settings> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Load using `env` in place of the process environment.
    pub fn load_with<F>(&self, env: F) -> ServiceResult<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = self.read_config(&env)?;
        Settings::from_config(config, &env)
    }

    fn read_config<F>(&self, env: &F) -> ServiceResult<LocalConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_path = self.config_dir.join("default");
        let profile_path = self.config_dir.join(&self.profile);

        let mut builder = Config::builder()
            .add_source(config::File::with_name(&default_path.to_string_lossy()))
            .add_source(config::File::with_name(&profile_path.to_string_lossy()).required(false));

        // `config::Environment` is not used here: it lower-cases keys, so
        // `APP_MASTER_PASSWORD_REQUIRED` would arrive as `master_password_required`
        // next to the file's `MASTER_PASSWORD_REQUIRED` and serde rejects the
        // pair as a duplicate field. Its `list_separator`/`with_list_parse_key`
        // split has the same problem for the sources list. Overrides are set
        // under the file's own key spelling instead.
        for key in SCALAR_KEYS {
            if let Some(value) = env(&format!("{ENV_PREFIX}_{key}")) {
                debug!("Overriding {key} from environment");
                builder = builder.set_override(key, value).map_err(ServiceError::Load)?;
            }
        }
        if let Some(value) = env(&format!("{ENV_PREFIX}_{AUTH_SOURCES_KEY}")) {
            let sources: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            builder = builder
                .set_override(AUTH_SOURCES_KEY, sources)
                .map_err(ServiceError::Load)?;
        }

        builder
            .build()
            .and_then(|settings| settings.try_deserialize::<LocalConfig>())
            .map_err(ServiceError::Load)
    }
}

/// Validated, read-only local settings.
#[derive(Clone, Debug)]
pub struct Settings {
    file_log_level: LogLevel,
    console_log_level: LogLevel,
    server_mode: bool,
    master_password_required: bool,
    authentication_sources: Vec<AuthSource>,
    oauth2_providers: Vec<OAuth2Provider>,
}

impl Settings {
    /// Validate a raw settings record. `env` resolves `OAUTH2_CLIENT_SECRET_ENV`.
    pub fn from_config<F>(config: LocalConfig, env: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        config
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let mut authentication_sources = Vec::with_capacity(config.authentication_sources.len());
        for raw in &config.authentication_sources {
            let source: AuthSource = raw.parse()?;
            if authentication_sources.contains(&source) {
                return Err(ServiceError::DuplicateAuthSource(source.to_string()));
            }
            authentication_sources.push(source);
        }

        let oauth2_enabled = authentication_sources.contains(&AuthSource::OAuth2);
        if oauth2_enabled && config.oauth2_config.is_empty() {
            return Err(ServiceError::MissingOAuth2Providers);
        }
        if !oauth2_enabled && !config.oauth2_config.is_empty() {
            debug!("oauth2 providers configured but oauth2 authentication is not enabled");
        }

        let mut seen = HashSet::new();
        let mut oauth2_providers = Vec::with_capacity(config.oauth2_config.len());
        for raw in config.oauth2_config {
            if !seen.insert(raw.name.clone()) {
                return Err(ServiceError::DuplicateProvider(raw.name));
            }
            oauth2_providers.push(OAuth2Provider::from_config(raw, &env)?);
        }

        if !config.server_mode && authentication_sources.iter().any(AuthSource::is_external) {
            warn!("External authentication sources only apply in server mode");
        }

        Ok(Self {
            file_log_level: config.file_log_level,
            console_log_level: config.console_log_level,
            server_mode: config.server_mode,
            master_password_required: config.master_password_required,
            authentication_sources,
            oauth2_providers,
        })
    }

    pub fn file_log_level(&self) -> LogLevel {
        self.file_log_level
    }

    pub fn console_log_level(&self) -> LogLevel {
        self.console_log_level
    }

    pub fn server_mode(&self) -> bool {
        self.server_mode
    }

    pub fn master_password_required(&self) -> bool {
        self.master_password_required
    }

    /// Enabled login mechanisms in priority order.
    pub fn authentication_sources(&self) -> &[AuthSource] {
        &self.authentication_sources
    }

    /// The first listed source.
    pub fn default_auth_source(&self) -> AuthSource {
        // `from_config` rejects an empty list.
        self.authentication_sources
            .first()
            .copied()
            .unwrap_or(AuthSource::Internal)
    }

    pub fn is_enabled(&self, source: AuthSource) -> bool {
        self.authentication_sources.contains(&source)
    }

    pub fn oauth2_providers(&self) -> &[OAuth2Provider] {
        &self.oauth2_providers
    }

    pub fn provider(&self, name: &str) -> Option<&OAuth2Provider> {
        self.oauth2_providers
            .iter()
            .find(|provider| provider.name().as_str() == name)
    }
}

/// A validated OAuth2 / OpenID Connect identity provider.
#[derive(Clone, Debug)]
pub struct OAuth2Provider {
    name: ProviderName,
    display_name: String,
    client_id: String,
    client_secret: ClientSecret,
    token_url: EndpointUrl,
    authorization_url: EndpointUrl,
    server_metadata_url: EndpointUrl,
    api_base_url: Option<EndpointUrl>,
    userinfo_endpoint: EndpointUrl,
    logout_url: Option<LogoutUrl>,
    scopes: Scopes,
    username_claim: Option<String>,
    icon: Option<String>,
    button_color: Option<ButtonColor>,
    ssl_cert_verification: bool,
}

impl OAuth2Provider {
    fn from_config<F>(raw: OAuth2ProviderConfig, env: &F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = raw.name.clone();
        let in_provider = |source: TypeConstraintError| ServiceError::Provider {
            provider: provider.clone(),
            source,
        };

        let client_secret = match (raw.client_secret, raw.client_secret_env) {
            (Some(secret), None) if secret.expose_secret().trim().is_empty() => {
                return Err(ServiceError::EmptySecret(provider.clone()));
            }
            (Some(secret), None) => secret,
            (None, Some(var)) => match env(&var).filter(|value| !value.trim().is_empty()) {
                Some(value) => ClientSecret::new(value),
                None => {
                    return Err(ServiceError::MissingSecret {
                        provider: provider.clone(),
                        var,
                    });
                }
            },
            _ => return Err(ServiceError::AmbiguousSecret(provider.clone())),
        };

        let logout_url = raw
            .logout_url
            .map(|template| LogoutUrl::try_new(template, &raw.client_id))
            .transpose()
            .map_err(in_provider)?;
        if logout_url
            .as_ref()
            .is_some_and(|logout| !logout.has_id_token_placeholder())
        {
            warn!("Logout url of oauth2 provider {provider} does not pass {{id_token}}");
        }
        let api_base_url = raw
            .api_base_url
            .as_deref()
            .map(EndpointUrl::try_from_str)
            .transpose()
            .map_err(in_provider)?;
        let button_color = raw
            .button_color
            .as_deref()
            .map(ButtonColor::try_from_str)
            .transpose()
            .map_err(in_provider)?;

        if !raw.ssl_cert_verification {
            warn!("TLS certificate verification is disabled for oauth2 provider {provider}");
        }

        Ok(Self {
            name: ProviderName::try_new(raw.name).map_err(in_provider)?,
            display_name: raw.display_name.unwrap_or_else(|| provider.clone()),
            client_id: raw.client_id,
            client_secret,
            token_url: EndpointUrl::try_from_str(&raw.token_url).map_err(in_provider)?,
            authorization_url: EndpointUrl::try_from_str(&raw.authorization_url)
                .map_err(in_provider)?,
            server_metadata_url: EndpointUrl::try_from_str(&raw.server_metadata_url)
                .map_err(in_provider)?,
            api_base_url,
            userinfo_endpoint: EndpointUrl::try_from_str(&raw.userinfo_endpoint)
                .map_err(in_provider)?,
            logout_url,
            scopes: Scopes::try_from_str(&raw.scope).map_err(in_provider)?,
            username_claim: raw.username_claim.filter(|claim| !claim.is_empty()),
            icon: raw.icon,
            button_color,
            ssl_cert_verification: raw.ssl_cert_verification,
        })
    }

    pub fn name(&self) -> &ProviderName {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }

    pub fn token_url(&self) -> &EndpointUrl {
        &self.token_url
    }

    pub fn authorization_url(&self) -> &EndpointUrl {
        &self.authorization_url
    }

    pub fn server_metadata_url(&self) -> &EndpointUrl {
        &self.server_metadata_url
    }

    pub fn api_base_url(&self) -> Option<&EndpointUrl> {
        self.api_base_url.as_ref()
    }

    pub fn userinfo_endpoint(&self) -> &EndpointUrl {
        &self.userinfo_endpoint
    }

    pub fn logout_url_template(&self) -> Option<&LogoutUrl> {
        self.logout_url.as_ref()
    }

    /// Logout URL with the id token and client id substituted.
    pub fn logout_url(&self, id_token: &str, redirect_uri: Option<&str>) -> Option<String> {
        self.logout_url
            .as_ref()
            .map(|logout| logout.render(id_token, &self.client_id, redirect_uri))
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    /// Claim holding the user name, `email` when unset.
    pub fn username_claim(&self) -> &str {
        self.username_claim
            .as_deref()
            .unwrap_or(DEFAULT_USERNAME_CLAIM)
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn button_color(&self) -> Option<&ButtonColor> {
        self.button_color.as_ref()
    }

    pub fn ssl_cert_verification(&self) -> bool {
        self.ssl_cert_verification
    }
}
