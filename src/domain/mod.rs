//! Strongly-typed domain structures for local settings.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Logging severity threshold, as used by the host application's settings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(try_from = "RawLogLevel", into = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Numeric severity (10, 20, ... 50).
    pub fn severity(&self) -> i64 {
        match self {
            LogLevel::Debug => 10,
            LogLevel::Info => 20,
            LogLevel::Warning => 30,
            LogLevel::Error => 40,
            LogLevel::Critical => 50,
        }
    }

    pub fn from_severity(value: i64) -> Result<Self, TypeConstraintError> {
        match value {
            10 => Ok(LogLevel::Debug),
            20 => Ok(LogLevel::Info),
            30 => Ok(LogLevel::Warning),
            40 => Ok(LogLevel::Error),
            50 => Ok(LogLevel::Critical),
            other => Err(TypeConstraintError::UnknownLogLevel(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => log::LevelFilter::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = TypeConstraintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(severity) = trimmed.parse::<i64>() {
            return Self::from_severity(severity);
        }
        match trimmed.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" | "FATAL" => Ok(LogLevel::Critical),
            _ => Err(TypeConstraintError::UnknownLogLevel(value.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for String {
    fn from(value: LogLevel) -> Self {
        value.as_str().to_string()
    }
}

/// Level as it may appear in a settings source: a name or a numeric severity.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLogLevel {
    Numeric(i64),
    Named(String),
}

impl TryFrom<RawLogLevel> for LogLevel {
    type Error = TypeConstraintError;

    fn try_from(value: RawLogLevel) -> Result<Self, TypeConstraintError> {
        match value {
            RawLogLevel::Numeric(severity) => LogLevel::from_severity(severity),
            RawLogLevel::Named(name) => name.parse(),
        }
    }
}

/// Login mechanism the application may enable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    Internal,
    Ldap,
    Kerberos,
    OAuth2,
    Webserver,
}

impl AuthSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthSource::Internal => "internal",
            AuthSource::Ldap => "ldap",
            AuthSource::Kerberos => "kerberos",
            AuthSource::OAuth2 => "oauth2",
            AuthSource::Webserver => "webserver",
        }
    }

    /// Whether the source delegates authentication outside the application.
    pub fn is_external(&self) -> bool {
        !matches!(self, AuthSource::Internal)
    }
}

impl FromStr for AuthSource {
    type Err = TypeConstraintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(AuthSource::Internal),
            "ldap" => Ok(AuthSource::Ldap),
            "kerberos" => Ok(AuthSource::Kerberos),
            "oauth2" => Ok(AuthSource::OAuth2),
            "webserver" => Ok(AuthSource::Webserver),
            _ => Err(TypeConstraintError::UnknownAuthSource(value.to_string())),
        }
    }
}

impl fmt::Display for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of an OAuth2 provider entry.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ProviderName(String);

impl ProviderName {
    pub fn try_new(value: String) -> Result<Self, TypeConstraintError> {
        if value.trim().is_empty() {
            return Err(TypeConstraintError::InvalidProviderName(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Absolute `http`/`https` URL of a provider endpoint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EndpointUrl(Url);

impl EndpointUrl {
    pub fn try_from_str(input: &str) -> Result<Self, TypeConstraintError> {
        let url = Url::parse(input.trim()).map_err(|e| TypeConstraintError::InvalidUrl {
            url: input.to_string(),
            reason: e.to_string(),
        })?;
        check_http_url(&url, input)?;
        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

fn check_http_url(url: &Url, input: &str) -> Result<(), TypeConstraintError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(TypeConstraintError::InvalidUrl {
            url: input.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(TypeConstraintError::InvalidUrl {
            url: input.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(())
}

const ID_TOKEN_PLACEHOLDER: &str = "{id_token}";
const CLIENT_ID_PLACEHOLDER: &str = "{client_id}";
const REDIRECT_URI_PLACEHOLDER: &str = "{redirect_uri}";

/// End-session URL template with `{id_token}`/`{client_id}` placeholders.
///
/// Placeholders are optional. `{<client id>}` (e.g. `{pgadmin}` for client
/// `pgadmin`) is accepted as a client id placeholder too; when that alias
/// spells another placeholder, the other placeholder wins. Substituted values
/// are percent-encoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogoutUrl {
    template: String,
}

impl LogoutUrl {
    pub fn try_new(template: String, client_id: &str) -> Result<Self, TypeConstraintError> {
        let logout = Self { template };
        let sample = logout.render("sample-token", client_id, Some("https://localhost/"));
        if sample.contains('{') || sample.contains('}') {
            return Err(TypeConstraintError::UnknownPlaceholder(logout.template));
        }
        let url = Url::parse(&sample).map_err(|e| TypeConstraintError::InvalidUrl {
            url: logout.template.clone(),
            reason: e.to_string(),
        })?;
        check_http_url(&url, &logout.template)?;
        Ok(logout)
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether the identity provider receives the id token hint.
    pub fn has_id_token_placeholder(&self) -> bool {
        self.template.contains(ID_TOKEN_PLACEHOLDER)
    }

    /// Substitute the placeholders for a concrete logout.
    pub fn render(&self, id_token: &str, client_id: &str, redirect_uri: Option<&str>) -> String {
        let client_alias = format!("{{{client_id}}}");
        let encoded_client = encode_component(client_id);
        self.template
            .replace(ID_TOKEN_PLACEHOLDER, &encode_component(id_token))
            .replace(CLIENT_ID_PLACEHOLDER, &encoded_client)
            .replace(&client_alias, &encoded_client)
            .replace(
                REDIRECT_URI_PLACEHOLDER,
                &encode_component(redirect_uri.unwrap_or_default()),
            )
    }
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// CSS hex color for a login button.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ButtonColor(String);

impl ButtonColor {
    pub fn try_from_str(value: &str) -> Result<Self, TypeConstraintError> {
        let digits = value
            .strip_prefix('#')
            .ok_or_else(|| TypeConstraintError::InvalidColor(value.to_string()))?;
        if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeConstraintError::InvalidColor(value.to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// OAuth2 client secret. Never printed.
#[derive(Clone, Eq, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(***)")
    }
}

impl fmt::Display for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Space separated scope string requested from the provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scopes(String);

impl Scopes {
    pub fn try_from_str(value: &str) -> Result<Self, TypeConstraintError> {
        if value.split_whitespace().next().is_none() {
            return Err(TypeConstraintError::EmptyScope);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.iter().any(|s| s == scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parses_names_and_severities() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("50".parse::<LogLevel>().unwrap(), LogLevel::Critical);
        assert_eq!(LogLevel::from_severity(10).unwrap(), LogLevel::Debug);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert!(LogLevel::from_severity(25).is_err());
    }

    #[test]
    fn log_level_maps_to_filter() {
        assert_eq!(LogLevel::Warning.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::Critical.to_level_filter(), log::LevelFilter::Error);
        assert!(LogLevel::Debug < LogLevel::Info);
    }

    #[test]
    fn auth_source_accepts_known_set_only() {
        assert_eq!("OAuth2".parse::<AuthSource>().unwrap(), AuthSource::OAuth2);
        assert_eq!("internal".parse::<AuthSource>().unwrap(), AuthSource::Internal);
        assert!(!AuthSource::Internal.is_external());
        assert!(AuthSource::Ldap.is_external());
        assert!(matches!(
            "saml".parse::<AuthSource>(),
            Err(TypeConstraintError::UnknownAuthSource(_))
        ));
    }

    #[test]
    fn endpoint_url_requires_absolute_http() {
        let url = EndpointUrl::try_from_str(
            "http://keycloak:8080/realms/platform/protocol/openid-connect/token",
        )
        .unwrap();
        assert_eq!(url.as_url().host_str(), Some("keycloak"));
        assert_eq!(url.as_url().port(), Some(8080));

        assert!(EndpointUrl::try_from_str("/realms/platform/token").is_err());
        assert!(EndpointUrl::try_from_str("ftp://keycloak/token").is_err());
        assert!(EndpointUrl::try_from_str("mailto:admin@example.com").is_err());
    }

    #[test]
    fn logout_url_substitutes_placeholders() {
        let logout = LogoutUrl::try_new(
            "http://keycloak:8080/logout?id_token_hint={id_token}&client_id={pgadmin}".into(),
            "pgadmin",
        )
        .unwrap();

        assert_eq!(
            logout.render("a b+c", "pgadmin", None),
            "http://keycloak:8080/logout?id_token_hint=a+b%2Bc&client_id=pgadmin"
        );
    }

    #[test]
    fn logout_url_supports_client_id_and_redirect() {
        let logout = LogoutUrl::try_new(
            "https://idp/logout?client_id={client_id}&post_logout_redirect_uri={redirect_uri}"
                .into(),
            "app",
        )
        .unwrap();

        assert_eq!(
            logout.render("tok", "app", Some("https://app/login")),
            "https://idp/logout?client_id=app&post_logout_redirect_uri=https%3A%2F%2Fapp%2Flogin"
        );
    }

    #[test]
    fn logout_url_id_token_wins_over_client_alias() {
        let logout = LogoutUrl::try_new(
            "https://idp/logout?hint={id_token}&client_id={client_id}".into(),
            "id_token",
        )
        .unwrap();

        assert_eq!(
            logout.render("tok", "id_token", None),
            "https://idp/logout?hint=tok&client_id=id_token"
        );
    }

    #[test]
    fn logout_url_without_placeholders_is_accepted() {
        let logout = LogoutUrl::try_new("http://k/logout".into(), "app").unwrap();

        assert!(!logout.has_id_token_placeholder());
        assert_eq!(logout.render("tok", "app", None), "http://k/logout");
    }

    #[test]
    fn logout_url_rejects_unknown_placeholders() {
        let err = LogoutUrl::try_new(
            "https://idp/logout?client_id={other}".into(),
            "app",
        )
        .unwrap_err();
        assert!(matches!(err, TypeConstraintError::UnknownPlaceholder(_)));

        assert!(LogoutUrl::try_new("logout?x={id_token}".into(), "app").is_err());
    }

    #[test]
    fn button_color_validates_hex() {
        assert_eq!(ButtonColor::try_from_str("#F44242").unwrap().as_str(), "#f44242");
        assert!(ButtonColor::try_from_str("#fff").is_ok());
        assert!(ButtonColor::try_from_str("f44242").is_err());
        assert!(ButtonColor::try_from_str("#f4424").is_err());
        assert!(ButtonColor::try_from_str("#gggggg").is_err());
    }

    #[test]
    fn client_secret_is_redacted() {
        let secret = ClientSecret::new("7fbf85fdd0c884d0cc845355fbbe00f4".into());
        assert_eq!(format!("{secret:?}"), "ClientSecret(***)");
        assert_eq!(secret.to_string(), "***");
        assert_eq!(secret.expose_secret(), "7fbf85fdd0c884d0cc845355fbbe00f4");
    }

    #[test]
    fn scopes_split_on_whitespace() {
        let scopes = Scopes::try_from_str("openid email  profile").unwrap();
        assert_eq!(scopes.iter().collect::<Vec<_>>(), vec!["openid", "email", "profile"]);
        assert!(scopes.contains("openid"));
        assert!(Scopes::try_from_str("   ").is_err());
    }

    #[test]
    fn provider_name_rejects_blank() {
        assert!(ProviderName::try_new("Keycloak".into()).is_ok());
        assert_eq!(
            ProviderName::try_new("Company SSO".into()).unwrap().as_str(),
            "Company SSO"
        );
        assert!(ProviderName::try_new("".into()).is_err());
        assert!(ProviderName::try_new("   ".into()).is_err());
    }
}

#[derive(Debug, Error)]
pub enum TypeConstraintError {
    #[error("unknown log level `{0}`")]
    UnknownLogLevel(String),
    #[error("unknown authentication source `{0}`")]
    UnknownAuthSource(String),
    #[error("invalid provider name `{0}`")]
    InvalidProviderName(String),
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unknown placeholder in logout url `{0}`")]
    UnknownPlaceholder(String),
    #[error("invalid button color `{0}`")]
    InvalidColor(String),
    #[error("scope must not be empty")]
    EmptyScope,
}
