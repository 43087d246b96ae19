//! Services loading settings and enforcing their invariants.
pub mod settings;

use crate::domain::TypeConstraintError;

/// Convenience alias for service results.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced while loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to load settings: {0}")]
    Load(#[source] config::ConfigError),
    #[error("invalid settings: {0}")]
    Validation(String),
    #[error(transparent)]
    Constraint(#[from] TypeConstraintError),
    #[error("oauth2 provider `{provider}`: {source}")]
    Provider {
        provider: String,
        #[source]
        source: TypeConstraintError,
    },
    #[error("authentication source `{0}` is listed more than once")]
    DuplicateAuthSource(String),
    #[error("oauth2 authentication is enabled but no provider is configured")]
    MissingOAuth2Providers,
    #[error("oauth2 provider `{0}` is configured more than once")]
    DuplicateProvider(String),
    #[error(
        "oauth2 provider `{0}` must set exactly one of OAUTH2_CLIENT_SECRET and OAUTH2_CLIENT_SECRET_ENV"
    )]
    AmbiguousSecret(String),
    #[error("oauth2 provider `{0}` has an empty client secret")]
    EmptySecret(String),
    #[error("environment variable `{var}` holding the secret of provider `{provider}` is not set or empty")]
    MissingSecret { provider: String, var: String },
}
