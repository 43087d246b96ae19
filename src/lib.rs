//! Local settings of a multi-user administration web application: log
//! levels, deployment mode, master password policy and the authentication
//! sources with their OAuth2 identity providers.
//!
//! Settings are loaded once with [`services::settings::SettingsLoader`] and
//! shared read-only (typically as `Arc<Settings>`).

pub mod domain;
pub mod dto;
pub mod logging;
pub mod models;
pub mod services;

pub use services::settings::{OAuth2Provider, Settings, SettingsLoader};

/// Directory holding `default.yaml` and the profile overrides.
pub const CONFIG_DIR: &str = "config";

/// Log file written when `APP_LOG_FILE` is not set.
pub const DEFAULT_LOG_FILE: &str = "local-settings.log";
