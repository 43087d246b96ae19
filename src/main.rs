//! Loads the local settings, installs logging and prints the effective,
//! redacted settings as JSON.
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use dotenvy::dotenv;

use local_settings::dto::{SettingsSummaryDto, login_buttons};
use local_settings::{CONFIG_DIR, DEFAULT_LOG_FILE, SettingsLoader, logging};

fn main() {
    // Load environment variables from `.env` in local development.
    dotenv().ok();

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = match SettingsLoader::new(CONFIG_DIR, app_env).load() {
        Ok(settings) => Arc::new(settings),
        Err(err) => {
            // The logger is configured from the settings; fall back to stderr.
            eprintln!("Error loading settings: {}", err);
            std::process::exit(1);
        }
    };

    let log_file = env::var("APP_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE));
    if let Err(err) = logging::init(&settings, Some(&log_file)) {
        eprintln!("Error initializing logging: {}", err);
        std::process::exit(1);
    }

    log::info!(
        "Settings loaded: server mode {}, default authentication source {}",
        settings.server_mode(),
        settings.default_auth_source()
    );
    for button in login_buttons(&settings) {
        log::debug!("OAuth2 login enabled for {}", button.display_name);
    }

    let summary = SettingsSummaryDto::from(settings.as_ref());
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            log::error!("Error serializing settings: {}", err);
            std::process::exit(1);
        }
    }
}
