//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. The two
//! service origins (`API_BASE_URL`, `WS_BASE_URL`) are resolved once at boot;
//! the per-field setters exist for tests and overrides, not for runtime
//! reconfiguration.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub api_base_url: String,
    pub ws_base_url: String,
    pub http_timeout_seconds: u64,
    pub ws_reconnect_base_ms: u64,
    pub ws_reconnect_max_ms: u64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// This method is used internally to populate the singleton. It panics
    /// if required variables are missing or improperly formatted.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "triage-client".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "app=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "client.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            api_base_url: env::var("API_BASE_URL").expect("API_BASE_URL is required"),
            ws_base_url: env::var("WS_BASE_URL").expect("WS_BASE_URL is required"),
            http_timeout_seconds: env::var("HTTP_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap(),
            ws_reconnect_base_ms: env::var("WS_RECONNECT_BASE_MS")
                .unwrap_or_else(|_| "500".into())
                .parse()
                .unwrap(),
            ws_reconnect_max_ms: env::var("WS_RECONNECT_MAX_MS")
                .unwrap_or_else(|_| "30000".into())
                .parse()
                .unwrap(),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap();
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_project_name(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.project_name = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_api_base_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.api_base_url = value.into());
    }

    pub fn set_ws_base_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.ws_base_url = value.into());
    }

    pub fn set_http_timeout_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.http_timeout_seconds = value);
    }

    pub fn set_ws_reconnect_base_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.ws_reconnect_base_ms = value);
    }

    pub fn set_ws_reconnect_max_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.ws_reconnect_max_ms = value);
    }
}

// --- Per-key accessors, the form the rest of the workspace consumes ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn api_base_url() -> String {
    AppConfig::global().api_base_url.clone()
}

pub fn ws_base_url() -> String {
    AppConfig::global().ws_base_url.clone()
}

pub fn http_timeout_seconds() -> u64 {
    AppConfig::global().http_timeout_seconds
}

pub fn ws_reconnect_base_ms() -> u64 {
    AppConfig::global().ws_reconnect_base_ms
}

pub fn ws_reconnect_max_ms() -> u64 {
    AppConfig::global().ws_reconnect_max_ms
}
