//! Application configuration for the Frontis engine.
//!
//! `AppConfig` represents the top-level `config.toml` in the data
//! directory. All fields have defaults so a missing or partial file
//! still yields a runnable configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded from `{data_dir}/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database URL. When absent, a default under the data
    /// directory is used.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Tracing filter directive, overridable via `FRONTIS_LOG`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "frontis=info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            log_filter: default_log_filter(),
        }
    }
}
