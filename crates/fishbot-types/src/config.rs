//! Runtime settings for fishbot.
//!
//! `Settings` represents the optional `fishbot.toml` in the data
//! directory. Everything here is a non-secret knob with a sensible
//! default; credentials stay in the environment.

use serde::{Deserialize, Serialize};

/// Non-secret runtime settings.
///
/// Loaded from `{data_dir}/fishbot.toml`. A missing or unparsable file
/// falls back to `Settings::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the chat platform's bot API.
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,

    /// Base URL of the commerce backend.
    #[serde(default = "default_commerce_api_base")]
    pub commerce_api_base: String,

    /// Long-poll wait in seconds for fetching updates.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Session database filename inside the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_commerce_api_base() -> String {
    "https://api.moltin.com".to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_database_file() -> String {
    "fishbot.db".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            telegram_api_base: default_telegram_api_base(),
            commerce_api_base: default_commerce_api_base(),
            poll_timeout_secs: default_poll_timeout_secs(),
            database_file: default_database_file(),
        }
    }
}
