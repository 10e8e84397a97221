//! Configuration loading for fishbot.
//!
//! Two layers, kept deliberately separate:
//!
//! - [`load_settings`] reads the non-secret knobs from
//!   `{data_dir}/fishbot.toml` and falls back to defaults when the file
//!   is missing or malformed.
//! - [`Credentials::from_env`] reads the secrets (bot token, commerce
//!   client id/secret) and the operator chat id from the environment;
//!   missing or invalid values are fatal at startup.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use fishbot_types::config::Settings;
use fishbot_types::error::ConfigError;
use fishbot_types::ids::ChatId;

/// Resolve the data directory: `FISHBOT_DATA_DIR` if set, else `~/.fishbot`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FISHBOT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fishbot")
}

/// Load runtime settings from `{data_dir}/fishbot.toml`.
///
/// - If the file does not exist, returns [`Settings::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and
///   returns the default.
pub async fn load_settings(data_dir: &Path) -> Settings {
    let settings_path = data_dir.join("fishbot.toml");

    let content = match tokio::fs::read_to_string(&settings_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No fishbot.toml found at {}, using defaults", settings_path.display());
            return Settings::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", settings_path.display());
            return Settings::default();
        }
    };

    match toml::from_str::<Settings>(&content) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                settings_path.display()
            );
            Settings::default()
        }
    }
}

/// Secrets and operator identity, loaded once at startup.
///
/// The token and client secret are wrapped in [`SecretString`] so they
/// never appear in Debug output or tracing logs.
#[derive(Debug)]
pub struct Credentials {
    pub telegram_token: SecretString,
    pub commerce_client_id: String,
    pub commerce_client_secret: SecretString,
    /// Chat that receives mirrored error-level log entries.
    pub operator_chat_id: ChatId,
}

impl Credentials {
    /// Read all credentials from the environment.
    ///
    /// Required variables: `TELEGRAM_TOKEN`, `COMMERCE_CLIENT_ID`,
    /// `COMMERCE_CLIENT_SECRET`, `OPERATOR_CHAT_ID`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let operator_raw = require_var("OPERATOR_CHAT_ID")?;
        let operator_chat_id = operator_raw
            .parse::<i64>()
            .map(ChatId)
            .map_err(|e| ConfigError::Invalid {
                name: "OPERATOR_CHAT_ID",
                reason: e.to_string(),
            })?;

        Ok(Self {
            telegram_token: SecretString::from(require_var("TELEGRAM_TOKEN")?),
            commerce_client_id: require_var("COMMERCE_CLIENT_ID")?,
            commerce_client_secret: SecretString::from(require_var("COMMERCE_CLIENT_SECRET")?),
            operator_chat_id,
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) => Err(ConfigError::Invalid {
            name,
            reason: "set but empty".to_string(),
        }),
        Err(_) => Err(ConfigError::Missing(name)),
    }
}
