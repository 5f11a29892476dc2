//! Engine configuration, loaded from the environment at startup.

use std::time::Duration;
use tracing::Level;

const DEFAULT_MAX_ROUND_SECS: u64 = 45;
const DEFAULT_ADVANCE_DELAY_SECS: u64 = 5;
const DEFAULT_SKIP_KEYWORD: &str = "!skip";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Quiz tunables and logging configuration.
///
/// The per-round wall-clock cap is configuration, not part of the round
/// state machine's contract: entries that ask to play to their natural end
/// are clipped to `max_round_secs`.
#[derive(Clone, Debug)]
pub struct Config {
    pub max_round_secs: u64,
    pub advance_delay_secs: u64,
    pub skip_keyword: String,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_round_secs: DEFAULT_MAX_ROUND_SECS,
            advance_delay_secs: DEFAULT_ADVANCE_DELAY_SECS,
            skip_keyword: DEFAULT_SKIP_KEYWORD.to_string(),
            log_level: Level::INFO,
        }
    }
}

fn read_u64(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string())),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let max_round_secs = read_u64("MAX_ROUND_SECS", DEFAULT_MAX_ROUND_SECS)?;
        if max_round_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ROUND_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let advance_delay_secs = read_u64("ADVANCE_DELAY_SECS", DEFAULT_ADVANCE_DELAY_SECS)?;

        let skip_keyword =
            std::env::var("SKIP_KEYWORD").unwrap_or_else(|_| DEFAULT_SKIP_KEYWORD.to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            max_round_secs,
            advance_delay_secs,
            skip_keyword,
            log_level,
        })
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_secs(self.advance_delay_secs)
    }
}
