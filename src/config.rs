// ⚙️ Configuration - environment (.env) with safe fallbacks

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

pub const DEFAULT_HISTORY_FILE: &str = "history.csv";
pub const DEFAULT_LOG_FILE: &str = "app.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// CSV file holding the calculation history
    pub history_file: PathBuf,

    /// Minimum level written to the log
    pub log_level: LevelFilter,

    /// Log destination (appended to)
    pub log_file: PathBuf,

    /// Mirror log output to stderr
    pub debug_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            log_level: LevelFilter::INFO,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            debug_mode: false,
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Self {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        AppConfig {
            history_file: lookup("HISTORY_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.history_file),
            log_level: lookup("LOG_LEVEL")
                .and_then(|v| parse_level(&v))
                .unwrap_or(defaults.log_level),
            log_file: lookup("LOG_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            debug_mode: lookup("DEBUG_MODE")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.debug_mode),
        }
    }
}

/// `true`/`1` (any case) are on, everything else is off
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1")
}

pub fn parse_level(value: &str) -> Option<LevelFilter> {
    // Python-style names map onto tracing levels
    let normalized = match value.trim().to_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" => "error".to_string(),
        other => other.to_string(),
    };
    LevelFilter::from_str(&normalized).ok()
}
