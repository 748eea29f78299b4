//! Configuration management for the CLI.

use std::env;
use std::path::PathBuf;

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Snapshot file the library is loaded from and saved to
    pub data_path: PathBuf,
    /// Write the snapshot back after every successful mutation
    pub autosave: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_path = env::var("CIRCULATE_DATA")
            .unwrap_or_else(|_| "library.json".to_string())
            .into();

        let autosave = match env::var("CIRCULATE_AUTOSAVE") {
            Ok(raw) => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidAutosave(raw)),
            },
            Err(_) => true,
        };

        Ok(Self {
            data_path,
            autosave,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid CIRCULATE_AUTOSAVE value {0:?}, expected true or false")]
    InvalidAutosave(String),
}
