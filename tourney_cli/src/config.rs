//! CLI configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::path::PathBuf;

/// Snapshot path used when neither `--data` nor `TOURNEY_DATA_FILE` is set
pub const DEFAULT_DATA_FILE: &str = "data.json";

/// Complete CLI configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// JSON snapshot of the competition store
    pub data_file: PathBuf,
    /// Seed for group draws and knockout shuffles; OS entropy when `None`
    pub seed: Option<u64>,
}

impl CliConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `data_override` - Optional snapshot path override (from CLI args)
    /// * `seed_override` - Optional seed override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(
        data_override: Option<PathBuf>,
        seed_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(data_override, seed_override, |key| std::env::var(key).ok())
    }

    /// Same as [`CliConfig::from_env`] with an explicit variable source
    pub fn from_lookup<F>(
        data_override: Option<PathBuf>,
        seed_override: Option<u64>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_file = data_override
            .or_else(|| lookup("TOURNEY_DATA_FILE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let seed = match seed_override {
            Some(seed) => Some(seed),
            None => match lookup("TOURNEY_SEED") {
                Some(raw) if !raw.trim().is_empty() => {
                    Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                        var: "TOURNEY_SEED".to_string(),
                        reason: format!("Expected an unsigned integer, got {raw:?}"),
                    })?)
                }
                _ => None,
            },
        };

        Ok(CliConfig { data_file, seed })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired {
                var: "TOURNEY_DATA_FILE".to_string(),
                hint: format!("Pass --data FILE or leave unset to use {DEFAULT_DATA_FILE}"),
            });
        }

        if self.data_file.is_dir() {
            return Err(ConfigError::Invalid {
                var: "TOURNEY_DATA_FILE".to_string(),
                reason: format!("{} is a directory", self.data_file.display()),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}
