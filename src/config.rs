use std::env;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prng::{DEFAULT_SEED_BYTES, MIN_SEED_BYTES};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Seed generation
    pub seed_bytes: usize,

    // Output
    pub output_dir: Option<PathBuf>,
    pub debug_result: bool,

    // Monitoring and logging
    pub log_level: String,
    pub metrics_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_bytes: DEFAULT_SEED_BYTES,
            output_dir: None,
            debug_result: false,
            log_level: "info".to_string(),
            metrics_enabled: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(val) = lookup("TOMBOLA_SEED_BYTES") {
            config.seed_bytes = val.parse()
                .map_err(|_| ConfigError::InvalidEnvVar("TOMBOLA_SEED_BYTES".to_string(), val))?;
        }

        if let Some(val) = lookup("TOMBOLA_OUTPUT_DIR") {
            if !val.is_empty() {
                config.output_dir = Some(PathBuf::from(val));
            }
        }

        if let Some(val) = lookup("TOMBOLA_DEBUG_RESULT") {
            config.debug_result = val == "1";
        }

        if let Some(val) = lookup("LOG_LEVEL") {
            config.log_level = val.to_lowercase();
        }

        if let Some(val) = lookup("METRICS_ENABLED") {
            config.metrics_enabled = val == "1";
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed_bytes < MIN_SEED_BYTES {
            return Err(ConfigError::ValidationError(format!(
                "TOMBOLA_SEED_BYTES must be at least {}",
                MIN_SEED_BYTES
            )));
        }

        if !matches!(self.log_level.as_str(), "error" | "warn" | "info" | "debug") {
            return Err(ConfigError::ValidationError(
                "LOG_LEVEL must be one of error, warn, info, debug".to_string(),
            ));
        }

        if let Some(dir) = &self.output_dir {
            if !dir.is_dir() {
                return Err(ConfigError::ValidationError(format!(
                    "TOMBOLA_OUTPUT_DIR {} is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    pub fn debug_enabled(&self) -> bool {
        self.log_level == "debug"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.seed_bytes, 32);
        assert_eq!(config.log_level, "info");
        assert!(!config.metrics_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TOMBOLA_SEED_BYTES", "64"),
            ("LOG_LEVEL", "DEBUG"),
            ("METRICS_ENABLED", "1"),
            ("TOMBOLA_DEBUG_RESULT", "1"),
        ]))
        .unwrap();
        assert_eq!(config.seed_bytes, 64);
        assert!(config.debug_enabled());
        assert!(config.metrics_enabled);
        assert!(config.debug_result);
    }

    #[test]
    fn rejects_bad_values() {
        let err = Config::from_lookup(lookup(&[("TOMBOLA_SEED_BYTES", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "TOMBOLA_SEED_BYTES"));

        let config = Config::from_lookup(lookup(&[("TOMBOLA_SEED_BYTES", "8")])).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let config = Config::from_lookup(lookup(&[("LOG_LEVEL", "verbose")])).unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_lookup(lookup(&[("TOMBOLA_OUTPUT_DIR", "/definitely/not/here")])).unwrap();
        assert!(config.validate().is_err());
    }
}
