//! Run configuration.
//!
//! The reference configuration is a fixed set of constants: read `input.bmp`, blur it
//! 100 times with 10 worker threads, write `output.bmp`. A JSON file can override any
//! subset of those fields.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "input.bmp";
pub const DEFAULT_OUTPUT: &str = "output.bmp";
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_ROUNDS: u32 = 100;

/// Parameters of one blur run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Image to read.
    pub input: PathBuf,
    /// Where to write the blurred image.
    pub output: PathBuf,
    /// Number of worker threads, fixed for the whole run.
    pub workers: usize,
    /// Number of blur rounds.
    pub rounds: u32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            workers: DEFAULT_WORKERS,
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl BlurConfig {
    /// Parse a JSON override; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BlurConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_constants() {
        let config = BlurConfig::default();

        assert_eq!(config.input, PathBuf::from("input.bmp"));
        assert_eq!(config.output, PathBuf::from("output.bmp"));
        assert_eq!(config.workers, 10);
        assert_eq!(config.rounds, 100);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BlurConfig::from_json(r#"{ "rounds": 3 }"#).unwrap();

        assert_eq!(config.rounds, 3);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.input, PathBuf::from(DEFAULT_INPUT));
    }

    #[test]
    fn zero_workers_rejected() {
        let err = BlurConfig::from_json(r#"{ "workers": 0 }"#).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_rejected() {
        let err = BlurConfig::from_json("{ rounds: ").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = BlurConfig::load_or_default(dir.path().join("absent.json")).unwrap();

        assert_eq!(config, BlurConfig::default());
    }

    #[test]
    fn file_overrides_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boxblur.json");
        std::fs::write(&path, r#"{ "workers": 4, "output": "out.bmp" }"#).unwrap();

        let config = BlurConfig::load_or_default(&path).unwrap();

        assert_eq!(config.workers, 4);
        assert_eq!(config.output, PathBuf::from("out.bmp"));
        assert_eq!(config.rounds, DEFAULT_ROUNDS);
    }
}
