//! Engine configuration

use serde::{Deserialize, Serialize};

use digger_nestedset::EncodingFormat;
use digger_tree::StoreOptions;

use crate::EngineError;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Zero-padded digits before the decimal point of a position encoding
    pub integer_digits: usize,
    /// Truncated digits after it
    pub fraction_digits: usize,
    /// Sibling index of a parent's first child
    pub first_child_index: u64,
    /// `tracing` filter used when no `RUST_LOG` is set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            integer_digits: 4,
            fraction_digits: 32,
            first_child_index: 1,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.integer_digits == 0 {
            return Err(EngineError::Config("integer_digits must be at least 1".into()));
        }
        if self.fraction_digits == 0 {
            return Err(EngineError::Config("fraction_digits must be at least 1".into()));
        }
        if self.first_child_index == 0 {
            return Err(EngineError::Config(
                "first_child_index must be at least 1 for nested-set containment".into(),
            ));
        }
        Ok(())
    }

    pub fn format(&self) -> EncodingFormat {
        EncodingFormat::new(self.integer_digits, self.fraction_digits)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            format: self.format(),
            first_child_index: self.first_child_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.format().width(), 36);
        assert_eq!(config.store_options(), StoreOptions::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(r#"{"fraction_digits": 16, "log_filter": "debug"}"#).unwrap();
        assert_eq!(config.integer_digits, 4);
        assert_eq!(config.fraction_digits, 16);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            Config::from_json(r#"{"integer_digits": 0}"#),
            Err(EngineError::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{"first_child_index": 0}"#),
            Err(EngineError::Config(_))
        ));
        assert!(matches!(
            Config::from_json("not json"),
            Err(EngineError::Json(_))
        ));
    }
}
