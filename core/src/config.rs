//! Configuration for the core crate
//!
//! This module provides the ingestion limits applied by the validator and
//! the pipeline. The on-chain payload ceiling is fixed by the ledger and is
//! not configurable.

use serde::{Serialize, Deserialize};

/// Ingestion limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestLimits {
    /// Maximum accepted file size in bytes
    pub max_file_size: u64,

    /// Row count above which a warning is raised and rows are capped downstream
    pub max_rows: usize,

    /// Column count above which a warning is raised
    pub max_columns: usize,

    /// Number of rows kept in the validation preview
    pub preview_rows: usize,

    /// Fraction of missing values above which a column is reported
    pub missing_value_ratio: f64,
}

impl Default for IngestLimits {
    fn default() -> Self {
        IngestLimits {
            max_file_size: 10 * 1024 * 1024,
            max_rows: 10_000,
            max_columns: 50,
            preview_rows: 5,
            missing_value_ratio: 0.5,
        }
    }
}

/// Core configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Ingestion limits
    pub limits: IngestLimits,

    /// Default log level when `RUST_LOG` is not set
    pub log_level: String,

    /// Also log HTTP request traces at debug level
    pub debug_mode: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            limits: IngestLimits::default(),
            log_level: "info".to_string(),
            debug_mode: false,
        }
    }
}

impl CoreConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self, crate::error::CoreError> {
        let file = std::fs::File::open(path)?;
        let config: CoreConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<(), crate::error::CoreError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Reject limits that would make every upload invalid or every column suspicious
    pub fn validate(&self) -> Result<(), crate::error::CoreError> {
        if self.limits.max_file_size == 0 {
            return Err(crate::error::to_config_error("max_file_size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.limits.missing_value_ratio) {
            return Err(crate::error::to_config_error(format!(
                "missing_value_ratio must be within 0..=1, got {}",
                self.limits.missing_value_ratio
            )));
        }
        Ok(())
    }

    /// Log filter directives used when the environment does not provide any
    pub fn log_filter(&self) -> String {
        let level = match self.log_level.trim() {
            "" => "info",
            level => level,
        };
        if self.debug_mode {
            format!("{},tower_http=debug", level)
        } else {
            level.to_string()
        }
    }

    /// Create a development configuration
    pub fn development() -> Self {
        let mut config = Self::default();
        config.debug_mode = true;
        config.log_level = "debug".to_string();
        config
    }

    /// Create a production configuration
    pub fn production() -> Self {
        let mut config = Self::default();
        config.debug_mode = false;
        config.log_level = "info".to_string();
        config
    }

    /// Create a testing configuration
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.debug_mode = true;
        config.log_level = "debug".to_string();
        config.limits.max_rows = 100;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();

        assert_eq!(config.limits.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.limits.max_rows, 10_000);
        assert_eq!(config.limits.max_columns, 50);
        assert_eq!(config.limits.preview_rows, 5);
        assert_eq!(config.log_level, "info");
        assert!(!config.debug_mode);
    }

    #[test]
    fn test_presets() {
        let dev = CoreConfig::development();
        assert!(dev.debug_mode);
        assert_eq!(dev.log_level, "debug");

        let prod = CoreConfig::production();
        assert!(!prod.debug_mode);
        assert_eq!(prod.limits, IngestLimits::default());

        let testing = CoreConfig::testing();
        assert_eq!(testing.limits.max_rows, 100);
    }

    #[test]
    fn test_log_filter_follows_level() {
        assert_eq!(CoreConfig::default().log_filter(), "info");
        assert_eq!(CoreConfig::development().log_filter(), "debug,tower_http=debug");

        let mut config = CoreConfig::production();
        config.log_level = "warn".to_string();
        assert_eq!(config.log_filter(), "warn");

        config.log_level = " ".to_string();
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = CoreConfig::default();
        config.limits.missing_value_ratio = 1.5;
        assert!(config.validate().is_err());

        config.limits.missing_value_ratio = 0.5;
        config.limits.max_file_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_io() {
        let mut config = CoreConfig::default();
        config.limits.max_rows = 42;

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        config.to_file(path).unwrap();
        let loaded = CoreConfig::from_file(path).unwrap();

        assert_eq!(loaded.limits.max_rows, 42);
        assert_eq!(loaded.limits.max_columns, config.limits.max_columns);
        assert_eq!(loaded.log_level, config.log_level);
    }
}
