//! Service settings
//!
//! Loaded from an optional settings file and `ANCHOR_`-prefixed environment
//! variables, then overridden by command-line flags in `main`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use dataset_anchor_core::{CoreConfig, CoreError};

/// Upload body limit; above the validation limit so oversize files still get a verdict
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file or environment could not be read
    #[error("Settings error: {0}")]
    Source(#[from] config::ConfigError),

    /// Ingestion limits file failed to load or validate
    #[error("Core configuration error: {0}")]
    Core(#[from] CoreError),

    /// A setting holds a value the service cannot run with
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// HTTP service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to
    pub listen_addr: SocketAddr,

    /// Largest request body accepted, in bytes
    pub max_upload_bytes: usize,

    /// JSON file with ingestion limits; defaults apply when unset
    pub core_config: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            core_config: None,
        }
    }
}

impl ServiceConfig {
    /// Load settings from `path` (if given) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings: ServiceConfig = builder
            .add_source(Environment::with_prefix("ANCHOR").try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_upload_bytes == 0 {
            return Err(SettingsError::Invalid("max_upload_bytes must be positive".to_string()));
        }
        Ok(())
    }

    /// Core configuration named by `core_config`, or the defaults
    pub fn core(&self) -> Result<CoreConfig, SettingsError> {
        match &self.core_config {
            Some(path) => {
                let path = path
                    .to_str()
                    .ok_or_else(|| SettingsError::Invalid(format!("non UTF-8 path: {}", path.display())))?;
                Ok(CoreConfig::from_file(path)?)
            }
            None => Ok(CoreConfig::default()),
        }
    }
}
