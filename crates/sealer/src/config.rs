//! Configuration loading and validation for the sealer.
//!
//! All values are read from environment variables at startup. The process exits
//! with a clear error message if a variable is present but invalid.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use common::{protocol::DEFAULT_BLOB_VERSION, SealError};

use crate::record::{Sealing, Secret};

/// Validated sealer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Seal records on save. Off means records are written as plaintext.
    #[serde(default)]
    pub encryption_enabled: bool,

    /// Passphrase records are sealed under. **Required** when encryption is
    /// enabled; at least 16 characters.
    #[serde(default)]
    pub encryption_secret: Secret,

    /// Version number stamped into newly written record wrappers.
    #[serde(default = "default_encryption_version")]
    pub encryption_version: u32,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_encryption_version() -> u32 {
    DEFAULT_BLOB_VERSION
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::build(config::Environment::default())
    }

    /// Same as [`from_env`](Self::from_env), but reads an explicit variable map.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::build(config::Environment::default().source(Some(vars)))
    }

    fn build(source: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(source)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.encryption_enabled {
            if self.encryption_secret.is_empty() {
                anyhow::bail!("ENCRYPTION_SECRET is required when ENCRYPTION_ENABLED is set");
            }
            self.encryption_secret
                .check_strength()
                .context("ENCRYPTION_SECRET is too weak")?;
        }
        if self.encryption_version == 0 {
            anyhow::bail!("ENCRYPTION_VERSION must be > 0");
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    /// Sealing parameters, or `None` when records are stored as plaintext.
    ///
    /// # Errors
    ///
    /// [`SealError::Config`] if encryption is enabled with an unusable secret.
    pub fn sealing(&self) -> Result<Option<Sealing>, SealError> {
        if !self.encryption_enabled {
            return Ok(None);
        }
        Sealing::new(self.encryption_secret.clone(), self.encryption_version).map(Some)
    }
}
