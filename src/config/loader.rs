//! Layered configuration loading.
//!
//! Precedence: serde defaults (lowest) -> config file -> `PATHSTORE__*`
//! environment variables (highest).

use super::{StoreConfig, ENV_PREFIX};
use crate::error::{Result, StoreError};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<StoreConfig> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = Self::add_file(builder, path, true)?;
        }
        Self::finish(Self::add_environment(builder))
    }

    /// Load from a file that may be absent, plus the environment.
    pub fn load_optional(path: &Path) -> Result<StoreConfig> {
        let builder = Self::add_file(Config::builder(), path, false)?;
        Self::finish(Self::add_environment(builder))
    }

    fn add_file(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>> {
        let name = path.to_str().ok_or_else(|| {
            StoreError::ConfigError(format!("Config path is not valid UTF-8: {:?}", path))
        })?;
        Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
    }

    /// Uses PATHSTORE_ prefix and __ as separator for nested keys.
    fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<StoreConfig> {
        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
