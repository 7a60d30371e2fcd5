//! Store configuration: root directory, protection policy and logging.

pub mod loader;

use crate::logging::LoggingConfig;
use crate::protection::ProtectionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use loader::ConfigLoader;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "PATHSTORE";

fn default_root() -> PathBuf {
    directories::ProjectDirs::from("", "pathstore", "pathstore")
        .map(|dirs| dirs.data_dir().join("store"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory every logical path is confined beneath
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default)]
    pub protection: ProtectionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            protection: ProtectionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
