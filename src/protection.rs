//! Protection policy gating every mutating operation.

use crate::error::Result;
use crate::path::LogicalPath;
use serde::{Deserialize, Serialize};

/// Predicate over logical paths, consulted before any physical effect.
pub trait ProtectionPolicy: Send + Sync {
    fn is_protected(&self, path: &LogicalPath) -> bool;
}

/// Policy that protects nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unprotected;

impl ProtectionPolicy for Unprotected {
    fn is_protected(&self, _path: &LogicalPath) -> bool {
        false
    }
}

impl<F> ProtectionPolicy for F
where
    F: Fn(&LogicalPath) -> bool + Send + Sync,
{
    fn is_protected(&self, path: &LogicalPath) -> bool {
        self(path)
    }
}

/// Prefix-based policy.
///
/// `subtrees` protect the listed path and everything beneath it; `contents`
/// protect only what lies strictly beneath the listed path, leaving the
/// container itself mutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedPaths {
    pub subtrees: Vec<LogicalPath>,
    pub contents: Vec<LogicalPath>,
}

impl ProtectedPaths {
    pub fn from_config(config: &ProtectionConfig) -> Result<Self> {
        let parse_all = |raw: &[String]| -> Result<Vec<LogicalPath>> {
            raw.iter().map(|p| LogicalPath::parse(p)).collect()
        };
        Ok(Self {
            subtrees: parse_all(&config.subtrees)?,
            contents: parse_all(&config.contents)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.subtrees.is_empty() && self.contents.is_empty()
    }
}

impl ProtectionPolicy for ProtectedPaths {
    fn is_protected(&self, path: &LogicalPath) -> bool {
        self.subtrees.iter().any(|p| path.starts_with(p))
            || self
                .contents
                .iter()
                .any(|p| path.starts_with(p) && path != p)
    }
}

/// Protection section of the store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtectionConfig {
    #[serde(default)]
    pub subtrees: Vec<String>,

    #[serde(default)]
    pub contents: Vec<String>,
}
