//! Logical paths and their mapping onto the physical root.

pub mod resolver;

use crate::error::{Result, StoreError};
use std::fmt;
use std::str::FromStr;

pub use resolver::{Form, PathResolver, PhysicalLocation};

/// Slash-segmented logical path. The root is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalPath {
    segments: Vec<String>,
}

impl LogicalPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-separated path. Empty segments (leading, trailing or
    /// doubled slashes) are dropped; every other segment must be valid.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut segments = Vec::new();
        for segment in raw.split('/').filter(|s| !s.is_empty()) {
            validate_segment(segment)?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn join(&self, name: &str) -> Result<Self> {
        validate_segment(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Join a relative path of one or more segments.
    pub fn join_path(&self, relative: &LogicalPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments.iter().cloned());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// Last segment; empty for the root.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment-wise prefix test (`a/b` starts with `a`, not with `a/bc`).
    pub fn starts_with(&self, prefix: &LogicalPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for LogicalPath {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Check that a single segment is an opaque name that cannot escape the root
/// or collide with an encoding extension.
pub fn validate_segment(segment: &str) -> Result<()> {
    if segment.trim().is_empty() {
        return Err(StoreError::InvalidPath(
            "Path segment cannot be empty".to_string(),
        ));
    }
    if let Some(bad) = segment.chars().find(|c| matches!(c, '/' | '.' | '\\' | '\0')) {
        return Err(StoreError::InvalidPath(format!(
            "Path segment '{}' contains reserved character {:?}",
            segment, bad
        )));
    }
    Ok(())
}
