//! Detached, recursive captures of a node and its descendants.

use crate::error::Result;
use crate::metadata::Metadata;
use crate::node::Node;
use crate::path::validate_segment;
use crate::types::NodeKind;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Immutable copy of a subtree: value, metadata and children.
///
/// A snapshot holds no reference to the live store, so it can be stored,
/// compared, serialized and merged elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeSnapshot {
    File {
        name: String,
        value: Value,
        #[serde(default, skip_serializing_if = "Metadata::is_empty")]
        metadata: Metadata,
    },
    Directory {
        name: String,
        #[serde(default, skip_serializing_if = "Metadata::is_empty")]
        metadata: Metadata,
        #[serde(default)]
        children: Vec<TreeSnapshot>,
    },
}

impl TreeSnapshot {
    pub fn file(name: impl Into<String>, value: impl Into<Value>) -> Self {
        TreeSnapshot::File {
            name: name.into(),
            value: value.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn directory(name: impl Into<String>, children: Vec<TreeSnapshot>) -> Self {
        TreeSnapshot::Directory {
            name: name.into(),
            metadata: Metadata::new(),
            children,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        match &mut self {
            TreeSnapshot::File { metadata: m, .. } | TreeSnapshot::Directory { metadata: m, .. } => {
                *m = metadata
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            TreeSnapshot::File { name, .. } | TreeSnapshot::Directory { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TreeSnapshot::File { .. } => NodeKind::File,
            TreeSnapshot::Directory { .. } => NodeKind::Directory,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            TreeSnapshot::File { metadata, .. } | TreeSnapshot::Directory { metadata, .. } => {
                metadata
            }
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            TreeSnapshot::File { value, .. } => Some(value),
            TreeSnapshot::Directory { .. } => None,
        }
    }

    pub fn children(&self) -> &[TreeSnapshot] {
        match self {
            TreeSnapshot::File { .. } => &[],
            TreeSnapshot::Directory { children, .. } => children,
        }
    }

    /// Copy with children ordered by name at every level, for comparisons
    /// that must not depend on directory listing order.
    pub fn sorted(&self) -> Self {
        match self {
            TreeSnapshot::File { .. } => self.clone(),
            TreeSnapshot::Directory {
                name,
                metadata,
                children,
            } => {
                let mut children: Vec<TreeSnapshot> =
                    children.iter().map(TreeSnapshot::sorted).collect();
                children.sort_by(|a, b| a.name().cmp(b.name()));
                TreeSnapshot::Directory {
                    name: name.clone(),
                    metadata: metadata.clone(),
                    children,
                }
            }
        }
    }

    /// Check that every name in the snapshot is a valid path segment.
    pub fn validate_names(&self) -> Result<()> {
        validate_segment(self.name())?;
        self.children()
            .iter()
            .try_for_each(TreeSnapshot::validate_names)
    }

    /// Number of nodes in the snapshot, itself included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(TreeSnapshot::node_count)
            .sum::<usize>()
    }
}

/// Source of a subtree for directory creation and merges: either a detached
/// snapshot or a live node that is captured first.
#[derive(Clone)]
pub enum TreeSource {
    Snapshot(TreeSnapshot),
    Node(Node),
}

impl From<TreeSnapshot> for TreeSource {
    fn from(snapshot: TreeSnapshot) -> Self {
        TreeSource::Snapshot(snapshot)
    }
}

impl From<Node> for TreeSource {
    fn from(node: Node) -> Self {
        TreeSource::Node(node)
    }
}

impl From<&Node> for TreeSource {
    fn from(node: &Node) -> Self {
        TreeSource::Node(node.clone())
    }
}
