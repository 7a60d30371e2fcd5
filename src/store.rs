//! Store: the configured root namespace and its protection policy.
//!
//! A `Store` is cheap to clone; every clone and every [`Node`] obtained from it
//! share the same root and policy.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::metadata::MetadataStore;
use crate::node::Node;
use crate::path::{LogicalPath, PathResolver};
use crate::protection::{ProtectedPaths, ProtectionPolicy, Unprotected};
use crate::value::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct StoreInner {
    resolver: PathResolver,
    policy: Arc<dyn ProtectionPolicy>,
}

/// Handle to a filesystem-backed document store rooted at one directory.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Open (creating if needed) an unprotected store at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_policy(root, Unprotected)
    }

    /// Open a store whose mutations are gated by `policy`.
    pub fn with_policy(
        root: impl Into<PathBuf>,
        policy: impl ProtectionPolicy + 'static,
    ) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "store opened");
        Ok(Self {
            inner: Arc::new(StoreInner {
                resolver: PathResolver::new(root),
                policy: Arc::new(policy),
            }),
        })
    }

    /// Open the store described by a loaded configuration.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let policy = ProtectedPaths::from_config(&config.protection)?;
        if policy.is_empty() {
            Self::open(&config.root)
        } else {
            Self::with_policy(&config.root, policy)
        }
    }

    pub fn root(&self) -> &Path {
        self.inner.resolver.root()
    }

    pub fn policy(&self) -> &dyn ProtectionPolicy {
        self.inner.policy.as_ref()
    }

    /// Node for the root path.
    pub fn home(&self) -> Node {
        Node::new(self.clone(), LogicalPath::root())
    }

    /// Node handle for `path`; performs no I/O.
    pub fn node(&self, path: &str) -> Result<Node> {
        Ok(Node::new(self.clone(), LogicalPath::parse(path)?))
    }

    pub fn node_at(&self, path: LogicalPath) -> Node {
        Node::new(self.clone(), path)
    }

    pub fn get_value(&self, path: &str, default: impl Into<Value>) -> Result<Value> {
        Ok(self.node(path)?.value(default))
    }

    pub fn set_value(&self, path: &str, value: impl Into<Value>) -> Result<Node> {
        let node = self.node(path)?;
        node.set_value(value)?;
        Ok(node)
    }

    /// Metadata of the root directory.
    pub fn metadata(&self) -> MetadataStore {
        self.home().metadata()
    }

    /// Remove everything beneath the root, root metadata included.
    pub fn clear(&self) -> Result<()> {
        self.home().guard_subtree()?;
        let root = self.root();
        if root.exists() {
            std::fs::remove_dir_all(root)?;
        }
        std::fs::create_dir_all(root)?;
        tracing::info!(root = %root.display(), "store cleared");
        Ok(())
    }

    pub(crate) fn resolver(&self) -> &PathResolver {
        &self.inner.resolver
    }

    /// Fail with `Protected` when the policy gates `path`.
    pub(crate) fn guard(&self, path: &LogicalPath) -> Result<()> {
        if self.inner.policy.is_protected(path) {
            tracing::warn!(path = %path, "rejected mutation of protected path");
            return Err(StoreError::Protected(path.to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("root", &self.root()).finish()
    }
}
