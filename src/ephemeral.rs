//! Process-lifetime key/value map, orthogonal to the persisted tree.
//!
//! Nothing here touches disk or consults the protection policy. The map is
//! owned by whoever constructs it and handed down explicitly; clones share
//! the same underlying map.

use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Transient cross-request state.
pub struct EphemeralStore<V = Value> {
    entries: Arc<RwLock<HashMap<String, V>>>,
}

impl<V: Clone> EphemeralStore<V> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Stored value for `key`, or `default` when unset.
    pub fn get(&self, key: &str, default: V) -> V {
        self.get_opt(key).unwrap_or(default)
    }

    pub fn get_opt(&self, key: &str) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        self.entries.write().insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.entries.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<V: Clone> Default for EphemeralStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for EphemeralStore<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}
