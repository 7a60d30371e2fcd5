//! Per-node metadata, persisted as a JSON side file next to the node.
//!
//! The document is a nested mapping addressed by slash-segmented keys
//! (`"stats/plays"`). It is loaded lazily on first access and every mutation
//! rewrites the whole side file.

use crate::error::{Result, StoreError};
use crate::path::{LogicalPath, PathResolver, PhysicalLocation};
use crate::store::Store;
use serde_json::{Map, Value as Json};
use std::fmt;

/// Whole metadata document of a node.
pub type Metadata = Map<String, Json>;

/// Cursor into a metadata document. The empty key addresses the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MetaKey {
    segments: Vec<String>,
}

impl MetaKey {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Cursor to a nested sub-key of this one.
    pub fn child(&self, subkey: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(MetaKey::parse(subkey).segments);
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn split_last(&self) -> Option<(&String, &[String])> {
        self.segments.split_last()
    }
}

impl From<&str> for MetaKey {
    fn from(raw: &str) -> Self {
        MetaKey::parse(raw)
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Metadata of one node, bound to its logical path.
///
/// The physical side file is re-resolved on load and on every persist, so the
/// handle follows the node's current form.
pub struct MetadataStore {
    store: Store,
    path: LogicalPath,
    data: Option<Metadata>,
}

impl MetadataStore {
    pub(crate) fn new(store: Store, path: LogicalPath) -> Self {
        Self {
            store,
            path,
            data: None,
        }
    }

    /// Cursor for `key`; performs no I/O.
    pub fn get(&self, key: &str) -> MetaKey {
        MetaKey::parse(key)
    }

    pub fn read(&mut self, key: &MetaKey) -> Option<Json> {
        lookup(self.document(), key).cloned()
    }

    /// Assign `value` at `key`, creating intermediate mappings as needed.
    /// A non-mapping value assigned to the root key resets the document.
    pub fn set(&mut self, key: &MetaKey, value: impl Into<Json>) -> Result<()> {
        let value = value.into();
        let document = self.document();
        match key.split_last() {
            None => {
                *document = match value {
                    Json::Object(map) => map,
                    _ => Metadata::new(),
                }
            }
            Some((last, parents)) => {
                container_mut(document, parents).insert(last.clone(), value);
            }
        }
        self.persist()
    }

    /// Set `subkey` inside the mapping at `key`, coercing a non-mapping value
    /// there into an empty mapping first.
    pub fn add_subkey(&mut self, key: &MetaKey, subkey: &str, value: impl Into<Json>) -> Result<()> {
        let value = value.into();
        container_mut(self.document(), key.segments()).insert(subkey.to_string(), value);
        self.persist()
    }

    /// Remove the terminal key; reports whether anything was removed.
    pub fn delete(&mut self, key: &MetaKey) -> Result<bool> {
        let Some((last, parents)) = key.split_last() else {
            return Ok(false);
        };
        let removed = parent_mut(self.document(), parents)
            .and_then(|parent| parent.remove(last))
            .is_some();
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Value at `key`, writing `default` there first when it is missing.
    pub fn get_or_insert(&mut self, key: &MetaKey, default: impl Into<Json>) -> Result<Json> {
        if let Some(existing) = self.read(key) {
            return Ok(existing);
        }
        let default = default.into();
        self.set(key, default.clone())?;
        Ok(default)
    }

    pub fn all(&mut self) -> Metadata {
        self.document().clone()
    }

    /// Replace the whole document.
    pub fn replace(&mut self, metadata: Metadata) -> Result<()> {
        *self.document() = metadata;
        self.persist()
    }

    fn document(&mut self) -> &mut Metadata {
        let Self { store, path, data } = self;
        data.get_or_insert_with(|| {
            let resolver = store.resolver();
            load(resolver, resolver.resolve(path).as_ref())
        })
    }

    fn persist(&mut self) -> Result<()> {
        self.store.guard(&self.path)?;
        let resolver = self.store.resolver();
        let location = resolver
            .resolve(&self.path)
            .ok_or_else(|| StoreError::missing(&self.path, "node does not exist"))?;
        let document = self.data.as_ref().cloned().unwrap_or_default();
        save(resolver, &location, &document)
    }
}

/// Load the side file for `location`. Missing or malformed files yield an
/// empty document.
pub(crate) fn load(resolver: &PathResolver, location: Option<&PhysicalLocation>) -> Metadata {
    let Some(location) = location else {
        return Metadata::new();
    };
    let side_file = resolver.metadata_location(location);
    let content = match std::fs::read_to_string(&side_file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Metadata::new(),
        Err(e) => {
            tracing::warn!("Failed to read metadata {}: {}", side_file.display(), e);
            return Metadata::new();
        }
    };
    match serde_json::from_str::<Json>(&content) {
        Ok(Json::Object(map)) => map,
        Ok(_) => {
            tracing::warn!("Metadata {} is not a mapping, ignoring", side_file.display());
            Metadata::new()
        }
        Err(e) => {
            tracing::warn!("Failed to parse metadata {}: {}", side_file.display(), e);
            Metadata::new()
        }
    }
}

/// Persist `document` as the side file of `location`, fully overwriting it.
/// An empty document removes the side file.
pub(crate) fn save(
    resolver: &PathResolver,
    location: &PhysicalLocation,
    document: &Metadata,
) -> Result<()> {
    let side_file = resolver.metadata_location(location);
    if document.is_empty() {
        return remove(&side_file);
    }
    if let Some(parent) = side_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(document)?;
    std::fs::write(&side_file, content)?;
    tracing::debug!(side_file = %side_file.display(), keys = document.len(), "metadata saved");
    Ok(())
}

pub(crate) fn remove(side_file: &std::path::Path) -> Result<()> {
    match std::fs::remove_file(side_file) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn lookup<'a>(document: &'a Metadata, key: &MetaKey) -> Option<&'a Json> {
    let Some((last, parents)) = key.split_last() else {
        return None;
    };
    parents
        .iter()
        .try_fold(document, |map, segment| map.get(segment)?.as_object())?
        .get(last)
}

/// Walk to the mapping at `segments`, creating or coercing mappings on the way.
fn container_mut<'a>(document: &'a mut Metadata, segments: &[String]) -> &'a mut Metadata {
    let mut current = document;
    for segment in segments {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Json::Object(Map::new()));
        if !slot.is_object() {
            *slot = Json::Object(Map::new());
        }
        current = match slot {
            Json::Object(map) => map,
            _ => unreachable!("slot was coerced to a mapping"),
        };
    }
    current
}

fn parent_mut<'a>(document: &'a mut Metadata, segments: &[String]) -> Option<&'a mut Metadata> {
    let mut current = document;
    for segment in segments {
        current = current.get_mut(segment)?.as_object_mut()?;
    }
    Some(current)
}
