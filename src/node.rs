//! Node: the path-addressed handle over the physical store.
//!
//! A node is a pure reference to a logical path. Its type is re-probed from
//! disk on every operation and never cached, so a handle stays valid across
//! any mutation made through it or through other handles.
//!
//! Form transitions:
//! - `Absent -> File` via [`Node::set_value`] / [`Node::make_file`]
//! - `Absent -> Directory` via [`Node::make_directory`]
//! - `File -> Directory` via [`Node::make_directory`] or [`Node::child`];
//!   content is discarded, metadata carried over
//! - `Directory -> File` via [`Node::set_value`] / [`Node::make_file`];
//!   the subtree is discarded
//! - `* -> Absent` via [`Node::delete`]

use crate::error::{Result, StoreError};
use crate::metadata::{self, Metadata, MetadataStore};
use crate::path::{resolver, Form, LogicalPath, PhysicalLocation};
use crate::snapshot::{TreeSnapshot, TreeSource};
use crate::store::Store;
use crate::types::NodeKind;
use crate::value::Value;
use serde::de::DeserializeOwned;
use std::collections::HashSet;

/// Handle to the node at a logical path. Creating one performs no I/O.
#[derive(Debug, Clone)]
pub struct Node {
    store: Store,
    path: LogicalPath,
}

impl Node {
    pub(crate) fn new(store: Store, path: LogicalPath) -> Self {
        Self { store, path }
    }

    pub fn path(&self) -> &LogicalPath {
        &self.path
    }

    /// Last path segment; empty for the root.
    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Handle to the containing node, `None` for the root.
    pub fn parent(&self) -> Option<Node> {
        self.path
            .parent()
            .map(|path| Node::new(self.store.clone(), path))
    }

    fn locate(&self) -> Option<PhysicalLocation> {
        self.store.resolver().resolve(&self.path)
    }

    pub fn kind(&self) -> NodeKind {
        match self.locate() {
            None => NodeKind::Absent,
            Some(location) if location.is_directory() => NodeKind::Directory,
            Some(_) => NodeKind::File,
        }
    }

    pub fn exists(&self) -> bool {
        self.kind() != NodeKind::Absent
    }

    pub fn is_file(&self) -> bool {
        self.kind() == NodeKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind() == NodeKind::Directory
    }

    // ----- reads -----

    /// Tolerant read: the decoded value, or `default` when the node is absent
    /// or its content cannot be decoded. A directory yields the mapping of
    /// child names to child types.
    pub fn value(&self, default: impl Into<Value>) -> Value {
        let default = default.into();
        self.value_opt().unwrap_or(default)
    }

    pub fn value_opt(&self) -> Option<Value> {
        self.value_or_fail().ok()
    }

    /// Strict read: fails with `MissingOrInvalid` instead of defaulting.
    pub fn value_or_fail(&self) -> Result<Value> {
        let location = self
            .locate()
            .ok_or_else(|| StoreError::missing(&self.path, "node does not exist"))?;
        match location.form() {
            Form::Directory => Ok(Value::Structured(self.child_kinds()?)),
            Form::File(encoding) => {
                let content = std::fs::read_to_string(location.path()).map_err(|e| {
                    StoreError::missing(&self.path, format!("unreadable content: {}", e))
                })?;
                encoding.decode(&content).map_err(|e| {
                    StoreError::missing(
                        &self.path,
                        format!("invalid .{} content: {}", encoding.extension(), e),
                    )
                })
            }
        }
    }

    /// Strict read into a typed shape.
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.value_or_fail()?;
        serde_json::from_value(value.into_json()).map_err(|e| {
            StoreError::missing(&self.path, format!("unexpected shape: {}", e))
        })
    }

    /// Read the value as a boolean (`"true"`/`"t"`, any case). With `update`,
    /// the node is rewritten with the canonical boolean encoding.
    pub fn boolean_value(&self, default: bool, update: bool) -> Result<bool> {
        let flag = self
            .value_opt()
            .map(|value| value.is_truthy())
            .unwrap_or(default);
        if update {
            self.set_value(flag)?;
        }
        Ok(flag)
    }

    fn child_kinds(&self) -> Result<serde_json::Value> {
        let mut kinds = serde_json::Map::new();
        for child in self.list_children()? {
            kinds.insert(
                child.name().to_string(),
                serde_json::Value::String(child.kind().as_str().to_string()),
            );
        }
        Ok(serde_json::Value::Object(kinds))
    }

    // ----- writes -----

    /// Write `value`, replacing whatever occupies the path.
    ///
    /// Text selects the text encoding, anything else the literal encoding;
    /// the alternate representation is removed. Existing metadata survives
    /// the rewrite.
    pub fn set_value(&self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.store.guard(&self.path)?;
        self.reject_root("set a value on")?;

        let encoding = value.encoding();
        let content = encoding.encode(&value)?;
        let resolver = self.store.resolver();
        let target = PhysicalLocation::new(
            resolver.encoded_path(&self.path, encoding),
            Form::File(encoding),
        );
        // An absent node may still have a side file kept by `delete(false)`.
        let current = self.locate();
        if current.as_ref().is_some_and(PhysicalLocation::is_directory) {
            self.guard_subtree()?;
        }
        let saved = metadata::load(resolver, Some(current.as_ref().unwrap_or(&target)));

        if let Some(location) = current.filter(PhysicalLocation::is_directory) {
            std::fs::remove_dir_all(location.path())?;
            tracing::debug!(path = %self.path, "directory replaced by file");
        }
        self.prepare_parent()?;

        std::fs::write(target.path(), content)?;
        for stale in resolver.file_representations(&self.path) {
            if stale != target.path() {
                std::fs::remove_file(&stale)?;
            }
        }

        metadata::save(resolver, &target, &saved)?;
        tracing::debug!(path = %self.path, encoding = ?encoding, "value written");
        Ok(())
    }

    /// Append `text` to the current text value (empty when not text).
    pub fn push_value(&self, text: &str) -> Result<()> {
        let mut current = match self.value_opt() {
            Some(Value::Text(existing)) => existing,
            _ => String::new(),
        };
        current.push_str(text);
        self.set_value(current)
    }

    /// Remove the node. No-op when absent. The metadata side file goes too
    /// unless `delete_metadata` is false.
    pub fn delete(&self, delete_metadata: bool) -> Result<()> {
        self.store.guard(&self.path)?;
        self.reject_root("delete")?;
        match self.locate() {
            Some(location) => {
                self.guard_subtree()?;
                self.remove_physical(&location, delete_metadata)
            }
            None => Ok(()),
        }
    }

    /// Ensure a directory exists at the path, converting a file in place.
    pub fn make_directory(&self) -> Result<()> {
        self.make_directory_with(Vec::<TreeSource>::new())
    }

    /// Ensure a directory exists, then materialize `children` inside it.
    ///
    /// Snapshot entries are written recursively; live node entries are
    /// captured first and merged in.
    pub fn make_directory_with<I>(&self, children: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<TreeSource>,
    {
        let sources: Vec<TreeSource> = children.into_iter().map(Into::into).collect();
        for source in &sources {
            match source {
                TreeSource::Snapshot(snapshot) => snapshot.validate_names()?,
                TreeSource::Node(node) => node.reject_root("copy")?,
            }
        }

        self.store.guard(&self.path)?;
        match self.locate() {
            Some(location) if location.is_file() => self.demote(&location)?,
            Some(_) => {}
            None => {
                self.prepare_parent()?;
                std::fs::create_dir_all(self.store.resolver().base_path(&self.path))?;
                tracing::debug!(path = %self.path, "directory created");
            }
        }

        for source in sources {
            match source {
                TreeSource::Snapshot(snapshot) => self.materialize(&snapshot)?,
                TreeSource::Node(node) => {
                    if let Some(snapshot) = node.extract()? {
                        self.child(snapshot.name())?.merge_snapshot(&snapshot)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Clear the path completely, then write `value` and, when given,
    /// replace the metadata.
    pub fn make_file(&self, value: impl Into<Value>, metadata: Option<Metadata>) -> Result<()> {
        self.store.guard(&self.path)?;
        self.reject_root("make a file at")?;
        if let Some(location) = self.locate() {
            self.guard_subtree()?;
            self.remove_physical(&location, true)?;
        }
        self.set_value(value)?;
        if let Some(metadata) = metadata {
            self.metadata().replace(metadata)?;
        }
        Ok(())
    }

    /// Merge a snapshot or live node into this path.
    ///
    /// Files replace prior content; directories are merged additively, so
    /// destination children missing from the source are kept.
    pub fn merge(&self, source: impl Into<TreeSource>) -> Result<()> {
        self.store.guard(&self.path)?;
        let source: TreeSource = source.into();
        let snapshot = match source {
            TreeSource::Snapshot(snapshot) => snapshot,
            TreeSource::Node(node) => match node.extract()? {
                Some(snapshot) => snapshot,
                None => return Ok(()),
            },
        };
        for child in snapshot.children() {
            child.validate_names()?;
        }
        self.merge_snapshot(&snapshot)
    }

    fn merge_snapshot(&self, snapshot: &TreeSnapshot) -> Result<()> {
        self.store.guard(&self.path)?;
        match snapshot {
            TreeSnapshot::File {
                value, metadata, ..
            } => self.make_file(value.clone(), Some(metadata.clone())),
            TreeSnapshot::Directory {
                metadata, children, ..
            } => {
                self.make_directory()?;
                for child in children {
                    self.child(child.name())?.merge_snapshot(child)?;
                }
                if !metadata.is_empty() {
                    self.metadata().replace(metadata.clone())?;
                }
                Ok(())
            }
        }
    }

    /// Reset the node to a directory, deleting every child whose name is
    /// not in `ignore`. A file at the path is deleted outright.
    pub fn clear(&self, ignore: &[&str]) -> Result<()> {
        self.store.guard(&self.path)?;
        match self.locate() {
            Some(location) if location.is_directory() => {
                let doomed: Vec<Node> = self
                    .list_children()?
                    .into_iter()
                    .filter(|child| !ignore.contains(&child.name()))
                    .collect();
                for child in &doomed {
                    child.guard_subtree()?;
                }
                for child in doomed {
                    child.delete(true)?;
                }
            }
            Some(location) => self.remove_physical(&location, true)?,
            None => {}
        }
        self.make_directory()
    }

    // ----- tree navigation -----

    /// Handle for `name` beneath this node.
    ///
    /// Addressing a child of a file converts the file into a directory: its
    /// content is discarded and its metadata moves onto the directory.
    pub fn child(&self, name: &str) -> Result<Node> {
        let path = self.path.join(name)?;
        if let Some(location) = self.locate().filter(PhysicalLocation::is_file) {
            self.store.guard(&self.path)?;
            self.demote(&location)?;
        }
        Ok(Node::new(self.store.clone(), path))
    }

    /// Chain [`Node::child`] over every segment of `relative`.
    pub fn descendant(&self, relative: &str) -> Result<Node> {
        let relative = LogicalPath::parse(relative)?;
        let mut node = self.clone();
        for segment in relative.segments() {
            node = node.child(segment)?;
        }
        Ok(node)
    }

    /// Child nodes in directory listing order. Empty for files and absent
    /// nodes; metadata side files and OS housekeeping entries are skipped.
    pub fn list_children(&self) -> Result<Vec<Node>> {
        let Some(location) = self.locate().filter(PhysicalLocation::is_directory) else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        let mut children = Vec::new();
        for entry in std::fs::read_dir(location.path())? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(raw) = file_name.to_str() else {
                tracing::warn!(
                    "Skipping non UTF8 entry {:?} in {}",
                    file_name,
                    location.path().display()
                );
                continue;
            };
            let Some(name) = resolver::child_name(raw) else {
                continue;
            };
            if seen.insert(name.to_string()) {
                children.push(Node::new(self.store.clone(), self.path.join(name)?));
            }
        }
        Ok(children)
    }

    pub fn names(&self) -> Result<Vec<String>> {
        Ok(self
            .list_children()?
            .iter()
            .map(|child| child.name().to_string())
            .collect())
    }

    /// `(name, value)` pairs of the children, `None` where unreadable.
    pub fn name_values(&self) -> Result<Vec<(String, Option<Value>)>> {
        Ok(self
            .list_children()?
            .iter()
            .map(|child| (child.name().to_string(), child.value_opt()))
            .collect())
    }

    // ----- subtree capture -----

    /// Capture this node and all descendants, depth first.
    pub fn extract(&self) -> Result<Option<TreeSnapshot>> {
        let Some(location) = self.locate() else {
            return Ok(None);
        };
        let metadata = metadata::load(self.store.resolver(), Some(&location));
        let name = self.name().to_string();
        let snapshot = match location.form() {
            Form::File(_) => TreeSnapshot::File {
                name,
                value: self.value_or_fail()?,
                metadata,
            },
            Form::Directory => {
                let mut children = Vec::new();
                for child in self.list_children()? {
                    if let Some(captured) = child.extract()? {
                        children.push(captured);
                    }
                }
                TreeSnapshot::Directory {
                    name,
                    metadata,
                    children,
                }
            }
        };
        Ok(Some(snapshot))
    }

    /// Metadata of this node; loaded on first access.
    pub fn metadata(&self) -> MetadataStore {
        MetadataStore::new(self.store.clone(), self.path.clone())
    }

    // ----- physical helpers -----

    /// Fail with `Protected` when this node or anything beneath it is gated.
    pub(crate) fn guard_subtree(&self) -> Result<()> {
        self.store.guard(&self.path)?;
        for child in self.list_children()? {
            child.guard_subtree()?;
        }
        Ok(())
    }

    fn reject_root(&self, action: &str) -> Result<()> {
        if self.path.is_root() {
            return Err(StoreError::InvalidPath(format!(
                "Cannot {} the store root",
                action
            )));
        }
        Ok(())
    }

    /// Make every ancestor a directory, converting files on the way.
    fn prepare_parent(&self) -> Result<()> {
        let Some(parent) = self.path.parent() else {
            return Ok(());
        };
        let mut node = self.store.home();
        for segment in self.path.segments() {
            node = node.child(segment)?;
        }
        std::fs::create_dir_all(self.store.resolver().base_path(&parent))?;
        Ok(())
    }

    fn remove_physical(&self, location: &PhysicalLocation, delete_metadata: bool) -> Result<()> {
        let resolver = self.store.resolver();
        let side_file = resolver.metadata_location(location);
        match location.form() {
            Form::Directory => std::fs::remove_dir_all(location.path())?,
            Form::File(_) => {
                for path in resolver.file_representations(&self.path) {
                    std::fs::remove_file(path)?;
                }
            }
        }
        if delete_metadata {
            metadata::remove(&side_file)?;
        }
        tracing::debug!(path = %self.path, delete_metadata, "node removed");
        Ok(())
    }

    /// File -> Directory: drop the content, keep the metadata.
    fn demote(&self, location: &PhysicalLocation) -> Result<()> {
        let resolver = self.store.resolver();
        let saved = metadata::load(resolver, Some(location));
        self.remove_physical(location, true)?;

        let directory = resolver.base_path(&self.path);
        std::fs::create_dir_all(&directory)?;
        metadata::save(
            resolver,
            &PhysicalLocation::new(directory, Form::Directory),
            &saved,
        )?;
        tracing::debug!(path = %self.path, "file converted to directory");
        Ok(())
    }

    fn materialize(&self, snapshot: &TreeSnapshot) -> Result<()> {
        let sub = self.child(snapshot.name())?;
        match snapshot {
            TreeSnapshot::File {
                value, metadata, ..
            } => sub.make_file(value.clone(), Some(metadata.clone())),
            TreeSnapshot::Directory {
                metadata, children, ..
            } => {
                sub.make_directory_with(children.iter().cloned().map(TreeSource::Snapshot))?;
                if !metadata.is_empty() {
                    sub.metadata().replace(metadata.clone())?;
                }
                Ok(())
            }
        }
    }
}
