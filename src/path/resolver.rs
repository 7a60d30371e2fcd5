//! Resolution of logical paths to physical files and directories.

use super::{validate_segment, LogicalPath};
use crate::value::Encoding;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// File name of a directory's metadata side file.
pub const DIRECTORY_META_FILE: &str = ".meta.json";

/// Suffix shared by every metadata side file.
pub const META_SUFFIX: &str = ".meta.json";

/// OS housekeeping entries never surfaced as children.
const HOUSEKEEPING: [&str; 3] = [".DS_Store", "Thumbs.db", "desktop.ini"];

/// Physical form a logical path currently takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Directory,
    File(Encoding),
}

/// The on-disk file or directory a logical path resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalLocation {
    path: PathBuf,
    form: Form,
}

impl PhysicalLocation {
    pub fn new(path: PathBuf, form: Form) -> Self {
        Self { path, form }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn form(&self) -> Form {
        self.form
    }

    pub fn is_directory(&self) -> bool {
        self.form == Form::Directory
    }

    pub fn is_file(&self) -> bool {
        matches!(self.form, Form::File(_))
    }
}

/// Maps logical paths beneath a single root onto physical locations.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Physical path without any encoding extension.
    pub fn base_path(&self, logical: &LogicalPath) -> PathBuf {
        logical
            .segments()
            .iter()
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Physical path of the file holding `logical` in the given encoding.
    pub fn encoded_path(&self, logical: &LogicalPath, encoding: Encoding) -> PathBuf {
        let mut raw: OsString = self.base_path(logical).into_os_string();
        raw.push(".");
        raw.push(encoding.extension());
        PathBuf::from(raw)
    }

    /// Resolve a logical path: an exact match (directory, or a file with no
    /// extension) wins, then each encoding in priority order, else absent.
    pub fn resolve(&self, logical: &LogicalPath) -> Option<PhysicalLocation> {
        let base = self.base_path(logical);
        if let Ok(meta) = std::fs::metadata(&base) {
            if meta.is_dir() {
                return Some(PhysicalLocation::new(base, Form::Directory));
            }
            if meta.is_file() {
                return Some(PhysicalLocation::new(base, Form::File(Encoding::Text)));
            }
        }

        Encoding::PRIORITY.into_iter().find_map(|encoding| {
            let candidate = self.encoded_path(logical, encoding);
            candidate
                .is_file()
                .then(|| PhysicalLocation::new(candidate, Form::File(encoding)))
        })
    }

    /// Every existing file that could represent `logical` (bare and encoded).
    pub fn file_representations(&self, logical: &LogicalPath) -> Vec<PathBuf> {
        let mut candidates = vec![self.base_path(logical)];
        candidates.extend(
            Encoding::PRIORITY
                .into_iter()
                .map(|encoding| self.encoded_path(logical, encoding)),
        );
        candidates.retain(|candidate| candidate.is_file());
        candidates
    }

    /// Side-file path holding the metadata of a physical location.
    pub fn metadata_location(&self, location: &PhysicalLocation) -> PathBuf {
        match location.form() {
            Form::Directory => location.path().join(DIRECTORY_META_FILE),
            Form::File(_) => {
                let file_name = location
                    .path()
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let stem = strip_encoding(&file_name).unwrap_or(&file_name);
                let parent = location.path().parent().unwrap_or(&self.root);
                parent.join(format!(".{}{}", stem, META_SUFFIX))
            }
        }
    }
}

/// True for entries a child listing must never surface.
pub fn is_bookkeeping(entry_name: &str) -> bool {
    entry_name.starts_with('.')
        || entry_name.ends_with(META_SUFFIX)
        || HOUSEKEEPING.contains(&entry_name)
}

/// Strip a known encoding extension, if present.
fn strip_encoding(entry_name: &str) -> Option<&str> {
    let (stem, extension) = entry_name.rsplit_once('.')?;
    Encoding::from_extension(extension).map(|_| stem)
}

/// Logical child name for a directory entry, or `None` when the entry is
/// bookkeeping or does not map back to a valid segment.
pub fn child_name(entry_name: &str) -> Option<&str> {
    if is_bookkeeping(entry_name) {
        return None;
    }
    let name = strip_encoding(entry_name).unwrap_or(entry_name);
    validate_segment(name).ok().map(|_| name)
}
