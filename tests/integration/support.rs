use pathstore::{Metadata, Store};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fresh store rooted in a temporary directory.
pub fn open_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path().join("data")).unwrap();
    (temp_dir, store)
}

pub fn meta(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().expect("metadata literal must be an object")
}

/// Sorted names of every entry physically present in `dir`.
pub fn physical_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn data_path(store: &Store, relative: &str) -> PathBuf {
    store.root().join(relative)
}
