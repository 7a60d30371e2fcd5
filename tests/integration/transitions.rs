use crate::integration::support::{data_path, meta, open_store, physical_entries};
use pathstore::{MetaKey, NodeKind, Value};
use serde_json::json;

#[test]
fn file_becomes_directory_when_child_is_addressed() {
    let (_temp, store) = open_store();
    let node = store.node("notes").unwrap();
    node.set_value("content").unwrap();
    node.metadata().set(&MetaKey::parse("owner"), "u1").unwrap();

    node.child("first").unwrap().set_value("hello").unwrap();

    assert_eq!(node.kind(), NodeKind::Directory);
    assert_eq!(node.metadata().all(), meta(json!({"owner": "u1"})));
    assert_eq!(
        physical_entries(store.root()),
        vec!["notes".to_string()]
    );
    assert_eq!(
        physical_entries(&data_path(&store, "notes")),
        vec![".meta.json".to_string(), "first.txt".to_string()]
    );
}

#[test]
fn make_directory_converts_file_in_place() {
    let (_temp, store) = open_store();
    let node = store.node("a/b").unwrap();
    node.set_value(json!({"x": 1})).unwrap();
    node.metadata().set(&MetaKey::parse("k"), 2).unwrap();

    node.make_directory().unwrap();

    assert!(node.is_directory());
    assert!(node.list_children().unwrap().is_empty());
    assert_eq!(node.metadata().all(), meta(json!({"k": 2})));
    assert_eq!(physical_entries(&data_path(&store, "a")), vec!["b".to_string()]);

    // Idempotent on an existing directory.
    node.make_directory().unwrap();
    assert!(node.is_directory());
}

#[test]
fn directory_becomes_file_and_loses_subtree() {
    let (_temp, store) = open_store();
    let node = store.node("games/g").unwrap();
    node.child("info").unwrap().child("name").unwrap().set_value("G").unwrap();
    node.metadata().set(&MetaKey::parse("owner"), "u1").unwrap();

    node.set_value("flattened").unwrap();

    assert_eq!(node.kind(), NodeKind::File);
    assert_eq!(node.value(""), Value::from("flattened"));
    assert_eq!(node.metadata().all(), meta(json!({"owner": "u1"})));
    assert_eq!(
        physical_entries(&data_path(&store, "games")),
        vec![".g.meta.json".to_string(), "g.txt".to_string()]
    );
    assert!(!store.node("games/g/info/name").unwrap().exists());
}

#[test]
fn make_file_starts_from_scratch() {
    let (_temp, store) = open_store();
    let node = store.node("doc").unwrap();
    node.child("part").unwrap().set_value("p").unwrap();
    node.metadata().set(&MetaKey::parse("old"), true).unwrap();

    node.make_file("fresh", None).unwrap();
    assert!(node.is_file());
    assert!(node.metadata().all().is_empty());

    node.make_file(json!([1]), Some(meta(json!({"new": 1})))).unwrap();
    assert_eq!(node.value_or_fail().unwrap(), Value::from(json!([1])));
    assert_eq!(node.metadata().all(), meta(json!({"new": 1})));
    assert_eq!(
        physical_entries(store.root()),
        vec![".doc.meta.json".to_string(), "doc.json".to_string()]
    );
}

#[test]
fn deep_write_demotes_file_ancestors() {
    let (_temp, store) = open_store();
    store.set_value("a", "leaf").unwrap();

    store.set_value("a/b/c", "deep").unwrap();

    assert!(store.node("a").unwrap().is_directory());
    assert!(store.node("a/b").unwrap().is_directory());
    assert_eq!(store.get_value("a/b/c", "").unwrap(), Value::from("deep"));
    assert_eq!(physical_entries(store.root()), vec!["a".to_string()]);
}

#[test]
fn clear_keeps_ignored_children() {
    let (_temp, store) = open_store();
    let game = store.node("games/g").unwrap();
    for name in ["info", "scenes", "stars"] {
        game.child(name).unwrap().set_value(name).unwrap();
    }
    game.child("keep_dir").unwrap().make_directory().unwrap();
    game.metadata().set(&MetaKey::parse("owner"), "u1").unwrap();

    game.clear(&["info", "keep_dir"]).unwrap();

    let mut names = game.names().unwrap();
    names.sort();
    assert_eq!(names, vec!["info".to_string(), "keep_dir".to_string()]);
    assert_eq!(game.metadata().all(), meta(json!({"owner": "u1"})));
}

#[test]
fn clear_turns_file_into_empty_directory() {
    let (_temp, store) = open_store();
    let node = store.node("x").unwrap();
    node.set_value("v").unwrap();
    node.metadata().set(&MetaKey::parse("k"), 1).unwrap();

    node.clear(&[]).unwrap();

    assert!(node.is_directory());
    assert!(node.metadata().all().is_empty());
    assert_eq!(physical_entries(store.root()), vec!["x".to_string()]);
}

#[test]
fn clear_on_absent_creates_directory() {
    let (_temp, store) = open_store();
    let node = store.node("fresh/dir").unwrap();
    node.clear(&[]).unwrap();
    assert!(node.is_directory());
}

#[test]
fn descendant_walks_through_files() {
    let (_temp, store) = open_store();
    store.set_value("users/1", "placeholder").unwrap();

    let node = store.home().descendant("users/1/settings/sound").unwrap();
    assert!(store.node("users/1").unwrap().is_directory());
    assert!(!node.exists());

    node.set_value(true).unwrap();
    assert_eq!(
        store.get_value("users/1/settings/sound", false).unwrap(),
        Value::from(true)
    );
}

#[test]
fn store_clear_removes_everything() {
    let (_temp, store) = open_store();
    store.set_value("a/b", "1").unwrap();
    store.metadata().set(&MetaKey::parse("k"), 1).unwrap();

    store.clear().unwrap();

    assert!(store.root().is_dir());
    assert!(physical_entries(store.root()).is_empty());
}
