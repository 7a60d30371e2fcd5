use crate::integration::support::{meta, open_store};
use pathstore::{MetaKey, Node, NodeKind, Store, StoreError, TreeSnapshot, TreeSource, Value};
use serde_json::json;

fn seed_game(store: &Store) -> Node {
    let game = store.node("games/g").unwrap();
    game.child("creator").unwrap().set_value("u1").unwrap();
    let info = game.child("info").unwrap();
    info.child("name").unwrap().set_value("Quest").unwrap();
    info.child("tags").unwrap().set_value(json!(["rpg", "short"])).unwrap();
    info.child("name")
        .unwrap()
        .metadata()
        .set(&MetaKey::parse("lang"), "en")
        .unwrap();
    game.metadata().set(&MetaKey::parse("created"), 1700).unwrap();
    game
}

#[test]
fn extract_captures_values_metadata_and_children() {
    let (_temp, store) = open_store();
    let game = seed_game(&store);

    let snapshot = game.extract().unwrap().unwrap().sorted();

    let expected = TreeSnapshot::directory(
        "g",
        vec![
            TreeSnapshot::file("creator", "u1"),
            TreeSnapshot::directory(
                "info",
                vec![
                    TreeSnapshot::file("name", "Quest").with_metadata(meta(json!({"lang": "en"}))),
                    TreeSnapshot::file("tags", json!(["rpg", "short"])),
                ],
            ),
        ],
    )
    .with_metadata(meta(json!({"created": 1700})));
    assert_eq!(snapshot, expected);
    assert_eq!(snapshot.node_count(), 5);
}

#[test]
fn extract_of_absent_node_is_none() {
    let (_temp, store) = open_store();
    assert!(store.node("missing").unwrap().extract().unwrap().is_none());
}

#[test]
fn merge_into_empty_location_reproduces_tree() {
    let (_temp, store) = open_store();
    let game = seed_game(&store);
    let snapshot = game.extract().unwrap().unwrap();

    let copy = store.node("archive/g").unwrap();
    copy.merge(snapshot.clone()).unwrap();

    assert_eq!(
        copy.extract().unwrap().unwrap().sorted(),
        snapshot.sorted()
    );

    // Merging again changes nothing.
    copy.merge(snapshot.clone()).unwrap();
    assert_eq!(
        copy.extract().unwrap().unwrap().sorted(),
        snapshot.sorted()
    );
}

#[test]
fn merge_of_live_node_copies_it() {
    let (_temp, store) = open_store();
    let game = seed_game(&store);

    let copy = store.node("backup").unwrap();
    copy.merge(&game).unwrap();

    assert_eq!(
        store.get_value("backup/info/name", "").unwrap(),
        Value::from("Quest")
    );
    assert!(game.exists());
}

#[test]
fn merge_keeps_destination_only_children_and_replaces_files() {
    let (_temp, store) = open_store();
    let target = store.node("target").unwrap();
    target.child("local").unwrap().set_value("mine").unwrap();
    target.child("shared").unwrap().set_value("old").unwrap();
    target
        .child("shared")
        .unwrap()
        .metadata()
        .set(&MetaKey::parse("stale"), true)
        .unwrap();

    let incoming = TreeSnapshot::directory(
        "target",
        vec![
            TreeSnapshot::file("shared", json!({"new": true})),
            TreeSnapshot::file("added", "a"),
        ],
    );
    target.merge(incoming).unwrap();

    let mut names = target.names().unwrap();
    names.sort();
    assert_eq!(names, vec!["added", "local", "shared"]);
    let shared = store.node("target/shared").unwrap();
    assert_eq!(shared.value_or_fail().unwrap(), Value::from(json!({"new": true})));
    assert!(shared.metadata().all().is_empty());
    assert_eq!(store.get_value("target/local", "").unwrap(), Value::from("mine"));
}

#[test]
fn merging_file_snapshot_over_directory_replaces_it() {
    let (_temp, store) = open_store();
    let node = store.node("thing").unwrap();
    node.child("inner").unwrap().set_value("x").unwrap();

    node.merge(TreeSnapshot::file("thing", 3i64)).unwrap();

    assert_eq!(node.kind(), NodeKind::File);
    assert_eq!(node.value_or_fail().unwrap(), Value::from(3i64));
}

#[test]
fn make_directory_with_materializes_snapshots_and_nodes() {
    let (_temp, store) = open_store();
    let game = seed_game(&store);

    let bundle = store.node("bundle").unwrap();
    bundle
        .make_directory_with(vec![
            TreeSource::from(TreeSnapshot::file("readme", "hi")),
            TreeSource::from(TreeSnapshot::directory("empty", Vec::new())),
            TreeSource::from(&game),
        ])
        .unwrap();

    let mut names = bundle.names().unwrap();
    names.sort();
    assert_eq!(names, vec!["empty", "g", "readme"]);
    assert!(store.node("bundle/empty").unwrap().is_directory());
    assert_eq!(
        store
            .node("bundle/g/info/name")
            .unwrap()
            .metadata()
            .all(),
        meta(json!({"lang": "en"}))
    );
}

#[test]
fn snapshot_serializes_as_tagged_json() {
    let (_temp, store) = open_store();
    let game = seed_game(&store);
    let snapshot = game.extract().unwrap().unwrap();

    let text = serde_json::to_string(&snapshot).unwrap();
    let parsed: TreeSnapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.sorted(), snapshot.sorted());
    assert!(text.contains("\"type\":\"directory\""));
}

#[test]
fn invalid_sources_are_rejected_before_any_write() {
    let (_temp, store) = open_store();
    let bundle = store.node("bundle").unwrap();

    let result = bundle.make_directory_with(vec![
        TreeSource::from(TreeSnapshot::file("readme", "hi")),
        TreeSource::from(store.home()),
    ]);
    assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    assert!(!bundle.exists());

    let result = bundle.make_directory_with(vec![
        TreeSnapshot::file("readme", "hi"),
        TreeSnapshot::directory("nested", vec![TreeSnapshot::file("bad.name", 1i64)]),
    ]);
    assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    assert!(!bundle.exists());

    let result = bundle.merge(TreeSnapshot::directory(
        "bundle",
        vec![TreeSnapshot::file("ok", 1i64), TreeSnapshot::file("", 2i64)],
    ));
    assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    assert!(!bundle.exists());
}
