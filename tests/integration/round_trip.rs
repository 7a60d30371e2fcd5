use crate::integration::support::{open_store, physical_entries};
use pathstore::{MetaKey, Value};
use proptest::prelude::*;
use serde_json::json;

fn structured_value() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        any::<f64>()
            .prop_filter("JSON has no NaN or infinity", |x| x.is_finite())
            .prop_map(serde_json::Value::from),
        "[a-z ]{0,12}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(|entries| {
                serde_json::Value::Object(entries.into_iter().collect())
            }),
        ]
    })
}

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_:-]{1,10}"
}

#[test]
fn floats_round_trip_exactly() {
    let (_temp, store) = open_store();
    let node = store.node("measure").unwrap();
    for x in [
        1.0715660391465826e-75,
        0.1,
        -2.5e300,
        f64::MIN_POSITIVE,
        f64::MAX,
        5e-324,
        1.0,
    ] {
        node.set_value(json!(x)).unwrap();
        assert_eq!(node.value_or_fail().unwrap(), Value::Structured(json!(x)));
        assert_eq!(node.value_as::<f64>().unwrap().to_bits(), x.to_bits());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn text_values_round_trip(text in "\\PC*", name in segment()) {
        let (_temp, store) = open_store();
        let node = store.home().child(&name).unwrap();
        node.set_value(text.as_str()).unwrap();
        prop_assert_eq!(node.value_or_fail().unwrap(), Value::Text(text));
        prop_assert_eq!(physical_entries(store.root()), vec![format!("{}.txt", name)]);
    }

    #[test]
    fn structured_values_round_trip(
        value in structured_value().prop_filter("strings are stored as text", |v| !v.is_string())
    ) {
        let (_temp, store) = open_store();
        let node = store.node("data").unwrap();
        node.set_value(value.clone()).unwrap();
        prop_assert_eq!(node.value_or_fail().unwrap(), Value::Structured(value));
        prop_assert_eq!(physical_entries(store.root()), vec!["data.json".to_string()]);
    }

    #[test]
    fn floats_round_trip(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        let (_temp, store) = open_store();
        let node = store.node("f").unwrap();
        node.set_value(x).unwrap();
        prop_assert_eq!(node.value_as::<f64>().unwrap().to_bits(), x.to_bits());
    }

    #[test]
    fn metadata_survives_any_rewrite_sequence(
        writes in prop::collection::vec(prop_oneof![
            "[a-z]{0,8}".prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
        ], 1..5)
    ) {
        let (_temp, store) = open_store();
        let node = store.node("item").unwrap();
        node.set_value("seed").unwrap();
        node.metadata().set(&MetaKey::parse("tag/id"), 7).unwrap();

        for value in writes {
            node.set_value(value.clone()).unwrap();
            prop_assert_eq!(node.value_or_fail().unwrap(), value);
            prop_assert_eq!(
                node.metadata().read(&MetaKey::parse("tag")),
                Some(json!({"id": 7}))
            );
            prop_assert_eq!(physical_entries(store.root()).len(), 2);
        }
    }
}
