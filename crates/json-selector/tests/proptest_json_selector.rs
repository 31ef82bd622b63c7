//! Property-based tests for query execution.
//!
//! Covers:
//! - slices agree with Python's `list[start:stop:step]`
//! - `select_nodes` is consistent with `select` and `select_paths`
//! - every reported path parses back and addresses the reported value
//! - `SortBy` and `no_duplicates` post-processing invariants
//! - parallel unions produce the same matches as sequential ones

use json_selector::{
    select, select_nodes, select_paths, ExecutionMode, JsonSelectorOptions, JsonValue, NormalizedPath,
    SortBy,
};
use proptest::prelude::*;
use serde_json::{Map, Value};
use std::cmp::Ordering;

fn json_key() -> impl Strategy<Value = String> {
    r"[a-c'\\]{1,2}"
}

fn json_document() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-100i64..100).prop_map(Value::from),
        "[a-c]{0,3}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(json_key(), inner, 0..4)
                .prop_map(|members| Value::Object(members.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

fn query() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "$..*",
        "$.*",
        "$[*][*]",
        "$..a",
        "$..[0]",
        "$..[-1]",
        "$..[::2]",
        "$..['a','b',0]",
        "$[?(@.a)]",
        "$..[?(@ > 1)]",
        "$..[?(@.length > 1)]",
        "$..*^",
    ])
}

fn bound() -> impl Strategy<Value = Option<i64>> {
    prop::option::of(-12i64..12)
}

fn step() -> impl Strategy<Value = i64> {
    prop_oneof![-4i64..0, 1i64..5]
}

/// Python's slice semantics, written as a filter over all indices.
fn python_slice(len: i64, start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<i64> {
    let normalize = |bound: i64| if bound < 0 { bound + len } else { bound };
    if step > 0 {
        let start = start.map(normalize).unwrap_or(0).clamp(0, len);
        let stop = stop.map(normalize).unwrap_or(len).clamp(0, len);
        (0..len)
            .filter(|i| *i >= start && *i < stop && (i - start) % step == 0)
            .collect()
    } else {
        let start = start.map(normalize).unwrap_or(len - 1).clamp(-1, len - 1);
        let stop = stop.map(normalize).unwrap_or(-1).clamp(-1, len - 1);
        (0..len)
            .rev()
            .filter(|i| *i <= start && *i > stop && (start - i) % -step == 0)
            .collect()
    }
}

fn slice_query(start: Option<i64>, stop: Option<i64>, step: i64) -> String {
    let part = |b: Option<i64>| b.map(|b| b.to_string()).unwrap_or_default();
    format!("$[{}:{}:{}]", part(start), part(stop), step)
}

fn values(path: &str, doc: &Value, options: &JsonSelectorOptions) -> Vec<Value> {
    select(doc, path, options)
        .unwrap()
        .iter()
        .map(JsonValue::to_value)
        .collect()
}

fn paths(path: &str, doc: &Value, options: &JsonSelectorOptions) -> Vec<String> {
    select_paths(doc, path, options)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect()
}

proptest! {
    #[test]
    fn prop_slice_matches_python(
        len in 0usize..10,
        start in bound(),
        stop in bound(),
        step in step(),
    ) {
        let doc = Value::Array((0..len as i64).map(Value::from).collect());
        let expected: Vec<Value> = python_slice(len as i64, start, stop, step)
            .into_iter()
            .map(Value::from)
            .collect();
        let actual = values(&slice_query(start, stop, step), &doc, &JsonSelectorOptions::default());
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_nodes_agree_with_values_and_paths(doc in json_document(), path in query()) {
        let options = JsonSelectorOptions::default();
        let nodes = select_nodes(&doc, path, &options).unwrap();
        let node_values: Vec<Value> = nodes.iter().map(|n| n.value.to_value()).collect();
        let node_paths: Vec<String> = nodes.iter().map(|n| n.path.to_string()).collect();
        prop_assert_eq!(node_values, values(path, &doc, &options));
        prop_assert_eq!(node_paths, paths(path, &doc, &options));
    }

    #[test]
    fn prop_paths_address_their_values(doc in json_document(), path in query()) {
        let nodes = select_nodes(&doc, path, &JsonSelectorOptions::default()).unwrap();
        for node in nodes {
            let text = node.path.to_string();
            let reparsed = NormalizedPath::parse(&text).unwrap();
            prop_assert_eq!(&reparsed, &node.path);
            let expected = node.value.to_value();
            prop_assert_eq!(node.path.try_get_value(&doc), Some(&expected));
        }
    }

    #[test]
    fn prop_sorted_unique_paths(doc in json_document(), path in query()) {
        let options = JsonSelectorOptions::default()
            .with_no_duplicates(true)
            .with_sort_by(SortBy::Path);
        let found = select_paths(&doc, path, &options).unwrap();
        for pair in found.windows(2) {
            prop_assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn prop_sort_by_value_is_ordered(doc in json_document(), path in query()) {
        let options = JsonSelectorOptions::default().with_sort_by(SortBy::Value);
        let found = select(&doc, path, &options).unwrap();
        for pair in found.windows(2) {
            prop_assert_ne!(pair[0].compare(&pair[1]), Ordering::Greater);
        }
        let unsorted = select(&doc, path, &JsonSelectorOptions::default()).unwrap();
        prop_assert_eq!(found.len(), unsorted.len());
    }

    #[test]
    fn prop_parallel_union_matches_sequential(doc in json_document()) {
        let sequential = JsonSelectorOptions::default().with_sort_by(SortBy::Path);
        let parallel = sequential.clone().with_execution_mode(ExecutionMode::Parallel);
        for path in ["$..['a','b',0,-1]", "$[*,0]..*", "$..[?(@.a),'c']"] {
            prop_assert_eq!(paths(path, &doc, &parallel), paths(path, &doc, &sequential));
        }
    }
}
