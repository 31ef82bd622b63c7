//! Compiled queries and the operations that run them.

use crate::error::JsonPathError;
use crate::eval_ctx::EvalCtx;
use crate::location::{LocationNode, NormalizedPath};
use crate::options::{JsonSelectorOptions, ProcessingFlags};
use crate::parser::Parser;
use crate::receiver::{NodeAccumulator, NodeReceiver, PathAccumulator, ValueAccumulator};
use crate::selector::{Selector, SelectorKind};
use crate::value::JsonValue;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A matched value together with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct PathValuePair<'a> {
    pub path: NormalizedPath,
    pub value: JsonValue<'a>,
}

impl<'a> PathValuePair<'a> {
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn value(&self) -> &JsonValue<'a> {
        &self.value
    }
}

/// A compiled JSONPath query. Immutable; one instance can serve any number
/// of documents, also from several threads at once.
#[derive(Debug, Clone)]
pub struct JsonSelector {
    text: String,
    selector: Selector,
    flags: ProcessingFlags,
}

impl JsonSelector {
    /// Compile `text`.
    pub fn parse(text: &str) -> Result<JsonSelector, JsonPathError> {
        let compiled = Parser::parse(text)?;
        let mut flags = ProcessingFlags::default();
        if compiled.paths_required {
            flags |= ProcessingFlags::PATHS_REQUIRED;
        }
        log::trace!("compiled {:?} (paths required: {})", text, compiled.paths_required);
        Ok(JsonSelector {
            text: text.to_string(),
            selector: compiled.selector,
            flags,
        })
    }

    /// The query text this selector was compiled from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Values of all matches.
    pub fn select<'a>(
        &self,
        root: &'a Value,
        options: &JsonSelectorOptions,
    ) -> Result<Vec<JsonValue<'a>>, JsonPathError> {
        if options.flags().needs_post_processing() {
            let nodes = self.select_nodes(root, options)?;
            return Ok(nodes.into_iter().map(|pair| pair.value).collect());
        }
        let mut values = ValueAccumulator::default();
        self.run(root, options, ProcessingFlags::default(), &mut values)?;
        Ok(values.values)
    }

    /// Normalized paths of all matches.
    pub fn select_paths(
        &self,
        root: &Value,
        options: &JsonSelectorOptions,
    ) -> Result<Vec<NormalizedPath>, JsonPathError> {
        if options.flags().needs_post_processing() {
            let nodes = self.select_nodes(root, options)?;
            return Ok(nodes.into_iter().map(|pair| pair.path).collect());
        }
        let mut paths = PathAccumulator::default();
        self.run(root, options, ProcessingFlags::PATHS_REQUIRED, &mut paths)?;
        Ok(paths.paths)
    }

    /// Matches as `(path, value)` pairs.
    pub fn select_nodes<'a>(
        &self,
        root: &'a Value,
        options: &JsonSelectorOptions,
    ) -> Result<Vec<PathValuePair<'a>>, JsonPathError> {
        let mut nodes = NodeAccumulator::default();
        self.run(root, options, ProcessingFlags::PATHS_REQUIRED, &mut nodes)?;
        let mut pairs: Vec<PathValuePair<'a>> = nodes
            .nodes
            .iter()
            .map(|(location, value)| PathValuePair {
                path: NormalizedPath::from(location),
                value: value.clone(),
            })
            .collect();

        let flags = options.flags();
        if flags.contains(ProcessingFlags::SORT_BY_PATH) {
            pairs.sort_by(|a, b| a.path.cmp(&b.path));
        }
        if flags.contains(ProcessingFlags::NO_DUPLICATES) {
            let mut seen = HashSet::new();
            pairs.retain(|pair| seen.insert(pair.path.clone()));
        }
        if flags.contains(ProcessingFlags::SORT_BY_VALUE) {
            pairs.sort_by(|a, b| a.value.compare(&b.value));
        }
        Ok(pairs)
    }

    fn run<'a>(
        &self,
        root: &'a Value,
        options: &JsonSelectorOptions,
        flags: ProcessingFlags,
        receiver: &mut dyn NodeReceiver<'a>,
    ) -> Result<(), JsonPathError> {
        let ctx = EvalCtx::new(root, options, self.flags | flags);
        let current = JsonValue::Node(root);
        self.selector
            .select(&ctx, &LocationNode::root(), &current, receiver, 0)
    }

    /// The location this query denotes when it consists of `$` followed by
    /// names and non-negative indices only.
    pub(crate) fn to_location(&self) -> Option<Arc<LocationNode>> {
        let SelectorKind::Root { .. } = self.selector.kind() else {
            return None;
        };
        let mut node = LocationNode::root();
        let mut step = self.selector.tail();
        while let Some(selector) = step {
            node = match selector.kind() {
                SelectorKind::Identifier(name) => LocationNode::with_name(&node, name.as_str()),
                SelectorKind::Index(index) if *index >= 0 => LocationNode::with_index(&node, *index as usize),
                _ => return None,
            };
            step = selector.tail();
        }
        Some(node)
    }
}

impl FromStr for JsonSelector {
    type Err = JsonPathError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        JsonSelector::parse(text)
    }
}

impl fmt::Display for JsonSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SortBy;
    use serde_json::json;

    fn values(path: &str, doc: &Value, options: &JsonSelectorOptions) -> Vec<Value> {
        JsonSelector::parse(path)
            .unwrap()
            .select(doc, options)
            .unwrap()
            .iter()
            .map(JsonValue::to_value)
            .collect()
    }

    #[test]
    fn keeps_query_text() {
        let selector: JsonSelector = "$.a[0]".parse().unwrap();
        assert_eq!(selector.text(), "$.a[0]");
        assert_eq!(selector.to_string(), "$.a[0]");
    }

    #[test]
    fn sort_by_path_then_dedup() {
        let doc = json!({"b": 2, "a": 1});
        let options = JsonSelectorOptions::default()
            .with_no_duplicates(true)
            .with_sort_by(SortBy::Path);
        assert_eq!(values("$['b','a','b']", &doc, &options), vec![json!(1), json!(2)]);
        let unsorted = JsonSelectorOptions::default().with_no_duplicates(true);
        assert_eq!(values("$['b','a','b']", &doc, &unsorted), vec![json!(2), json!(1)]);
    }

    #[test]
    fn sort_by_value_is_kind_first() {
        let doc = json!(["b", 3, null, [1], true, 1, "a"]);
        let options = JsonSelectorOptions::default().with_sort_by(SortBy::Value);
        assert_eq!(
            values("$[*]", &doc, &options),
            vec![json!(null), json!(true), json!(1), json!(3), json!("a"), json!("b"), json!([1])]
        );
    }

    #[test]
    fn location_of_simple_queries() {
        let selector = JsonSelector::parse("$.a[2]['b']").unwrap();
        let location = selector.to_location().unwrap();
        assert_eq!(NormalizedPath::from(&location).to_string(), "$['a'][2]['b']");
        assert!(JsonSelector::parse("@.a").unwrap().to_location().is_none());
        assert!(JsonSelector::parse("$..a").unwrap().to_location().is_none());
    }
}
