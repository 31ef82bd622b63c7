//! Where a matched value was found.
//!
//! Matches carry a [`LocationNode`], a parent-linked chain built one step at
//! a time during traversal. A [`NormalizedPath`] flattens that chain into an
//! ordered sequence when the caller asks for paths.

use crate::error::JsonPathError;
use crate::json_selector::JsonSelector;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Kind of a location step. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocationNodeKind {
    Root,
    Name,
    Index,
}

#[derive(Debug, Clone)]
enum Step {
    Root(&'static str),
    Name(String),
    Index(usize),
}

/// One step of a location, linked to its parent step.
#[derive(Debug)]
pub struct LocationNode {
    parent: Option<Arc<LocationNode>>,
    step: Step,
}

impl LocationNode {
    /// The `$` anchor.
    pub fn root() -> Arc<LocationNode> {
        static ROOT: OnceLock<Arc<LocationNode>> = OnceLock::new();
        ROOT.get_or_init(|| {
            Arc::new(LocationNode {
                parent: None,
                step: Step::Root("$"),
            })
        })
        .clone()
    }

    /// The `@` anchor.
    pub fn current() -> Arc<LocationNode> {
        static CURRENT: OnceLock<Arc<LocationNode>> = OnceLock::new();
        CURRENT
            .get_or_init(|| {
                Arc::new(LocationNode {
                    parent: None,
                    step: Step::Root("@"),
                })
            })
            .clone()
    }

    pub fn with_name(parent: &Arc<LocationNode>, name: impl Into<String>) -> Arc<LocationNode> {
        Arc::new(LocationNode {
            parent: Some(Arc::clone(parent)),
            step: Step::Name(name.into()),
        })
    }

    pub fn with_index(parent: &Arc<LocationNode>, index: usize) -> Arc<LocationNode> {
        Arc::new(LocationNode {
            parent: Some(Arc::clone(parent)),
            step: Step::Index(index),
        })
    }

    pub fn kind(&self) -> LocationNodeKind {
        match self.step {
            Step::Root(_) => LocationNodeKind::Root,
            Step::Name(_) => LocationNodeKind::Name,
            Step::Index(_) => LocationNodeKind::Index,
        }
    }

    pub fn parent(&self) -> Option<&Arc<LocationNode>> {
        self.parent.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        match &self.step {
            Step::Name(name) => Some(name),
            Step::Root(symbol) => Some(symbol),
            Step::Index(_) => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self.step {
            Step::Index(index) => Some(index),
            _ => None,
        }
    }

    /// Walk `depth` parent links up. `None` if the chain is shorter.
    pub fn ancestor(self: &Arc<Self>, depth: usize) -> Option<Arc<LocationNode>> {
        let mut node = Arc::clone(self);
        for _ in 0..depth {
            node = Arc::clone(node.parent.as_ref()?);
        }
        Some(node)
    }
}

impl PartialEq for LocationNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LocationNode {}

impl PartialOrd for LocationNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares this step only: kind first, then name or index. Ancestors are
/// compared by [`NormalizedPath`].
impl Ord for LocationNode {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.step, &other.step) {
            (Step::Root(_), Step::Root(_)) => Ordering::Equal,
            (Step::Name(a), Step::Name(b)) => a.cmp(b),
            (Step::Index(a), Step::Index(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl Hash for LocationNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match &self.step {
            Step::Root(_) => {}
            Step::Name(name) => name.hash(state),
            Step::Index(index) => index.hash(state),
        }
    }
}

/// The concrete, wildcard-free address of a value, from the root down.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedPath {
    nodes: Vec<Arc<LocationNode>>,
}

impl NormalizedPath {
    /// Parse the bracket notation produced by `Display` (or any query made of
    /// names and non-negative indices only).
    pub fn parse(text: &str) -> Result<NormalizedPath, JsonPathError> {
        let selector = JsonSelector::parse(text)?;
        selector
            .to_location()
            .map(|node| NormalizedPath::from(&node))
            .ok_or_else(|| JsonPathError::NotNormalizedPath(text.to_string()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocationNode> {
        self.nodes.iter().map(|node| node.as_ref())
    }

    /// The terminal step.
    pub fn last(&self) -> Option<&LocationNode> {
        self.nodes.last().map(|node| node.as_ref())
    }

    /// Resolve this path against a document.
    pub fn try_get_value<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for node in &self.nodes {
            current = match (&node.step, current) {
                (Step::Root(_), _) => current,
                (Step::Name(name), Value::Object(map)) => map.get(name)?,
                (Step::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// RFC 6901 rendering: `/a/b/2`. The root renders as the empty string.
    pub fn to_json_pointer(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match &node.step {
                Step::Root(_) => {}
                Step::Name(name) => {
                    out.push('/');
                    out.push_str(&escape_pointer_component(name));
                }
                Step::Index(index) => {
                    out.push('/');
                    out.push_str(&index.to_string());
                }
            }
        }
        out
    }
}

impl From<&Arc<LocationNode>> for NormalizedPath {
    fn from(node: &Arc<LocationNode>) -> Self {
        let mut nodes = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            nodes.push(Arc::clone(n));
            current = n.parent.as_ref();
        }
        nodes.reverse();
        NormalizedPath { nodes }
    }
}

/// Bracket notation: `$['a']['b'][2]`.
impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match &node.step {
                Step::Root(symbol) => f.write_str(symbol)?,
                Step::Name(name) => write!(f, "['{}']", escape_single_quoted(name))?,
                Step::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

fn escape_single_quoted(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_pointer_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // ~ first, or the ~ introduced by ~1 would be escaped again
    component.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(steps: &[&str]) -> NormalizedPath {
        let mut node = LocationNode::root();
        for step in steps {
            node = match step.parse::<usize>() {
                Ok(i) => LocationNode::with_index(&node, i),
                Err(_) => LocationNode::with_name(&node, *step),
            };
        }
        NormalizedPath::from(&node)
    }

    #[test]
    fn renders_bracket_and_pointer_forms() {
        let p = path(&["a", "b", "2"]);
        assert_eq!(p.to_string(), "$['a']['b'][2]");
        assert_eq!(p.to_json_pointer(), "/a/b/2");
        assert_eq!(path(&[]).to_json_pointer(), "");
    }

    #[test]
    fn escapes_quotes_and_pointer_tokens() {
        let p = path(&["it's", "a/b~c"]);
        assert_eq!(p.to_string(), "$['it\\'s']['a/b~c']");
        assert_eq!(p.to_json_pointer(), "/it's/a~1b~0c");
    }

    #[test]
    fn orders_by_kind_then_content_then_length() {
        let mut paths = vec![
            path(&["b"]),
            path(&["a", "1"]),
            path(&["0"]),
            path(&["a"]),
            path(&["a", "0"]),
        ];
        paths.sort();
        let rendered: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["$['a']", "$['a'][0]", "$['a'][1]", "$['b']", "$[0]"]
        );
    }

    #[test]
    fn equal_paths_hash_alike() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(path(&["a", "0"]));
        assert!(set.contains(&path(&["a", "0"])));
        assert!(!set.contains(&path(&["a", "1"])));
    }

    #[test]
    fn ancestor_walks_parent_links() {
        let node = LocationNode::with_index(&LocationNode::with_name(&LocationNode::root(), "a"), 3);
        assert_eq!(node.ancestor(1).and_then(|n| n.name().map(String::from)), Some("a".into()));
        assert_eq!(node.ancestor(2).map(|n| n.kind()), Some(LocationNodeKind::Root));
        assert!(node.ancestor(3).is_none());
    }

    #[test]
    fn resolves_against_document() {
        let doc = json!({"a": [10, {"b": "x"}]});
        assert_eq!(path(&["a", "1", "b"]).try_get_value(&doc), Some(&json!("x")));
        assert_eq!(path(&[]).try_get_value(&doc), Some(&doc));
        assert_eq!(path(&["a", "5"]).try_get_value(&doc), None);
        assert_eq!(path(&["a", "b"]).try_get_value(&doc), None);
    }

    #[test]
    fn parses_rendered_paths() {
        let p = path(&["it's", "back\\slash", "3"]);
        let parsed = NormalizedPath::parse(&p.to_string()).unwrap();
        assert_eq!(parsed, p);
        assert!(NormalizedPath::parse("$.a[*]").is_err());
        assert!(NormalizedPath::parse("$.a[-1]").is_err());
    }
}
