use crate::location::LocationNode;
use crate::options::{ExecutionMode, JsonSelectorOptions, ProcessingFlags};
use crate::value::JsonValue;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// State shared by every selector during one query.
pub(crate) struct EvalCtx<'a> {
    /// The queried document.
    pub root: &'a Value,
    pub flags: ProcessingFlags,
    pub max_depth: usize,
    pub mode: ExecutionMode,
    /// Values of root-anchored sub-paths, keyed by the selector's id.
    cache: Mutex<HashMap<usize, JsonValue<'a>>>,
}

impl<'a> EvalCtx<'a> {
    pub(crate) fn new(root: &'a Value, options: &JsonSelectorOptions, flags: ProcessingFlags) -> Self {
        EvalCtx {
            root,
            flags: flags | options.flags(),
            max_depth: options.max_depth,
            mode: options.execution_mode,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn paths_required(&self) -> bool {
        self.flags.contains(ProcessingFlags::PATHS_REQUIRED)
    }

    pub(crate) fn cached(&self, id: usize) -> Option<JsonValue<'a>> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Remember a root-anchored result. The first stored value wins and is
    /// returned.
    pub(crate) fn store(&self, id: usize, value: JsonValue<'a>) -> JsonValue<'a> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert(value)
            .clone()
    }

    /// Location of a property; the untracked `@` anchor when paths are not
    /// needed.
    pub(crate) fn extend_name(&self, parent: &Arc<LocationNode>, name: &str) -> Arc<LocationNode> {
        if self.paths_required() {
            LocationNode::with_name(parent, name)
        } else {
            LocationNode::current()
        }
    }

    pub(crate) fn extend_index(&self, parent: &Arc<LocationNode>, index: usize) -> Arc<LocationNode> {
        if self.paths_required() {
            LocationNode::with_index(parent, index)
        } else {
            LocationNode::current()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_stored_value_wins() {
        let doc = json!({});
        let ctx = EvalCtx::new(&doc, &JsonSelectorOptions::default(), ProcessingFlags::default());
        assert!(ctx.cached(1).is_none());
        assert_eq!(ctx.store(1, JsonValue::Bool(true)), JsonValue::Bool(true));
        assert_eq!(ctx.store(1, JsonValue::Bool(false)), JsonValue::Bool(true));
        assert_eq!(ctx.cached(1), Some(JsonValue::Bool(true)));
    }

    #[test]
    fn locations_only_tracked_when_required() {
        let doc = json!({});
        let ctx = EvalCtx::new(&doc, &JsonSelectorOptions::default(), ProcessingFlags::default());
        let node = ctx.extend_name(&LocationNode::root(), "a");
        assert_eq!(node.name(), Some("@"));

        let ctx = EvalCtx::new(&doc, &JsonSelectorOptions::default(), ProcessingFlags::PATHS_REQUIRED);
        let node = ctx.extend_index(&LocationNode::root(), 2);
        assert_eq!(node.index(), Some(2));
    }
}
