//! Sinks for the nodes a selector chain produces.

use crate::error::JsonPathError;
use crate::eval_ctx::EvalCtx;
use crate::location::{LocationNode, NormalizedPath};
use crate::selector::Selector;
use crate::value::JsonValue;
use std::sync::Arc;

/// Receives every `(location, value)` a selector chain produces.
pub(crate) trait NodeReceiver<'a>: Send {
    fn add(&mut self, location: &Arc<LocationNode>, value: JsonValue<'a>) -> Result<(), JsonPathError>;
}

#[derive(Default)]
pub(crate) struct ValueAccumulator<'a> {
    pub values: Vec<JsonValue<'a>>,
}

impl<'a> NodeReceiver<'a> for ValueAccumulator<'a> {
    fn add(&mut self, _location: &Arc<LocationNode>, value: JsonValue<'a>) -> Result<(), JsonPathError> {
        self.values.push(value);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct PathAccumulator {
    pub paths: Vec<NormalizedPath>,
}

impl<'a> NodeReceiver<'a> for PathAccumulator {
    fn add(&mut self, location: &Arc<LocationNode>, _value: JsonValue<'a>) -> Result<(), JsonPathError> {
        self.paths.push(NormalizedPath::from(location));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct NodeAccumulator<'a> {
    pub nodes: Vec<(Arc<LocationNode>, JsonValue<'a>)>,
}

impl<'a> NodeReceiver<'a> for NodeAccumulator<'a> {
    fn add(&mut self, location: &Arc<LocationNode>, value: JsonValue<'a>) -> Result<(), JsonPathError> {
        self.nodes.push((Arc::clone(location), value));
        Ok(())
    }
}

/// Feeds each received node through the rest of a selector chain.
pub(crate) struct TailReceiver<'r, 'a> {
    tail: &'r Selector,
    ctx: &'r EvalCtx<'a>,
    inner: &'r mut dyn NodeReceiver<'a>,
    depth: usize,
}

impl<'r, 'a> TailReceiver<'r, 'a> {
    pub(crate) fn new(
        tail: &'r Selector,
        ctx: &'r EvalCtx<'a>,
        inner: &'r mut dyn NodeReceiver<'a>,
        depth: usize,
    ) -> Self {
        TailReceiver {
            tail,
            ctx,
            inner,
            depth,
        }
    }
}

impl<'a> NodeReceiver<'a> for TailReceiver<'_, 'a> {
    fn add(&mut self, location: &Arc<LocationNode>, value: JsonValue<'a>) -> Result<(), JsonPathError> {
        self.tail
            .select(self.ctx, location, &value, &mut *self.inner, self.depth)
    }
}
