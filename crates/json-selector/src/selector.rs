//! Compiled path steps.
//!
//! A query compiles to a chain of [`Selector`]s. Each selector hands every
//! node it produces to its tail; the last one in the chain hands them to a
//! [`NodeReceiver`]. Inside expressions, selectors are evaluated instead: a
//! name or index step yields a single value, any other step yields the array
//! of everything it matched.

use crate::error::JsonPathError;
use crate::eval_ctx::EvalCtx;
use crate::expression::Expression;
use crate::location::{LocationNode, NormalizedPath};
use crate::options::ExecutionMode;
use crate::receiver::{NodeAccumulator, NodeReceiver, TailReceiver, ValueAccumulator};
use crate::value::{JsonValue, JsonValueKind};
use rayon::prelude::*;
use std::sync::Arc;

/// `start:stop:step` with Python semantics. `step` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slice {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: i64,
}

impl Slice {
    /// Indices selected from an array of `len` elements, in visiting order.
    pub(crate) fn indices(&self, len: usize) -> Vec<usize> {
        let len = len as i64;
        let step = self.step;
        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };
        let clamp = |bound: i64| {
            let bound = if bound < 0 { bound + len } else { bound };
            bound.clamp(lower, upper)
        };
        let start = self.start.map(clamp).unwrap_or(if step > 0 { lower } else { upper });
        let stop = self.stop.map(clamp).unwrap_or(if step > 0 { upper } else { lower });

        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
pub(crate) enum SelectorKind {
    /// `$`. The id keys the memoized value of a root-anchored sub-path.
    Root { id: usize },
    /// `@`
    CurrentNode,
    /// `^`, repeated `depth` times.
    Parent { depth: usize },
    Identifier(String),
    Index(i64),
    Slice(Slice),
    Wildcard,
    /// `..`: the node itself, then every descendant.
    RecursiveDescent,
    Union(Vec<Selector>),
    Filter(Expression),
}

#[derive(Debug, Clone)]
pub(crate) struct Selector {
    kind: SelectorKind,
    tail: Option<Box<Selector>>,
}

impl Selector {
    pub(crate) fn new(kind: SelectorKind) -> Selector {
        Selector { kind, tail: None }
    }

    pub(crate) fn kind(&self) -> &SelectorKind {
        &self.kind
    }

    pub(crate) fn tail(&self) -> Option<&Selector> {
        self.tail.as_deref()
    }

    /// Attach `next` at the end of this chain.
    pub(crate) fn append(&mut self, next: Selector) {
        let mut slot = &mut self.tail;
        while let Some(node) = slot {
            slot = &mut node.tail;
        }
        *slot = Some(Box::new(next));
    }

    /// Produce every match of this chain below `current` into `receiver`.
    pub(crate) fn select<'a>(
        &self,
        ctx: &EvalCtx<'a>,
        last: &Arc<LocationNode>,
        current: &JsonValue<'a>,
        receiver: &mut dyn NodeReceiver<'a>,
        depth: usize,
    ) -> Result<(), JsonPathError> {
        match &self.kind {
            SelectorKind::Root { .. } => {
                let root = JsonValue::Node(ctx.root);
                self.emit(ctx, &LocationNode::root(), root, receiver, depth)
            }
            SelectorKind::CurrentNode => self.emit(ctx, last, current.clone(), receiver, depth),
            SelectorKind::Parent { depth: levels } => match self.ancestor(ctx, last, *levels) {
                Some((location, value)) => self.emit(ctx, &location, value, receiver, depth),
                None => Ok(()),
            },
            SelectorKind::Identifier(name) => match self.property(ctx, last, current, name) {
                Some((location, value)) => self.emit(ctx, &location, value, receiver, depth),
                None => Ok(()),
            },
            SelectorKind::Index(index) => match self.element(ctx, last, current, *index) {
                Some((location, value)) => self.emit(ctx, &location, value, receiver, depth),
                None => Ok(()),
            },
            SelectorKind::Slice(slice) => {
                let Some(len) = array_len(current) else {
                    return Ok(());
                };
                for i in slice.indices(len) {
                    if let Some(value) = current.get_index(i) {
                        self.emit(ctx, &ctx.extend_index(last, i), value, receiver, depth)?;
                    }
                }
                Ok(())
            }
            SelectorKind::Wildcard => {
                for (i, value) in current.elements().enumerate() {
                    self.emit(ctx, &ctx.extend_index(last, i), value, receiver, depth)?;
                }
                for (name, value) in current.properties() {
                    self.emit(ctx, &ctx.extend_name(last, name), value, receiver, depth)?;
                }
                Ok(())
            }
            SelectorKind::RecursiveDescent => {
                if depth > ctx.max_depth {
                    log::debug!("recursive descent reached level {} (max {})", depth, ctx.max_depth);
                    return Err(JsonPathError::MaxDepthExceeded {
                        max_depth: ctx.max_depth,
                    });
                }
                self.emit(ctx, last, current.clone(), receiver, depth)?;
                for (i, value) in current.elements().enumerate() {
                    self.select(ctx, &ctx.extend_index(last, i), &value, receiver, depth + 1)?;
                }
                for (name, value) in current.properties() {
                    self.select(ctx, &ctx.extend_name(last, name), &value, receiver, depth + 1)?;
                }
                Ok(())
            }
            SelectorKind::Union(members) => self.select_union(ctx, members, last, current, receiver, depth),
            SelectorKind::Filter(expr) => {
                for (i, value) in current.elements().enumerate() {
                    let location = ctx.extend_index(last, i);
                    if expr.is_match(ctx, &location, &value, depth + 1)? {
                        self.emit(ctx, &location, value, receiver, depth)?;
                    }
                }
                for (name, value) in current.properties() {
                    let location = ctx.extend_name(last, name);
                    if expr.is_match(ctx, &location, &value, depth + 1)? {
                        self.emit(ctx, &location, value, receiver, depth)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// The value of this chain inside an expression. `Ok(None)` when a name
    /// or index step finds nothing.
    pub(crate) fn evaluate<'a>(
        &self,
        ctx: &EvalCtx<'a>,
        last: &Arc<LocationNode>,
        current: &JsonValue<'a>,
        depth: usize,
    ) -> Result<Option<JsonValue<'a>>, JsonPathError> {
        match &self.kind {
            SelectorKind::Root { id } => {
                if let Some(value) = ctx.cached(*id) {
                    return Ok(Some(value));
                }
                let root = JsonValue::Node(ctx.root);
                let value = self.evaluate_tail(ctx, &LocationNode::root(), root, 0)?;
                Ok(value.map(|value| ctx.store(*id, value)))
            }
            SelectorKind::CurrentNode => self.evaluate_tail(ctx, last, current.clone(), depth),
            SelectorKind::Parent { depth: levels } => match self.ancestor(ctx, last, *levels) {
                Some((location, value)) => self.evaluate_tail(ctx, &location, value, depth),
                None => Ok(None),
            },
            SelectorKind::Identifier(name) => match self.property(ctx, last, current, name) {
                Some((location, value)) => self.evaluate_tail(ctx, &location, value, depth),
                None => Ok(None),
            },
            SelectorKind::Index(index) => match self.element(ctx, last, current, *index) {
                Some((location, value)) => self.evaluate_tail(ctx, &location, value, depth),
                None => Ok(None),
            },
            _ => {
                let mut values = ValueAccumulator::default();
                self.select(ctx, last, current, &mut values, depth)?;
                Ok(Some(JsonValue::array(values.values)))
            }
        }
    }

    fn emit<'a>(
        &self,
        ctx: &EvalCtx<'a>,
        location: &Arc<LocationNode>,
        value: JsonValue<'a>,
        receiver: &mut dyn NodeReceiver<'a>,
        depth: usize,
    ) -> Result<(), JsonPathError> {
        match &self.tail {
            Some(tail) => tail.select(ctx, location, &value, receiver, depth),
            None => receiver.add(location, value),
        }
    }

    fn evaluate_tail<'a>(
        &self,
        ctx: &EvalCtx<'a>,
        location: &Arc<LocationNode>,
        value: JsonValue<'a>,
        depth: usize,
    ) -> Result<Option<JsonValue<'a>>, JsonPathError> {
        match &self.tail {
            Some(tail) => tail.evaluate(ctx, location, &value, depth),
            None => Ok(Some(value)),
        }
    }

    fn select_union<'a>(
        &self,
        ctx: &EvalCtx<'a>,
        members: &[Selector],
        last: &Arc<LocationNode>,
        current: &JsonValue<'a>,
        receiver: &mut dyn NodeReceiver<'a>,
        depth: usize,
    ) -> Result<(), JsonPathError> {
        let tail = self.tail.as_deref();
        if ctx.mode == ExecutionMode::Parallel && members.len() > 1 {
            log::trace!("union fans out to {} members at level {}", members.len(), depth);
            // Each worker runs its member and the tail into its own
            // accumulator; only the merge below touches `receiver`.
            let batches = members
                .par_iter()
                .map(|member| {
                    let mut local = NodeAccumulator::default();
                    match tail {
                        Some(tail) => {
                            let mut chained = TailReceiver::new(tail, ctx, &mut local, depth);
                            member.select(ctx, last, current, &mut chained, depth)?;
                        }
                        None => member.select(ctx, last, current, &mut local, depth)?,
                    }
                    Ok::<_, JsonPathError>(local.nodes)
                })
                .collect::<Result<Vec<_>, JsonPathError>>()?;
            for (location, value) in batches.into_iter().flatten() {
                receiver.add(&location, value)?;
            }
            return Ok(());
        }
        for member in members {
            match tail {
                Some(tail) => {
                    let mut chained = TailReceiver::new(tail, ctx, &mut *receiver, depth);
                    member.select(ctx, last, current, &mut chained, depth)?;
                }
                None => member.select(ctx, last, current, &mut *receiver, depth)?,
            }
        }
        Ok(())
    }

    fn ancestor<'a>(
        &self,
        ctx: &EvalCtx<'a>,
        last: &Arc<LocationNode>,
        levels: usize,
    ) -> Option<(Arc<LocationNode>, JsonValue<'a>)> {
        let location = last.ancestor(levels)?;
        let value = NormalizedPath::from(&location).try_get_value(ctx.root)?;
        Some((location, JsonValue::Node(value)))
    }

    /// A named property, or the `length` of an array or string.
    fn property<'a>(
        &self,
        ctx: &EvalCtx<'a>,
        last: &Arc<LocationNode>,
        current: &JsonValue<'a>,
        name: &str,
    ) -> Option<(Arc<LocationNode>, JsonValue<'a>)> {
        let value = match current.kind() {
            JsonValueKind::Object => current.get_property(name)?,
            JsonValueKind::Array | JsonValueKind::String if name == "length" => {
                JsonValue::from_usize(current.len()?)
            }
            _ => return None,
        };
        Some((ctx.extend_name(last, name), value))
    }

    /// An array element; negative indices count from the end.
    fn element<'a>(
        &self,
        ctx: &EvalCtx<'a>,
        last: &Arc<LocationNode>,
        current: &JsonValue<'a>,
        index: i64,
    ) -> Option<(Arc<LocationNode>, JsonValue<'a>)> {
        let len = array_len(current)? as i64;
        let index = if index < 0 { index + len } else { index };
        if index < 0 || index >= len {
            return None;
        }
        let index = index as usize;
        let value = current.get_index(index)?;
        Some((ctx.extend_index(last, index), value))
    }
}

fn array_len(value: &JsonValue<'_>) -> Option<usize> {
    if value.kind() == JsonValueKind::Array {
        value.len()
    } else {
        None
    }
}
