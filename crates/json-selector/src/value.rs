//! Value handles seen by selectors and expressions.
//!
//! A [`JsonValue`] is either a node borrowed from the queried document or a
//! value synthesized while evaluating an expression (arithmetic results,
//! function results, literals, collected node lists). Every variant answers
//! the same questions: its kind, its children, and its numeric coercions.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// Nested structure below this depth does not contribute to a hash.
pub const DEFAULT_HASH_DEPTH: usize = 100;

/// Kind discriminant of a JSON value. The declaration order is the order
/// used when sorting values of different kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JsonValueKind {
    Null,
    False,
    True,
    Number,
    String,
    Array,
    Object,
}

/// A JSON value, borrowed from a document or synthesized.
#[derive(Debug, Clone)]
pub enum JsonValue<'a> {
    /// A node of the queried document.
    Node(&'a Value),
    /// A JSON literal embedded in a query.
    Literal(Arc<Value>),
    Decimal(Decimal),
    Float(f64),
    String(Arc<str>),
    Bool(bool),
    Null,
    Array(Arc<Vec<JsonValue<'a>>>),
}

impl<'a> JsonValue<'a> {
    pub fn from_literal(value: Value) -> JsonValue<'static> {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(b),
            Value::String(s) => JsonValue::String(Arc::from(s)),
            other => JsonValue::Literal(Arc::new(other)),
        }
    }

    pub fn array(items: Vec<JsonValue<'a>>) -> Self {
        JsonValue::Array(Arc::new(items))
    }

    pub(crate) fn from_usize(n: usize) -> Self {
        JsonValue::Decimal(Decimal::from(n as u64))
    }

    fn backing(&self) -> Option<&Value> {
        match self {
            JsonValue::Node(v) => Some(*v),
            JsonValue::Literal(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    pub fn kind(&self) -> JsonValueKind {
        match self {
            JsonValue::Node(v) => value_kind(v),
            JsonValue::Literal(v) => value_kind(v),
            JsonValue::Decimal(_) | JsonValue::Float(_) => JsonValueKind::Number,
            JsonValue::String(_) => JsonValueKind::String,
            JsonValue::Bool(true) => JsonValueKind::True,
            JsonValue::Bool(false) => JsonValueKind::False,
            JsonValue::Null => JsonValueKind::Null,
            JsonValue::Array(_) => JsonValueKind::Array,
        }
    }

    /// The document node behind this handle, if it is document-backed.
    pub fn as_value(&self) -> Option<&'a Value> {
        match self {
            JsonValue::Node(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => self.backing().and_then(Value::as_str),
        }
    }

    /// Coerce to a high-precision decimal. Fails for non-numbers and for
    /// numbers outside the decimal range.
    pub fn try_get_decimal(&self) -> Option<Decimal> {
        match self {
            JsonValue::Decimal(d) => Some(*d),
            JsonValue::Float(f) => f64_to_decimal(*f),
            _ => match self.backing()? {
                Value::Number(n) => number_to_decimal(n),
                _ => None,
            },
        }
    }

    pub fn try_get_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Decimal(d) => d.to_f64(),
            JsonValue::Float(f) => Some(*f),
            _ => match self.backing()? {
                Value::Number(n) => n.as_f64(),
                _ => None,
            },
        }
    }

    /// Element count for arrays, character count for strings, property count
    /// for objects.
    pub fn len(&self) -> Option<usize> {
        match self {
            JsonValue::String(s) => Some(s.chars().count()),
            JsonValue::Array(items) => Some(items.len()),
            _ => match self.backing()? {
                Value::String(s) => Some(s.chars().count()),
                Value::Array(items) => Some(items.len()),
                Value::Object(map) => Some(map.len()),
                _ => None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// JSON truthiness: false and null are false, numbers are never false,
    /// empty strings, arrays and objects are false.
    pub fn is_false(&self) -> bool {
        match self.kind() {
            JsonValueKind::Null | JsonValueKind::False => true,
            JsonValueKind::True | JsonValueKind::Number => false,
            JsonValueKind::String | JsonValueKind::Array | JsonValueKind::Object => {
                self.is_empty()
            }
        }
    }

    pub fn is_true(&self) -> bool {
        !self.is_false()
    }

    pub fn get_property(&self, name: &str) -> Option<JsonValue<'a>> {
        match self {
            JsonValue::Node(v) => match *v {
                Value::Object(map) => map.get(name).map(JsonValue::Node),
                _ => None,
            },
            JsonValue::Literal(v) => v
                .as_object()
                .and_then(|map| map.get(name))
                .map(|child| JsonValue::Literal(Arc::new(child.clone()))),
            _ => None,
        }
    }

    pub fn get_index(&self, index: usize) -> Option<JsonValue<'a>> {
        match self {
            JsonValue::Node(v) => match *v {
                Value::Array(items) => items.get(index).map(JsonValue::Node),
                _ => None,
            },
            JsonValue::Literal(v) => v
                .as_array()
                .and_then(|items| items.get(index))
                .map(|child| JsonValue::Literal(Arc::new(child.clone()))),
            JsonValue::Array(items) => items.get(index).cloned(),
            _ => None,
        }
    }

    /// Array elements in order. Empty for non-arrays.
    pub fn elements(&self) -> Elements<'_, 'a> {
        match self {
            JsonValue::Node(v) => match *v {
                Value::Array(items) => Elements::Node(items.iter()),
                _ => Elements::Empty,
            },
            JsonValue::Literal(v) => match v.as_array() {
                Some(items) => Elements::Literal(items.iter()),
                None => Elements::Empty,
            },
            JsonValue::Array(items) => Elements::Synthesized(items.iter()),
            _ => Elements::Empty,
        }
    }

    /// Object properties in document order. Empty for non-objects.
    pub fn properties(&self) -> Properties<'_, 'a> {
        match self {
            JsonValue::Node(v) => match *v {
                Value::Object(map) => Properties::Node(map.iter()),
                _ => Properties::Empty,
            },
            JsonValue::Literal(v) => match v.as_object() {
                Some(map) => Properties::Literal(map.iter()),
                None => Properties::Empty,
            },
            _ => Properties::Empty,
        }
    }

    /// Convert to an owned `serde_json::Value`.
    pub fn to_value(&self) -> Value {
        match self {
            JsonValue::Node(v) => (*v).clone(),
            JsonValue::Literal(v) => (**v).clone(),
            JsonValue::Decimal(d) => decimal_to_value(*d),
            JsonValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            JsonValue::String(s) => Value::String(s.to_string()),
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Null => Value::Null,
            JsonValue::Array(items) => Value::Array(items.iter().map(|v| v.to_value()).collect()),
        }
    }

    /// Total order used for value sorting: kind first, then content.
    pub fn compare(&self, other: &JsonValue<'_>) -> Ordering {
        let kind = self.kind();
        match kind.cmp(&other.kind()) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        match kind {
            JsonValueKind::Null | JsonValueKind::False | JsonValueKind::True => Ordering::Equal,
            JsonValueKind::Number => compare_numbers(self, other).unwrap_or(Ordering::Equal),
            JsonValueKind::String => self.as_str().cmp(&other.as_str()),
            JsonValueKind::Array => {
                let mut left = self.elements();
                let mut right = other.elements();
                loop {
                    match (left.next(), right.next()) {
                        (None, None) => return Ordering::Equal,
                        (None, Some(_)) => return Ordering::Less,
                        (Some(_), None) => return Ordering::Greater,
                        (Some(a), Some(b)) => match a.compare(&b) {
                            Ordering::Equal => {}
                            unequal => return unequal,
                        },
                    }
                }
            }
            JsonValueKind::Object => {
                let left = self.sorted_properties();
                let right = other.sorted_properties();
                for ((ka, va), (kb, vb)) in left.iter().zip(right.iter()) {
                    match ka.cmp(kb).then_with(|| va.compare(vb)) {
                        Ordering::Equal => {}
                        unequal => return unequal,
                    }
                }
                left.len().cmp(&right.len())
            }
        }
    }

    fn sorted_properties(&self) -> Vec<(&str, JsonValue<'a>)> {
        let mut props: Vec<_> = self.properties().collect();
        props.sort_by(|a, b| a.0.cmp(b.0));
        props
    }

    fn hash_with_depth<H: Hasher>(&self, state: &mut H, depth: usize) {
        let kind = self.kind();
        kind.hash(state);
        match kind {
            JsonValueKind::Null | JsonValueKind::False | JsonValueKind::True => {}
            JsonValueKind::Number => {
                let f = self.try_get_f64().unwrap_or(0.0);
                // -0.0 and 0.0 compare equal
                let f = if f == 0.0 { 0.0 } else { f };
                f.to_bits().hash(state);
            }
            JsonValueKind::String => self.as_str().hash(state),
            JsonValueKind::Array => {
                self.len().hash(state);
                if depth < DEFAULT_HASH_DEPTH {
                    for item in self.elements() {
                        item.hash_with_depth(state, depth + 1);
                    }
                }
            }
            JsonValueKind::Object => {
                self.len().hash(state);
                if depth < DEFAULT_HASH_DEPTH {
                    for (name, item) in self.sorted_properties() {
                        name.hash(state);
                        item.hash_with_depth(state, depth + 1);
                    }
                }
            }
        }
    }
}

fn value_kind(value: &Value) -> JsonValueKind {
    match value {
        Value::Null => JsonValueKind::Null,
        Value::Bool(true) => JsonValueKind::True,
        Value::Bool(false) => JsonValueKind::False,
        Value::Number(_) => JsonValueKind::Number,
        Value::String(_) => JsonValueKind::String,
        Value::Array(_) => JsonValueKind::Array,
        Value::Object(_) => JsonValueKind::Object,
    }
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    let text = n.to_string();
    let d = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()?;
    // underflow rounds to zero; keep such numbers on the float path
    if d.is_zero() && n.as_f64() != Some(0.0) {
        return None;
    }
    Some(d)
}

fn f64_to_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    let d = Decimal::from_str(&f.to_string()).ok()?;
    if d.is_zero() && f != 0.0 {
        return None;
    }
    Some(d)
}

pub(crate) fn decimal_to_value(d: Decimal) -> Value {
    let d = d.normalize();
    if d.scale() == 0 {
        if let Some(i) = d.to_i64() {
            return Value::from(i);
        }
    }
    d.to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Compare two numbers, preferring decimal precision. `None` if either side
/// is not a number.
pub(crate) fn compare_numbers(a: &JsonValue<'_>, b: &JsonValue<'_>) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.try_get_decimal(), b.try_get_decimal()) {
        return Some(x.cmp(&y));
    }
    match (a.try_get_f64(), b.try_get_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y),
        _ => None,
    }
}

impl PartialEq for JsonValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        let kind = self.kind();
        if kind != other.kind() {
            return false;
        }
        match kind {
            JsonValueKind::Null | JsonValueKind::False | JsonValueKind::True => true,
            JsonValueKind::Number => compare_numbers(self, other) == Some(Ordering::Equal),
            JsonValueKind::String => self.as_str() == other.as_str(),
            JsonValueKind::Array => {
                self.len() == other.len() && self.elements().zip(other.elements()).all(|(a, b)| a == b)
            }
            JsonValueKind::Object => {
                if self.len() != other.len() {
                    return false;
                }
                let left = self.sorted_properties();
                let right = other.sorted_properties();
                left.iter()
                    .zip(right.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
            }
        }
    }
}

impl Eq for JsonValue<'_> {}

impl Hash for JsonValue<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_with_depth(state, 0);
    }
}

impl fmt::Display for JsonValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonValue::Node(v) => write!(f, "{}", v),
            other => write!(f, "{}", other.to_value()),
        }
    }
}

impl<'a> From<&'a Value> for JsonValue<'a> {
    fn from(value: &'a Value) -> Self {
        JsonValue::Node(value)
    }
}

impl From<bool> for JsonValue<'_> {
    fn from(b: bool) -> Self {
        JsonValue::Bool(b)
    }
}

impl From<Decimal> for JsonValue<'_> {
    fn from(d: Decimal) -> Self {
        JsonValue::Decimal(d)
    }
}

impl From<&str> for JsonValue<'_> {
    fn from(s: &str) -> Self {
        JsonValue::String(Arc::from(s))
    }
}

impl From<String> for JsonValue<'_> {
    fn from(s: String) -> Self {
        JsonValue::String(Arc::from(s))
    }
}

/// Iterator over array elements.
pub enum Elements<'s, 'a> {
    Node(std::slice::Iter<'a, Value>),
    Literal(std::slice::Iter<'s, Value>),
    Synthesized(std::slice::Iter<'s, JsonValue<'a>>),
    Empty,
}

impl<'a> Iterator for Elements<'_, 'a> {
    type Item = JsonValue<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Elements::Node(iter) => iter.next().map(JsonValue::Node),
            Elements::Literal(iter) => iter
                .next()
                .map(|child| JsonValue::Literal(Arc::new(child.clone()))),
            Elements::Synthesized(iter) => iter.next().cloned(),
            Elements::Empty => None,
        }
    }
}

/// Iterator over object properties as `(name, value)` pairs.
pub enum Properties<'s, 'a> {
    Node(serde_json::map::Iter<'a>),
    Literal(serde_json::map::Iter<'s>),
    Empty,
}

impl<'s, 'a: 's> Iterator for Properties<'s, 'a> {
    type Item = (&'s str, JsonValue<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Properties::Node(iter) => iter
                .next()
                .map(|(name, child)| (name.as_str(), JsonValue::Node(child))),
            Properties::Literal(iter) => iter
                .next()
                .map(|(name, child)| (name.as_str(), JsonValue::Literal(Arc::new(child.clone())))),
            Properties::Empty => None,
        }
    }
}
