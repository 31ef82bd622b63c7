//! Built-in filter functions.
//!
//! Each function is a row of the [`FUNCTIONS`] table with a fixed arity. A
//! function returns `None` when its arguments have unsupported kinds, which
//! aborts the enclosing expression.

use crate::value::{compare_numbers, JsonValue, JsonValueKind};
use regex::Regex;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

pub(crate) type EvalFn = for<'a> fn(&[JsonValue<'a>]) -> Option<JsonValue<'a>>;

pub(crate) struct FunctionDefinition {
    pub name: &'static str,
    pub arity: usize,
    pub eval_fn: EvalFn,
}

impl fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

impl FunctionDefinition {
    pub(crate) fn call<'a>(&self, args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
        if args.len() != self.arity {
            log::debug!("{} called with {} argument(s)", self.name, args.len());
            return None;
        }
        let result = (self.eval_fn)(args);
        if result.is_none() {
            log::debug!("{} rejected its arguments", self.name);
        }
        result
    }
}

/// Look up a built-in by name.
pub(crate) fn lookup(name: &str) -> Option<&'static FunctionDefinition> {
    static BY_NAME: OnceLock<HashMap<&'static str, &'static FunctionDefinition>> = OnceLock::new();
    BY_NAME
        .get_or_init(|| FUNCTIONS.iter().map(|def| (def.name, def)).collect())
        .get(name)
        .copied()
}

fn abs_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let arg = number(&args[0])?;
    match arg.try_get_decimal() {
        Some(d) => Some(JsonValue::Decimal(d.abs())),
        None => arg.try_get_f64().map(|f| JsonValue::Float(f.abs())),
    }
}

fn ceil_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let arg = number(&args[0])?;
    match arg.try_get_decimal() {
        Some(d) => Some(JsonValue::Decimal(d.ceil())),
        None => arg.try_get_f64().map(|f| JsonValue::Float(f.ceil())),
    }
}

fn floor_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let arg = number(&args[0])?;
    match arg.try_get_decimal() {
        Some(d) => Some(JsonValue::Decimal(d.floor())),
        None => arg.try_get_f64().map(|f| JsonValue::Float(f.floor())),
    }
}

fn sum_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let items = numbers(&args[0])?;
    fold(&items, Decimal::ZERO, Decimal::checked_add, 0.0, |a, b| a + b)
}

fn prod_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let items = numbers(&args[0])?;
    if items.is_empty() {
        return Some(JsonValue::Null);
    }
    fold(&items, Decimal::ONE, Decimal::checked_mul, 1.0, |a, b| a * b)
}

fn avg_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let items = numbers(&args[0])?;
    if items.is_empty() {
        return Some(JsonValue::Null);
    }
    let sum = fold(&items, Decimal::ZERO, Decimal::checked_add, 0.0, |a, b| a + b)?;
    let count = Decimal::from(items.len() as u64);
    if let Some(avg) = sum.try_get_decimal().and_then(|s| s.checked_div(count)) {
        return Some(JsonValue::Decimal(avg));
    }
    let avg = sum.try_get_f64()? / items.len() as f64;
    avg.is_finite().then_some(JsonValue::Float(avg))
}

fn max_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    extreme(&args[0], Ordering::Greater)
}

fn min_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    extreme(&args[0], Ordering::Less)
}

fn contains_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let (subject, needle) = (&args[0], &args[1]);
    match subject.kind() {
        JsonValueKind::Array => Some(JsonValue::Bool(subject.elements().any(|item| item == *needle))),
        JsonValueKind::String => {
            let needle = needle.as_str()?;
            Some(JsonValue::Bool(subject.as_str()?.contains(needle)))
        }
        _ => None,
    }
}

fn starts_with_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let (subject, prefix) = (args[0].as_str()?, args[1].as_str()?);
    Some(JsonValue::Bool(subject.starts_with(prefix)))
}

fn ends_with_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let (subject, suffix) = (args[0].as_str()?, args[1].as_str()?);
    Some(JsonValue::Bool(subject.ends_with(suffix)))
}

fn keys_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    if args[0].kind() != JsonValueKind::Object {
        return None;
    }
    let names = args[0].properties().map(|(name, _)| JsonValue::from(name)).collect();
    Some(JsonValue::array(names))
}

fn length_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    args[0].len().map(JsonValue::from_usize)
}

fn to_number_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let arg = &args[0];
    match arg.kind() {
        JsonValueKind::Number => Some(arg.clone()),
        JsonValueKind::String => {
            let text = arg.as_str()?.trim();
            if let Ok(d) = Decimal::from_str(text) {
                return Some(JsonValue::Decimal(d));
            }
            let f = text.parse::<f64>().ok()?;
            f.is_finite().then_some(JsonValue::Float(f))
        }
        _ => None,
    }
}

fn tokenize_eval<'a>(args: &[JsonValue<'a>]) -> Option<JsonValue<'a>> {
    let (subject, pattern) = (args[0].as_str()?, args[1].as_str()?);
    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => {
            log::debug!("tokenize: invalid pattern {:?}: {}", pattern, err);
            return None;
        }
    };
    let tokens = regex.split(subject).map(JsonValue::from).collect();
    Some(JsonValue::array(tokens))
}

fn number<'v, 'a>(arg: &'v JsonValue<'a>) -> Option<&'v JsonValue<'a>> {
    (arg.kind() == JsonValueKind::Number).then_some(arg)
}

/// Elements of an array argument, all of which must be numbers.
fn numbers<'a>(arg: &JsonValue<'a>) -> Option<Vec<JsonValue<'a>>> {
    if arg.kind() != JsonValueKind::Array {
        return None;
    }
    arg.elements()
        .map(|item| number(&item).is_some().then_some(item))
        .collect()
}

fn fold<'a>(
    items: &[JsonValue<'a>],
    init: Decimal,
    op: fn(Decimal, Decimal) -> Option<Decimal>,
    init_f64: f64,
    op_f64: fn(f64, f64) -> f64,
) -> Option<JsonValue<'a>> {
    let exact = items
        .iter()
        .try_fold(init, |acc, item| op(acc, item.try_get_decimal()?));
    if let Some(result) = exact {
        return Some(JsonValue::Decimal(result));
    }
    let result = items
        .iter()
        .try_fold(init_f64, |acc, item| Some(op_f64(acc, item.try_get_f64()?)))?;
    result.is_finite().then_some(JsonValue::Float(result))
}

/// Largest (or smallest) element of an array of numbers or of strings.
fn extreme<'a>(arg: &JsonValue<'a>, wanted: Ordering) -> Option<JsonValue<'a>> {
    if arg.kind() != JsonValueKind::Array {
        return None;
    }
    let mut items = arg.elements();
    let Some(mut best) = items.next() else {
        return Some(JsonValue::Null);
    };
    let kind = best.kind();
    if kind != JsonValueKind::Number && kind != JsonValueKind::String {
        return None;
    }
    for item in items {
        if item.kind() != kind {
            return None;
        }
        let ord = match kind {
            JsonValueKind::Number => compare_numbers(&item, &best)?,
            _ => item.as_str().cmp(&best.as_str()),
        };
        if ord == wanted {
            best = item;
        }
    }
    Some(best)
}

pub(crate) static FUNCTIONS: &[FunctionDefinition] = &[
    FunctionDefinition {
        name: "abs",
        arity: 1,
        eval_fn: abs_eval,
    },
    FunctionDefinition {
        name: "avg",
        arity: 1,
        eval_fn: avg_eval,
    },
    FunctionDefinition {
        name: "ceil",
        arity: 1,
        eval_fn: ceil_eval,
    },
    FunctionDefinition {
        name: "contains",
        arity: 2,
        eval_fn: contains_eval,
    },
    FunctionDefinition {
        name: "ends_with",
        arity: 2,
        eval_fn: ends_with_eval,
    },
    FunctionDefinition {
        name: "floor",
        arity: 1,
        eval_fn: floor_eval,
    },
    FunctionDefinition {
        name: "keys",
        arity: 1,
        eval_fn: keys_eval,
    },
    FunctionDefinition {
        name: "length",
        arity: 1,
        eval_fn: length_eval,
    },
    FunctionDefinition {
        name: "max",
        arity: 1,
        eval_fn: max_eval,
    },
    FunctionDefinition {
        name: "min",
        arity: 1,
        eval_fn: min_eval,
    },
    FunctionDefinition {
        name: "prod",
        arity: 1,
        eval_fn: prod_eval,
    },
    FunctionDefinition {
        name: "starts_with",
        arity: 2,
        eval_fn: starts_with_eval,
    },
    FunctionDefinition {
        name: "sum",
        arity: 1,
        eval_fn: sum_eval,
    },
    FunctionDefinition {
        name: "to_number",
        arity: 1,
        eval_fn: to_number_eval,
    },
    FunctionDefinition {
        name: "tokenize",
        arity: 2,
        eval_fn: tokenize_eval,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn call(name: &str, args: &[Value]) -> Option<Value> {
        let def = lookup(name).unwrap();
        let args: Vec<JsonValue<'_>> = args.iter().map(JsonValue::Node).collect();
        def.call(&args).map(|v| v.to_value())
    }

    #[test]
    fn every_function_is_registered() {
        for name in [
            "abs", "avg", "ceil", "contains", "ends_with", "floor", "keys", "length", "max",
            "min", "prod", "starts_with", "sum", "to_number", "tokenize",
        ] {
            assert_eq!(lookup(name).map(|def| def.name), Some(name));
        }
        assert!(lookup("nope").is_none());
    }

    #[test]
    fn numeric_functions() {
        assert_eq!(call("abs", &[json!(-2.5)]), Some(json!(2.5)));
        assert_eq!(call("ceil", &[json!(1.2)]), Some(json!(2)));
        assert_eq!(call("floor", &[json!(-1.2)]), Some(json!(-2)));
        assert_eq!(call("abs", &[json!("x")]), None);
    }

    #[test]
    fn aggregates() {
        assert_eq!(call("sum", &[json!([1, 2, 3.5])]), Some(json!(6.5)));
        assert_eq!(call("sum", &[json!([])]), Some(json!(0)));
        assert_eq!(call("prod", &[json!([2, 3])]), Some(json!(6)));
        assert_eq!(call("prod", &[json!([])]), Some(Value::Null));
        assert_eq!(call("avg", &[json!([1, 2])]), Some(json!(1.5)));
        assert_eq!(call("avg", &[json!([])]), Some(Value::Null));
        assert_eq!(call("sum", &[json!([1, "2"])]), None);
    }

    #[test]
    fn extremes() {
        assert_eq!(call("max", &[json!([1, 7, 3])]), Some(json!(7)));
        assert_eq!(call("min", &[json!(["b", "a", "c"])]), Some(json!("a")));
        assert_eq!(call("max", &[json!([])]), Some(Value::Null));
        assert_eq!(call("min", &[json!([1, "a"])]), None);
    }

    #[test]
    fn string_functions() {
        assert_eq!(call("contains", &[json!("hello"), json!("ell")]), Some(json!(true)));
        assert_eq!(call("contains", &[json!([1, 2]), json!(2.0)]), Some(json!(true)));
        assert_eq!(call("starts_with", &[json!("hello"), json!("he")]), Some(json!(true)));
        assert_eq!(call("ends_with", &[json!("hello"), json!("he")]), Some(json!(false)));
        assert_eq!(call("ends_with", &[json!(1), json!("1")]), None);
        assert_eq!(
            call("tokenize", &[json!("a, b,c"), json!(",\\s*")]),
            Some(json!(["a", "b", "c"]))
        );
        assert_eq!(call("tokenize", &[json!("a"), json!("(")]), None);
    }

    #[test]
    fn structural_functions() {
        assert_eq!(call("keys", &[json!({"b": 1, "a": 2})]), Some(json!(["b", "a"])));
        assert_eq!(call("keys", &[json!([1])]), None);
        assert_eq!(call("length", &[json!("h\u{e9}")]), Some(json!(2)));
        assert_eq!(call("length", &[json!({"a": 1})]), Some(json!(1)));
        assert_eq!(call("length", &[json!(3)]), None);
    }

    #[test]
    fn to_number_parses_strings() {
        assert_eq!(call("to_number", &[json!(" 12.5 ")]), Some(json!(12.5)));
        assert_eq!(call("to_number", &[json!(4)]), Some(json!(4)));
        let parsed = call("to_number", &[json!("1e3")]).and_then(|v| v.as_f64());
        assert_eq!(parsed, Some(1000.0));
        assert_eq!(call("to_number", &[json!("abc")]), None);
    }

    #[test]
    fn wrong_argument_count_is_rejected() {
        let def = lookup("abs").unwrap();
        assert!(def.call(&[]).is_none());
    }
}
