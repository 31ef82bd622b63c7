//! Unary and binary operators of filter expressions.
//!
//! Operators are pure functions over [`JsonValue`]s. A `None` result means
//! the operator failed and the enclosing expression has no value.

use crate::value::{compare_numbers, JsonValue, JsonValueKind};
use regex::Regex;
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Precedence of prefix unary operators and selectors.
pub(crate) const UNARY_PRECEDENCE: u8 = 11;

#[derive(Debug, Clone)]
pub(crate) enum UnaryOperator {
    /// `!`
    Not,
    /// `-`
    Minus,
    /// `=~ /pattern/flags`, applied to the operand on its left.
    Regex(Regex),
}

impl UnaryOperator {
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            UnaryOperator::Not | UnaryOperator::Minus => UNARY_PRECEDENCE,
            UnaryOperator::Regex(_) => 3,
        }
    }

    pub(crate) fn is_right_associative(&self) -> bool {
        !self.is_postfix()
    }

    /// Postfix operators apply to an operand that is already on the output.
    pub(crate) fn is_postfix(&self) -> bool {
        matches!(self, UnaryOperator::Regex(_))
    }

    pub(crate) fn evaluate<'a>(&self, operand: &JsonValue<'a>) -> Option<JsonValue<'a>> {
        match self {
            UnaryOperator::Not => Some(JsonValue::Bool(operand.is_false())),
            UnaryOperator::Minus => {
                if operand.kind() != JsonValueKind::Number {
                    return None;
                }
                match operand.try_get_decimal() {
                    Some(d) => Some(JsonValue::Decimal(-d)),
                    None => operand.try_get_f64().map(|f| JsonValue::Float(-f)),
                }
            }
            UnaryOperator::Regex(regex) => Some(match operand.as_str() {
                Some(s) => JsonValue::Bool(regex.is_match(s)),
                None => JsonValue::Null,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOperator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 3,
            BinaryOperator::Less
            | BinaryOperator::LessOrEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterOrEqual => 4,
            BinaryOperator::Plus | BinaryOperator::Minus => 5,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 6,
        }
    }

    pub(crate) fn is_right_associative(self) -> bool {
        false
    }

    pub(crate) fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterOrEqual => ">=",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
        }
    }

    pub(crate) fn evaluate<'a>(
        self,
        lhs: &JsonValue<'a>,
        rhs: &JsonValue<'a>,
    ) -> Option<JsonValue<'a>> {
        match self {
            BinaryOperator::Or => Some(if lhs.is_true() { lhs.clone() } else { rhs.clone() }),
            BinaryOperator::And => Some(if lhs.is_true() { rhs.clone() } else { lhs.clone() }),
            BinaryOperator::Equal => Some(JsonValue::Bool(lhs == rhs)),
            BinaryOperator::NotEqual => Some(JsonValue::Bool(lhs != rhs)),
            BinaryOperator::Less => Some(ordering(lhs, rhs, |o| o == Ordering::Less)),
            BinaryOperator::LessOrEqual => Some(ordering(lhs, rhs, |o| o != Ordering::Greater)),
            BinaryOperator::Greater => Some(ordering(lhs, rhs, |o| o == Ordering::Greater)),
            BinaryOperator::GreaterOrEqual => Some(ordering(lhs, rhs, |o| o != Ordering::Less)),
            BinaryOperator::Plus
            | BinaryOperator::Minus
            | BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::Modulo => self.arithmetic(lhs, rhs),
        }
    }

    fn arithmetic<'a>(self, lhs: &JsonValue<'a>, rhs: &JsonValue<'a>) -> Option<JsonValue<'a>> {
        if lhs.kind() != JsonValueKind::Number || rhs.kind() != JsonValueKind::Number {
            return None;
        }
        if let (Some(a), Some(b)) = (lhs.try_get_decimal(), rhs.try_get_decimal()) {
            let divides = matches!(self, BinaryOperator::Divide | BinaryOperator::Modulo);
            if divides && b.is_zero() {
                return None;
            }
            if let Some(result) = self.decimal(a, b) {
                return Some(JsonValue::Decimal(result));
            }
        }
        let (a, b) = (lhs.try_get_f64()?, rhs.try_get_f64()?);
        let result = match self {
            BinaryOperator::Plus => a + b,
            BinaryOperator::Minus => a - b,
            BinaryOperator::Multiply => a * b,
            BinaryOperator::Divide if b != 0.0 => a / b,
            BinaryOperator::Modulo if b != 0.0 => a % b,
            _ => return None,
        };
        result.is_finite().then_some(JsonValue::Float(result))
    }

    fn decimal(self, a: Decimal, b: Decimal) -> Option<Decimal> {
        match self {
            BinaryOperator::Plus => a.checked_add(b),
            BinaryOperator::Minus => a.checked_sub(b),
            BinaryOperator::Multiply => a.checked_mul(b),
            BinaryOperator::Divide => a.checked_div(b),
            BinaryOperator::Modulo => a.checked_rem(b),
            _ => None,
        }
    }
}

/// Ordering comparisons hold between two numbers or two strings; anything
/// else compares as null.
fn ordering<'a>(
    lhs: &JsonValue<'a>,
    rhs: &JsonValue<'a>,
    accept: impl Fn(Ordering) -> bool,
) -> JsonValue<'a> {
    let ord = match (lhs.kind(), rhs.kind()) {
        (JsonValueKind::Number, JsonValueKind::Number) => compare_numbers(lhs, rhs),
        (JsonValueKind::String, JsonValueKind::String) => lhs.as_str().zip(rhs.as_str()).map(|(a, b)| a.cmp(b)),
        _ => None,
    };
    match ord {
        Some(o) => JsonValue::Bool(accept(o)),
        None => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(n: i64) -> JsonValue<'static> {
        JsonValue::Decimal(Decimal::from(n))
    }

    #[test]
    fn logical_operators_return_operands() {
        let doc = json!({"s": "x", "e": ""});
        let s = JsonValue::Node(&doc["s"]);
        let e = JsonValue::Node(&doc["e"]);
        assert_eq!(BinaryOperator::Or.evaluate(&e, &s), Some(s.clone()));
        assert_eq!(BinaryOperator::Or.evaluate(&s, &e), Some(s.clone()));
        assert_eq!(BinaryOperator::And.evaluate(&s, &num(0)), Some(num(0)));
        assert_eq!(BinaryOperator::And.evaluate(&e, &s), Some(e.clone()));
    }

    #[test]
    fn comparisons_of_mixed_kinds_are_null() {
        let doc = json!("10");
        let s = JsonValue::Node(&doc);
        assert_eq!(BinaryOperator::Less.evaluate(&s, &num(20)), Some(JsonValue::Null));
        assert_eq!(BinaryOperator::Equal.evaluate(&s, &num(10)), Some(JsonValue::Bool(false)));
        assert_eq!(
            BinaryOperator::Less.evaluate(&JsonValue::from("abc"), &JsonValue::from("abd")),
            Some(JsonValue::Bool(true))
        );
        assert_eq!(
            BinaryOperator::GreaterOrEqual.evaluate(&num(3), &JsonValue::Float(3.0)),
            Some(JsonValue::Bool(true))
        );
    }

    #[test]
    fn arithmetic_prefers_decimals() {
        let doc = json!([0.1, 0.2]);
        let a = JsonValue::Node(&doc[0]);
        let b = JsonValue::Node(&doc[1]);
        let sum = BinaryOperator::Plus.evaluate(&a, &b).unwrap();
        assert_eq!(sum, JsonValue::Decimal(Decimal::new(3, 1)));
        assert_eq!(BinaryOperator::Modulo.evaluate(&num(7), &num(4)), Some(num(3)));
        assert_eq!(BinaryOperator::Divide.evaluate(&num(1), &num(4)).map(|v| v.to_string()), Some("0.25".into()));
    }

    #[test]
    fn arithmetic_failures() {
        assert_eq!(BinaryOperator::Divide.evaluate(&num(1), &num(0)), None);
        assert_eq!(BinaryOperator::Modulo.evaluate(&num(1), &JsonValue::Float(0.0)), None);
        assert_eq!(BinaryOperator::Plus.evaluate(&num(1), &JsonValue::from("1")), None);
        assert_eq!(
            BinaryOperator::Multiply.evaluate(&JsonValue::Float(1e300), &JsonValue::Float(1e300)),
            None
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(UnaryOperator::Not.evaluate(&JsonValue::Null), Some(JsonValue::Bool(true)));
        assert_eq!(UnaryOperator::Not.evaluate(&num(0)), Some(JsonValue::Bool(false)));
        assert_eq!(UnaryOperator::Minus.evaluate(&num(4)), Some(num(-4)));
        assert_eq!(UnaryOperator::Minus.evaluate(&JsonValue::from("4")), None);
        let re = UnaryOperator::Regex(Regex::new("^ab").unwrap());
        assert_eq!(re.evaluate(&JsonValue::from("abc")), Some(JsonValue::Bool(true)));
        assert_eq!(re.evaluate(&num(1)), Some(JsonValue::Null));
        assert!(re.is_postfix());
        assert!(UnaryOperator::Not.is_right_associative());
    }

    #[test]
    fn precedence_table() {
        assert!(BinaryOperator::Or.precedence() < BinaryOperator::And.precedence());
        assert!(BinaryOperator::And.precedence() < BinaryOperator::Equal.precedence());
        assert!(BinaryOperator::Equal.precedence() < BinaryOperator::Less.precedence());
        assert!(BinaryOperator::Less.precedence() < BinaryOperator::Plus.precedence());
        assert!(BinaryOperator::Plus.precedence() < BinaryOperator::Modulo.precedence());
        assert!(BinaryOperator::Modulo.precedence() < UNARY_PRECEDENCE);
    }
}
