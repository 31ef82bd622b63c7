//! Postfix evaluation of filter expressions.

use crate::error::{JsonPathError, ParseErrorKind};
use crate::eval_ctx::EvalCtx;
use crate::location::LocationNode;
use crate::token::Token;
use crate::value::JsonValue;
use std::sync::Arc;

/// A compiled expression: tokens in postfix order.
#[derive(Debug, Clone)]
pub(crate) struct Expression {
    tokens: Vec<Token>,
}

impl Expression {
    /// Check that `tokens` leave exactly one value on the stack.
    pub(crate) fn new(tokens: Vec<Token>) -> Result<Expression, ParseErrorKind> {
        if tokens.is_empty() {
            return Err(ParseErrorKind::ExpectedExpression);
        }
        let mut depth = 0usize;
        for token in &tokens {
            match token {
                t if t.is_operand() => depth += 1,
                Token::Function(..) => depth += 1,
                Token::Selector(_) | Token::Unary(_) => {
                    if depth < 1 {
                        return Err(ParseErrorKind::InvalidExpression);
                    }
                }
                Token::Binary(_) => {
                    if depth < 2 {
                        return Err(ParseErrorKind::InvalidExpression);
                    }
                    depth -= 1;
                }
                Token::EndArgument => {
                    if depth < 1 {
                        return Err(ParseErrorKind::InvalidExpression);
                    }
                    depth -= 1;
                }
                _ => return Err(ParseErrorKind::InvalidExpression),
            }
        }
        if depth != 1 {
            return Err(ParseErrorKind::InvalidExpression);
        }
        Ok(Expression { tokens })
    }

    /// Evaluate against `current`, the node under test found at `location`.
    ///
    /// `Ok(None)` means the expression has no value: an operator or function
    /// rejected its operands.
    pub(crate) fn evaluate<'a>(
        &self,
        ctx: &EvalCtx<'a>,
        location: &Arc<LocationNode>,
        current: &JsonValue<'a>,
        depth: usize,
    ) -> Result<Option<JsonValue<'a>>, JsonPathError> {
        let mut stack: Vec<JsonValue<'a>> = Vec::with_capacity(self.tokens.len());
        let mut arguments: Vec<JsonValue<'a>> = Vec::new();
        for token in &self.tokens {
            match token {
                Token::Value(value) => stack.push(value.clone()),
                Token::RootNode => stack.push(JsonValue::Node(ctx.root)),
                Token::CurrentNode => stack.push(current.clone()),
                Token::Selector(selector) => {
                    let Some(input) = stack.pop() else {
                        return Ok(None);
                    };
                    let value = selector
                        .evaluate(ctx, location, &input, depth)?
                        .unwrap_or(JsonValue::Null);
                    stack.push(value);
                }
                Token::Unary(op) => {
                    let Some(operand) = stack.pop() else {
                        return Ok(None);
                    };
                    match op.evaluate(&operand) {
                        Some(value) => stack.push(value),
                        None => return Ok(None),
                    }
                }
                Token::Binary(op) => {
                    let (Some(rhs), Some(lhs)) = (stack.pop(), stack.pop()) else {
                        return Ok(None);
                    };
                    match op.evaluate(&lhs, &rhs) {
                        Some(value) => stack.push(value),
                        None => {
                            log::trace!("operator {} rejected {} and {}", op.symbol(), lhs, rhs);
                            return Ok(None);
                        }
                    }
                }
                Token::Expression(expr) => match expr.evaluate(ctx, location, current, depth)? {
                    Some(value) => stack.push(value),
                    None => return Ok(None),
                },
                Token::EndArgument => {
                    let Some(argument) = stack.pop() else {
                        return Ok(None);
                    };
                    arguments.push(argument);
                }
                Token::Function(def, _) => {
                    let result = def.call(&arguments);
                    arguments.clear();
                    match result {
                        Some(value) => stack.push(value),
                        None => return Ok(None),
                    }
                }
                _ => return Ok(None),
            }
        }
        Ok(stack.pop())
    }

    /// Filter test: the expression has a value and that value is truthy.
    pub(crate) fn is_match<'a>(
        &self,
        ctx: &EvalCtx<'a>,
        location: &Arc<LocationNode>,
        current: &JsonValue<'a>,
        depth: usize,
    ) -> Result<bool, JsonPathError> {
        Ok(self
            .evaluate(ctx, location, current, depth)?
            .is_some_and(|value| value.is_true()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::BinaryOperator;
    use crate::options::JsonSelectorOptions;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn num(n: i64) -> Token {
        Token::Value(JsonValue::Decimal(Decimal::from(n)))
    }

    #[test]
    fn rejects_unbalanced_postfix() {
        assert_eq!(
            Expression::new(vec![num(1), num(2)]).unwrap_err(),
            ParseErrorKind::InvalidExpression
        );
        assert_eq!(
            Expression::new(vec![num(1), Token::Binary(BinaryOperator::Plus)]).unwrap_err(),
            ParseErrorKind::InvalidExpression
        );
        assert_eq!(Expression::new(vec![]).unwrap_err(), ParseErrorKind::ExpectedExpression);
    }

    #[test]
    fn evaluates_postfix_arithmetic() {
        let doc = json!(null);
        let ctx = EvalCtx::new(&doc, &JsonSelectorOptions::default(), Default::default());
        // 1 + 2 * 3
        let expr = Expression::new(vec![
            num(1),
            num(2),
            num(3),
            Token::Binary(BinaryOperator::Multiply),
            Token::Binary(BinaryOperator::Plus),
        ])
        .unwrap();
        let value = expr
            .evaluate(&ctx, &LocationNode::root(), &JsonValue::Node(&doc), 0)
            .unwrap();
        assert_eq!(value, Some(JsonValue::Decimal(Decimal::from(7))));
    }

    #[test]
    fn failed_operator_has_no_value() {
        let doc = json!({"a": "x"});
        let ctx = EvalCtx::new(&doc, &JsonSelectorOptions::default(), Default::default());
        let expr = Expression::new(vec![
            num(1),
            num(0),
            Token::Binary(BinaryOperator::Divide),
        ])
        .unwrap();
        let current = JsonValue::Node(&doc);
        assert_eq!(expr.evaluate(&ctx, &LocationNode::root(), &current, 0).unwrap(), None);
        assert!(!expr.is_match(&ctx, &LocationNode::root(), &current, 0).unwrap());
    }
}
