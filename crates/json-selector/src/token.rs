//! Tokens produced by the lexer and rearranged by the shunting-yard compiler.

use crate::expression::Expression;
use crate::functions::FunctionDefinition;
use crate::operators::{BinaryOperator, UnaryOperator};
use crate::selector::Selector;
use crate::value::JsonValue;

#[derive(Debug, Clone)]
pub(crate) enum Token {
    /// A literal operand.
    Value(JsonValue<'static>),
    /// `$` inside an expression: pushes the document root.
    RootNode,
    /// `@` inside an expression: pushes the node under test.
    CurrentNode,
    Unary(UnaryOperator),
    Binary(BinaryOperator),
    Selector(Box<Selector>),
    /// A function call and the number of arguments compiled so far.
    Function(&'static FunctionDefinition, usize),
    /// A compiled sub-expression (a function argument).
    Expression(Expression),
    LeftParen,
    RightParen,
    BeginUnion,
    EndUnion,
    BeginFilter,
    EndFilter,
    BeginArgument,
    EndArgument,
    EndFunction,
    Separator,
}

impl Token {
    /// Operator precedence. `None` for tokens that are not operators.
    pub(crate) fn precedence(&self) -> Option<u8> {
        match self {
            Token::Unary(op) => Some(op.precedence()),
            Token::Binary(op) => Some(op.precedence()),
            _ => None,
        }
    }

    pub(crate) fn is_right_associative(&self) -> bool {
        match self {
            Token::Unary(op) => op.is_right_associative(),
            Token::Binary(op) => op.is_right_associative(),
            _ => false,
        }
    }

    /// Tokens that push exactly one value when evaluated.
    pub(crate) fn is_operand(&self) -> bool {
        matches!(
            self,
            Token::Value(_) | Token::RootNode | Token::CurrentNode | Token::Expression(_)
        )
    }
}
