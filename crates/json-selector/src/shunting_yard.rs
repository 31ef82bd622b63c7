//! Rearranges lexer tokens into selector chains and postfix expressions.
//!
//! Operands and selectors go to the output stack, operators wait on the
//! operator stack until something of lower precedence arrives. Group markers
//! (`BeginUnion`, `BeginFilter`, `BeginArgument`) stay on the output stack
//! until their closing token collapses everything above them into a single
//! selector or expression.

use crate::error::ParseErrorKind;
use crate::expression::Expression;
use crate::selector::{Selector, SelectorKind};
use crate::token::Token;

#[derive(Debug, Default)]
pub(crate) struct ShuntingYard {
    output: Vec<Token>,
    operators: Vec<Token>,
}

impl ShuntingYard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, token: Token) -> Result<(), ParseErrorKind> {
        match token {
            Token::Selector(selector) => self.push_selector(*selector),
            Token::Value(_) | Token::RootNode | Token::CurrentNode | Token::Expression(_) => {
                self.output.push(token)
            }
            Token::Unary(op) if op.is_postfix() => {
                self.pop_operators(op.precedence(), false);
                self.output.push(Token::Unary(op));
            }
            Token::Unary(_) | Token::Binary(_) => self.push_operator(token),
            Token::LeftParen | Token::Function(..) => self.operators.push(token),
            Token::RightParen => self.unwind_to_left_paren()?,
            Token::BeginUnion | Token::Separator => self.output.push(token),
            Token::EndUnion => {
                let mut members = Vec::new();
                for token in self.collect_group(|t| matches!(t, Token::BeginUnion))? {
                    match token {
                        Token::Selector(selector) => members.push(*selector),
                        Token::Separator => {}
                        _ => return Err(ParseErrorKind::InvalidExpression),
                    }
                }
                let selector = match members.len() {
                    0 => return Err(ParseErrorKind::ExpectedExpression),
                    1 => members.remove(0),
                    _ => Selector::new(SelectorKind::Union(members)),
                };
                self.push_selector(selector);
            }
            Token::BeginFilter => {
                self.output.push(token);
                self.operators.push(Token::LeftParen);
            }
            Token::EndFilter => {
                self.unwind_to_left_paren()?;
                let tokens = self.collect_group(|t| matches!(t, Token::BeginFilter))?;
                let expr = Expression::new(tokens)?;
                self.push_selector(Selector::new(SelectorKind::Filter(expr)));
            }
            Token::BeginArgument => {
                self.output.push(token);
                self.operators.push(Token::LeftParen);
            }
            Token::EndArgument => {
                self.unwind_to_left_paren()?;
                let tokens = self.collect_group(|t| matches!(t, Token::BeginArgument))?;
                let expr = Expression::new(tokens)?;
                match self.operators.last_mut() {
                    Some(Token::Function(_, count)) => *count += 1,
                    _ => return Err(ParseErrorKind::UnbalancedParentheses),
                }
                self.output.push(Token::Expression(expr));
                self.output.push(Token::EndArgument);
            }
            Token::EndFunction => match self.operators.pop() {
                Some(Token::Function(def, count)) => {
                    if count != def.arity {
                        return Err(ParseErrorKind::InvalidArity {
                            name: def.name,
                            expected: def.arity,
                            found: count,
                        });
                    }
                    self.output.push(Token::Function(def, count));
                }
                _ => return Err(ParseErrorKind::UnbalancedParentheses),
            },
        }
        Ok(())
    }

    /// The compiled query: exactly one selector chain and nothing pending.
    pub(crate) fn finish(mut self) -> Result<Selector, ParseErrorKind> {
        if !self.operators.is_empty() {
            return Err(ParseErrorKind::UnbalancedParentheses);
        }
        match (self.output.pop(), self.output.is_empty()) {
            (Some(Token::Selector(selector)), true) => Ok(*selector),
            _ => Err(ParseErrorKind::InvalidExpression),
        }
    }

    /// Selectors extend the chain on top of the output stack.
    fn push_selector(&mut self, selector: Selector) {
        if let Some(Token::Selector(top)) = self.output.last_mut() {
            top.append(selector);
        } else {
            self.output.push(Token::Selector(Box::new(selector)));
        }
    }

    fn push_operator(&mut self, token: Token) {
        let Some(precedence) = token.precedence() else {
            return;
        };
        self.pop_operators(precedence, token.is_right_associative());
        self.operators.push(token);
    }

    /// Move operators that bind at least as tightly as `precedence` to the
    /// output. With `right_associative`, equal precedence stays.
    fn pop_operators(&mut self, precedence: u8, right_associative: bool) {
        while let Some(top) = self.operators.last().and_then(Token::precedence) {
            if top > precedence || (top == precedence && !right_associative) {
                if let Some(op) = self.operators.pop() {
                    self.output.push(op);
                }
            } else {
                break;
            }
        }
    }

    fn unwind_to_left_paren(&mut self) -> Result<(), ParseErrorKind> {
        loop {
            match self.operators.pop() {
                Some(Token::LeftParen) => return Ok(()),
                Some(op @ (Token::Unary(_) | Token::Binary(_))) => self.output.push(op),
                _ => return Err(ParseErrorKind::UnbalancedParentheses),
            }
        }
    }

    /// Pop the output down to the nearest marker matching `is_marker` and
    /// return what was above it, in original order.
    fn collect_group(&mut self, is_marker: impl Fn(&Token) -> bool) -> Result<Vec<Token>, ParseErrorKind> {
        let mut group = Vec::new();
        loop {
            match self.output.pop() {
                Some(token) if is_marker(&token) => break,
                Some(token) => group.push(token),
                None => return Err(ParseErrorKind::UnbalancedParentheses),
            }
        }
        group.reverse();
        Ok(group)
    }
}
