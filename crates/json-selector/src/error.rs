//! Error types for compiling and evaluating selectors.

use thiserror::Error;

/// What went wrong while compiling a query string.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("Expected '$' or '@' at start of path")]
    ExpectedRootOrCurrentNode,
    #[error("Unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("Invalid escape sequence")]
    InvalidEscape,
    #[error("Unclosed string")]
    UnclosedString,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Expected integer")]
    ExpectedInteger,
    #[error("Slice step cannot be zero")]
    ZeroSliceStep,
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("Function '{name}' expects {expected} argument(s), found {found}")]
    InvalidArity {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("Invalid regular expression: {0}")]
    InvalidRegex(String),
    #[error("Invalid JSON literal: {0}")]
    InvalidJsonLiteral(String),
    #[error("Expected expression")]
    ExpectedExpression,
    #[error("Invalid expression")]
    InvalidExpression,
}

/// Errors surfaced by this crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JsonPathError {
    /// The query text could not be compiled.
    #[error("{kind} at line {line} and column {column}")]
    Syntax {
        kind: ParseErrorKind,
        line: usize,
        column: usize,
    },
    /// Recursive descent went deeper than the configured maximum.
    #[error("Maximum depth of {max_depth} exceeded")]
    MaxDepthExceeded { max_depth: usize },
    /// A location string contained something other than names and indices.
    #[error("Not a normalized path: {0}")]
    NotNormalizedPath(String),
}

impl JsonPathError {
    pub(crate) fn syntax(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        JsonPathError::Syntax { kind, line, column }
    }

    /// The parse failure kind, if this is a syntax error.
    pub fn parse_kind(&self) -> Option<&ParseErrorKind> {
        match self {
            JsonPathError::Syntax { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// 1-based line of a syntax error.
    pub fn line(&self) -> Option<usize> {
        match self {
            JsonPathError::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// 1-based column of a syntax error.
    pub fn column(&self) -> Option<usize> {
        match self {
            JsonPathError::Syntax { column, .. } => Some(*column),
            _ => None,
        }
    }
}
