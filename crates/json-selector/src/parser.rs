//! Query lexer.
//!
//! The lexer walks the query text once, driven by an explicit stack of
//! states, and feeds tokens to a [`ShuntingYard`]. Nested constructs
//! (brackets, filters, parentheses, function arguments) push a state and
//! pop it when they close, so nesting depth never consumes call stack.
//!
//! Positions are 1-based; a newline starts a new line at column 1.

use crate::error::{JsonPathError, ParseErrorKind};
use crate::functions;
use crate::operators::{BinaryOperator, UnaryOperator};
use crate::selector::{Selector, SelectorKind, Slice};
use crate::shunting_yard::ShuntingYard;
use crate::token::Token;
use crate::value::JsonValue;
use regex::RegexBuilder;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Where a path being lexed is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathContext {
    /// The query itself.
    Top,
    /// A path element of a bracketed union, such as `$[@.a]`.
    Union,
    /// An operand of a filter expression.
    Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    /// After an anchor or a completed step.
    PathSteps(PathContext),
    /// After `.` (or `..` when `recursive`).
    DotName { recursive: bool },
    UnquotedName,
    BracketElement,
    CommaOrRightBracket,
    /// Only whitespace may follow the query.
    TrailingWhitespace,
    ExpectOperand,
    ExpectOperator,
    ExpectRegex,
    RightParen,
    FunctionArguments,
    /// The filter expression is complete; `]` or `,` closes the filter.
    FilterEnd,
}

/// Result of compiling a query.
pub(crate) struct CompiledPath {
    pub selector: Selector,
    /// The query uses parent steps and so needs locations during traversal.
    pub paths_required: bool,
}

pub(crate) struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    states: Vec<State>,
    yard: ShuntingYard,
    name: String,
    next_root_id: usize,
    paths_required: bool,
}

impl Parser {
    pub(crate) fn parse(input: &str) -> Result<CompiledPath, JsonPathError> {
        let parser = Parser {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            states: vec![State::Start],
            yard: ShuntingYard::new(),
            name: String::new(),
            next_root_id: 0,
            paths_required: false,
        };
        parser.run()
    }

    fn run(mut self) -> Result<CompiledPath, JsonPathError> {
        while self.peek().is_some() {
            match self.states.last().copied() {
                Some(state) => self.step(state)?,
                None => return Err(self.unexpected()),
            }
        }
        while let Some(state) = self.states.pop() {
            match state {
                State::UnquotedName => self.emit_name()?,
                State::PathSteps(_) | State::TrailingWhitespace => {}
                _ => return Err(self.error(ParseErrorKind::UnexpectedEndOfInput)),
            }
        }
        let (line, column) = (self.line, self.column);
        let selector = self
            .yard
            .finish()
            .map_err(|kind| JsonPathError::syntax(kind, line, column))?;
        Ok(CompiledPath {
            selector,
            paths_required: self.paths_required,
        })
    }

    fn step(&mut self, state: State) -> Result<(), JsonPathError> {
        match state {
            State::Start => self.start(),
            State::PathSteps(context) => self.path_steps(context),
            State::DotName { recursive } => self.dot_name(recursive),
            State::UnquotedName => self.unquoted_name(),
            State::BracketElement => self.bracket_element(),
            State::CommaOrRightBracket => self.comma_or_right_bracket(),
            State::TrailingWhitespace => {
                if self.skip_whitespace() {
                    Ok(())
                } else {
                    Err(self.unexpected())
                }
            }
            State::ExpectOperand => self.operand(),
            State::ExpectOperator => self.operator(),
            State::ExpectRegex => self.regex(),
            State::RightParen => {
                if self.skip_whitespace() {
                    return Ok(());
                }
                if self.peek() != Some(')') {
                    return Err(self.error(ParseErrorKind::UnbalancedParentheses));
                }
                self.advance();
                self.emit(Token::RightParen)?;
                self.replace(State::ExpectOperator);
                Ok(())
            }
            State::FunctionArguments => self.function_arguments(),
            State::FilterEnd => {
                if self.skip_whitespace() {
                    return Ok(());
                }
                match self.peek() {
                    Some(']') | Some(',') => {
                        self.emit(Token::EndFilter)?;
                        self.states.pop();
                        Ok(())
                    }
                    Some(')') => Err(self.error(ParseErrorKind::UnbalancedParentheses)),
                    _ => Err(self.unexpected()),
                }
            }
        }
    }

    fn start(&mut self) -> Result<(), JsonPathError> {
        if self.skip_whitespace() {
            return Ok(());
        }
        match self.peek() {
            Some('$') => {
                self.advance();
                let root = self.root_selector();
                self.emit(root)?;
            }
            Some('@') => {
                self.advance();
                self.emit(selector(SelectorKind::CurrentNode))?;
            }
            _ => return Err(self.error(ParseErrorKind::ExpectedRootOrCurrentNode)),
        }
        self.replace(State::PathSteps(PathContext::Top));
        Ok(())
    }

    fn path_steps(&mut self, context: PathContext) -> Result<(), JsonPathError> {
        match self.peek() {
            Some('.') => {
                self.advance();
                self.states.push(State::DotName { recursive: false });
            }
            Some('[') => {
                self.advance();
                self.emit(Token::BeginUnion)?;
                self.states.push(State::CommaOrRightBracket);
                self.states.push(State::BracketElement);
            }
            Some('^') => {
                let mut depth = 0;
                while self.peek() == Some('^') {
                    self.advance();
                    depth += 1;
                }
                self.paths_required = true;
                self.emit(selector(SelectorKind::Parent { depth }))?;
            }
            Some(c) if context == PathContext::Top => {
                if c.is_whitespace() {
                    self.replace(State::TrailingWhitespace);
                } else {
                    return Err(self.unexpected());
                }
            }
            _ => {
                self.states.pop();
            }
        }
        Ok(())
    }

    fn dot_name(&mut self, recursive: bool) -> Result<(), JsonPathError> {
        match self.peek() {
            Some('.') if !recursive => {
                self.advance();
                self.emit(selector(SelectorKind::RecursiveDescent))?;
                self.replace(State::DotName { recursive: true });
            }
            // `..[...]`: the bracket is handled as the next path step
            Some('[') if recursive => {
                self.states.pop();
            }
            Some('*') => {
                self.advance();
                self.emit(selector(SelectorKind::Wildcard))?;
                self.states.pop();
            }
            Some('\'') | Some('"') => {
                let name = self.quoted_string()?;
                self.emit(selector(SelectorKind::Identifier(name)))?;
                self.states.pop();
            }
            Some(c) if is_name_char(c) => {
                self.name.clear();
                self.replace(State::UnquotedName);
            }
            _ => return Err(self.unexpected()),
        }
        Ok(())
    }

    fn unquoted_name(&mut self) -> Result<(), JsonPathError> {
        while let Some(c) = self.peek().filter(|c| is_name_char(*c)) {
            self.name.push(c);
            self.advance();
        }
        if self.peek().is_some() {
            self.emit_name()?;
            self.states.pop();
        }
        Ok(())
    }

    fn emit_name(&mut self) -> Result<(), JsonPathError> {
        let name = std::mem::take(&mut self.name);
        self.emit(selector(SelectorKind::Identifier(name)))
    }

    fn bracket_element(&mut self) -> Result<(), JsonPathError> {
        if self.skip_whitespace() {
            return Ok(());
        }
        match self.peek() {
            Some('*') => {
                self.advance();
                self.emit(selector(SelectorKind::Wildcard))?;
                self.states.pop();
            }
            Some('\'') | Some('"') => {
                let name = self.quoted_string()?;
                self.emit(selector(SelectorKind::Identifier(name)))?;
                self.states.pop();
            }
            Some(c) if c == '-' || c == ':' || c.is_ascii_digit() => {
                let kind = self.index_or_slice()?;
                self.emit(selector(kind))?;
                self.states.pop();
            }
            Some('?') => {
                self.advance();
                self.emit(Token::BeginFilter)?;
                self.replace(State::FilterEnd);
                self.states.push(State::ExpectOperand);
            }
            Some('@') => {
                self.advance();
                self.emit(selector(SelectorKind::CurrentNode))?;
                self.replace(State::PathSteps(PathContext::Union));
            }
            Some('$') => {
                self.advance();
                let root = self.root_selector();
                self.emit(root)?;
                self.replace(State::PathSteps(PathContext::Union));
            }
            _ => return Err(self.unexpected()),
        }
        Ok(())
    }

    fn comma_or_right_bracket(&mut self) -> Result<(), JsonPathError> {
        if self.skip_whitespace() {
            return Ok(());
        }
        match self.peek() {
            Some(',') => {
                self.advance();
                self.emit(Token::Separator)?;
                self.states.push(State::BracketElement);
            }
            Some(']') => {
                self.advance();
                self.emit(Token::EndUnion)?;
                self.states.pop();
            }
            _ => return Err(self.unexpected()),
        }
        Ok(())
    }

    fn index_or_slice(&mut self) -> Result<SelectorKind, JsonPathError> {
        let start = self.optional_integer()?;
        self.skip_whitespace();
        if self.peek() != Some(':') {
            return match start {
                Some(index) => Ok(SelectorKind::Index(index)),
                None => Err(self.error(ParseErrorKind::ExpectedInteger)),
            };
        }
        self.advance();
        let stop = self.optional_integer()?;
        self.skip_whitespace();
        let mut step = None;
        if self.peek() == Some(':') {
            self.advance();
            step = self.optional_integer()?;
        }
        if step == Some(0) {
            return Err(self.error(ParseErrorKind::ZeroSliceStep));
        }
        Ok(SelectorKind::Slice(Slice {
            start,
            stop,
            step: step.unwrap_or(1),
        }))
    }

    fn optional_integer(&mut self) -> Result<Option<i64>, JsonPathError> {
        self.skip_whitespace();
        let mut digits = String::new();
        if self.peek() == Some('-') {
            digits.push('-');
            self.advance();
        }
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            digits.push(c);
            self.advance();
        }
        match digits.as_str() {
            "" => Ok(None),
            "-" => Err(self.error(ParseErrorKind::ExpectedInteger)),
            text => text
                .parse::<i64>()
                .map(Some)
                .map_err(|_| self.error(ParseErrorKind::InvalidNumber)),
        }
    }

    fn operand(&mut self) -> Result<(), JsonPathError> {
        if self.skip_whitespace() {
            return Ok(());
        }
        let Some(c) = self.peek() else {
            return Err(self.error(ParseErrorKind::UnexpectedEndOfInput));
        };
        match c {
            '(' => {
                self.advance();
                self.emit(Token::LeftParen)?;
                self.replace(State::RightParen);
                self.states.push(State::ExpectOperand);
            }
            '!' => {
                self.advance();
                self.emit(Token::Unary(UnaryOperator::Not))?;
            }
            '-' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                let value = self.number()?;
                self.emit(Token::Value(value))?;
                self.replace(State::ExpectOperator);
            }
            '-' => {
                self.advance();
                self.emit(Token::Unary(UnaryOperator::Minus))?;
            }
            '@' => {
                self.advance();
                self.emit(Token::CurrentNode)?;
                self.emit(selector(SelectorKind::CurrentNode))?;
                self.replace(State::ExpectOperator);
                self.states.push(State::PathSteps(PathContext::Expression));
            }
            '$' => {
                self.advance();
                self.emit(Token::RootNode)?;
                let root = self.root_selector();
                self.emit(root)?;
                self.replace(State::ExpectOperator);
                self.states.push(State::PathSteps(PathContext::Expression));
            }
            '\'' | '"' => {
                let text = self.quoted_string()?;
                self.emit(Token::Value(JsonValue::from(text)))?;
                self.replace(State::ExpectOperator);
            }
            '{' | '[' => {
                let value = self.json_literal()?;
                self.emit(Token::Value(value))?;
                self.replace(State::ExpectOperator);
            }
            c if c.is_ascii_digit() => {
                let value = self.number()?;
                self.emit(Token::Value(value))?;
                self.replace(State::ExpectOperator);
            }
            c if c.is_ascii_alphabetic() || c == '_' => self.word()?,
            _ => return Err(self.error(ParseErrorKind::ExpectedExpression)),
        }
        Ok(())
    }

    /// `true`, `false`, `null`, or a function call.
    fn word(&mut self) -> Result<(), JsonPathError> {
        let (line, column) = (self.line, self.column);
        let mut word = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            word.push(c);
            self.advance();
        }
        self.skip_whitespace();
        if self.peek() == Some('(') {
            let Some(def) = functions::lookup(&word) else {
                return Err(JsonPathError::syntax(ParseErrorKind::UnknownFunction(word), line, column));
            };
            self.advance();
            self.emit(Token::Function(def, 0))?;
            self.skip_whitespace();
            if self.peek() == Some(')') {
                self.advance();
                self.emit(Token::EndFunction)?;
                self.replace(State::ExpectOperator);
            } else {
                self.emit(Token::BeginArgument)?;
                self.replace(State::FunctionArguments);
                self.states.push(State::ExpectOperand);
            }
            return Ok(());
        }
        let value = match word.as_str() {
            "true" => JsonValue::Bool(true),
            "false" => JsonValue::Bool(false),
            "null" => JsonValue::Null,
            _ => return Err(JsonPathError::syntax(ParseErrorKind::ExpectedExpression, line, column)),
        };
        self.emit(Token::Value(value))?;
        self.replace(State::ExpectOperator);
        Ok(())
    }

    fn operator(&mut self) -> Result<(), JsonPathError> {
        if self.skip_whitespace() {
            return Ok(());
        }
        let next = self.peek_at(1);
        let (op, len) = match (self.peek(), next) {
            (Some('='), Some('~')) => {
                self.advance_by(2);
                self.replace(State::ExpectRegex);
                return Ok(());
            }
            (Some('='), Some('=')) => (BinaryOperator::Equal, 2),
            (Some('!'), Some('=')) => (BinaryOperator::NotEqual, 2),
            (Some('<'), Some('=')) => (BinaryOperator::LessOrEqual, 2),
            (Some('>'), Some('=')) => (BinaryOperator::GreaterOrEqual, 2),
            (Some('&'), Some('&')) => (BinaryOperator::And, 2),
            (Some('|'), Some('|')) => (BinaryOperator::Or, 2),
            (Some('<'), _) => (BinaryOperator::Less, 1),
            (Some('>'), _) => (BinaryOperator::Greater, 1),
            (Some('+'), _) => (BinaryOperator::Plus, 1),
            (Some('-'), _) => (BinaryOperator::Minus, 1),
            (Some('*'), _) => (BinaryOperator::Multiply, 1),
            (Some('/'), _) => (BinaryOperator::Divide, 1),
            (Some('%'), _) => (BinaryOperator::Modulo, 1),
            (Some('=' | '!' | '&' | '|'), _) => return Err(self.unexpected_at(1)),
            _ => {
                self.states.pop();
                return Ok(());
            }
        };
        self.advance_by(len);
        self.emit(Token::Binary(op))?;
        self.replace(State::ExpectOperand);
        Ok(())
    }

    /// `/pattern/flags`. `\/` stands for a literal slash; `i` is the only flag.
    fn regex(&mut self) -> Result<(), JsonPathError> {
        if self.skip_whitespace() {
            return Ok(());
        }
        if self.peek() != Some('/') {
            return Err(self.unexpected());
        }
        self.advance();
        let mut pattern = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error(ParseErrorKind::UnexpectedEndOfInput)),
                Some('/') => {
                    self.advance();
                    break;
                }
                Some('\\') if self.peek_at(1) == Some('/') => {
                    pattern.push('/');
                    self.advance_by(2);
                }
                Some('\\') => {
                    pattern.push('\\');
                    self.advance();
                    if let Some(c) = self.peek() {
                        pattern.push(c);
                        self.advance();
                    }
                }
                Some(c) => {
                    pattern.push(c);
                    self.advance();
                }
            }
        }
        let mut case_insensitive = false;
        while let Some(c) = self.peek().filter(char::is_ascii_alphabetic) {
            if c != 'i' {
                return Err(self.error(ParseErrorKind::InvalidRegex(format!("unknown flag '{}'", c))));
            }
            case_insensitive = true;
            self.advance();
        }
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|err| self.error(ParseErrorKind::InvalidRegex(err.to_string())))?;
        self.emit(Token::Unary(UnaryOperator::Regex(regex)))?;
        self.replace(State::ExpectOperator);
        Ok(())
    }

    fn function_arguments(&mut self) -> Result<(), JsonPathError> {
        if self.skip_whitespace() {
            return Ok(());
        }
        match self.peek() {
            Some(',') => {
                self.advance();
                self.emit(Token::EndArgument)?;
                self.emit(Token::BeginArgument)?;
                self.states.push(State::ExpectOperand);
            }
            Some(')') => {
                self.emit(Token::EndArgument)?;
                self.emit(Token::EndFunction)?;
                self.advance();
                self.replace(State::ExpectOperator);
            }
            _ => return Err(self.unexpected()),
        }
        Ok(())
    }

    fn quoted_string(&mut self) -> Result<String, JsonPathError> {
        let Some(quote) = self.peek() else {
            return Err(self.error(ParseErrorKind::UnexpectedEndOfInput));
        };
        self.advance();
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error(ParseErrorKind::UnclosedString)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(out);
                }
                Some('\\') => {
                    self.advance();
                    let c = self.escape()?;
                    out.push(c);
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
    }

    /// The character after a backslash, consumed.
    fn escape(&mut self) -> Result<char, JsonPathError> {
        let Some(c) = self.peek() else {
            return Err(self.error(ParseErrorKind::UnclosedString));
        };
        let decoded = match c {
            '"' | '\'' | '\\' | '/' => c,
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                self.advance();
                let high = self.hex4()?;
                if !(0xD800..0xDC00).contains(&high) {
                    return char::from_u32(high).ok_or_else(|| self.error(ParseErrorKind::InvalidEscape));
                }
                if self.peek() != Some('\\') || self.peek_at(1) != Some('u') {
                    return Err(self.error(ParseErrorKind::InvalidEscape));
                }
                self.advance_by(2);
                let low = self.hex4()?;
                if !(0xDC00..0xE000).contains(&low) {
                    return Err(self.error(ParseErrorKind::InvalidEscape));
                }
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(code).ok_or_else(|| self.error(ParseErrorKind::InvalidEscape));
            }
            _ => return Err(self.error(ParseErrorKind::InvalidEscape)),
        };
        self.advance();
        Ok(decoded)
    }

    fn hex4(&mut self) -> Result<u32, JsonPathError> {
        let mut code = 0;
        for _ in 0..4 {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error(ParseErrorKind::InvalidEscape))?;
            code = code * 16 + digit;
            self.advance();
        }
        Ok(code)
    }

    /// `-?digits(.digits)?([eE][+-]?digits)?`. Exact decimals when they fit,
    /// floats otherwise.
    fn number(&mut self) -> Result<JsonValue<'static>, JsonPathError> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.advance();
        }
        self.digits(&mut text);
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.advance();
            self.digits(&mut text);
        }
        let mut exponent = false;
        if matches!(self.peek(), Some('e' | 'E')) {
            exponent = true;
            text.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.advance();
            }
            if !self.digits(&mut text) {
                return Err(self.error(ParseErrorKind::InvalidNumber));
            }
        }
        if !exponent {
            if let Ok(d) = Decimal::from_str(&text) {
                return Ok(JsonValue::Decimal(d));
            }
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(JsonValue::Float(f)),
            _ => Err(JsonPathError::syntax(ParseErrorKind::InvalidNumber, line, column)),
        }
    }

    fn digits(&mut self, out: &mut String) -> bool {
        let before = out.len();
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            out.push(c);
            self.advance();
        }
        out.len() > before
    }

    /// An embedded JSON array or object, delimited by bracket counting.
    fn json_literal(&mut self) -> Result<JsonValue<'static>, JsonPathError> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error(ParseErrorKind::UnexpectedEndOfInput));
            };
            text.push(c);
            self.advance();
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' | '[' => depth += 1,
                '}' | ']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        serde_json::from_str(&text)
            .map(JsonValue::from_literal)
            .map_err(|err| JsonPathError::syntax(ParseErrorKind::InvalidJsonLiteral(err.to_string()), line, column))
    }

    fn root_selector(&mut self) -> Token {
        let id = self.next_root_id;
        self.next_root_id += 1;
        selector(SelectorKind::Root { id })
    }

    fn emit(&mut self, token: Token) -> Result<(), JsonPathError> {
        let (line, column) = (self.line, self.column);
        self.yard
            .push(token)
            .map_err(|kind| JsonPathError::syntax(kind, line, column))
    }

    fn replace(&mut self, state: State) {
        self.states.pop();
        self.states.push(state);
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Consume whitespace. Returns whether any was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
            skipped = true;
        }
        skipped
    }

    fn error(&self, kind: ParseErrorKind) -> JsonPathError {
        JsonPathError::syntax(kind, self.line, self.column)
    }

    fn unexpected(&self) -> JsonPathError {
        match self.peek() {
            Some(c) => self.error(ParseErrorKind::UnexpectedCharacter(c)),
            None => self.error(ParseErrorKind::UnexpectedEndOfInput),
        }
    }

    fn unexpected_at(&self, offset: usize) -> JsonPathError {
        let column = self.column + offset;
        match self.peek_at(offset) {
            Some(c) => JsonPathError::syntax(ParseErrorKind::UnexpectedCharacter(c), self.line, column),
            None => JsonPathError::syntax(ParseErrorKind::UnexpectedEndOfInput, self.line, column),
        }
    }
}

fn selector(kind: SelectorKind) -> Token {
    Token::Selector(Box::new(Selector::new(kind)))
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || (!c.is_ascii() && !c.is_whitespace())
}
