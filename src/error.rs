// ABOUTME: The two error taxonomies — parse errors and evaluation errors

use crate::value::Value;
use thiserror::Error;

/// A line/column position in the source text, 1-indexed to match editor
/// conventions. Unclosed-form errors additionally carry the position where
/// the opening delimiter appeared (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn start() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unknown token {token:?} at {at}")]
    UnknownToken { token: String, at: Position },

    #[error("unexpected end of file at {at}")]
    UnexpectedEof { at: Position },

    #[error("unexpected end of file inside string starting at {at}")]
    UnexpectedEofInString { at: Position },

    #[error("unexpected end of file inside comment starting at {at}")]
    UnexpectedEofInComment { at: Position },

    #[error("non-digit character in number at {at}")]
    NonDigitInNumber { at: Position },

    #[error("digit beyond radix in number at {at}")]
    DigitBeyondRadix { at: Position },

    #[error("non-decimal floating point number at {at}")]
    NonDecimalFloat { at: Position },

    #[error("malformed floating point number at {at}")]
    MalformedFloat { at: Position },

    #[error("'{opener}' opened at {opened_at} was closed with '{closer}' at {at}")]
    MismatchedDelimiter {
        opener: char,
        opened_at: Position,
        closer: char,
        at: Position,
    },

    #[error("unexpected '{delimiter}' at {at}")]
    UnexpectedDelimiter { delimiter: char, at: Position },

    #[error("'{opener}' opened at {opened_at} was not closed")]
    UnexpectedEofInArray { opener: char, opened_at: Position },

    #[error("malformed macro definition at {at}: {reason}")]
    MacroMalformed { reason: String, at: Position },

    #[error("macro '{name}' expected {expected} argument(s), got {actual} at {at}")]
    MacroArgumentMismatch {
        name: String,
        expected: String,
        actual: usize,
        at: Position,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnknownToken { at, .. }
            | ParseError::UnexpectedEof { at }
            | ParseError::UnexpectedEofInString { at }
            | ParseError::UnexpectedEofInComment { at }
            | ParseError::NonDigitInNumber { at }
            | ParseError::DigitBeyondRadix { at }
            | ParseError::NonDecimalFloat { at }
            | ParseError::MalformedFloat { at }
            | ParseError::MismatchedDelimiter { at, .. }
            | ParseError::UnexpectedDelimiter { at, .. }
            | ParseError::MacroMalformed { at, .. }
            | ParseError::MacroArgumentMismatch { at, .. } => *at,
            ParseError::UnexpectedEofInArray { opened_at, .. } => *opened_at,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("{function}: expected {expected} argument(s), got {actual}")]
    WrongArity {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("symbol already exists: {0}")]
    SymbolAlreadyExists(String),

    #[error("{function}: expected {expected}, got {actual}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("{function}: no such property {property:?}")]
    InvalidProperty { function: String, property: String },

    #[error("{function}: index {index} out of bounds (length {length})")]
    IndexOutOfBounds {
        function: String,
        index: i64,
        length: usize,
    },

    #[error("{function}: invalid key {key}")]
    InvalidKey { function: String, key: String },

    #[error("{type_name} is not instantiatable")]
    NotInstantiatable { type_name: String },

    #[error("invalid type name: {0}")]
    InvalidTypeName(String),

    #[error("invalid argument name: {0}")]
    InvalidArgumentName(String),

    #[error("{function}: incompatible values {lhs} and {rhs}")]
    IncompatibleValues {
        function: String,
        lhs: String,
        rhs: String,
    },

    #[error("value of type {0} is not callable")]
    NotCallable(&'static str),

    #[error("division by zero in {0}")]
    DivisionByZero(String),
}

impl EvalError {
    pub fn wrong_arity(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::WrongArity {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn type_mismatch(function: &str, expected: &str, actual: &Value) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }

    pub fn incompatible(function: &str, lhs: &Value, rhs: &Value) -> Self {
        EvalError::IncompatibleValues {
            function: function.to_string(),
            lhs: lhs.type_name().to_string(),
            rhs: rhs.type_name().to_string(),
        }
    }

    pub fn invalid_key(function: &str, key: &Value) -> Self {
        EvalError::InvalidKey {
            function: function.to_string(),
            key: key.repr(),
        }
    }
}
