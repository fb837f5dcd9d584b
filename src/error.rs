//! Error types for the dslkit grammar engine.
//!
//! This module provides a unified error type [`DslError`] that covers
//! every way a `parse` call can fail: lexing, parsing, action callbacks
//! and grammar configuration mistakes found while walking the grammar.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`DslError`].
pub type Result<T> = std::result::Result<T, DslError>;

/// A 1-indexed line/column location in the parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in characters (1-indexed)
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Unified error type for all dslkit operations.
#[derive(Error, Debug)]
pub enum DslError {
    // ============ Per-call Errors ============
    /// No token definition matches at some position
    #[error("Lex error at line {line}, column {column}: {message}")]
    Lex {
        line: usize,
        column: usize,
        message: String,
    },

    /// No production sequence consumes the full input
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// An action callback returned an error
    #[error("Action '{action}' failed at line {line}, column {column}: {message}")]
    Action {
        action: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// Nonterminal nesting exceeded the configured depth
    #[error("Recursion limit of {limit} exceeded at line {line}, column {column}")]
    RecursionLimit {
        limit: usize,
        line: usize,
        column: usize,
    },

    // ============ Grammar Errors ============
    /// A production references an undefined symbol or action
    #[error("Grammar configuration error: {message}")]
    Configuration { message: String },

    /// A pattern token's regular expression failed to compile
    #[error("Invalid pattern for token '{token}': {source}")]
    InvalidPattern {
        token: String,
        #[source]
        source: Box<regex_automata::dfa::dense::BuildError>,
    },

    // ============ I/O Errors ============
    /// Error reading a file handed to the CLI
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Context data was not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl DslError {
    /// Create a lexer error
    pub fn lex(position: Position, message: impl Into<String>) -> Self {
        Self::Lex {
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(position: Position, message: impl Into<String>) -> Self {
        Self::Parse {
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }

    /// Create an action error
    pub fn action(action: impl Into<String>, position: Position, message: impl Into<String>) -> Self {
        Self::Action {
            action: action.into(),
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }

    /// Create a grammar configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The location this error points at, if it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Lex { line, column, .. }
            | Self::Parse { line, column, .. }
            | Self::Action { line, column, .. }
            | Self::RecursionLimit { line, column, .. } => Some(Position::new(*line, *column)),
            _ => None,
        }
    }

    /// The bare message without the location prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Lex { message, .. } | Self::Parse { message, .. } => message.clone(),
            Self::Action {
                action, message, ..
            } => format!("action '{}' failed: {}", action, message),
            Self::RecursionLimit { limit, .. } => {
                format!("recursion limit of {} exceeded", limit)
            }
            other => other.to_string(),
        }
    }
}

/// Error returned by an action callback.
///
/// The engine wraps it into [`DslError::Action`] together with the
/// action name and the position where the production started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    /// Create an action error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
