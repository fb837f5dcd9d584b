//! Ordered-choice backtracking parser.
//!
//! ## Algorithm
//!
//! To match nonterminal `N` at lexeme position `p`, each production of
//! `N` is tried in registration order:
//!
//! 1. Match the right-hand-side symbols in sequence from `p`. A terminal
//!    matches if the lexeme under the cursor has that token name; a
//!    nonterminal recurses.
//! 2. If every symbol matched, invoke the production's action with the
//!    collected values. Its return value is the value of `N`, and `N` is
//!    committed to that production.
//! 3. If a symbol failed, rewind to `p` and try the next production.
//!
//! The start symbol must consume the whole lexeme sequence. On failure the
//! error points at the furthest position any terminal was expected, which
//! is usually where the input went wrong.
//!
//! Action errors abort the parse immediately; they are never backtracked.
//! Worst-case cost is exponential in the nesting of ambiguous alternatives,
//! which the small command languages this engine targets never approach.

mod parser;

pub use parser::Parser;

use crate::value::Value;

/// Default bound on nonterminal nesting during one parse.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Configuration for the parsing engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum nesting of nonterminal matches before the parse is aborted.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    ///
    /// Deep nesting grows the stack on the heap as needed, so the limit
    /// bounds memory and time rather than protecting the thread's stack.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Successful parse output.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    output: Value,
}

impl ParseResult {
    /// Wrap the start symbol's value.
    pub fn new(output: Value) -> Self {
        Self { output }
    }

    /// The value returned by the start symbol's action.
    pub fn output(&self) -> &Value {
        &self.output
    }

    /// Take the output value.
    pub fn into_output(self) -> Value {
        self.output
    }
}
