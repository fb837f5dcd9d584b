//! Core types for grammar representation.

use std::fmt;

use crate::context::Context;
use crate::error::ActionError;
use crate::lexer::TokenDef;
use crate::value::Value;

/// Callback computing the value of a recognized production.
///
/// `args` holds one value per right-hand-side symbol, in order: lexeme
/// text for terminals, the sub-result for nonterminals.
pub type ActionFn =
    dyn Fn(&[Value], &Context) -> std::result::Result<Value, ActionError> + Send + Sync;

/// One alternative expansion of a nonterminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    /// The nonterminal this production belongs to
    pub nonterminal: String,
    /// Right-hand-side symbol names (token or nonterminal names)
    pub symbols: Vec<String>,
    /// Name of the action invoked when the production matches
    pub action: String,
}

impl Production {
    /// Create a production.
    pub fn new(nonterminal: impl Into<String>, symbols: &[&str], action: impl Into<String>) -> Self {
        Self {
            nonterminal: nonterminal.into(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            action: action.into(),
        }
    }

    /// Check if the production has no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.nonterminal)?;
        if self.symbols.is_empty() {
            write!(f, " ε")?;
        }
        for symbol in &self.symbols {
            write!(f, " {}", symbol)?;
        }
        write!(f, " {{{}}}", self.action)
    }
}

/// A right-hand-side symbol resolved against the grammar.
#[derive(Debug, Clone, Copy)]
pub enum Symbol<'g> {
    /// A token definition
    Terminal(&'g TokenDef),
    /// A nonterminal with at least one production
    Nonterminal(&'g str, &'g [Production]),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_display() {
        let production = Production::new("cmd", &["FFT", "WITH", "WINDOW", "WORD"], "windowed");
        assert_eq!(production.to_string(), "cmd -> FFT WITH WINDOW WORD {windowed}");

        let empty = Production::new("tail", &[], "done");
        assert!(empty.is_empty());
        assert_eq!(empty.to_string(), "tail -> ε {done}");
    }
}
