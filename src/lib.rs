//! # Dslkit Core
//!
//! A toolkit for building small domain-specific languages at runtime.
//!
//! This library provides:
//! - A tokenizer driven by runtime keyword and regex token definitions
//! - A grammar model of nonterminals with ordered alternative productions
//! - An ordered-choice backtracking parser that evaluates actions bottom-up
//! - Context bindings that let actions read host data (tables, settings)
//! - Position-tagged errors and token dumps for grammar authors
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`lexer`] - Token definitions and the tokenizer
//! - [`grammar`] - Registration API, lookups and validation
//! - [`engine`] - The parser and its configuration
//! - [`context`] - Per-call bindings and host-owned sessions
//! - [`diagnostics`] - Error rendering and lexeme dumps
//! - [`demos`] - Reference DSLs built on the engine
//!
//! ## Usage
//!
//! ```
//! use dslkit_core::{Grammar, Value};
//!
//! let mut grammar = Grammar::new("greeting");
//! grammar
//!     .keyword_token("FROM", "from")
//!     .token("WORD", "[a-zA-Z]+")?
//!     .rule("greeting", &["FROM", "WORD"], "hello")
//!     .action("hello", |args, _| Ok(Value::from(format!("Hello, {}", args[1]))));
//!
//! let result = grammar.parse("from Ana")?;
//! assert_eq!(result.output(), &Value::from("Hello, Ana"));
//! # Ok::<(), dslkit_core::DslError>(())
//! ```
//!
//! ## Concurrency
//!
//! A [`Grammar`] is mutated only through `&mut self` registration calls
//! and is `Send + Sync`, so once built it can be shared behind an `Arc`
//! and parsed from many threads. Context is never stored in the grammar:
//! each call receives it explicitly, and a [`Session`] owned by one caller
//! carries bindings across calls.

pub mod context;
pub mod demos;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod value;

// Re-export main types for convenience
pub use context::{Context, Session};
pub use diagnostics::Diagnostic;
pub use engine::{EngineConfig, ParseResult};
pub use error::{ActionError, DslError, Position, Result};
pub use grammar::{Grammar, Production};
pub use lexer::{Lexeme, TokenDef, TokenKind};
pub use value::Value;
