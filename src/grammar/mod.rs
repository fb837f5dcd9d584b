//! Grammar model and host-facing entry points.
//!
//! A [`Grammar`] is built once through registration calls, then used
//! read-only for any number of parses:
//!
//! ```text
//! token(name, regex)            pattern token
//! keyword_token(name, literal)  reserved word / punctuation
//! rule(nonterminal, symbols, action)
//! action(name, callback)
//! ```
//!
//! The nonterminal of the first registered rule is the start symbol.
//! Productions of one nonterminal are tried in registration order and the
//! first one that matches wins, so overlapping alternatives must be
//! registered longest first:
//!
//! ```text
//! cmd -> FFT WITH WINDOW WORD   {windowed}
//! cmd -> FFT                    {plain}
//! ```
//!
//! Symbols and action names are resolved while parsing, so a grammar can
//! be declared in any order. A reference that never resolves is reported
//! as [`DslError::Configuration`](crate::DslError::Configuration) by the
//! first parse that reaches it, or up front by [`Grammar::validate`].

mod display;
mod types;
mod validate;

pub use types::{ActionFn, Production, Symbol};
pub use validate::validate_grammar;

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::context::{Context, Session};
use crate::engine::{EngineConfig, ParseResult, Parser};
use crate::error::{ActionError, Result};
use crate::lexer::{self, Lexeme, TokenDef};
use crate::value::Value;

/// A runtime-defined DSL: tokens, productions and actions.
pub struct Grammar {
    name: String,
    config: EngineConfig,
    tokens: Vec<TokenDef>,
    rules: IndexMap<String, Vec<Production>>,
    actions: HashMap<String, Box<ActionFn>>,
}

impl Grammar {
    /// Create an empty grammar with the default engine configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, EngineConfig::default())
    }

    /// Create an empty grammar with a custom engine configuration.
    pub fn with_config(name: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            name: name.into(),
            config,
            tokens: Vec::new(),
            rules: IndexMap::new(),
            actions: HashMap::new(),
        }
    }

    /// Grammar name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ============ Registration ============

    /// Define a pattern token matched by a regular expression.
    pub fn token(&mut self, name: impl Into<String>, pattern: &str) -> Result<&mut Self> {
        let def = TokenDef::pattern(name, pattern)?;
        self.define_token(def);
        Ok(self)
    }

    /// Define a keyword token matched by an exact literal.
    pub fn keyword_token(&mut self, name: impl Into<String>, literal: impl Into<String>) -> &mut Self {
        self.define_token(TokenDef::keyword(name, literal));
        self
    }

    /// Append a production to `nonterminal`'s ordered alternatives.
    pub fn rule(
        &mut self,
        nonterminal: impl Into<String>,
        symbols: &[&str],
        action: impl Into<String>,
    ) -> &mut Self {
        let production = Production::new(nonterminal, symbols, action);
        self.rules
            .entry(production.nonterminal.clone())
            .or_default()
            .push(production);
        self
    }

    /// Bind a callback to an action name.
    pub fn action<F>(&mut self, name: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&[Value], &Context) -> std::result::Result<Value, ActionError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.actions.insert(name.clone(), Box::new(callback)).is_some() {
            tracing::warn!(grammar = %self.name, action = %name, "action redefined");
        }
        self
    }

    fn define_token(&mut self, def: TokenDef) {
        if let Some(existing) = self.tokens.iter_mut().find(|t| t.name() == def.name()) {
            tracing::warn!(grammar = %self.name, token = %def.name(), "token redefined");
            *existing = def;
        } else {
            self.tokens.push(def);
        }
    }

    // ============ Lookup ============

    /// All token definitions in registration order.
    pub fn token_definitions(&self) -> &[TokenDef] {
        &self.tokens
    }

    /// Find a token definition by name.
    pub fn token_definition(&self, name: &str) -> Option<&TokenDef> {
        self.tokens.iter().find(|t| t.name() == name)
    }

    /// Ordered productions of a nonterminal (empty if it has none).
    pub fn productions_for(&self, nonterminal: &str) -> &[Production] {
        self.rules
            .get(nonterminal)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Nonterminal names in the order they were first used in `rule`.
    pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// The nonterminal of the first registered production.
    pub fn start_symbol(&self) -> Option<&str> {
        self.rules.keys().next().map(String::as_str)
    }

    /// Look up an action callback.
    pub fn action_for(&self, name: &str) -> Option<&ActionFn> {
        self.actions.get(name).map(|action| &**action)
    }

    /// Check if an action is bound.
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Resolve a right-hand-side symbol. Token names win over nonterminals.
    pub fn resolve(&self, symbol: &str) -> Option<Symbol<'_>> {
        if let Some(def) = self.token_definition(symbol) {
            return Some(Symbol::Terminal(def));
        }
        self.rules
            .get_key_value(symbol)
            .filter(|(_, productions)| !productions.is_empty())
            .map(|(name, productions)| Symbol::Nonterminal(name.as_str(), productions.as_slice()))
    }

    // ============ Execution ============

    /// Parse `text` with an empty context.
    pub fn parse(&self, text: &str) -> Result<ParseResult> {
        self.parse_with_context(text, &Context::new())
    }

    /// Parse `text` with `context` visible to every action.
    pub fn parse_with_context(&self, text: &str, context: &Context) -> Result<ParseResult> {
        let stream = lexer::tokenize(&self.tokens, text)?;
        Parser::new(self, stream, context).parse()
    }

    /// Start a session that keeps context bindings across parses.
    pub fn session(&self) -> Session<'_> {
        Session::new(self)
    }

    /// Tokenize `text` without parsing it.
    pub fn debug_tokens(&self, text: &str) -> Result<Vec<Lexeme>> {
        Ok(lexer::tokenize(&self.tokens, text)?.lexemes)
    }

    /// Check every production eagerly instead of waiting for a parse to
    /// reach it.
    pub fn validate(&self) -> Result<()> {
        validate_grammar(self)
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<&String> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .field("rules", &self.rules)
            .field("actions", &actions)
            .finish()
    }
}
