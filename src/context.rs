//! Context bindings readable by actions.
//!
//! A [`Context`] is passed explicitly into every action invocation; the
//! engine never writes to it. Hosts that want bindings to outlive one call
//! (a dataset registered once and queried many times) keep them in a
//! [`Session`], which owns its context and lends it to each parse.

use std::collections::hash_map;
use std::collections::HashMap;

use crate::engine::ParseResult;
use crate::error::Result;
use crate::grammar::Grammar;
use crate::value::Value;

/// String-keyed bindings visible to actions during one parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    bindings: HashMap<String, Value>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a binding.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.bindings.get(key)
    }

    /// Bind `key` to `value`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.bindings.insert(key.into(), value.into())
    }

    /// Remove a binding.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.bindings.remove(key)
    }

    /// Check if `key` is bound.
    pub fn contains(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Remove all bindings.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Iterate over all bindings in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.bindings.iter()
    }
}

impl From<HashMap<String, Value>> for Context {
    fn from(bindings: HashMap<String, Value>) -> Self {
        Self { bindings }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            bindings: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Context {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.bindings.extend(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
    }
}

/// Host-owned context that persists across parses against one grammar.
///
/// A session is not shared between threads implicitly: concurrent callers
/// each create their own, or wrap one in a lock.
#[derive(Debug)]
pub struct Session<'g> {
    grammar: &'g Grammar,
    context: Context,
}

impl<'g> Session<'g> {
    /// Create a session with no bindings.
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_context(grammar, Context::new())
    }

    /// Create a session starting from existing bindings.
    pub fn with_context(grammar: &'g Grammar, context: Context) -> Self {
        Self { grammar, context }
    }

    /// The grammar this session parses with.
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Bind a value for all later parses in this session.
    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.context.set(key, value)
    }

    /// Look up a session binding.
    pub fn get_context(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// Remove a session binding.
    pub fn remove_context(&mut self, key: &str) -> Option<Value> {
        self.context.remove(key)
    }

    /// Remove all session bindings.
    pub fn clear_context(&mut self) {
        self.context.clear();
    }

    /// All session bindings.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Parse `text` with the session bindings visible to actions.
    pub fn parse(&self, text: &str) -> Result<ParseResult> {
        self.grammar.parse_with_context(text, &self.context)
    }

    /// Merge `bindings` into the session, then parse `text`.
    ///
    /// The merged bindings stay in the session after the call returns,
    /// whether or not the parse succeeded.
    pub fn parse_with<K, V, I>(&mut self, text: &str, bindings: I) -> Result<ParseResult>
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.context.extend(bindings);
        self.parse(text)
    }
}
