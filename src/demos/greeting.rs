//! Smallest useful grammar: a keyword followed by a word.

use crate::error::Result;
use crate::grammar::Grammar;
use crate::value::Value;

/// `greeting -> FROM WORD`, producing `"Hello, <word>"`.
pub fn greeting() -> Result<Grammar> {
    let mut grammar = Grammar::new("greeting");
    grammar
        .keyword_token("FROM", "from")
        .token("WORD", "[a-zA-Z]+")?
        .rule("greeting", &["FROM", "WORD"], "hello")
        .action("hello", |args, _| Ok(Value::from(format!("Hello, {}", args[1]))));
    Ok(grammar)
}
