//! Arithmetic calculator.
//!
//! ```text
//! expr      ::= term expr_tail
//! expr_tail ::= ("+" | "-") term expr_tail | ε
//! term      ::= factor term_tail
//! term_tail ::= ("*" | "/") factor term_tail | ε
//! factor    ::= "-" factor | "(" expr ")" | NUMBER
//! ```
//!
//! Tail rules keep the grammar right-recursive; the `fold` action turns
//! the collected `(operator, operand)` pairs back into left-associative
//! evaluation, so `8 - 2 - 1` is `5`.

use crate::error::{ActionError, Result};
use crate::grammar::Grammar;
use crate::value::Value;

fn number(value: &Value) -> std::result::Result<f64, ActionError> {
    value
        .as_f64()
        .ok_or_else(|| ActionError::new(format!("expected a number, got {}", value.type_name())))
}

fn apply(op: &str, lhs: f64, rhs: f64) -> std::result::Result<f64, ActionError> {
    match op {
        "+" => Ok(lhs + rhs),
        "-" => Ok(lhs - rhs),
        "*" => Ok(lhs * rhs),
        "/" if rhs == 0.0 => Err(ActionError::new("division by zero")),
        "/" => Ok(lhs / rhs),
        other => Err(ActionError::new(format!("unknown operator '{}'", other))),
    }
}

/// Four-function calculator with parentheses and unary minus.
pub fn calc() -> Result<Grammar> {
    let mut grammar = Grammar::new("calc");
    grammar
        .token("NUMBER", r"[0-9]+(\.[0-9]+)?")?
        .keyword_token("PLUS", "+")
        .keyword_token("MINUS", "-")
        .keyword_token("STAR", "*")
        .keyword_token("SLASH", "/")
        .keyword_token("LPAREN", "(")
        .keyword_token("RPAREN", ")");

    grammar
        .rule("expr", &["term", "expr_tail"], "fold")
        .rule("expr_tail", &["PLUS", "term", "expr_tail"], "tail_op")
        .rule("expr_tail", &["MINUS", "term", "expr_tail"], "tail_op")
        .rule("expr_tail", &[], "tail_end")
        .rule("term", &["factor", "term_tail"], "fold")
        .rule("term_tail", &["STAR", "factor", "term_tail"], "tail_op")
        .rule("term_tail", &["SLASH", "factor", "term_tail"], "tail_op")
        .rule("term_tail", &[], "tail_end")
        .rule("factor", &["MINUS", "factor"], "negate")
        .rule("factor", &["LPAREN", "expr", "RPAREN"], "group")
        .rule("factor", &["NUMBER"], "number");

    grammar
        .action("fold", |args, _| {
            let mut acc = number(&args[0])?;
            for pair in args[1].as_list().unwrap_or_default() {
                let [op, operand] = pair.as_list().unwrap_or_default() else {
                    return Err(ActionError::new("malformed operator chain"));
                };
                acc = apply(op.as_str().unwrap_or_default(), acc, number(operand)?)?;
            }
            Ok(Value::Number(acc))
        })
        .action("tail_op", |args, _| {
            let mut chain = vec![Value::List(vec![args[0].clone(), args[1].clone()])];
            chain.extend(args[2].as_list().unwrap_or_default().iter().cloned());
            Ok(Value::List(chain))
        })
        .action("tail_end", |_, _| Ok(Value::List(Vec::new())))
        .action("negate", |args, _| Ok(Value::Number(-number(&args[1])?)))
        .action("group", |args, _| Ok(args[1].clone()))
        .action("number", |args, _| {
            let text = args[0].as_str().unwrap_or_default();
            text.parse::<f64>()
                .map(Value::Number)
                .map_err(|_| ActionError::new(format!("invalid number '{}'", text)))
        });

    Ok(grammar)
}
