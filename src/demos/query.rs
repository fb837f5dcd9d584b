//! Query language over tables supplied through the context.
//!
//! ```text
//! from orders select name, total where status = 'open'
//! ```
//!
//! The table name is looked up in the context at parse time; it must be
//! bound to a list of records.

use std::collections::BTreeMap;

use crate::context::Context;
use crate::error::{ActionError, Result};
use crate::grammar::Grammar;
use crate::value::Value;

fn table<'c>(ctx: &'c Context, name: &Value) -> std::result::Result<&'c [Value], ActionError> {
    let name = name.as_str().unwrap_or_default();
    let value = ctx
        .get(name)
        .ok_or_else(|| ActionError::new(format!("unknown table '{}'", name)))?;
    value
        .as_list()
        .ok_or_else(|| ActionError::new(format!("'{}' is a {}, not a table", name, value.type_name())))
}

/// Project `fields` out of `row`. `Value::Null` selects every field.
fn project(row: &Value, fields: &Value) -> Value {
    match fields.as_list() {
        None => row.clone(),
        Some(fields) => {
            let record: BTreeMap<String, Value> = fields
                .iter()
                .filter_map(Value::as_str)
                .map(|field| (field.to_string(), row.get(field).cloned().unwrap_or_default()))
                .collect();
            Value::Record(record)
        }
    }
}

fn matches(row: &Value, condition: &Value) -> bool {
    let field = condition.get("field").and_then(Value::as_str).unwrap_or_default();
    let expected = condition.get("value").unwrap_or(&Value::Null);
    row.get(field) == Some(expected)
}

/// `from TABLE select FIELDS [where FIELD = LITERAL]`.
pub fn query() -> Result<Grammar> {
    let mut grammar = Grammar::new("query");
    grammar
        .keyword_token("FROM", "from")
        .keyword_token("SELECT", "select")
        .keyword_token("WHERE", "where")
        .keyword_token("COMMA", ",")
        .keyword_token("EQ", "=")
        .keyword_token("STAR", "*")
        .token("IDENT", "[A-Za-z_][A-Za-z0-9_]*")?
        .token("NUMBER", r"-?[0-9]+(\.[0-9]+)?")?
        .token("STRING", "'[^']*'")?;

    grammar
        .rule("query", &["FROM", "IDENT", "SELECT", "fields", "WHERE", "condition"], "filtered")
        .rule("query", &["FROM", "IDENT", "SELECT", "fields"], "select")
        .rule("fields", &["STAR"], "all_fields")
        .rule("fields", &["IDENT", "COMMA", "fields"], "field_list")
        .rule("fields", &["IDENT"], "field")
        .rule("condition", &["IDENT", "EQ", "literal"], "condition")
        .rule("literal", &["STRING"], "string")
        .rule("literal", &["NUMBER"], "number")
        .rule("literal", &["IDENT"], "bare_word");

    grammar
        .action("select", |args, ctx| {
            let rows = table(ctx, &args[1])?;
            Ok(Value::List(rows.iter().map(|row| project(row, &args[3])).collect()))
        })
        .action("filtered", |args, ctx| {
            let rows = table(ctx, &args[1])?;
            Ok(Value::List(
                rows.iter()
                    .filter(|row| matches(row, &args[5]))
                    .map(|row| project(row, &args[3]))
                    .collect(),
            ))
        })
        .action("all_fields", |_, _| Ok(Value::Null))
        .action("field_list", |args, _| {
            let mut fields = vec![args[0].clone()];
            fields.extend(args[2].as_list().unwrap_or_default().iter().cloned());
            Ok(Value::List(fields))
        })
        .action("field", |args, _| Ok(Value::List(vec![args[0].clone()])))
        .action("condition", |args, _| {
            let mut record = BTreeMap::new();
            record.insert("field".to_string(), args[0].clone());
            record.insert("value".to_string(), args[2].clone());
            Ok(Value::Record(record))
        })
        .action("string", |args, _| {
            let quoted = args[0].as_str().unwrap_or_default();
            Ok(Value::from(quoted.trim_matches('\'')))
        })
        .action("number", |args, _| {
            let text = args[0].as_str().unwrap_or_default();
            text.parse::<f64>()
                .map(Value::Number)
                .map_err(|_| ActionError::new(format!("invalid number '{}'", text)))
        })
        .action("bare_word", |args, _| Ok(args[0].clone()));

    Ok(grammar)
}
