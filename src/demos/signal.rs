//! Signal-processing command language.
//!
//! Overlapping alternatives are registered longest first: `fft` alone
//! would otherwise match the prefix of `fft with window hann` and leave
//! the rest unconsumed.

use std::collections::BTreeMap;

use crate::error::{ActionError, Result};
use crate::grammar::Grammar;
use crate::value::Value;

fn command(op: &str, fields: &[(&str, Value)]) -> Value {
    let mut record = BTreeMap::new();
    record.insert("op".to_string(), Value::from(op));
    for (key, value) in fields {
        record.insert(key.to_string(), value.clone());
    }
    Value::Record(record)
}

/// Commands: `fft`, `fft with window <name>`, `gain <number>`.
pub fn signal() -> Result<Grammar> {
    let mut grammar = Grammar::new("signal");
    grammar
        .keyword_token("FFT", "fft")
        .keyword_token("WITH", "with")
        .keyword_token("WINDOW", "window")
        .keyword_token("GAIN", "gain")
        .token("NUMBER", r"-?[0-9]+(\.[0-9]+)?")?
        .token("WORD", "[a-z]+")?
        .rule("cmd", &["FFT", "WITH", "WINDOW", "WORD"], "fft_windowed")
        .rule("cmd", &["FFT"], "fft")
        .rule("cmd", &["GAIN", "NUMBER"], "gain")
        .action("fft_windowed", |args, _| {
            Ok(command("fft", &[("window", args[3].clone())]))
        })
        .action("fft", |_, _| {
            Ok(command("fft", &[("window", Value::from("rectangular"))]))
        })
        .action("gain", |args, _| {
            let text = args[1].as_str().unwrap_or_default();
            let db: f64 = text
                .parse()
                .map_err(|_| ActionError::new(format!("invalid gain '{}'", text)))?;
            Ok(command("gain", &[("db", Value::Number(db))]))
        });
    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windowed_fft_selects_longer_production() {
        let grammar = signal().unwrap();
        let output = grammar.parse("fft with window hamming").unwrap().into_output();
        assert_eq!(output.get("op"), Some(&Value::from("fft")));
        assert_eq!(output.get("window"), Some(&Value::from("hamming")));
    }

    #[test]
    fn test_plain_fft() {
        let grammar = signal().unwrap();
        let output = grammar.parse("fft").unwrap().into_output();
        assert_eq!(output.get("window"), Some(&Value::from("rectangular")));
    }

    #[test]
    fn test_gain() {
        let grammar = signal().unwrap();
        let output = grammar.parse("gain -3.5").unwrap().into_output();
        assert_eq!(output.get("db").and_then(Value::as_f64), Some(-3.5));
    }

    #[test]
    fn test_keyword_is_not_a_window_name() {
        let grammar = signal().unwrap();
        assert!(grammar.parse("fft with window gain").is_err());
    }
}
