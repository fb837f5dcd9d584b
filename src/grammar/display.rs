//! Human-readable grammar dump.

use std::fmt;

use crate::lexer::TokenKind;

use super::Grammar;

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# grammar {}", self.name)?;

        let width = self.tokens.iter().map(|t| t.name().len()).max().unwrap_or(0);
        for token in &self.tokens {
            match token.kind() {
                TokenKind::Keyword => {
                    writeln!(f, "{:width$} := {:?}", token.name(), token.source(), width = width)?
                }
                TokenKind::Pattern => {
                    writeln!(f, "{:width$} := /{}/", token.name(), token.source(), width = width)?
                }
            }
        }

        for (nonterminal, productions) in &self.rules {
            writeln!(f)?;
            for (i, production) in productions.iter().enumerate() {
                let body = if production.is_empty() {
                    "ε".to_string()
                } else {
                    production.symbols.join(" ")
                };
                if i == 0 {
                    write!(f, "{} ::=", nonterminal)?;
                } else {
                    write!(f, "{}   |", " ".repeat(nonterminal.len()))?;
                }
                writeln!(f, " {}  {{{}}}", body, production.action)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump() {
        let mut grammar = Grammar::new("signal");
        grammar
            .keyword_token("FFT", "fft")
            .keyword_token("WITH", "with")
            .token("WORD", "[a-z]+")
            .unwrap()
            .rule("cmd", &["FFT", "WITH", "WORD"], "windowed")
            .rule("cmd", &["FFT"], "plain")
            .rule("opt", &[], "none");

        let expected = "\
# grammar signal
FFT  := \"fft\"
WITH := \"with\"
WORD := /[a-z]+/

cmd ::= FFT WITH WORD  {windowed}
      | FFT  {plain}

opt ::= ε  {none}
";
        assert_eq!(grammar.to_string(), expected);
    }
}
