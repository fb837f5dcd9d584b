//! Error rendering and token dumps for grammar authors.

use std::fmt;

use crate::error::{DslError, Position};
use crate::lexer::Lexeme;

/// A rendered view of an error against the text that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Error message without the location prefix
    pub message: String,
    /// Location of the error, if it has one
    pub position: Option<Position>,
    /// The source line the position points into
    pub source_line: Option<String>,
}

impl Diagnostic {
    /// Build a diagnostic for `error` raised while parsing `source`.
    pub fn from_error(error: &DslError, source: &str) -> Self {
        let position = error.position();
        let source_line = position.and_then(|p| source.lines().nth(p.line - 1).map(str::to_string));
        Self {
            message: error.message(),
            position,
            source_line,
        }
    }
}

/// Renders `line:column: error: message`, the source line and a caret.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(position) = self.position else {
            return write!(f, "error: {}", self.message);
        };
        write!(f, "{}: error: {}", position, self.message)?;
        if let Some(line) = &self.source_line {
            let gutter = position.line.to_string();
            writeln!(f)?;
            writeln!(f, "{} | {}", gutter, line)?;
            let padding: String = line
                .chars()
                .take(position.column.saturating_sub(1))
                .map(|ch| if ch == '\t' { '\t' } else { ' ' })
                .collect();
            write!(f, "{} | {}^", " ".repeat(gutter.len()), padding)?;
        }
        Ok(())
    }
}

/// Format lexemes as an aligned table, one per line.
pub fn dump_lexemes(lexemes: &[Lexeme]) -> String {
    let width = lexemes.iter().map(|l| l.token.len()).max().unwrap_or(0);
    lexemes
        .iter()
        .map(|l| format!("{:>3}:{:<3} {:width$} {:?}\n", l.line, l.column, l.token, l.text, width = width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::value::Value;

    fn grammar() -> Grammar {
        let mut grammar = Grammar::new("greeting");
        grammar
            .keyword_token("FROM", "from")
            .token("WORD", "[a-zA-Z]+")
            .unwrap()
            .rule("greeting", &["FROM", "WORD"], "hello")
            .action("hello", |args, _| Ok(args[1].clone()));
        grammar
    }

    #[test]
    fn test_render_points_at_column() {
        let source = "from Ana\nfrom from";
        let grammar = grammar();
        let err = grammar.parse("from from").unwrap_err();
        let diagnostic = Diagnostic::from_error(&err, "from from");
        assert_eq!(
            diagnostic.to_string(),
            "1:6: error: unexpected FROM 'from', expected WORD\n1 | from from\n  |      ^"
        );

        let err = DslError::lex(Position::new(2, 3), "unexpected character '$'");
        let diagnostic = Diagnostic::from_error(&err, source);
        assert_eq!(diagnostic.source_line.as_deref(), Some("from from"));
    }

    #[test]
    fn test_render_without_position() {
        let err = DslError::configuration("grammar 'g' has no rules");
        let diagnostic = Diagnostic::from_error(&err, "anything");
        assert_eq!(
            diagnostic.to_string(),
            "error: Grammar configuration error: grammar 'g' has no rules"
        );
    }

    #[test]
    fn test_caret_keeps_tabs_aligned() {
        let grammar = grammar();
        let err = grammar.parse("\tfrom\tfrom").unwrap_err();
        let diagnostic = Diagnostic::from_error(&err, "\tfrom\tfrom");
        assert_eq!(diagnostic.position, Some(Position::new(1, 7)));
        assert_eq!(
            diagnostic.to_string(),
            "1:7: error: unexpected FROM 'from', expected WORD\n1 | \tfrom\tfrom\n  | \t    \t^"
        );
    }

    #[test]
    fn test_end_of_input_position_past_last_line() {
        let grammar = grammar();
        let err = grammar.parse("from\n").unwrap_err();
        let diagnostic = Diagnostic::from_error(&err, "from\n");
        assert_eq!(diagnostic.position, Some(Position::new(2, 1)));
        assert_eq!(diagnostic.source_line, None);
        assert_eq!(
            diagnostic.to_string(),
            "2:1: error: unexpected end of input, expected WORD"
        );
    }

    #[test]
    fn test_dump_lexemes() {
        let grammar = grammar();
        let lexemes = grammar.debug_tokens("from Ana").unwrap();
        assert_eq!(
            dump_lexemes(&lexemes),
            "  1:1   FROM \"from\"\n  1:6   WORD \"Ana\"\n"
        );
        assert_eq!(grammar.parse("from Ana").unwrap().into_output(), Value::from("Ana"));
    }
}
