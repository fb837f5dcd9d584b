//! Lexer (tokenizer) driven by runtime token definitions.
//!
//! At each position the lexer skips whitespace, then tries every token
//! definition against the remaining text. The longest match wins; on a
//! length tie a keyword beats a pattern, so identifier patterns that also
//! spell a keyword never steal it. Remaining ties go to the definition
//! registered first.
//!
//! Pattern tokens take the longest prefix their expression can match, not
//! the first alternative that succeeds: `<|<=` reads `<=` as one lexeme and
//! lazy quantifiers behave like greedy ones. Patterns are compiled to an
//! anchored DFA that reports every match state, and the last one reached
//! before the automaton dies is the match.

use regex_automata::dfa::{dense, Automaton, StartKind};
use regex_automata::{Anchored, Input, MatchError, MatchKind};

use crate::error::{DslError, Position, Result};

/// How a token definition recognizes text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Exact literal with a word boundary after identifier characters
    Keyword,
    /// Regular expression anchored at the scan position
    Pattern,
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Regex {
        source: String,
        dfa: dense::DFA<Vec<u32>>,
    },
}

/// A registered token definition.
#[derive(Debug, Clone)]
pub struct TokenDef {
    name: String,
    kind: TokenKind,
    matcher: Matcher,
}

impl TokenDef {
    /// Create a keyword token matching `literal` exactly.
    pub fn keyword(name: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TokenKind::Keyword,
            matcher: Matcher::Literal(literal.into()),
        }
    }

    /// Create a pattern token from a regular expression.
    ///
    /// The expression is anchored at the scan position, so `[a-z]+` only
    /// matches text starting exactly where the lexer currently is.
    pub fn pattern(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let dfa = dense::DFA::builder()
            .configure(
                dense::DFA::config()
                    .match_kind(MatchKind::All)
                    .start_kind(StartKind::Anchored)
                    .unicode_word_boundary(true),
            )
            .build(pattern)
            .map_err(|source| DslError::InvalidPattern {
                token: name.clone(),
                source: Box::new(source),
            })?;
        Ok(Self {
            name,
            kind: TokenKind::Pattern,
            matcher: Matcher::Regex {
                source: pattern.to_string(),
                dfa,
            },
        })
    }

    /// Token name referenced by productions.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keyword or pattern.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The literal (keywords) or the regular expression as registered (patterns).
    pub fn source(&self) -> &str {
        match &self.matcher {
            Matcher::Literal(literal) => literal,
            Matcher::Regex { source, .. } => source,
        }
    }

    /// Length in bytes of the longest match at the start of `rest`, if any.
    ///
    /// Fails only when a pattern using `\b` meets non-ASCII text, which the
    /// DFA cannot classify.
    fn match_len(&self, rest: &str) -> std::result::Result<Option<usize>, MatchError> {
        match &self.matcher {
            Matcher::Literal(literal) => {
                if literal.is_empty() || !rest.starts_with(literal.as_str()) {
                    return Ok(None);
                }
                let ends_in_word = literal.chars().last().is_some_and(is_identifier_char);
                let next = rest[literal.len()..].chars().next();
                if ends_in_word && next.is_some_and(is_identifier_char) {
                    return Ok(None);
                }
                Ok(Some(literal.len()))
            }
            Matcher::Regex { dfa, .. } => {
                let input = Input::new(rest).anchored(Anchored::Yes);
                Ok(dfa.try_search_fwd(&input)?.map(|m| m.offset()))
            }
        }
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// A classified chunk of input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    /// Name of the token definition that matched
    pub token: String,
    /// The matched text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset into the input
    pub offset: usize,
}

impl Lexeme {
    /// Line/column of the first character.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// Output of a full tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    /// Lexemes in input order
    pub lexemes: Vec<Lexeme>,
    /// Position just past the last character of the input
    pub end: Position,
}

/// Lexer over one input string.
pub struct Lexer<'a> {
    defs: &'a [TokenDef],
    input: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given definitions and input.
    pub fn new(defs: &'a [TokenDef], input: &'a str) -> Self {
        Self {
            defs,
            input,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get the next lexeme, or `None` at end of input.
    pub fn next_lexeme(&mut self) -> Result<Option<Lexeme>> {
        self.skip_whitespace();

        let input = self.input;
        let rest = &input[self.offset..];
        let Some(ch) = rest.chars().next() else {
            return Ok(None);
        };

        let mut best: Option<(usize, &TokenDef)> = None;
        for def in self.defs {
            let matched = def.match_len(rest).map_err(|err| {
                DslError::lex(
                    self.position(),
                    format!("token {} cannot match here: {}", def.name, err),
                )
            })?;
            let Some(len) = matched else {
                continue;
            };
            if len == 0 {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_len, best_def)) => {
                    len > best_len
                        || (len == best_len
                            && def.kind == TokenKind::Keyword
                            && best_def.kind == TokenKind::Pattern)
                }
            };
            if better {
                best = Some((len, def));
            }
        }

        let Some((len, def)) = best else {
            return Err(DslError::lex(
                self.position(),
                format!("unexpected character '{}'", ch),
            ));
        };

        let text = &rest[..len];
        let lexeme = Lexeme {
            token: def.name.clone(),
            text: text.to_string(),
            line: self.line,
            column: self.column,
            offset: self.offset,
        };
        tracing::trace!(token = %lexeme.token, text = %lexeme.text, "lexeme");

        for ch in text.chars() {
            self.advance(ch);
        }
        Ok(Some(lexeme))
    }

    /// Current line/column.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        let input = self.input;
        while let Some(ch) = input[self.offset..].chars().next() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance(ch);
        }
    }
}

/// Tokenize a complete input string.
pub fn tokenize(defs: &[TokenDef], input: &str) -> Result<TokenStream> {
    let mut lexer = Lexer::new(defs, input);
    let mut lexemes = Vec::new();
    while let Some(lexeme) = lexer.next_lexeme()? {
        lexemes.push(lexeme);
    }
    Ok(TokenStream {
        lexemes,
        end: lexer.position(),
    })
}
