//! Recursive descent over a runtime grammar.

use std::collections::{BTreeSet, HashSet};

use super::ParseResult;
use crate::context::Context;
use crate::error::{DslError, Position, Result};
use crate::grammar::{Grammar, Production, Symbol};
use crate::lexer::{Lexeme, TokenStream};
use crate::value::Value;

const END_OF_INPUT: &str = "end of input";

/// Remaining stack below which a nested match moves to a fresh segment.
const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each stack segment allocated for deep nesting.
const STACK_SEGMENT: usize = 1024 * 1024;

/// A matched nonterminal: its value and the position just past it.
type Matched = Option<(Value, usize)>;

/// Parser for one tokenized input.
pub struct Parser<'a> {
    grammar: &'a Grammar,
    context: &'a Context,
    lexemes: Vec<Lexeme>,
    end: Position,
    depth: usize,
    /// Nonterminals currently being matched, keyed by start position
    active: HashSet<(&'a str, usize)>,
    furthest: usize,
    expected: BTreeSet<&'a str>,
}

impl<'a> Parser<'a> {
    /// Create a parser over a token stream.
    pub fn new(grammar: &'a Grammar, stream: TokenStream, context: &'a Context) -> Self {
        Self {
            grammar,
            context,
            lexemes: stream.lexemes,
            end: stream.end,
            depth: 0,
            active: HashSet::new(),
            furthest: 0,
            expected: BTreeSet::new(),
        }
    }

    /// Parse the whole input from the grammar's start symbol.
    pub fn parse(&mut self) -> Result<ParseResult> {
        let grammar = self.grammar;
        let start = grammar.start_symbol().ok_or_else(|| {
            DslError::configuration(format!("grammar '{}' has no rules", grammar.name()))
        })?;

        tracing::debug!(
            grammar = %grammar.name(),
            start = %start,
            lexemes = self.lexemes.len(),
            "parse started"
        );

        match self.match_nonterminal(start, grammar.productions_for(start), 0)? {
            Some((value, end)) if end == self.lexemes.len() => {
                tracing::debug!(grammar = %grammar.name(), "parse finished");
                Ok(ParseResult::new(value))
            }
            Some((_, end)) => {
                self.expect(end, END_OF_INPUT);
                Err(self.syntax_error())
            }
            None => Err(self.syntax_error()),
        }
    }

    fn match_nonterminal(
        &mut self,
        name: &'a str,
        productions: &'a [Production],
        pos: usize,
    ) -> Result<Matched> {
        if !self.active.insert((name, pos)) {
            tracing::trace!(nonterminal = %name, pos, "left-recursive re-entry rejected");
            return Ok(None);
        }
        if self.depth >= self.grammar.config().max_depth {
            let position = self.position_of(pos);
            return Err(DslError::RecursionLimit {
                limit: self.grammar.config().max_depth,
                line: position.line,
                column: position.column,
            });
        }

        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            self.match_alternatives(productions, pos)
        });
        self.depth -= 1;
        self.active.remove(&(name, pos));
        result
    }

    fn match_alternatives(&mut self, productions: &'a [Production], pos: usize) -> Result<Matched> {
        for production in productions {
            tracing::trace!(production = %production, pos, "trying");
            if let Some((values, end)) = self.match_sequence(production, pos)? {
                let value = self.invoke(production, &values, pos)?;
                return Ok(Some((value, end)));
            }
        }
        Ok(None)
    }

    fn match_sequence(
        &mut self,
        production: &'a Production,
        pos: usize,
    ) -> Result<Option<(Vec<Value>, usize)>> {
        let grammar = self.grammar;
        let mut cursor = pos;
        let mut values = Vec::with_capacity(production.symbols.len());

        for symbol in &production.symbols {
            match grammar.resolve(symbol) {
                Some(Symbol::Terminal(def)) => {
                    let text = self
                        .lexemes
                        .get(cursor)
                        .filter(|lexeme| lexeme.token == def.name())
                        .map(|lexeme| lexeme.text.clone());
                    match text {
                        Some(text) => {
                            values.push(Value::Text(text));
                            cursor += 1;
                        }
                        None => {
                            self.expect(cursor, def.name());
                            return Ok(None);
                        }
                    }
                }
                Some(Symbol::Nonterminal(name, productions)) => {
                    match self.match_nonterminal(name, productions, cursor)? {
                        Some((value, end)) => {
                            values.push(value);
                            cursor = end;
                        }
                        None => return Ok(None),
                    }
                }
                None => {
                    return Err(DslError::configuration(format!(
                        "production '{}' refers to undefined symbol '{}'",
                        production, symbol
                    )));
                }
            }
        }

        Ok(Some((values, cursor)))
    }

    fn invoke(&self, production: &Production, values: &[Value], pos: usize) -> Result<Value> {
        let action = self.grammar.action_for(&production.action).ok_or_else(|| {
            DslError::configuration(format!(
                "production '{}' uses unbound action '{}'",
                production, production.action
            ))
        })?;

        action(values, self.context).map_err(|err| {
            DslError::action(&production.action, self.position_of(pos), err.message())
        })
    }

    /// Record that `what` was expected at lexeme position `pos`.
    fn expect(&mut self, pos: usize, what: &'a str) {
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
        }
        if pos == self.furthest {
            self.expected.insert(what);
        }
    }

    fn position_of(&self, pos: usize) -> Position {
        self.lexemes
            .get(pos)
            .map(Lexeme::position)
            .unwrap_or(self.end)
    }

    fn syntax_error(&self) -> DslError {
        let found = match self.lexemes.get(self.furthest) {
            Some(lexeme) => format!("unexpected {} '{}'", lexeme.token, lexeme.text),
            None => "unexpected end of input".to_string(),
        };
        let expected: Vec<&str> = self.expected.iter().copied().collect();
        let message = match expected.as_slice() {
            [] => found,
            [only] => format!("{}, expected {}", found, only),
            many => format!("{}, expected one of {}", found, many.join(", ")),
        };
        DslError::parse(self.position_of(self.furthest), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::error::ActionError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn text(args: &[Value], index: usize) -> String {
        args[index].as_str().unwrap_or_default().to_string()
    }

    fn greeting() -> Grammar {
        let mut grammar = Grammar::new("greeting");
        grammar
            .keyword_token("FROM", "from")
            .token("WORD", "[a-zA-Z]+")
            .unwrap()
            .rule("greeting", &["FROM", "WORD"], "hello")
            .action("hello", |args, _| Ok(format!("Hello, {}", text(args, 1)).into()));
        grammar
    }

    /// FFT command grammar; `longest_first` controls production order.
    fn signal(longest_first: bool) -> Grammar {
        let mut grammar = Grammar::new("signal");
        grammar
            .keyword_token("FFT", "fft")
            .keyword_token("WITH", "with")
            .keyword_token("WINDOW", "window")
            .token("WORD", "[a-z]+")
            .unwrap()
            .action("plain", |_, _| Ok("fft".into()))
            .action("windowed", |args, _| Ok(format!("fft:{}", text(args, 3)).into()));
        if longest_first {
            grammar
                .rule("cmd", &["FFT", "WITH", "WINDOW", "WORD"], "windowed")
                .rule("cmd", &["FFT"], "plain");
        } else {
            grammar
                .rule("cmd", &["FFT"], "plain")
                .rule("cmd", &["FFT", "WITH", "WINDOW", "WORD"], "windowed");
        }
        grammar
    }

    fn parse_error(err: DslError) -> (usize, usize, String) {
        match err {
            DslError::Parse {
                line,
                column,
                message,
            } => (line, column, message),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_keyword_then_word() {
        let output = greeting().parse("from Ana").unwrap();
        assert_eq!(output.output(), &Value::from("Hello, Ana"));
    }

    #[test]
    fn test_keyword_without_boundary_is_a_lone_word() {
        let grammar = greeting();
        let lexemes = grammar.debug_tokens("fromANA").unwrap();
        assert_eq!(lexemes.len(), 1);
        assert_eq!(lexemes[0].token, "WORD");

        let (line, column, message) = parse_error(grammar.parse("fromANA").unwrap_err());
        assert_eq!((line, column), (1, 1));
        assert_eq!(message, "unexpected WORD 'fromANA', expected FROM");
    }

    #[test]
    fn test_longer_alternative_registered_first_wins() {
        let grammar = signal(true);
        let output = grammar.parse("fft with window hamming").unwrap().into_output();
        assert_eq!(output, Value::from("fft:hamming"));
        assert_eq!(grammar.parse("fft").unwrap().into_output(), Value::from("fft"));
    }

    #[test]
    fn test_shorter_alternative_registered_first_leaves_trailing_input() {
        let grammar = signal(false);
        let (line, column, message) =
            parse_error(grammar.parse("fft with window hamming").unwrap_err());
        assert_eq!((line, column), (1, 5));
        assert_eq!(message, "unexpected WITH 'with', expected end of input");
    }

    #[test]
    fn test_first_matching_production_is_selected() {
        let mut grammar = Grammar::new("choice");
        grammar
            .token("WORD", "[a-z]+")
            .unwrap()
            .rule("start", &["WORD"], "first")
            .rule("start", &["WORD"], "second")
            .action("first", |_, _| Ok("first".into()))
            .action("second", |_, _| Ok("second".into()));
        for _ in 0..3 {
            assert_eq!(grammar.parse("x").unwrap().into_output(), Value::from("first"));
        }
    }

    #[test]
    fn test_backtracking_restores_cursor() {
        let mut grammar = Grammar::new("assign");
        grammar
            .token("NAME", "[a-z]+")
            .unwrap()
            .token("NUM", "[0-9]+")
            .unwrap()
            .keyword_token("EQ", "=")
            .keyword_token("SEMI", ";")
            .rule("stmt", &["target", "EQ", "NUM", "SEMI"], "assign")
            .rule("stmt", &["target", "EQ", "NAME"], "alias")
            .rule("target", &["NAME"], "name")
            .action("name", |args, _| Ok(args[0].clone()))
            .action("assign", |args, _| Ok(format!("{}:={}", args[0], args[2]).into()))
            .action("alias", |args, _| Ok(format!("{}->{}", args[0], args[2]).into()));

        assert_eq!(grammar.parse("x = 1;").unwrap().into_output(), Value::from("x:=1"));
        assert_eq!(grammar.parse("x = y").unwrap().into_output(), Value::from("x->y"));
    }

    #[test]
    fn test_terminal_values_cover_every_lexeme() {
        let mut grammar = Grammar::new("words");
        grammar
            .token("WORD", "[a-z]+")
            .unwrap()
            .keyword_token("COMMA", ",")
            .rule("list", &["WORD", "COMMA", "list"], "cons")
            .rule("list", &["WORD"], "single")
            .action("cons", |args, _| {
                let mut items = vec![args[0].clone(), args[1].clone()];
                items.extend(args[2].as_list().unwrap_or_default().iter().cloned());
                Ok(Value::List(items))
            })
            .action("single", |args, _| Ok(Value::List(args.to_vec())));

        let input = "a, b ,c,d";
        let output = grammar.parse(input).unwrap().into_output();
        let joined: Vec<String> = output
            .as_list()
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect();
        let lexed: Vec<String> = grammar
            .debug_tokens(input)
            .unwrap()
            .into_iter()
            .map(|l| l.text)
            .collect();
        assert_eq!(joined, lexed);
    }

    #[test]
    fn test_empty_production() {
        let mut grammar = Grammar::new("opt");
        grammar
            .keyword_token("BANG", "!")
            .rule("start", &["BANG", "start"], "more")
            .rule("start", &[], "none")
            .action("more", |args, _| {
                Ok(Value::Number(1.0 + args[1].as_f64().unwrap_or_default()))
            })
            .action("none", |args, _| {
                assert!(args.is_empty());
                Ok(Value::Number(0.0))
            });

        assert_eq!(grammar.parse("").unwrap().into_output(), Value::Number(0.0));
        assert_eq!(grammar.parse("! ! !").unwrap().into_output(), Value::Number(3.0));
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let grammar = greeting();
        let (line, column, message) = parse_error(grammar.parse("from  ").unwrap_err());
        assert_eq!((line, column), (1, 7));
        assert_eq!(message, "unexpected end of input, expected WORD");
    }

    #[test]
    fn test_error_reports_furthest_failure() {
        let mut grammar = Grammar::new("cmd");
        grammar
            .keyword_token("SET", "set")
            .keyword_token("TO", "to")
            .keyword_token("BY", "by")
            .token("WORD", "[a-z]+")
            .unwrap()
            .token("NUM", "[0-9]+")
            .unwrap()
            .rule("cmd", &["SET", "WORD", "TO", "NUM"], "a")
            .rule("cmd", &["SET", "WORD", "BY", "NUM"], "a")
            .action("a", |_, _| Ok(Value::Null));

        let (line, column, message) = parse_error(grammar.parse("set\nspeed at 3").unwrap_err());
        assert_eq!((line, column), (2, 7));
        assert_eq!(message, "unexpected WORD 'at', expected one of BY, TO");
    }

    #[test]
    fn test_action_error_aborts_without_backtracking() {
        let fallback_calls = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&fallback_calls);

        let mut grammar = Grammar::new("strict");
        grammar
            .token("NUM", "[0-9]+")
            .unwrap()
            .rule("start", &["checked"], "pass")
            .rule("start", &["NUM"], "fallback")
            .rule("checked", &["NUM"], "check")
            .action("pass", |args, _| Ok(args[0].clone()))
            .action("check", |args, _| {
                if args[0].as_str() == Some("0") {
                    Err(ActionError::new("zero is not allowed"))
                } else {
                    Ok(args[0].clone())
                }
            })
            .action("fallback", move |args, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(args[0].clone())
            });

        assert_eq!(grammar.parse("7").unwrap().into_output(), Value::from("7"));
        match grammar.parse("0").unwrap_err() {
            DslError::Action {
                action,
                line,
                column,
                message,
            } => {
                assert_eq!(action, "check");
                assert_eq!((line, column), (1, 1));
                assert_eq!(message, "zero is not allowed");
            }
            other => panic!("expected action error, got {:?}", other),
        }
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_undefined_symbol_is_reported_lazily() {
        let mut grammar = Grammar::new("lazy");
        grammar
            .keyword_token("A", "a")
            .keyword_token("B", "b")
            .rule("start", &["A"], "ok")
            .rule("start", &["B", "missing"], "ok")
            .action("ok", |_, _| Ok(Value::Null));

        assert!(grammar.parse("a").is_ok());
        match grammar.parse("b").unwrap_err() {
            DslError::Configuration { message } => {
                assert!(message.contains("undefined symbol 'missing'"), "{}", message)
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_unbound_action_is_reported_on_match() {
        let mut grammar = Grammar::new("lazy");
        grammar.keyword_token("A", "a").rule("start", &["A"], "nowhere");
        assert!(matches!(
            grammar.parse("a"),
            Err(DslError::Configuration { .. })
        ));
    }

    #[test]
    fn test_grammar_without_rules() {
        let grammar = Grammar::new("empty");
        assert!(matches!(
            grammar.parse(""),
            Err(DslError::Configuration { .. })
        ));
    }

    #[test]
    fn test_left_recursion_does_not_overflow() {
        let mut grammar = Grammar::new("left");
        grammar
            .token("NUM", "[0-9]+")
            .unwrap()
            .keyword_token("PLUS", "+")
            .rule("expr", &["expr", "PLUS", "NUM"], "add")
            .rule("expr", &["NUM"], "num")
            .action("add", |_, _| Ok(Value::Null))
            .action("num", |args, _| Ok(args[0].clone()));

        assert_eq!(grammar.parse("1").unwrap().into_output(), Value::from("1"));
        assert!(matches!(grammar.parse("1 + 2"), Err(DslError::Parse { .. })));
    }

    #[test]
    fn test_recursion_limit() {
        let mut grammar = Grammar::with_config("nest", EngineConfig::new().with_max_depth(8));
        grammar
            .keyword_token("OPEN", "(")
            .keyword_token("CLOSE", ")")
            .rule("group", &["OPEN", "group", "CLOSE"], "wrap")
            .rule("group", &[], "leaf")
            .action("wrap", |args, _| Ok(Value::Number(args[1].as_f64().unwrap_or_default() + 1.0)))
            .action("leaf", |_, _| Ok(Value::Number(0.0)));

        assert_eq!(grammar.parse("((()))").unwrap().into_output(), Value::Number(3.0));
        match grammar.parse(&"(".repeat(20)).unwrap_err() {
            DslError::RecursionLimit { limit, line, column } => {
                assert_eq!(limit, 8);
                assert_eq!((line, column), (1, 9));
            }
            other => panic!("expected recursion limit, got {:?}", other),
        }
    }

    #[test]
    fn test_long_right_recursive_list() {
        let mut grammar = Grammar::new("list");
        grammar
            .token("W", "[a-z]+")
            .unwrap()
            .keyword_token("C", ",")
            .rule("list", &["W", "C", "list"], "more")
            .rule("list", &["W"], "one")
            .action("more", |args, _| Ok(Value::Number(args[2].as_f64().unwrap_or_default() + 1.0)))
            .action("one", |_, _| Ok(Value::Number(1.0)));

        let input = vec!["w"; 1000].join(", ");
        let output = grammar.parse(&input).unwrap().into_output();
        assert_eq!(output, Value::Number(1000.0));
    }

    #[test]
    fn test_deep_nesting_runs_on_a_small_thread_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let mut grammar = Grammar::new("nest");
                grammar
                    .keyword_token("OPEN", "(")
                    .keyword_token("CLOSE", ")")
                    .rule("group", &["OPEN", "group", "CLOSE"], "wrap")
                    .rule("group", &[], "leaf")
                    .action("wrap", |args, _| {
                        Ok(Value::Number(args[1].as_f64().unwrap_or_default() + 1.0))
                    })
                    .action("leaf", |_, _| Ok(Value::Number(0.0)));
                let input = format!("{}{}", "(".repeat(3000), ")".repeat(3000));
                grammar.parse(&input).map(ParseResult::into_output)
            })
            .unwrap();
        assert_eq!(handle.join().unwrap().unwrap(), Value::Number(3000.0));
    }

    #[test]
    fn test_lex_errors_surface_before_parsing() {
        let err = greeting().parse("from 42").unwrap_err();
        assert!(matches!(err, DslError::Lex { line: 1, column: 6, .. }));
    }

    #[test]
    fn test_concurrent_parses_share_a_grammar() {
        let grammar = Arc::new(signal(true));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let grammar = Arc::clone(&grammar);
                std::thread::spawn(move || grammar.parse("fft with window hann").unwrap().into_output())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Value::from("fft:hann"));
        }
    }
}
