//! Grammar validation.

use std::collections::{HashMap, HashSet};

use crate::error::{DslError, Result};

use super::{Grammar, Symbol};

/// Validate a grammar before parsing.
///
/// Checks:
/// - The grammar has at least one rule
/// - No name is both a token and a nonterminal
/// - Every right-hand-side symbol resolves
/// - Every production's action is bound
/// - No nonterminal is left-recursive
pub fn validate_grammar(grammar: &Grammar) -> Result<()> {
    if grammar.start_symbol().is_none() {
        return Err(DslError::configuration(format!(
            "grammar '{}' has no rules",
            grammar.name()
        )));
    }

    for nonterminal in grammar.nonterminals() {
        if grammar.token_definition(nonterminal).is_some() {
            return Err(DslError::configuration(format!(
                "'{}' is defined both as a token and as a nonterminal",
                nonterminal
            )));
        }

        for production in grammar.productions_for(nonterminal) {
            for symbol in &production.symbols {
                if grammar.resolve(symbol).is_none() {
                    return Err(DslError::configuration(format!(
                        "production '{}' refers to undefined symbol '{}'",
                        production, symbol
                    )));
                }
            }
            if !grammar.has_action(&production.action) {
                return Err(DslError::configuration(format!(
                    "production '{}' uses unbound action '{}'",
                    production, production.action
                )));
            }
        }
    }

    if let Some(cycle) = find_left_recursion(grammar) {
        return Err(DslError::configuration(format!(
            "left recursion through {}; rewrite it right-recursively",
            cycle.join(" -> ")
        )));
    }

    Ok(())
}

/// Nonterminals that can match without consuming a lexeme.
fn nullable_set(grammar: &Grammar) -> HashSet<&str> {
    let mut nullable = HashSet::new();
    loop {
        let before = nullable.len();
        for nonterminal in grammar.nonterminals() {
            if nullable.contains(nonterminal) {
                continue;
            }
            let derives_empty = grammar.productions_for(nonterminal).iter().any(|p| {
                p.symbols.iter().all(|s| match grammar.resolve(s) {
                    Some(Symbol::Nonterminal(name, _)) => nullable.contains(name),
                    _ => false,
                })
            });
            if derives_empty {
                nullable.insert(nonterminal);
            }
        }
        if nullable.len() == before {
            return nullable;
        }
    }
}

/// Find a cycle of nonterminals reachable at the left edge without
/// consuming input. Returns the cycle path with the repeated node at both
/// ends.
fn find_left_recursion(grammar: &Grammar) -> Option<Vec<String>> {
    let nullable = nullable_set(grammar);

    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for nonterminal in grammar.nonterminals() {
        let targets = edges.entry(nonterminal).or_default();
        for production in grammar.productions_for(nonterminal) {
            for symbol in &production.symbols {
                match grammar.resolve(symbol) {
                    Some(Symbol::Nonterminal(name, _)) => {
                        targets.push(name);
                        if !nullable.contains(name) {
                            break;
                        }
                    }
                    _ => break,
                }
            }
        }
    }

    let mut finished = HashSet::new();
    for start in grammar.nonterminals() {
        let mut path = Vec::new();
        if let Some(cycle) = visit(start, &edges, &mut path, &mut finished) {
            return Some(cycle);
        }
    }
    None
}

fn visit<'g>(
    node: &'g str,
    edges: &HashMap<&'g str, Vec<&'g str>>,
    path: &mut Vec<&'g str>,
    finished: &mut HashSet<&'g str>,
) -> Option<Vec<String>> {
    if let Some(index) = path.iter().position(|n| *n == node) {
        let mut cycle: Vec<String> = path[index..].iter().map(|n| n.to_string()).collect();
        cycle.push(node.to_string());
        return Some(cycle);
    }
    if finished.contains(node) {
        return None;
    }

    path.push(node);
    for &next in edges.get(node).map(Vec::as_slice).unwrap_or_default() {
        if let Some(cycle) = visit(next, edges, path, finished) {
            return Some(cycle);
        }
    }
    path.pop();
    finished.insert(node);
    None
}
