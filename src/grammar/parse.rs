use std::collections::HashSet;

use crate::Grammar;

use super::{GrammarError, END_MARK_INDEX, EPSILON_INDEX};

fn syntax_error(line: usize, message: impl Into<String>) -> GrammarError {
    GrammarError::Syntax {
        line: line + 1,
        message: message.into(),
    }
}

impl Grammar {
    /// Loads a grammar written as `A -> x y | z` rules.
    ///
    /// `%token a b c` declares terminals and `%start X` picks the start
    /// symbol. Once any `%token` line is present, a right-side name that is
    /// neither a left side nor a declared token is an undefined symbol.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut g = Self::new();

        let mut raw_productions: Vec<(usize, usize, &str)> = Vec::new();
        let mut tokens: Vec<(usize, &str)> = Vec::new();
        let mut start: Option<(usize, &str)> = None;

        let mut previous_left: Option<usize> = None;
        for (i, line) in grammar.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(directive) = line.strip_prefix('%') {
                let mut words = directive.split_whitespace();
                match words.next() {
                    Some("token") => tokens.extend(words.map(|w| (i, w))),
                    Some("start") => match (words.next(), words.next()) {
                        (Some(name), None) => start = Some((i, name)),
                        _ => return Err(syntax_error(i, "%start takes exactly one symbol")),
                    },
                    other => {
                        return Err(syntax_error(
                            i,
                            format!("unknown directive \"%{}\"", other.unwrap_or_default()),
                        ))
                    }
                }
                continue;
            }

            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(syntax_error(i, "too many \"->\""));
            }
            let (left, rights): (usize, &str) = if parts.len() == 2 {
                let left_str = parts[0].trim();
                if left_str.is_empty() {
                    return Err(syntax_error(i, "empty left side"));
                } else if left_str.split_whitespace().count() != 1 {
                    return Err(syntax_error(i, "left side contains whitespace"));
                }
                let idx = match g.get_symbol_index(left_str) {
                    Some(idx) if g.is_non_terminal(idx) => idx,
                    Some(_) => return Err(GrammarError::ReservedSymbol(left_str.to_string())),
                    None => g.add_non_terminal(left_str),
                };
                (idx, parts[1].trim())
            } else {
                match (previous_left, parts[0].strip_prefix('|')) {
                    (Some(idx), Some(rest)) => (idx, rest.trim()),
                    _ => return Err(syntax_error(i, "cannot find left side")),
                }
            };

            previous_left = Some(left);
            raw_productions.push((i, left, rights));
        }

        let strict = !tokens.is_empty();
        for (i, name) in tokens {
            match g.get_symbol_index(name) {
                None => {
                    g.add_terminal(name.to_string());
                }
                Some(idx) if g.is_terminal(idx) => {}
                Some(idx) if g.is_non_terminal(idx) => {
                    return Err(syntax_error(
                        i,
                        format!("\"{}\" is declared as a token and defined as a nonterminal", name),
                    ))
                }
                Some(_) => return Err(GrammarError::ReservedSymbol(name.to_string())),
            }
        }

        for (i, left, rights) in raw_productions {
            for right in rights.split('|') {
                let mut symbols = Vec::new();
                for s in right.split_whitespace() {
                    match g.get_symbol_index(s) {
                        Some(EPSILON_INDEX) => {}
                        Some(END_MARK_INDEX) => {
                            return Err(GrammarError::ReservedSymbol(s.to_string()))
                        }
                        Some(idx) => symbols.push(idx),
                        None if strict => {
                            return Err(GrammarError::UndefinedSymbol {
                                symbol: s.to_string(),
                                non_terminal: g.get_symbol_name(left).to_string(),
                            })
                        }
                        None => symbols.push(g.add_terminal(s.to_string())),
                    }
                }
                if symbols.is_empty() && right.split_whitespace().next().is_none() {
                    return Err(syntax_error(i, "empty alternative, write ε instead"));
                }
                g.add_production(left, symbols);
            }
        }

        g.start_symbol = match start {
            Some((i, name)) => match g.get_symbol_index(name) {
                Some(idx) if g.is_non_terminal(idx) => Some(idx),
                _ => return Err(syntax_error(i, format!("unknown start symbol \"{}\"", name))),
            },
            None => g.non_terminal_iter().next().map(|nt| nt.index),
        };

        Ok(g)
    }
}
