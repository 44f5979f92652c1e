use serde::Serialize;
use thiserror::Error;

use super::{grammar::Symbol, Grammar, LL1Table, END_MARK, END_MARK_INDEX};

/// Why a sentence was rejected. Positions are token offsets, the end marker
/// sitting one past the last token.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseFailure {
    #[error("no production for {non_terminal} on \"{lookahead}\" at token {position}")]
    NoProduction {
        non_terminal: String,
        lookahead: String,
        position: usize,
    },

    #[error("expected \"{expected}\" but found \"{found}\" at token {position}")]
    Mismatch {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("input ended at token {position} while \"{expected}\" was expected")]
    Underrun { expected: String, position: usize },

    #[error("unexpected trailing input \"{found}\" at token {position}")]
    Overrun { found: String, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    pub accepted: bool,
    /// Productions applied, leftmost first, as `N → X Y`.
    pub derivation: Vec<String>,
    pub failure: Option<ParseFailure>,
}

impl ParseOutcome {
    fn rejected(derivation: Vec<String>, failure: ParseFailure) -> Self {
        tracing::debug!("rejected: {}", failure);
        Self {
            accepted: false,
            derivation,
            failure: Some(failure),
        }
    }
}

impl LL1Table {
    /// Runs the predictive parser over `tokens`. The end marker is appended
    /// here; a `$` inside `tokens` is an ordinary, unknown word.
    pub fn parse<S: AsRef<str>>(&self, g: &Grammar, tokens: &[S]) -> ParseOutcome {
        let input: Vec<(Option<usize>, &str)> = tokens
            .iter()
            .map(|t| (g.get_terminal_index(t.as_ref()), t.as_ref()))
            .chain(std::iter::once((Some(END_MARK_INDEX), END_MARK)))
            .collect();

        let mut stack: Vec<usize> = vec![END_MARK_INDEX, self.start()];
        let mut cursor: usize = 0;
        let mut derivation: Vec<String> = Vec::new();

        while let Some(&top) = stack.last() {
            let (lookahead, word) = input[cursor];

            if Some(top) == lookahead {
                tracing::trace!("match \"{}\"", word);
                stack.pop();
                cursor += 1;
                continue;
            }

            let failure = match &g.symbols[top] {
                Symbol::NonTerminal(nt) => {
                    let chosen = lookahead.and_then(|t| self.production(top, t));
                    if let Some(i) = chosen {
                        let production = &nt.productions[i];
                        let step = g.production_to_string(top, production);
                        tracing::trace!("expand {}", step);
                        derivation.push(step);
                        stack.pop();
                        stack.extend(production.iter().rev());
                        continue;
                    }
                    ParseFailure::NoProduction {
                        non_terminal: nt.name.clone(),
                        lookahead: word.to_string(),
                        position: cursor,
                    }
                }
                Symbol::EndMark => ParseFailure::Overrun {
                    found: word.to_string(),
                    position: cursor,
                },
                _ if lookahead == Some(END_MARK_INDEX) => ParseFailure::Underrun {
                    expected: g.get_symbol_name(top).to_string(),
                    position: cursor,
                },
                _ => ParseFailure::Mismatch {
                    expected: g.get_symbol_name(top).to_string(),
                    found: word.to_string(),
                    position: cursor,
                },
            };
            return ParseOutcome::rejected(derivation, failure);
        }

        if cursor != input.len() {
            let (_, word) = input[cursor];
            return ParseOutcome::rejected(
                derivation,
                ParseFailure::Overrun {
                    found: word.to_string(),
                    position: cursor,
                },
            );
        }

        ParseOutcome {
            accepted: true,
            derivation,
            failure: None,
        }
    }
}
