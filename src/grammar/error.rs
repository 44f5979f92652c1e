//! Structural errors: the grammar itself cannot be used.

use thiserror::Error;

use super::ll1_table::Conflict;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Malformed grammar text
    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A nonterminal is used on a right side but never defined
    #[error("undefined symbol \"{symbol}\" in a production of {non_terminal}")]
    UndefinedSymbol {
        symbol: String,
        non_terminal: String,
    },

    /// ε or $ used where only grammar symbols are allowed
    #[error("\"{0}\" is reserved and cannot be used as a grammar symbol")]
    ReservedSymbol(String),

    /// The grammar has no nonterminal to start from
    #[error("grammar has no start symbol")]
    MissingStartSymbol,

    /// Two or more productions claim the same table cell
    #[error("grammar is not LL(1): {}", format_conflicts(.0))]
    TableConflict(Vec<Conflict>),
}

fn format_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
