pub mod error;
pub mod first;
pub mod follow;
pub mod grammar;
pub mod ll1_parser;
pub mod ll1_table;
pub mod parse;
pub mod pretty_print;

pub use error::GrammarError;
pub use first::FirstSets;
pub use follow::FollowSets;
pub use grammar::Grammar;
pub use ll1_parser::{ParseFailure, ParseOutcome};
pub use ll1_table::{Conflict, ConflictPolicy, LL1Table};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";

/// Arena slot of ε in every grammar.
pub const EPSILON_INDEX: usize = 0;
/// Arena slot of `$` in every grammar.
pub const END_MARK_INDEX: usize = 1;
