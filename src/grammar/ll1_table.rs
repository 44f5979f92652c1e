use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::{FirstSets, FollowSets, Grammar, GrammarError, EPSILON_INDEX};

/// Several productions of one nonterminal claim the same lookahead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub non_terminal: String,
    pub lookahead: String,
    pub productions: Vec<String>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M[{}, {}] = {{{}}}",
            self.non_terminal,
            self.lookahead,
            self.productions.join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Refuse to build a table for a grammar that is not LL(1).
    #[default]
    Reject,
    /// Keep the earliest production of each conflicting cell.
    KeepFirst,
}

/// Predictive parsing table. Cells hold indices into the owning
/// nonterminal's production list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LL1Table {
    start: usize,
    cells: BTreeMap<(usize, usize), Vec<usize>>,
    conflicts: Vec<Conflict>,
}

impl LL1Table {
    pub fn start(&self) -> usize {
        self.start
    }

    /// The production chosen for `non_terminal` on `lookahead`.
    pub fn production(&self, non_terminal: usize, lookahead: usize) -> Option<usize> {
        self.cells
            .get(&(non_terminal, lookahead))
            .and_then(|candidates| candidates.first().cloned())
    }

    /// Every production that claimed the cell, in grammar order.
    pub fn candidates(&self, non_terminal: usize, lookahead: usize) -> &[usize] {
        self.cells
            .get(&(non_terminal, lookahead))
            .map(|c| c.as_slice())
            .unwrap_or_default()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }
}

impl Grammar {
    pub fn build_ll1_table(
        &self,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> Result<LL1Table, GrammarError> {
        self.build_ll1_table_with(first, follow, ConflictPolicy::Reject)
    }

    pub fn build_ll1_table_with(
        &self,
        first: &FirstSets,
        follow: &FollowSets,
        policy: ConflictPolicy,
    ) -> Result<LL1Table, GrammarError> {
        self.validate()?;
        let start = self.start_symbol.ok_or(GrammarError::MissingStartSymbol)?;

        let mut cells: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
        for nt in self.non_terminal_iter() {
            for (i, production) in nt.productions.iter().enumerate() {
                let production_first = first.of_production(self, production);

                let mut lookaheads: Vec<usize> = production_first
                    .iter()
                    .filter(|idx| **idx != EPSILON_INDEX)
                    .cloned()
                    .collect();
                if production_first.contains(&EPSILON_INDEX) {
                    if let Some(nt_follow) = follow.get(nt.index) {
                        lookaheads.extend(nt_follow.iter().cloned());
                    }
                }

                for lookahead in lookaheads {
                    let cell = cells.entry((nt.index, lookahead)).or_default();
                    if !cell.contains(&i) {
                        cell.push(i);
                    }
                }
            }
        }

        let conflicts: Vec<Conflict> = cells
            .iter()
            .filter(|(_, candidates)| candidates.len() > 1)
            .map(|(&(nt, lookahead), candidates)| {
                let productions = self.symbols[nt]
                    .non_terminal()
                    .map(|e| e.productions.as_slice())
                    .unwrap_or_default();
                Conflict {
                    non_terminal: self.get_symbol_name(nt).to_string(),
                    lookahead: self.get_symbol_name(lookahead).to_string(),
                    productions: candidates
                        .iter()
                        .map(|i| self.production_to_string(nt, &productions[*i]))
                        .collect(),
                }
            })
            .collect();

        if !conflicts.is_empty() {
            match policy {
                ConflictPolicy::Reject => return Err(GrammarError::TableConflict(conflicts)),
                ConflictPolicy::KeepFirst => {
                    for conflict in &conflicts {
                        tracing::warn!("keeping {} for {}", conflict.productions[0], conflict);
                    }
                }
            }
        }

        tracing::debug!(
            "built LL(1) table with {} cells, {} conflicts",
            cells.len(),
            conflicts.len()
        );

        Ok(LL1Table {
            start,
            cells,
            conflicts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str, policy: ConflictPolicy) -> Result<(Grammar, LL1Table), GrammarError> {
        let g = Grammar::parse(text)?;
        let first = g.compute_first();
        let follow = g.compute_follow(&first);
        let t = g.build_ll1_table_with(&first, &follow, policy)?;
        Ok((g, t))
    }

    #[test]
    fn epsilon_production_goes_under_follow() {
        let (g, t) = table("S -> A b\nA -> a | ε", ConflictPolicy::Reject).unwrap();
        let a = g.get_symbol_index("A").unwrap();
        assert_eq!(t.production(a, g.get_symbol_index("a").unwrap()), Some(0));
        assert_eq!(t.production(a, g.get_symbol_index("b").unwrap()), Some(1));
        assert_eq!(t.production(a, crate::grammar::END_MARK_INDEX), None);
        assert!(t.is_ll1());
    }

    #[test]
    fn conflict_is_reported_with_both_productions() {
        let err = table("S -> a b | a c", ConflictPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            GrammarError::TableConflict(vec![Conflict {
                non_terminal: "S".to_string(),
                lookahead: "a".to_string(),
                productions: vec!["S → a b".to_string(), "S → a c".to_string()],
            }])
        );
    }

    #[test]
    fn first_follow_conflict() {
        // FIRST(A b) and FOLLOW(A) both contain b.
        let err = table("S -> A b\nA -> b | ε", ConflictPolicy::Reject).unwrap_err();
        match err {
            GrammarError::TableConflict(conflicts) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].non_terminal, "A");
                assert_eq!(conflicts[0].lookahead, "b");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn keep_first_resolves_to_earliest() {
        let (g, t) = table("S -> a b | a c", ConflictPolicy::KeepFirst).unwrap();
        let s = g.get_symbol_index("S").unwrap();
        let a = g.get_symbol_index("a").unwrap();
        assert_eq!(t.candidates(s, a), &[0, 1]);
        assert_eq!(t.production(s, a), Some(0));
        assert!(!t.is_ll1());
    }

    #[test]
    fn undefined_symbol_aborts_construction() {
        let mut g = Grammar::new();
        let s = g.add_non_terminal("S");
        let x = g.add_non_terminal("X");
        g.add_production(s, vec![x]);
        g.start_symbol = Some(s);
        let first = g.compute_first();
        let follow = g.compute_follow(&first);
        assert!(matches!(
            g.build_ll1_table(&first, &follow),
            Err(GrammarError::UndefinedSymbol { .. })
        ));
    }

    #[test]
    fn idempotent() {
        let g = Grammar::parse(include_str!("../../demos/english.grammar")).unwrap();
        let first = g.compute_first();
        let follow = g.compute_follow(&first);
        assert_eq!(
            g.build_ll1_table(&first, &follow).unwrap(),
            g.build_ll1_table(&first, &follow).unwrap()
        );
    }
}
