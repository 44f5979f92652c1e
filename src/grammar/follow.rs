use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::{FirstSets, Grammar, END_MARK_INDEX, EPSILON_INDEX};

/// FOLLOW set of every nonterminal. Entries are terminal indices plus
/// possibly [`END_MARK_INDEX`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FollowSets {
    sets: HashMap<usize, HashSet<usize>>,
}

impl FollowSets {
    pub fn get(&self, non_terminal: usize) -> Option<&HashSet<usize>> {
        self.sets.get(&non_terminal)
    }

    /// Sets keyed and sorted by name.
    pub fn named<'a>(&self, g: &'a Grammar) -> BTreeMap<&'a str, BTreeSet<&'a str>> {
        self.sets
            .iter()
            .map(|(nt, follow)| {
                (
                    g.get_symbol_name(*nt),
                    follow.iter().map(|idx| g.get_symbol_name(*idx)).collect(),
                )
            })
            .collect()
    }
}

impl Grammar {
    pub fn compute_follow(&self, first: &FirstSets) -> FollowSets {
        let mut follow: HashMap<usize, HashSet<usize>> = self
            .non_terminal_iter()
            .map(|nt| (nt.index, HashSet::new()))
            .collect();

        let start = match self.start_symbol {
            Some(start) => start,
            None => return FollowSets { sets: follow },
        };
        follow.entry(start).or_default().insert(END_MARK_INDEX);

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for left in self.non_terminal_iter() {
                for production in &left.productions {
                    let mut trailer = follow.get(&left.index).cloned().unwrap_or_default();
                    for idx in production.iter().rev() {
                        if !self.is_non_terminal(*idx) {
                            trailer = HashSet::from([*idx]);
                            continue;
                        }

                        let target = follow.entry(*idx).or_default();
                        let len = target.len();
                        target.extend(trailer.iter().cloned());
                        changed |= target.len() != len;

                        let symbol_first = first.of_symbol(self, *idx);
                        if symbol_first.contains(&EPSILON_INDEX) {
                            trailer.extend(symbol_first.into_iter().filter(|s| *s != EPSILON_INDEX));
                        } else {
                            trailer = symbol_first;
                        }
                    }
                }
            }
        }
        tracing::debug!("FOLLOW sets converged after {} passes", passes);

        FollowSets { sets: follow }
    }
}
