use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::{grammar::Symbol, Grammar, EPSILON_INDEX};

/// FIRST set of every nonterminal. Entries are terminal indices plus
/// possibly [`EPSILON_INDEX`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirstSets {
    sets: HashMap<usize, HashSet<usize>>,
}

impl FirstSets {
    pub fn get(&self, non_terminal: usize) -> Option<&HashSet<usize>> {
        self.sets.get(&non_terminal)
    }

    pub fn is_nullable(&self, non_terminal: usize) -> bool {
        self.get(non_terminal)
            .is_some_and(|first| first.contains(&EPSILON_INDEX))
    }

    pub fn of_symbol(&self, g: &Grammar, symbol: usize) -> HashSet<usize> {
        match &g.symbols[symbol] {
            Symbol::NonTerminal(_) => self.get(symbol).cloned().unwrap_or_default(),
            _ => HashSet::from([symbol]),
        }
    }

    /// FIRST of a symbol string, scanning left to right while the symbols can
    /// vanish. An empty production yields `{ε}`.
    pub fn of_production(&self, g: &Grammar, production: &[usize]) -> HashSet<usize> {
        first_of_sequence(production, |idx| self.of_symbol(g, idx))
    }

    /// Sets keyed and sorted by name.
    pub fn named<'a>(&self, g: &'a Grammar) -> BTreeMap<&'a str, BTreeSet<&'a str>> {
        self.sets
            .iter()
            .map(|(nt, first)| {
                (
                    g.get_symbol_name(*nt),
                    first.iter().map(|idx| g.get_symbol_name(*idx)).collect(),
                )
            })
            .collect()
    }
}

fn first_of_sequence(
    production: &[usize],
    mut first_of: impl FnMut(usize) -> HashSet<usize>,
) -> HashSet<usize> {
    let mut first: HashSet<usize> = HashSet::new();
    for idx in production {
        let symbol_first = first_of(*idx);
        first.extend(symbol_first.iter().filter(|s| **s != EPSILON_INDEX));
        if !symbol_first.contains(&EPSILON_INDEX) {
            return first;
        }
    }
    first.insert(EPSILON_INDEX);
    first
}

struct FirstPass<'g> {
    grammar: &'g Grammar,
    memo: HashMap<usize, HashSet<usize>>,
    visiting: HashSet<usize>,
    done: HashSet<usize>,
}

impl FirstPass<'_> {
    fn first_of(&mut self, symbol: usize) -> HashSet<usize> {
        let grammar = self.grammar;
        let nt = match grammar.non_terminal(symbol) {
            Some(nt) => nt,
            None => return HashSet::from([symbol]),
        };

        // Re-entry while still in progress sees the current approximation.
        if self.done.contains(&symbol) || self.visiting.contains(&symbol) {
            return self.memo.get(&symbol).cloned().unwrap_or_default();
        }

        self.visiting.insert(symbol);
        let mut result: HashSet<usize> = HashSet::new();
        for production in &nt.productions {
            result.extend(first_of_sequence(production, |idx| self.first_of(idx)));
        }
        self.visiting.remove(&symbol);
        self.done.insert(symbol);

        let entry = self.memo.entry(symbol).or_default();
        entry.extend(result);
        entry.clone()
    }
}

impl Grammar {
    pub fn compute_first(&self) -> FirstSets {
        let mut pass = FirstPass {
            grammar: self,
            memo: HashMap::new(),
            visiting: HashSet::new(),
            done: HashSet::new(),
        };

        let non_terminals: Vec<usize> = self.non_terminal_iter().map(|nt| nt.index).collect();
        let mut passes = 0;
        loop {
            passes += 1;
            let before: usize = pass.memo.values().map(|s| s.len()).sum();
            pass.done.clear();
            for nt in &non_terminals {
                pass.first_of(*nt);
            }
            let after: usize = pass.memo.values().map(|s| s.len()).sum();
            if before == after {
                break;
            }
        }
        tracing::debug!("FIRST sets converged after {} passes", passes);

        FirstSets { sets: pass.memo }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::Grammar;

    fn first_of<'a>(g: &'a Grammar, name: &str) -> BTreeSet<&'a str> {
        let first = g.compute_first();
        first.named(g).remove(name).unwrap()
    }

    #[test]
    fn terminals_and_epsilon() {
        let g = Grammar::parse(
            "E -> T E'
             E' -> + T E' | ε
             T -> F T'
             T' -> * F T' | ε
             F -> ( E ) | id",
        )
        .unwrap();

        assert_eq!(first_of(&g, "E"), BTreeSet::from(["(", "id"]));
        assert_eq!(first_of(&g, "E'"), BTreeSet::from(["+", "ε"]));
        assert_eq!(first_of(&g, "T'"), BTreeSet::from(["*", "ε"]));
    }

    #[test]
    fn nullable_prefix_propagates() {
        let g = Grammar::parse("S -> A B c\nA -> a | ε\nB -> b | ε").unwrap();
        assert_eq!(first_of(&g, "S"), BTreeSet::from(["a", "b", "c"]));

        let g = Grammar::parse("S -> A B\nA -> a | ε\nB -> ε").unwrap();
        assert_eq!(first_of(&g, "S"), BTreeSet::from(["a", "ε"]));
    }

    #[test]
    fn left_recursion_terminates() {
        let g = Grammar::parse("E -> E + T | T\nT -> id").unwrap();
        assert_eq!(first_of(&g, "E"), BTreeSet::from(["id"]));
    }

    #[test]
    fn mutual_recursion_reaches_fixed_point() {
        let g = Grammar::parse("A -> B x | y\nB -> A z | ε").unwrap();
        assert_eq!(first_of(&g, "A"), BTreeSet::from(["x", "y"]));
        assert_eq!(first_of(&g, "B"), BTreeSet::from(["x", "y", "ε"]));
    }

    #[test]
    fn only_terminals_or_epsilon() {
        let g = Grammar::parse(include_str!("../../demos/english.grammar")).unwrap();
        let first = g.compute_first();
        for nt in g.non_terminal_iter() {
            for idx in first.get(nt.index).unwrap() {
                assert!(!g.is_non_terminal(*idx), "{} in FIRST({})", idx, nt.name);
            }
        }
    }

    #[test]
    fn deterministic_under_reordering() {
        let a = Grammar::parse("S -> A b | c\nA -> a | ε").unwrap();
        let b = Grammar::parse("S -> c | A b\nA -> ε | a").unwrap();
        assert_eq!(a.compute_first(), a.compute_first());
        assert_eq!(a.compute_first().named(&a), b.compute_first().named(&b));
    }
}
