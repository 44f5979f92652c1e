use std::collections::HashMap;

use super::{GrammarError, END_MARK, END_MARK_INDEX, EPSILON, EPSILON_INDEX};

#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    /// An empty production is the ε-production.
    pub productions: Vec<Vec<usize>>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Symbol {
    Epsilon,
    EndMark,
    NonTerminal(NonTerminal),
    Terminal(String),
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            _ => None,
        }
    }

    pub fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Grammar {
    pub symbols: Vec<Symbol>,
    pub symbol_table: HashMap<String, usize>,
    pub start_symbol: Option<usize>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        let mut g = Self {
            symbols: vec![Symbol::Epsilon, Symbol::EndMark],
            symbol_table: HashMap::new(),
            start_symbol: None,
        };
        g.symbol_table.insert(EPSILON.to_string(), EPSILON_INDEX);
        g.symbol_table.insert("ϵ".to_string(), EPSILON_INDEX);
        g.symbol_table.insert(END_MARK.to_string(), END_MARK_INDEX);
        g
    }

    /// Builds a grammar from `(nonterminal, alternatives)` pairs. The first
    /// key is the start symbol; every right-side name that is not a key is a
    /// terminal.
    pub fn from_rules<'a, R, P>(rules: R) -> Result<Self, GrammarError>
    where
        R: IntoIterator<Item = (&'a str, P)>,
        P: IntoIterator<Item = &'a [&'a str]>,
    {
        let mut g = Self::new();
        let mut raw: Vec<(usize, P)> = Vec::new();
        for (left, productions) in rules {
            let idx = match g.get_symbol_index(left) {
                Some(idx) if g.is_non_terminal(idx) => idx,
                Some(_) => return Err(GrammarError::ReservedSymbol(left.to_string())),
                None => g.add_non_terminal(left),
            };
            raw.push((idx, productions));
        }

        for (left, productions) in raw {
            for production in productions {
                let mut right = Vec::with_capacity(production.len());
                for name in production {
                    match g.get_symbol_index(name) {
                        Some(EPSILON_INDEX) => continue,
                        Some(END_MARK_INDEX) => {
                            return Err(GrammarError::ReservedSymbol(END_MARK.to_string()))
                        }
                        Some(idx) => right.push(idx),
                        None => right.push(g.add_terminal(name.to_string())),
                    }
                }
                g.add_production(left, right);
            }
        }

        let start_symbol = g.non_terminal_iter().next().map(|nt| nt.index);
        g.start_symbol = start_symbol;
        g.validate()?;
        Ok(g)
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = &String> {
        self.symbols.iter().filter_map(|s| {
            if let Symbol::Terminal(name) = s {
                Some(name)
            } else {
                None
            }
        })
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.symbols.iter().filter_map(|s| s.non_terminal())
    }

    pub fn non_terminal(&self, index: usize) -> Option<&NonTerminal> {
        self.symbols.get(index).and_then(|s| s.non_terminal())
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        matches!(self.symbols.get(index), Some(Symbol::Terminal(_)))
    }

    pub fn is_non_terminal(&self, index: usize) -> bool {
        matches!(self.symbols.get(index), Some(Symbol::NonTerminal(_)))
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    /// Index of `name` only if it is a terminal.
    pub fn get_terminal_index(&self, name: &str) -> Option<usize> {
        self.get_symbol_index(name)
            .filter(|idx| self.is_terminal(*idx))
    }

    pub fn add_non_terminal(&mut self, name: &str) -> usize {
        let idx = self.symbols.len();
        self.symbols
            .push(Symbol::NonTerminal(NonTerminal::new(idx, name.to_string())));
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    pub fn add_terminal(&mut self, name: String) -> usize {
        let idx = self.symbols.len();
        self.symbols.push(Symbol::Terminal(name.clone()));
        self.symbol_table.insert(name, idx);
        idx
    }

    /// Appends `right` to the alternatives of `left`. Does nothing if `left`
    /// is not a nonterminal.
    pub fn add_production(&mut self, left: usize, right: Vec<usize>) {
        if let Some(nt) = self.symbols[left].mut_non_terminal() {
            nt.productions.push(right);
        }
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        match &self.symbols[index] {
            Symbol::Epsilon => EPSILON,
            Symbol::EndMark => END_MARK,
            Symbol::NonTerminal(e) => e.name.as_str(),
            Symbol::Terminal(e) => e.as_str(),
        }
    }

    pub fn start_symbol(&self) -> Option<usize> {
        self.start_symbol
    }

    pub fn production_to_vec_str(&self, production: &[usize]) -> Vec<&str> {
        if production.is_empty() {
            vec![EPSILON]
        } else {
            production
                .iter()
                .map(|idx| self.get_symbol_name(*idx))
                .collect()
        }
    }

    /// `A → X Y`, or `A → ε` for the empty production.
    pub fn production_to_string(&self, left: usize, production: &[usize]) -> String {
        format!(
            "{} → {}",
            self.get_symbol_name(left),
            self.production_to_vec_str(production).join(" ")
        )
    }

    /// Every nonterminal that shows up on a right side must have at least one
    /// production of its own.
    pub fn validate(&self) -> Result<(), GrammarError> {
        if self.start_symbol.is_none() {
            return Err(GrammarError::MissingStartSymbol);
        }

        for nt in self.non_terminal_iter() {
            for idx in nt.productions.iter().flatten() {
                if let Some(referenced) = self.non_terminal(*idx) {
                    if referenced.productions.is_empty() {
                        return Err(GrammarError::UndefinedSymbol {
                            symbol: referenced.name.clone(),
                            non_terminal: nt.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_slots() {
        let g = Grammar::new();
        assert_eq!(g.get_symbol_name(EPSILON_INDEX), EPSILON);
        assert_eq!(g.get_symbol_name(END_MARK_INDEX), END_MARK);
        assert!(!g.is_terminal(EPSILON_INDEX));
        assert!(!g.is_non_terminal(END_MARK_INDEX));
        assert_eq!(g.get_symbol_index("ϵ"), Some(EPSILON_INDEX));
    }

    #[test]
    fn from_rules_classifies_by_keys() {
        let g = Grammar::from_rules([
            ("S", vec![&["A", "b"][..]]),
            ("A", vec![&["a"][..], &["ε"][..]]),
        ])
        .unwrap();

        let s = g.get_symbol_index("S").unwrap();
        let a = g.get_symbol_index("A").unwrap();
        assert_eq!(g.start_symbol(), Some(s));
        assert!(g.is_non_terminal(a));
        assert!(g.is_terminal(g.get_symbol_index("b").unwrap()));
        assert_eq!(g.non_terminal(a).unwrap().productions[1], Vec::<usize>::new());
        assert_eq!(g.production_to_string(a, &[]), "A → ε");
        assert_eq!(g.terminal_iter().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn undefined_non_terminal_is_reported() {
        let mut g = Grammar::new();
        let s = g.add_non_terminal("S");
        let x = g.add_non_terminal("X");
        g.add_production(s, vec![x]);
        g.start_symbol = Some(s);

        assert_eq!(
            g.validate(),
            Err(GrammarError::UndefinedSymbol {
                symbol: "X".to_string(),
                non_terminal: "S".to_string(),
            })
        );
    }

    #[test]
    fn empty_grammar_has_no_start() {
        assert_eq!(Grammar::new().validate(), Err(GrammarError::MissingStartSymbol));
    }
}
