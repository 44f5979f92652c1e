use std::collections::HashSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    FirstSets, FollowSets, Grammar, LL1Table, ParseOutcome, END_MARK, END_MARK_INDEX, EPSILON,
};

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminal_set: &HashSet<&str>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| {
                        if *s == EPSILON {
                            "\\epsilon".to_string()
                        } else if terminal_set.contains(s) {
                            format!("\\text{{{}}}", escape::tex(*s))
                        } else {
                            escape::tex(*s).to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
    #[serde(skip)]
    terminals: HashSet<&'a str>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex(true, &self.terminals)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|nt| ProductionOutput {
                left: nt.name.as_str(),
                rights: nt
                    .productions
                    .iter()
                    .map(|production| self.production_to_vec_str(production))
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminals: self.terminal_iter().map(|t| t.as_str()).collect(),
        }
    }
}

#[derive(Serialize)]
struct FirstFollowOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl FirstFollowOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[&str]) -> String {
            a.iter()
                .map(|s| match *s {
                    EPSILON => r"$\epsilon$".to_string(),
                    END_MARK => r"\$".to_string(),
                    s => escape::tex(s).to_string(),
                })
                .collect::<Vec<_>>()
                .join(r"\ ")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct FirstFollowOutputVec<'a> {
    data: Vec<FirstFollowOutput<'a>>,
}

impl FirstFollowOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_first_follow_output_vec<'a>(
        &'a self,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> FirstFollowOutputVec<'a> {
        let first_named = first.named(self);
        let follow_named = follow.named(self);

        let data = self
            .non_terminal_iter()
            .map(|nt| {
                let name = nt.name.as_str();
                // ε sorts last, as in the usual textbook layout.
                let mut first: Vec<&str> = first_named
                    .get(name)
                    .map(|s| s.iter().cloned().filter(|s| *s != EPSILON).collect())
                    .unwrap_or_default();
                let nullable = first_named.get(name).is_some_and(|s| s.contains(EPSILON));
                if nullable {
                    first.push(EPSILON);
                }
                FirstFollowOutput {
                    name,
                    nullable,
                    first,
                    follow: follow_named
                        .get(name)
                        .map(|s| s.iter().cloned().collect())
                        .unwrap_or_default(),
                }
            })
            .collect();
        FirstFollowOutputVec { data }
    }
}

#[derive(Serialize)]
pub struct LL1ParsingTableOutput<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<ProductionOutput<'a>>)>,
    conflicts: Vec<String>,
}

impl LL1ParsingTableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(
                row.iter()
                    .map(|productions| productions.to_plaintext(left.chars().count(), false)),
            );
            output.push(line);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| {
                output
                    .iter()
                    .map(|line| line[j].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let table = output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n");

        if self.conflicts.is_empty() {
            table
        } else {
            format!("{}\n\nconflicts:\n{}", table, self.conflicts.join("\n"))
        }
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(self.terminals.iter().map(|&t| match t {
            END_MARK => r"\$".to_string(),
            t => format!("\\text{{{}}}", escape::tex(t)),
        }));
        let header = header.join(" & ");

        let terminal_set: HashSet<&str> = self.terminals.iter().cloned().collect();
        let mut output: Vec<String> = Vec::new();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![escape::tex(*left).to_string()];
            line.extend(row.iter().map(|productions| {
                let cell = productions.to_latex(false, &terminal_set);
                if productions.rights.len() > 1 {
                    format!("{{\\color{{red}}{}}}", cell)
                } else {
                    cell
                }
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl LL1Table {
    /// Rows follow grammar order, columns are the terminals followed by `$`.
    pub fn to_output<'a>(&self, g: &'a Grammar) -> LL1ParsingTableOutput<'a> {
        let columns: Vec<usize> = g
            .terminal_iter()
            .filter_map(|t| g.get_terminal_index(t))
            .chain(std::iter::once(END_MARK_INDEX))
            .collect();
        let terminals: Vec<&str> = columns.iter().map(|idx| g.get_symbol_name(*idx)).collect();

        let rows = g
            .non_terminal_iter()
            .map(|nt| {
                let left = nt.name.as_str();
                let row = columns
                    .iter()
                    .map(|lookahead| ProductionOutput {
                        left,
                        rights: self
                            .candidates(nt.index, *lookahead)
                            .iter()
                            .map(|i| g.production_to_vec_str(&nt.productions[*i]))
                            .collect(),
                    })
                    .collect();
                (left, row)
            })
            .collect();

        LL1ParsingTableOutput {
            terminals,
            rows,
            conflicts: self.conflicts().iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ParseOutcome {
    pub fn to_plaintext(&self) -> String {
        let mut output = vec![if self.accepted {
            "accepted".to_string()
        } else {
            "rejected".to_string()
        }];
        output.extend(self.derivation.iter().map(|step| format!("  {}", step)));
        if let Some(failure) = &self.failure {
            output.push(format!("error: {}", failure));
        }
        output.join("\n")
    }

    pub fn to_latex(&self) -> String {
        let steps = self
            .derivation
            .iter()
            .filter_map(|step| step.split_once(" → "))
            .map(|(left, right)| {
                format!(
                    "{} & \\rightarrow & {}",
                    escape::tex(left),
                    escape::tex(right).replace(EPSILON, "\\epsilon")
                )
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");
        let verdict = match &self.failure {
            None => "\\text{accepted}".to_string(),
            Some(failure) => format!("\\text{{rejected: {}}}", escape::tex(failure.to_string())),
        };
        format!("\\[\\begin{{array}}{{cll}}\n{}\n\\end{{array}}\\]\n{}", steps, verdict)
    }
}
