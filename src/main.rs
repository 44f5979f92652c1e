use std::{fs, io::Read, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use ll1_checker::{ConflictPolicy, Grammar};

/// Computes FIRST/FOLLOW sets and LL(1) tables, and checks sentences
/// against a grammar.
#[derive(Debug, Parser)]
#[command(name = "ll1-checker", author)]
struct Args {
    /// What to print, in order
    #[arg(value_enum, required = true)]
    outputs: Vec<Output>,

    /// Grammar file, read from stdin when absent
    #[arg(short = 'f', long = "grammar")]
    grammar: Option<PathBuf>,

    /// Sentence to check, words separated by whitespace
    #[arg(short, long)]
    sentence: Option<String>,

    /// Resolve table conflicts to the earliest production instead of failing
    #[arg(long)]
    keep_first: bool,

    /// Print in LaTeX format
    #[arg(short = 'l', long, conflicts_with = "json")]
    latex: bool,

    /// Print in JSON format
    #[arg(short = 'j', long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short = 'V', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Productions
    Prod,
    /// Nullable, first and follow
    Ff,
    /// LL(1) parsing table
    Ll1,
    /// Verdict and derivation for --sentence
    Parse,
}

enum OutputFormat {
    Plain,
    LaTeX,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    let output_format = if args.latex {
        OutputFormat::LaTeX
    } else if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Plain
    };

    let input = match &args.grammar {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    let g = Grammar::parse(&input)?;
    let first = g.compute_first();
    let follow = g.compute_follow(&first);
    let policy = if args.keep_first {
        ConflictPolicy::KeepFirst
    } else {
        ConflictPolicy::Reject
    };

    for output in &args.outputs {
        let text = match output {
            Output::Prod => {
                let t = g.to_production_output_vec();
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::Json => serde_json::to_string(&t)?,
                }
            }
            Output::Ff => {
                let t = g.to_first_follow_output_vec(&first, &follow);
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::Json => t.to_json()?,
                }
            }
            Output::Ll1 => {
                let table = g.build_ll1_table_with(&first, &follow, policy)?;
                let t = table.to_output(&g);
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::Json => serde_json::to_string(&t)?,
                }
            }
            Output::Parse => {
                let Some(sentence) = &args.sentence else {
                    bail!("parse needs a sentence, pass one with --sentence");
                };
                let table = g.build_ll1_table_with(&first, &follow, policy)?;
                let tokens: Vec<&str> = sentence.split_whitespace().collect();
                tracing::info!("checking {:?}", tokens);
                let outcome = table.parse(&g, &tokens);
                match output_format {
                    OutputFormat::Plain => outcome.to_plaintext(),
                    OutputFormat::LaTeX => outcome.to_latex(),
                    OutputFormat::Json => serde_json::to_string(&outcome)?,
                }
            }
        };
        println!("{}", text);
    }

    Ok(())
}
