extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{
    Conflict, ConflictPolicy, FirstSets, FollowSets, Grammar, GrammarError, LL1Table,
    ParseFailure, ParseOutcome,
};

/// Loads `grammar`, builds its LL(1) table and parses the whitespace
/// separated words of `sentence`.
pub fn check_sentence(grammar: &str, sentence: &str) -> Result<ParseOutcome, GrammarError> {
    let g = Grammar::parse(grammar)?;
    let first = g.compute_first();
    let follow = g.compute_follow(&first);
    let table = g.build_ll1_table(&first, &follow)?;
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    Ok(table.parse(&g, &tokens))
}

fn error_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    match Grammar::parse(grammar) {
        Ok(g) => {
            let first = g.compute_first();
            let follow = g.compute_follow(&first);
            g.to_first_follow_output_vec(&first, &follow)
                .to_json()
                .unwrap_or_else(error_json)
        }
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    let g = match Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_json(e),
    };
    let first = g.compute_first();
    let follow = g.compute_follow(&first);
    match g.build_ll1_table_with(&first, &follow, ConflictPolicy::KeepFirst) {
        Ok(table) => serde_json::to_string(&table.to_output(&g)).unwrap_or_else(error_json),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn check_sentence_to_json(grammar: &str, sentence: &str) -> String {
    match check_sentence(grammar, sentence) {
        Ok(outcome) => serde_json::to_string(&outcome).unwrap_or_else(error_json),
        Err(e) => error_json(e),
    }
}


#[cfg(test)]
mod check_sentence_tests {
    use crate::{check_sentence, GrammarError, ParseFailure};

    const ENGLISH: &str = include_str!("../demos/english.grammar");

    // The unfactored verb phrase: both VP alternatives start with V.
    const ENGLISH_AMBIGUOUS: &str = "S -> NP VP
NP -> Det N | PN
VP -> V NP | V PP
PP -> P NP
Det -> the | a | an
N -> man | dog | cat | ball | house
PN -> John | Mary
V -> hit | saw | kicked | ran | ate
P -> with | in | on | at";

    #[test]
    fn accepts_sentences() {
        let outcome = check_sentence(ENGLISH, "the man hit the ball").unwrap();
        assert!(outcome.accepted);
        assert_eq!(&outcome.derivation[..2], &["S → NP VP", "NP → Det N"]);

        assert!(check_sentence(ENGLISH, "John saw a cat").unwrap().accepted);
    }

    #[test]
    fn rejects_sentences() {
        let outcome = check_sentence(ENGLISH, "the hit man").unwrap();
        assert!(!outcome.accepted);
        assert!(matches!(
            outcome.failure,
            Some(ParseFailure::NoProduction { .. }) | Some(ParseFailure::Mismatch { .. })
        ));

        let outcome = check_sentence(ENGLISH, "   ").unwrap();
        assert!(!outcome.accepted);
        assert!(matches!(
            outcome.failure,
            Some(ParseFailure::NoProduction { ref non_terminal, .. }) if non_terminal == "S"
        ));
    }

    #[test]
    fn ambiguous_grammar_is_refused() {
        match check_sentence(ENGLISH_AMBIGUOUS, "the man hit the ball") {
            Err(GrammarError::TableConflict(conflicts)) => {
                assert_eq!(conflicts.len(), 5);
                assert!(conflicts.iter().all(|c| c.non_terminal == "VP"));
                assert_eq!(conflicts[0].productions, vec!["VP → V NP", "VP → V PP"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn json_entry_points() {
        let json = crate::check_sentence_to_json(ENGLISH, "John saw a cat");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["accepted"], true);
        assert_eq!(value["failure"], serde_json::Value::Null);

        let json = crate::check_sentence_to_json(ENGLISH, "the hit man");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["failure"]["kind"], "no_production");

        let json = crate::check_sentence_to_json("S -> a -> b", "a");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "Line 1: too many \"->\"");

        let json = crate::ll1_table_to_json(ENGLISH_AMBIGUOUS);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["conflicts"].as_array().unwrap().len(), 5);

        let json = crate::first_follow_to_json(ENGLISH);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["data"][0]["name"], "S");
        assert_eq!(value["data"][0]["follow"], serde_json::json!(["$"]));
    }
}
