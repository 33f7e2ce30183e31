#![allow(dead_code)]

use std::collections::BTreeSet;

use cfg_ebnf::{BnfGrammar, Expression, Grammar, RepetitionSet};

pub fn load(source: &str) -> Grammar {
    match cfg_ebnf::parse("test", source) {
        Ok(grammar) => grammar,
        Err(error) => panic!("failed to load test grammar: {}", error),
    }
}

/// Mints `owner1`, `owner2`, … skipping names already taken.
pub fn inventor(grammar: &Grammar) -> impl FnMut(&str) -> String {
    let mut taken: BTreeSet<String> = grammar.names().map(str::to_string).collect();
    move |owner| {
        let mut i = 1;
        loop {
            let name = format!("{}{}", owner, i);
            if taken.insert(name.clone()) {
                return name;
            }
            i += 1;
        }
    }
}

pub fn lower(source: &str, start: &str) -> (BnfGrammar, RepetitionSet) {
    let grammar = load(source);
    let invent = inventor(&grammar);
    grammar.to_bnf(start, invent).expect("lowering failed")
}

/// A leaf written `"x"` is a literal, anything else is a name.
pub fn leaf(text: &str) -> Expression {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        Expression::Token(text[1..text.len() - 1].to_string())
    } else {
        Expression::Name(text.to_string())
    }
}

pub fn branches(branches: &[&[&str]]) -> Expression {
    Expression::from_alternatives(
        branches
            .iter()
            .map(|branch| branch.iter().map(|text| leaf(text)).collect())
            .collect(),
    )
}

pub fn bnf(rules: &[(&str, &[&[&str]])]) -> BnfGrammar {
    let mut grammar = BnfGrammar::new();
    for &(name, rhs) in rules {
        grammar.insert(name, branches(rhs));
    }
    grammar
}
