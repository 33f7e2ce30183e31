//! Assigns display symbols to the terminals of a bare-form grammar.

use std::collections::BTreeMap;
use std::fmt;

use cfg_ebnf::Report;
use log::debug;

use crate::names::NameRegistry;

/// A terminal of the bare form. Symbolic names and literal texts live in
/// separate namespaces, so `ident` and `"ident"` never share a symbol.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Terminal {
    Name(String),
    Literal(String),
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Terminal::Name(name) => f.write_str(name),
            Terminal::Literal(text) => f.write_str(&cfg_ebnf::quote::quote(text)),
        }
    }
}

/// Declared terminals and their display symbols.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Classification {
    /// Display symbol of every declared terminal.
    pub symbols: BTreeMap<Terminal, String>,
    /// Symbols of symbolic terminals, sorted.
    pub named: Vec<String>,
    /// Punctuation literals and their symbols, in literal order.
    pub punctuation: Vec<(String, String)>,
    /// Symbols of literals that contain identifier characters, sorted.
    pub words: Vec<String>,
}

impl Classification {
    /// Classifies the terminals found by analysis. Symbols are allocated
    /// from `names` with `prefix` prepended.
    pub fn new(report: &Report, prefix: &str, names: &mut NameRegistry) -> Self {
        let mut classification = Classification::default();

        for name in &report.tokens {
            let symbol = names.allocate(&format!("{}{}", prefix, name.to_uppercase()), "");
            classification
                .symbols
                .insert(Terminal::Name(name.clone()), symbol.clone());
            classification.named.push(symbol);
        }
        classification.named.sort();

        let tok = format!("{}TOK", prefix);
        names.allocate(&tok, "");
        for literal in &report.literals {
            if is_single_char(literal) || !identifier_chars(literal).is_empty() {
                continue;
            }
            let symbol = names.allocate(&tok, "");
            classification
                .symbols
                .insert(Terminal::Literal(literal.clone()), symbol.clone());
            classification.punctuation.push((literal.clone(), symbol));
        }

        for literal in &report.literals {
            let letters = identifier_chars(literal);
            if is_single_char(literal) || letters.is_empty() {
                continue;
            }
            let symbol = names.allocate(&format!("{}{}", prefix, letters.to_uppercase()), "");
            classification
                .symbols
                .insert(Terminal::Literal(literal.clone()), symbol.clone());
            classification.words.push(symbol);
        }
        classification.words.sort();

        debug!(
            "classified {} named, {} punctuation and {} word terminals",
            classification.named.len(),
            classification.punctuation.len(),
            classification.words.len()
        );
        classification
    }

    pub fn symbol(&self, terminal: &Terminal) -> Option<&str> {
        self.symbols.get(terminal).map(String::as_str)
    }
}

/// Single-character literals are written inline as character literals.
pub fn is_single_char(literal: &str) -> bool {
    let mut chars = literal.chars();
    chars.next().is_some() && chars.next().is_none()
}

/// Keeps only ASCII letters and underscores.
pub fn identifier_chars(literal: &str) -> String {
    literal
        .chars()
        .filter(|&ch| ch == '_' || ch.is_ascii_alphabetic())
        .collect()
}
