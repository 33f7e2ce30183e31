//! Library for loading grammars written in the EBNF notation
//! `Name = Expression .` and lowering them to bare alternations of symbol
//! sequences, the form bottom-up parser generators consume.
//!
//! A grammar goes through these steps:
//!
//! * [`parse`] builds a [`Grammar`] of [`Expr`] trees,
//! * [`Grammar::verify`] checks that it is closed and connected,
//! * [`Grammar::to_bnf`] lowers groups, options and repetitions into fresh
//!   productions, producing a [`BnfGrammar`],
//! * [`BnfGrammar::analyze`](Grammar::analyze) reports the terminals,
//!   literals and nonterminals in use.
//!
//! Both forms can be rewritten by inlining productions.

#![deny(unsafe_code)]
#![deny(trivial_casts, unused_import_braces)]

mod bnf;
mod error;
mod grammar;
mod inline;
mod load;
pub mod quote;
mod reach;
mod verify;

pub use crate::bnf::RepetitionSet;
pub use crate::error::GrammarError;
pub use crate::grammar::{
    is_exported, BnfGrammar, Expr, Expression, Grammar, Production, Report, Rhs,
};
pub use crate::load::parse;
