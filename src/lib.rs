//! Converts grammars written in EBNF to goyacc sources with illustrative
//! semantic actions, and optionally searches for an equivalent grammar with
//! fewer shift/reduce and reduce/reduce conflicts.
//!
//! The search treats the parser generator as a black box: a
//! [`ConflictOracle`] reports the conflicts of each rendered artifact, and
//! nonterminals are inlined one at a time while that lowers the count.

#![deny(unsafe_code)]
#![deny(trivial_casts, unused_import_braces)]

pub mod classify;
mod error;
pub mod job;
pub mod names;
pub mod options;
pub mod oracle;
pub mod render;
pub mod search;

use std::fs;
use std::io::{self, Read};

use log::info;

pub use crate::error::Error;
pub use crate::job::Job;
pub use crate::options::{InlineDegree, Options};
pub use crate::oracle::{ConflictOracle, Score, YaccOracle};
pub use crate::search::{Improvement, Mode, Search, SearchReport};

/// Runs one conversion as described by `options`.
pub fn run<O: ConflictOracle>(options: &Options, oracle: &mut O) -> Result<SearchReport, Error> {
    options.validate()?;
    let (name, source) = match options.input() {
        Some(path) => {
            let source = fs::read_to_string(path).map_err(|source| Error::Open {
                path: path.to_path_buf(),
                source,
            })?;
            (path.display().to_string(), source)
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|source| Error::Open {
                    path: "<stdin>".into(),
                    source,
                })?;
            ("<stdin>".to_string(), source)
        }
    };
    let grammar = cfg_ebnf::parse(&name, &source)?;
    info!("loaded {} productions from {}", grammar.len(), name);

    let mut job = Job::prepare(grammar, options)?;
    let mode = if options.search_mode() {
        Mode::Search {
            verbose: options.search_verbose,
        }
    } else {
        Mode::SingleShot
    };
    let report = Search::new(&mut job, oracle, options.output(), mode)?.run()?;
    if let Some(path) = options.output() {
        info!("wrote {}", path.display());
    }
    Ok(report)
}
