//! Command-line options.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;

use crate::error::Error;

/// How many productions to inline before rendering.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum InlineDegree {
    #[default]
    None,
    /// Productions referenced exactly once.
    UsedOnce,
    /// Every production that does not refer to itself.
    All,
}

impl InlineDegree {
    /// `None` when nothing is inlined, otherwise whether productions used
    /// more than once are inlined too.
    pub(crate) fn eliminate_all(self) -> Option<bool> {
        match self {
            InlineDegree::None => None,
            InlineDegree::UsedOnce => Some(false),
            InlineDegree::All => Some(true),
        }
    }
}

impl FromStr for InlineDegree {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(InlineDegree::None),
            "1" => Ok(InlineDegree::UsedOnce),
            "2" => Ok(InlineDegree::All),
            _ => Err(format!("must be 0, 1 or 2, not {:?}", s)),
        }
    }
}

impl fmt::Display for InlineDegree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let degree = match self {
            InlineDegree::None => 0,
            InlineDegree::UsedOnce => 1,
            InlineDegree::All => 2,
        };
        write!(f, "{}", degree)
    }
}

/// Converts an EBNF grammar to goyacc source.
#[derive(Clone, Debug, Parser)]
#[command(name = "cfg-yacc", version)]
pub struct Options {
    /// Inline the EBNF grammar. 0: none, 1: used once, 2: all (illegal with -m).
    #[arg(long = "ie", value_name = "DEGREE", default_value = "0")]
    pub inline_ebnf: InlineDegree,

    /// Inline the BNF grammar. 0: none, 1: used once, 2: all (illegal with -m).
    #[arg(long = "iy", value_name = "DEGREE", default_value = "0")]
    pub inline_bnf: InlineDegree,

    /// Inline nonterminals to reduce yacc conflicts (slow).
    #[arg(short = 'm', long)]
    pub search: bool,

    /// Like -m, and log every candidate with the yacc output.
    #[arg(short = 'M', long)]
    pub search_verbose: bool,

    /// Pretty print the EBNF grammar to this file.
    #[arg(long = "oe", value_name = "PATH")]
    pub pretty: Option<PathBuf>,

    /// Output file. Stdout if left blank.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Prefix for token names, e.g. "_".
    #[arg(short, long, default_value = "")]
    pub prefix: String,

    /// Start production name.
    #[arg(long, default_value = "SourceFile")]
    pub start: String,

    /// Parser generator used to count conflicts.
    #[arg(long, env = "CFG_YACC", default_value = "goyacc")]
    pub yacc: String,

    /// Input grammar. Stdin if left out.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,
}

impl Options {
    /// Rejects option combinations before any input is read.
    pub fn validate(&self) -> Result<(), Error> {
        if self.search_mode() {
            if self.output().is_none() {
                return Err(Error::Usage(
                    "'-m' requires using a named output file ('-o name')".to_string(),
                ));
            }
            if self.inline_ebnf == InlineDegree::All || self.inline_bnf == InlineDegree::All {
                return Err(Error::Usage(
                    "'-m' cannot be used with '--ie 2' or '--iy 2'".to_string(),
                ));
            }
        }
        if self.inputs.len() > 1 {
            return Err(Error::Usage(
                "at most one input file may be specified".to_string(),
            ));
        }
        Ok(())
    }

    pub fn search_mode(&self) -> bool {
        self.search || self.search_verbose
    }

    pub fn input(&self) -> Option<&Path> {
        self.inputs.first().map(PathBuf::as_path)
    }

    /// The artifact path, unless blank.
    pub fn output(&self) -> Option<&Path> {
        non_blank(&self.output)
    }

    /// The pretty-print path, unless blank.
    pub fn pretty_output(&self) -> Option<&Path> {
        non_blank(&self.pretty)
    }
}

fn non_blank(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref()
        .filter(|path| !path.as_os_str().is_empty())
}
