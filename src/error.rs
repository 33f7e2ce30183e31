use std::io;
use std::path::PathBuf;

use cfg_ebnf::GrammarError;
use thiserror::Error;

/// Represents an error when converting a grammar or searching for a
/// grammar with fewer conflicts.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid combination of command-line options.
    #[error("{0}")]
    Usage(String),
    /// The input grammar cannot be read.
    #[error("cannot read {path}: {source}")]
    Open {
        /// Path of the input.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The grammar is malformed, or a rewrite failed.
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    /// A production is named with a reserved word of the generated code.
    #[error("reserved word {0:?} cannot be used as a production name")]
    NameCollision(String),
    /// An expression has a shape that cannot appear in bare form.
    #[error("unsupported expression in production {production:?}: {expr}")]
    UnsupportedExpression {
        /// Production containing the expression.
        production: String,
        /// The expression, pretty-printed.
        expr: String,
    },
    /// A terminal has no allocated symbol.
    #[error("no symbol allocated for terminal {0}")]
    UnknownTerminal(String),
    /// An artifact cannot be written.
    #[error("cannot write {target}: {source}")]
    Write {
        /// Path of the artifact, or `<stdout>`.
        target: String,
        /// The underlying error.
        source: io::Error,
    },
    /// The parser generator failed to run or exited with an error.
    #[error("running {command:?}: {reason}")]
    OracleInvocation {
        /// The parser generator command.
        command: String,
        /// What went wrong.
        reason: String,
    },
    /// A diagnostic line looks like a never-reduced rule but names none.
    #[error("malformed diagnostic {0:?}")]
    MalformedDiagnostic(String),
}
