use thiserror::Error;

/// Represents an error when loading, checking or rewriting a grammar.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum GrammarError {
    /// The grammar text is malformed.
    ///
    /// Line and column are one-indexed.
    #[error("{grammar}:{line}:{col}: {reason}")]
    Parse {
        /// Name of the grammar source, usually a file name.
        grammar: String,
        /// Line where the error happened.
        line: u32,
        /// Column where the error happened.
        col: u32,
        /// Human-readable reason for the error.
        reason: String,
    },
    /// A production is defined twice.
    #[error("{grammar}:{line}:{col}: production {name:?} redeclared")]
    DuplicateProduction {
        /// Name of the grammar source.
        grammar: String,
        /// Name of the production.
        name: String,
        /// Line of the second definition.
        line: u32,
        /// Column of the second definition.
        col: u32,
    },
    /// The start production is not defined.
    #[error("start production {0:?} is not defined")]
    MissingStart(String),
    /// A syntactic production is referenced but never defined.
    #[error("production {name:?} referenced by {used_in:?} is not defined")]
    Undefined {
        /// The missing production.
        name: String,
        /// The production containing the reference.
        used_in: String,
    },
    /// A production cannot be reached from the start production.
    #[error("production {0:?} is unreachable from the start production")]
    Unreachable(String),
    /// A lexical production refers to a syntactic one.
    #[error("lexical production {lexical:?} refers to syntactic production {syntactic:?}")]
    LexicalRefersToSyntactic {
        /// The lexical production.
        lexical: String,
        /// The referenced syntactic production.
        syntactic: String,
    },
    /// A character range appears outside a lexical production.
    #[error("character range used in syntactic production {0:?}")]
    RangeOutsideLexical(String),
    /// There is no production with the given name.
    #[error("no production named {0:?}")]
    UnknownProduction(String),
    /// The production refers to itself, so it has no finite substitution.
    #[error("production {0:?} refers to itself and cannot be inlined")]
    SelfReferential(String),
}
