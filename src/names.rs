//! Allocation of unique identifiers for the generated parser.

use std::collections::BTreeSet;

use log::trace;

/// Keywords of the language the semantic actions are written in.
pub const GO_KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Checks whether `name` is a keyword of the generated code.
pub fn is_reserved_word(name: &str) -> bool {
    GO_KEYWORDS.binary_search(&name).is_ok()
}

/// A registry state that can be restored with [`NameRegistry::rollback`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Checkpoint(usize);

/// Set of identifiers in use, seeded with the reserved words.
///
/// Every insertion is journaled, so a checkpoint is just the journal length.
#[derive(Clone, Debug)]
pub struct NameRegistry {
    names: BTreeSet<String>,
    journal: Vec<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        NameRegistry {
            names: GO_KEYWORDS.iter().map(|&word| word.to_string()).collect(),
            journal: vec![],
        }
    }

    /// Returns the first free name among `prefix`, `prefix separator 1`,
    /// `prefix separator 2`, … and records it.
    ///
    /// The bare `prefix` is a candidate only when `separator` is empty. With
    /// an empty separator, the bare candidate is `prefix` itself.
    pub fn allocate(&mut self, prefix: &str, separator: &str) -> String {
        let mut i = if separator.is_empty() { 0 } else { 1 };
        loop {
            let candidate = if i == 0 {
                prefix.to_string()
            } else {
                format!("{}{}{}", prefix, separator, i)
            };
            if !self.names.contains(&candidate) {
                trace!("allocated {}", candidate);
                self.record(candidate.clone());
                return candidate;
            }
            i += 1;
        }
    }

    /// Records `name`. Returns `true` if it was already present.
    pub fn reserve(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            true
        } else {
            self.record(name.to_string());
            false
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.journal.len())
    }

    /// Forgets every name recorded since `checkpoint` was taken.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        let Checkpoint(len) = checkpoint;
        while self.journal.len() > len {
            if let Some(name) = self.journal.pop() {
                self.names.remove(&name);
            }
        }
    }

    fn record(&mut self, name: String) {
        self.names.insert(name.clone());
        self.journal.push(name);
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
