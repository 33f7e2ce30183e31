//! Reachability between productions, computed as the transitive closure of
//! the direct derivation relation.

use bit_matrix::BitMatrix;
use bit_vec::BitVec;

use crate::grammar::{Grammar, Rhs};

/// A matrix that represents the relation "production `A` derives a string
/// containing a reference to production `B`", closed under transitivity and
/// reflexivity.
pub(crate) struct Reachability<'g> {
    names: Vec<&'g str>,
    matrix: BitMatrix,
}

impl<'g> Reachability<'g> {
    pub(crate) fn new<E: Rhs>(grammar: &'g Grammar<E>) -> Self {
        let names: Vec<&str> = grammar.names().collect();
        let mut matrix = BitMatrix::new(names.len(), names.len());
        for (row, production) in grammar.productions().enumerate() {
            production.expr.visit_names(&mut |used| {
                // References to undefined names are terminals.
                if let Ok(col) = names.binary_search_by(|probe| (*probe).cmp(used)) {
                    matrix.set(row, col, true);
                }
            });
        }
        matrix.transitive_closure();
        matrix.reflexive_closure();
        Reachability { names, matrix }
    }

    /// Returns the set of productions reachable from `root`, indexed like
    /// the grammar's productions, or `None` if `root` is not a production.
    pub(crate) fn reachable_from(&self, root: &str) -> Option<BitVec> {
        let row = self
            .names
            .binary_search_by(|probe| (*probe).cmp(root))
            .ok()?;
        Some(self.matrix.iter_row(row).collect())
    }

    /// Returns the names of productions that cannot be reached from `root`.
    pub(crate) fn unreachable_from(&self, root: &str) -> Vec<&'g str> {
        match self.reachable_from(root) {
            Some(reachable) => self
                .names
                .iter()
                .zip(reachable.iter())
                .filter_map(|(&name, reached)| if reached { None } else { Some(name) })
                .collect(),
            None => self.names.clone(),
        }
    }
}
