//! Well-formedness checks for repetition grammars.

use crate::error::GrammarError;
use crate::grammar::{is_exported, Expr, Grammar, Rhs};
use crate::reach::Reachability;

impl Grammar<Expr> {
    /// Checks that:
    ///
    /// * the start production is defined,
    /// * every syntactic production referenced is defined,
    /// * lexical productions refer only to lexical productions,
    /// * character ranges appear only in lexical productions,
    /// * every production is reachable from the start production.
    ///
    /// Lexical names without a production are accepted as symbolic
    /// terminals.
    pub fn verify(&self, start: &str) -> Result<(), GrammarError> {
        if !self.contains(start) {
            return Err(GrammarError::MissingStart(start.to_string()));
        }
        for production in self {
            let lexical = !is_exported(&production.name);
            let mut error = None;
            production.expr.visit_names(&mut |used| {
                if error.is_some() || !is_exported(used) {
                    return;
                }
                if lexical {
                    error = Some(GrammarError::LexicalRefersToSyntactic {
                        lexical: production.name.clone(),
                        syntactic: used.to_string(),
                    });
                } else if !self.contains(used) {
                    error = Some(GrammarError::Undefined {
                        name: used.to_string(),
                        used_in: production.name.clone(),
                    });
                }
            });
            if let Some(error) = error {
                return Err(error);
            }
            if !lexical {
                let mut has_range = false;
                production
                    .expr
                    .walk(&mut |expr| has_range |= matches!(expr, Expr::Range(..)));
                if has_range {
                    return Err(GrammarError::RangeOutsideLexical(production.name.clone()));
                }
            }
        }
        let reachability = Reachability::new(self);
        match reachability.unreachable_from(start).first() {
            Some(&name) => Err(GrammarError::Unreachable(name.to_string())),
            None => Ok(()),
        }
    }
}
