//! Elimination of productions by substituting their right-hand sides at every
//! reference.

use std::collections::BTreeSet;

use log::debug;

use crate::error::GrammarError;
use crate::grammar::{is_exported, product, BnfGrammar, Expr, Expression, Grammar, Rhs};

impl<E: Rhs> Grammar<E> {
    /// Picks the first production, in name order, that can be inlined.
    fn inline_candidate(
        &self,
        start: &str,
        eliminate_all: bool,
        keep: impl Fn(&str) -> bool,
    ) -> Option<String> {
        self.productions()
            .filter(|production| {
                let name = &production.name[..];
                name != start
                    && is_exported(name)
                    && !keep(name)
                    && !production.expr.refers_to(name)
            })
            .find(|production| match self.uses(&production.name) {
                0 => false,
                1 => true,
                _ => eliminate_all,
            })
            .map(|production| production.name.clone())
    }
}

impl Grammar<Expr> {
    /// Substitutes syntactic productions, other than `start`, at their
    /// reference sites and removes them.
    ///
    /// Without `eliminate_all`, only productions referenced exactly once are
    /// inlined. Productions that refer to themselves are never inlined.
    pub fn inline(&mut self, start: &str, eliminate_all: bool) -> Result<(), GrammarError> {
        if !self.contains(start) {
            return Err(GrammarError::MissingStart(start.to_string()));
        }
        while let Some(name) = self.inline_candidate(start, eliminate_all, |_| false) {
            let production = match self.remove(&name) {
                Some(production) => production,
                None => return Err(GrammarError::UnknownProduction(name)),
            };
            let replacement = match production.expr {
                leaf @ (Expr::Name(_) | Expr::Token(_) | Expr::Empty) => leaf,
                group @ (Expr::Group(_) | Expr::Optional(_) | Expr::Repetition(_)) => group,
                other => Expr::Group(Box::new(other)),
            };
            for production in self.productions_mut() {
                production.expr.substitute(&name, &replacement);
            }
            debug!("inlined {}", name);
        }
        Ok(())
    }
}

impl BnfGrammar {
    /// Eliminates one nonterminal by substituting its right-hand side at every
    /// reference. Alternatives are distributed over the referencing
    /// sequences, so the result stays in bare form.
    ///
    /// With `remove`, the production itself is deleted afterwards.
    pub fn inline_one(&mut self, name: &str, remove: bool) -> Result<(), GrammarError> {
        let body = match self.get(name) {
            Some(production) if production.expr.refers_to(name) => {
                return Err(GrammarError::SelfReferential(name.to_string()))
            }
            Some(production) => production.expr.expand(),
            None => return Err(GrammarError::UnknownProduction(name.to_string())),
        };
        for production in self.productions_mut() {
            if production.name == name || !production.expr.refers_to(name) {
                continue;
            }
            let mut branches = vec![];
            for branch in production.expr.expand() {
                let mut expanded = vec![vec![]];
                for leaf in branch {
                    if leaf.is_name(name) {
                        expanded = product(&expanded, &body);
                    } else {
                        for prefix in &mut expanded {
                            prefix.push(leaf.clone());
                        }
                    }
                }
                branches.extend(expanded);
            }
            production.expr = Expression::from_alternatives(branches);
        }
        if remove {
            self.remove(name);
        }
        debug!("inlined {} ({} branches)", name, body.len());
        Ok(())
    }

    /// Inlines nonterminals other than `start` and those in `protected`, like
    /// [`Grammar::inline`] does for repetition grammars.
    pub fn inline(
        &mut self,
        start: &str,
        eliminate_all: bool,
        protected: &BTreeSet<String>,
    ) -> Result<(), GrammarError> {
        if !self.contains(start) {
            return Err(GrammarError::MissingStart(start.to_string()));
        }
        while let Some(name) =
            self.inline_candidate(start, eliminate_all, |name| protected.contains(name))
        {
            self.inline_one(&name, true)?;
        }
        Ok(())
    }
}
