//! Lowers repetition grammars to the bare form, and analyzes and normalizes
//! grammars in bare form.

use std::collections::BTreeSet;

use log::{debug, trace};

use crate::error::GrammarError;
use crate::grammar::{is_exported, BnfGrammar, Expr, Expression, Grammar, Report};
use crate::reach::Reachability;

/// Names of the nonterminals that represent repeated constructs. Each has
/// the shape `R = | R element… .`
pub type RepetitionSet = BTreeSet<String>;

type Branches = Vec<Vec<Expression>>;

/// Rewrites groups, options and repetitions into fresh productions.
struct Lowering<F> {
    invent: F,
    output: BnfGrammar,
    repetitions: RepetitionSet,
}

impl Grammar<Expr> {
    /// Converts every syntactic production reachable from `start` to the bare
    /// form.
    ///
    /// Names for fresh productions are requested from `invent`, which
    /// receives the name of the production being converted and must return
    /// an unused name. Lexical productions are dropped; references to them
    /// remain as symbolic terminals.
    pub fn to_bnf<F>(
        &self,
        start: &str,
        invent: F,
    ) -> Result<(BnfGrammar, RepetitionSet), GrammarError>
    where
        F: FnMut(&str) -> String,
    {
        let reachability = Reachability::new(self);
        let reachable = reachability
            .reachable_from(start)
            .ok_or_else(|| GrammarError::MissingStart(start.to_string()))?;
        let mut lowering = Lowering {
            invent,
            output: Grammar::new(),
            repetitions: RepetitionSet::new(),
        };
        for (production, reached) in self.productions().zip(reachable.iter()) {
            if !reached || !is_exported(&production.name) {
                continue;
            }
            let branches = lowering.branches(&production.name, &production.expr)?;
            lowering
                .output
                .insert(production.name.clone(), Expression::from_alternatives(branches));
        }
        debug!(
            "lowered {} productions to {} ({} repetitions)",
            self.len(),
            lowering.output.len(),
            lowering.repetitions.len()
        );
        Ok((lowering.output, lowering.repetitions))
    }
}

impl<F> Lowering<F>
where
    F: FnMut(&str) -> String,
{
    fn branches(&mut self, owner: &str, expr: &Expr) -> Result<Branches, GrammarError> {
        match expr {
            Expr::Alternative(branches) => {
                let mut result = vec![];
                for branch in branches {
                    result.extend(self.branches(owner, branch)?);
                }
                Ok(result)
            }
            Expr::Group(inner) => self.branches(owner, inner),
            Expr::Optional(inner) => {
                let mut result = vec![vec![]];
                result.extend(self.branches(owner, inner)?);
                Ok(result)
            }
            _ => {
                let mut leaves = vec![];
                self.append(owner, expr, &mut leaves)?;
                Ok(vec![leaves])
            }
        }
    }

    fn append(
        &mut self,
        owner: &str,
        expr: &Expr,
        leaves: &mut Vec<Expression>,
    ) -> Result<(), GrammarError> {
        match expr {
            Expr::Empty => {}
            Expr::Name(name) => leaves.push(Expression::Name(name.clone())),
            Expr::Token(text) => leaves.push(Expression::Token(text.clone())),
            Expr::Range(..) => return Err(GrammarError::RangeOutsideLexical(owner.to_string())),
            Expr::Sequence(items) => {
                for item in items {
                    self.append(owner, item, leaves)?;
                }
            }
            Expr::Group(_) | Expr::Alternative(_) => {
                let mut branches = self.branches(owner, expr)?;
                if branches.len() == 1 {
                    leaves.append(&mut branches[0]);
                } else {
                    let name = self.fresh(owner, branches);
                    leaves.push(Expression::Name(name));
                }
            }
            Expr::Optional(_) => {
                let branches = self.branches(owner, expr)?;
                let name = self.fresh(owner, branches);
                leaves.push(Expression::Name(name));
            }
            Expr::Repetition(inner) => {
                let name = self.repetition(owner, inner)?;
                leaves.push(Expression::Name(name));
            }
        }
        Ok(())
    }

    fn fresh(&mut self, owner: &str, branches: Branches) -> String {
        let name = (self.invent)(owner);
        trace!("fresh production {} in {}", name, owner);
        self.output
            .insert(name.clone(), Expression::from_alternatives(branches));
        name
    }

    fn repetition(&mut self, owner: &str, element: &Expr) -> Result<String, GrammarError> {
        let name = (self.invent)(owner);
        trace!("repetition {} in {}", name, owner);
        let mut branches = self.branches(owner, element)?;
        let mut step = vec![Expression::Name(name.clone())];
        if branches.len() == 1 {
            step.append(&mut branches[0]);
        } else {
            // Keeps the repetition at exactly two branches.
            let element = self.fresh(owner, branches);
            step.push(Expression::Name(element));
        }
        self.output.insert(
            name.clone(),
            Expression::Alternative(vec![Expression::Empty, Expression::from_sequence(step)]),
        );
        self.repetitions.insert(name.clone());
        Ok(name)
    }
}

impl BnfGrammar {
    /// Finds the symbolic terminals, literals and nonterminals reachable from
    /// `start`.
    pub fn analyze(&self, start: &str) -> Result<Report, GrammarError> {
        if !self.contains(start) {
            return Err(GrammarError::MissingStart(start.to_string()));
        }
        let mut report = Report::default();
        let mut work = vec![start.to_string()];
        report.nonterminals.insert(start.to_string());
        while let Some(name) = work.pop() {
            let production = match self.get(&name) {
                Some(production) => production,
                None => continue,
            };
            for branch in production.expr.branches() {
                let mut error = None;
                visit_leaves(branch, &mut |leaf| match leaf {
                    Expression::Name(used) if is_exported(used) => {
                        if !self.contains(used) {
                            error.get_or_insert_with(|| GrammarError::Undefined {
                                name: used.clone(),
                                used_in: name.clone(),
                            });
                        } else if report.nonterminals.insert(used.clone()) {
                            work.push(used.clone());
                        }
                    }
                    Expression::Name(used) => {
                        report.tokens.insert(used.clone());
                    }
                    Expression::Token(text) => {
                        report.literals.insert(text.clone());
                    }
                    _ => {}
                });
                if let Some(error) = error {
                    return Err(error);
                }
            }
        }
        Ok(report)
    }

    /// Returns an independent copy in strict bare form: every production is a
    /// list of distinct branches, each an `Empty`, a single leaf or a flat
    /// sequence of leaves.
    pub fn normalize(&self) -> BnfGrammar {
        let mut result = Grammar::new();
        for production in self {
            let mut branches: Branches = vec![];
            for branch in production.expr.expand() {
                if !branches.contains(&branch) {
                    branches.push(branch);
                }
            }
            result.insert(production.name.clone(), Expression::from_alternatives(branches));
        }
        result
    }
}

/// Calls `f` on every leaf of a branch, left to right.
pub(crate) fn visit_leaves<'a>(expr: &'a Expression, f: &mut dyn FnMut(&'a Expression)) {
    match expr {
        Expression::Sequence(items) | Expression::Alternative(items) => {
            for item in items {
                visit_leaves(item, f);
            }
        }
        Expression::Empty => {}
        leaf => f(leaf),
    }
}
