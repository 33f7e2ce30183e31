//! Definitions of the grammar type, its productions and both expression
//! forms.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;
use std::fmt::{self, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::quote::quote;

/// Returns `true` when the name starts with an upper-case letter.
///
/// Exported names denote syntactic productions. All other names are lexical:
/// they stand for symbolic terminals, whether a lexical production defines
/// them or not.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().map_or(false, char::is_uppercase)
}

/// Expression of the repetition grammar.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// The empty expression.
    Empty,
    /// Reference to a production or a symbolic terminal.
    Name(String),
    /// Literal text.
    Token(String),
    /// Character range `"a" … "z"`. Only legal in lexical productions.
    Range(String, String),
    /// Concatenation.
    Sequence(Vec<Expr>),
    /// Choice between alternatives.
    Alternative(Vec<Expr>),
    /// `( … )`
    Group(Box<Expr>),
    /// `[ … ]`
    Optional(Box<Expr>),
    /// `{ … }`
    Repetition(Box<Expr>),
}

/// Expression of the bare form.
///
/// A production's expression is either an `Alternative` of branches or a
/// single branch. A branch is `Empty`, a leaf, or a `Sequence` of leaves.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expression {
    /// The empty branch.
    Empty,
    /// Reference to a nonterminal or a symbolic terminal.
    Name(String),
    /// Literal text.
    Token(String),
    /// Concatenation of leaves.
    Sequence(Vec<Expression>),
    /// Choice between branches. Only legal at the top of a production.
    Alternative(Vec<Expression>),
}

/// A named production.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Production<E> {
    /// The production's left-hand side.
    pub name: String,
    /// The production's right-hand side.
    pub expr: E,
}

/// Grammar type, a mapping from production names to productions.
///
/// Productions are kept in name order, so every traversal of a grammar is
/// deterministic.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grammar<E = Expr> {
    productions: BTreeMap<String, Production<E>>,
}

/// A grammar in bare form.
pub type BnfGrammar = Grammar<Expression>;

/// Terminals, literals and nonterminals in use, as found by
/// [`Grammar::analyze`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Report {
    /// Names of symbolic terminals.
    pub tokens: BTreeSet<String>,
    /// Literal texts.
    pub literals: BTreeSet<String>,
    /// Names of the reachable nonterminals.
    pub nonterminals: BTreeSet<String>,
}

/// Right-hand sides that refer to other productions by name.
pub trait Rhs {
    /// Calls `f` for every name referenced by this expression, left to right.
    fn visit_names<'a>(&'a self, f: &mut dyn FnMut(&'a str));

    /// Checks whether this expression refers to the given name.
    fn refers_to(&self, name: &str) -> bool {
        let mut found = false;
        self.visit_names(&mut |used| found |= used == name);
        found
    }

    /// Counts references to the given name.
    fn count_refs(&self, name: &str) -> usize {
        let mut count = 0;
        self.visit_names(&mut |used| {
            if used == name {
                count += 1;
            }
        });
        count
    }
}

impl<E> Default for Grammar<E> {
    fn default() -> Self {
        Grammar {
            productions: BTreeMap::new(),
        }
    }
}

impl<E> Grammar<E> {
    /// Creates an empty grammar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a production, returning the one it replaces, if any.
    pub fn insert(&mut self, name: impl Into<String>, expr: E) -> Option<Production<E>> {
        let name = name.into();
        self.productions.insert(
            name.clone(),
            Production { name, expr },
        )
    }

    /// Removes a production.
    pub fn remove(&mut self, name: &str) -> Option<Production<E>> {
        self.productions.remove(name)
    }

    /// Returns the production with the given name.
    pub fn get(&self, name: &str) -> Option<&Production<E>> {
        self.productions.get(name)
    }

    /// Checks whether a production with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.productions.contains_key(name)
    }

    /// Returns an iterator over production names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.productions.keys().map(String::as_str)
    }

    /// Returns an iterator over productions, in name order.
    pub fn productions(&self) -> btree_map::Values<'_, String, Production<E>> {
        self.productions.values()
    }

    pub(crate) fn productions_mut(&mut self) -> btree_map::ValuesMut<'_, String, Production<E>> {
        self.productions.values_mut()
    }

    /// Returns the number of productions.
    pub fn len(&self) -> usize {
        self.productions.len()
    }

    /// Checks whether the grammar has no productions.
    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }
}

impl<E: Rhs> Grammar<E> {
    /// Counts references to `name` from all productions.
    pub fn uses(&self, name: &str) -> usize {
        self.productions()
            .map(|production| production.expr.count_refs(name))
            .sum()
    }
}

impl<'a, E> IntoIterator for &'a Grammar<E> {
    type Item = &'a Production<E>;
    type IntoIter = btree_map::Values<'a, String, Production<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.productions()
    }
}

impl Rhs for Expr {
    fn visit_names<'a>(&'a self, f: &mut dyn FnMut(&'a str)) {
        match self {
            Expr::Name(name) => f(name),
            Expr::Empty | Expr::Token(_) | Expr::Range(..) => {}
            Expr::Sequence(items) | Expr::Alternative(items) => {
                for item in items {
                    item.visit_names(f);
                }
            }
            Expr::Group(inner) | Expr::Optional(inner) | Expr::Repetition(inner) => {
                inner.visit_names(f)
            }
        }
    }
}

impl Rhs for Expression {
    fn visit_names<'a>(&'a self, f: &mut dyn FnMut(&'a str)) {
        match self {
            Expression::Name(name) => f(name),
            Expression::Empty | Expression::Token(_) => {}
            Expression::Sequence(items) | Expression::Alternative(items) => {
                for item in items {
                    item.visit_names(f);
                }
            }
        }
    }
}

impl Expr {
    /// Calls `f` on this expression and every subexpression, parents first.
    pub fn walk<F: FnMut(&Expr)>(&self, f: &mut F) {
        f(self);
        match self {
            Expr::Sequence(items) | Expr::Alternative(items) => {
                for item in items {
                    item.walk(f);
                }
            }
            Expr::Group(inner) | Expr::Optional(inner) | Expr::Repetition(inner) => inner.walk(f),
            Expr::Empty | Expr::Name(_) | Expr::Token(_) | Expr::Range(..) => {}
        }
    }

    /// Replaces every reference to `name` with `replacement`.
    pub(crate) fn substitute(&mut self, name: &str, replacement: &Expr) {
        match self {
            Expr::Name(used) if used == name => *self = replacement.clone(),
            Expr::Sequence(items) | Expr::Alternative(items) => {
                for item in items {
                    item.substitute(name, replacement);
                }
            }
            Expr::Group(inner) | Expr::Optional(inner) | Expr::Repetition(inner) => {
                inner.substitute(name, replacement)
            }
            _ => {}
        }
    }
}

impl Expression {
    /// Builds an expression from branches, each a sequence of leaves.
    pub fn from_alternatives(mut branches: Vec<Vec<Expression>>) -> Self {
        if branches.len() == 1 {
            Self::from_sequence(branches.remove(0))
        } else {
            Expression::Alternative(branches.into_iter().map(Self::from_sequence).collect())
        }
    }

    /// Builds a branch from a sequence of leaves.
    pub fn from_sequence(mut leaves: Vec<Expression>) -> Self {
        match leaves.len() {
            0 => Expression::Empty,
            1 => leaves.remove(0),
            _ => Expression::Sequence(leaves),
        }
    }

    /// Returns the top-level branches of this expression.
    pub fn branches(&self) -> &[Expression] {
        match self {
            Expression::Alternative(branches) => &branches[..],
            other => std::slice::from_ref(other),
        }
    }

    /// Expands this expression into branches of leaves, distributing any
    /// alternative over the sequences around it.
    pub fn expand(&self) -> Vec<Vec<Expression>> {
        match self {
            Expression::Empty => vec![vec![]],
            Expression::Name(_) | Expression::Token(_) => vec![vec![self.clone()]],
            Expression::Sequence(items) => {
                let mut result = vec![vec![]];
                for item in items {
                    result = product(&result, &item.expand());
                }
                result
            }
            Expression::Alternative(branches) => {
                branches.iter().flat_map(|branch| branch.expand()).collect()
            }
        }
    }

    /// Checks whether this is a reference to the given name.
    pub fn is_name(&self, name: &str) -> bool {
        matches!(self, Expression::Name(used) if used == name)
    }
}

/// Concatenates every prefix with every suffix.
pub(crate) fn product(
    prefixes: &[Vec<Expression>],
    suffixes: &[Vec<Expression>],
) -> Vec<Vec<Expression>> {
    let mut result = Vec::with_capacity(prefixes.len() * suffixes.len());
    for prefix in prefixes {
        for suffix in suffixes {
            let mut branch = prefix.clone();
            branch.extend(suffix.iter().cloned());
            result.push(branch);
        }
    }
    result
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Empty => Ok(()),
            Expr::Name(name) => f.write_str(name),
            Expr::Token(text) => f.write_str(&quote(text)),
            Expr::Range(low, high) => write!(f, "{} … {}", quote(low), quote(high)),
            Expr::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        f.write_char(' ')?;
                    }
                    match item {
                        Expr::Alternative(_) | Expr::Empty => write!(f, "({})", item)?,
                        _ => write!(f, "{}", item)?,
                    }
                }
                Ok(())
            }
            Expr::Alternative(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i != 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", branch)?;
                }
                Ok(())
            }
            Expr::Group(inner) => enclose(f, '(', inner, ')'),
            Expr::Optional(inner) => enclose(f, '[', inner, ']'),
            Expr::Repetition(inner) => enclose(f, '{', inner, '}'),
        }
    }
}

// An empty body prints as `()`, the same text a sequence uses for `Empty`.
fn enclose(f: &mut fmt::Formatter, open: char, inner: &Expr, close: char) -> fmt::Result {
    let body = inner.to_string();
    let body = body.trim();
    if body.is_empty() {
        write!(f, "{}{}", open, close)
    } else {
        write!(f, "{} {} {}", open, body, close)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Empty => Ok(()),
            Expression::Name(name) => f.write_str(name),
            Expression::Token(text) => f.write_str(&quote(text)),
            Expression::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Expression::Alternative(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i != 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", branch)?;
                }
                Ok(())
            }
        }
    }
}

impl<E: fmt::Display> fmt::Display for Production<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rhs = self.expr.to_string();
        let rhs = rhs.trim();
        if rhs.is_empty() {
            write!(f, "{} = .", self.name)
        } else {
            write!(f, "{} = {} .", self.name, rhs)
        }
    }
}

/// Pretty-prints the grammar, one production per paragraph. The output of a
/// repetition grammar can be loaded back with [`parse`](crate::parse).
impl<E: fmt::Display> fmt::Display for Grammar<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, production) in self.productions().enumerate() {
            if i != 0 {
                f.write_char('\n')?;
            }
            writeln!(f, "{}", production)?;
        }
        Ok(())
    }
}
