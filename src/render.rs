//! Renders a bare-form grammar as goyacc source with illustrative semantic
//! actions.

use cfg_ebnf::quote::{quote, quote_char};
use cfg_ebnf::{is_exported, BnfGrammar, Expression, RepetitionSet, Report};

use crate::classify::{identifier_chars, is_single_char, Classification, Terminal};
use crate::error::Error;

const HEADER: &str = "%{
// Yacc source generated by cfg-yacc.
//
// CAUTION: If this file is a Go source file (*.go), it was generated
// automatically by goyacc from a *.y file - DO NOT EDIT in that case!

package main

// Imports used only by the demo _dump function.
import (
\t\"fmt\"
\t\"strings\"
)

%}

%union {
\titem interface{} // Replace with the real field(s).
}

";

const TYPE_COMMENT: &str = "/* Replace with the real type(s) where applicable. */";

const DUMP: &str = "func _dump() {
\ts := fmt.Sprintf(\"%#v\", _parserResult)
\ts = strings.Replace(s, \", \", \",\\n\", -1)
\tfmt.Println(s)
}

// End of demo code.
";

/// Renders one grammar with one classification of its terminals.
pub struct Renderer<'a> {
    pub grammar: &'a BnfGrammar,
    pub repetitions: &'a RepetitionSet,
    pub report: &'a Report,
    pub classification: &'a Classification,
    /// The start symbol, whose actions set `_parserResult`.
    pub start: &'a str,
}

impl<'a> Renderer<'a> {
    /// Renders the whole artifact.
    pub fn render(&self) -> Result<String, Error> {
        let mut out = String::from(HEADER);
        let classification = self.classification;

        if !classification.named.is_empty() {
            for symbol in &classification.named {
                out.push_str(&format!("%token\t{}\n", symbol));
            }
            out.push('\n');
            type_block(&mut out, classification.named.iter());
        }

        if !classification.punctuation.is_empty() {
            for (literal, symbol) in &classification.punctuation {
                out.push_str(&format!(
                    "%token\t{}\t/* Name for {} */\n",
                    symbol,
                    comment(&quote(literal))
                ));
            }
            out.push('\n');
            type_block(&mut out, classification.punctuation.iter().map(|(_, symbol)| symbol));
        }

        if !classification.words.is_empty() {
            for symbol in &classification.words {
                out.push_str(&format!("%token\t{}\n", symbol));
            }
            out.push('\n');
            type_block(&mut out, classification.words.iter());
        }

        type_block(&mut out, self.report.nonterminals.iter());
        out.push_str(&format!(
            "/* Add %left, %right, ... declarations here. */\n\n%start {}\n\n%%\n\n",
            self.start
        ));

        for name in &self.report.nonterminals {
            let production = match self.grammar.get(name) {
                Some(production) => production,
                None => {
                    return Err(cfg_ebnf::GrammarError::UnknownProduction(name.clone()).into())
                }
            };
            out.push_str(&format!("{}:\n", name));
            for (i, branch) in production.expr.branches().iter().enumerate() {
                out.push_str(if i == 0 { "\t" } else { "|\t" });
                out.push_str(&format!(
                    "{}\n\t{{\n\t\t{}\n\t}}\n",
                    self.render_body(name, branch)?,
                    self.render_action(name, branch)?
                ));
            }
            out.push('\n');
        }

        out.push_str("%%\n\n// Demo code below. Remove it once real actions are in place.\n\n");
        out.push_str("var _parserResult interface{}\n\ntype (\n");
        for name in &self.report.nonterminals {
            out.push_str(&format!("\t{} interface{{}}\n", name));
        }
        out.push_str(")\n\n");
        out.push_str(DUMP);
        Ok(out)
    }

    /// Renders one branch of `production` as a rule body.
    pub fn render_body(&self, production: &str, branch: &Expression) -> Result<String, Error> {
        match branch {
            Expression::Empty => Ok("/* EMPTY */".to_string()),
            Expression::Sequence(items) => {
                let mut leaves = vec![];
                for item in items {
                    match item {
                        Expression::Empty => {}
                        leaf => leaves.push(self.render_leaf(production, leaf)?),
                    }
                }
                Ok(leaves.join(" "))
            }
            leaf => self.render_leaf(production, leaf),
        }
    }

    fn render_leaf(&self, production: &str, leaf: &Expression) -> Result<String, Error> {
        match leaf {
            Expression::Name(name) if is_exported(name) => Ok(name.clone()),
            Expression::Name(name) => self.symbol(Terminal::Name(name.clone())),
            Expression::Token(text) => match single_char(text) {
                Some(ch) => Ok(quote_char(ch)),
                None => {
                    let symbol = self.symbol(Terminal::Literal(text.clone()))?;
                    if identifier_chars(text).is_empty() {
                        Ok(format!("{} /* {} */", symbol, comment(&quote(text))))
                    } else {
                        Ok(symbol)
                    }
                }
            },
            other => Err(unsupported(production, other)),
        }
    }

    /// Renders the semantic action of one branch of `production`.
    ///
    /// Every leaf of the branch gets one positional marker, in the order
    /// [`render_body`](Self::render_body) writes the leaves.
    pub fn render_action(&self, production: &str, branch: &Expression) -> Result<String, Error> {
        let markers = self.markers(production, branch)?;
        if self.repetitions.contains(production) {
            return Ok(if markers.is_empty() {
                format!("$$ = []{}(nil)", production)
            } else {
                let mut args = vec![format!("$1.([]{})", production)];
                args.extend(markers[1..].iter().cloned());
                format!("$$ = append({})", args.join(", "))
            });
        }
        let target = if production == self.start {
            "_parserResult"
        } else {
            "$$"
        };
        Ok(match markers.len() {
            0 => format!("{} = nil", target),
            1 => format!("{} = {}", target, markers[0]),
            _ => format!("{} = []{}{{{}}}", target, production, markers.join(", ")),
        })
    }

    fn markers(&self, production: &str, branch: &Expression) -> Result<Vec<String>, Error> {
        let leaves: &[Expression] = match branch {
            Expression::Sequence(items) => items,
            Expression::Alternative(_) => return Err(unsupported(production, branch)),
            leaf => std::slice::from_ref(leaf),
        };
        let mut markers = vec![];
        for leaf in leaves {
            let position = markers.len() + 1;
            match leaf {
                Expression::Empty => {}
                // Character literals carry no declared type.
                Expression::Token(text) if is_single_char(text) => {
                    markers.push(format!("$<item>{}", position))
                }
                Expression::Name(_) | Expression::Token(_) => {
                    markers.push(format!("${}", position))
                }
                other => return Err(unsupported(production, other)),
            }
        }
        Ok(markers)
    }

    fn symbol(&self, terminal: Terminal) -> Result<String, Error> {
        match self.classification.symbol(&terminal) {
            Some(symbol) => Ok(symbol.to_string()),
            None => Err(Error::UnknownTerminal(terminal.to_string())),
        }
    }
}

fn type_block<'s>(out: &mut String, symbols: impl Iterator<Item = &'s String>) {
    out.push_str(&format!("%type\t<item>\t{}\n", TYPE_COMMENT));
    for symbol in symbols {
        out.push_str(&format!("\t{}\n", symbol));
    }
    out.push('\n');
}

fn single_char(text: &str) -> Option<char> {
    if is_single_char(text) {
        text.chars().next()
    } else {
        None
    }
}

/// Keeps quoted text from closing the surrounding block comment.
fn comment(text: &str) -> String {
    text.replace("*/", "*\\/")
}

fn unsupported(production: &str, expr: &Expression) -> Error {
    Error::UnsupportedExpression {
        production: production.to_string(),
        expr: expr.to_string(),
    }
}
