//! The conversion of one input grammar.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use cfg_ebnf::{is_exported, BnfGrammar, Expr, Grammar, RepetitionSet, Rhs};
use log::{debug, info};

use crate::classify::Classification;
use crate::error::Error;
use crate::names::{is_reserved_word, NameRegistry};
use crate::options::Options;
use crate::render::Renderer;

/// Working state shared by every rendering of one grammar.
#[derive(Clone, Debug)]
pub struct Job {
    grammar: BnfGrammar,
    repetitions: RepetitionSet,
    names: NameRegistry,
    /// The invented start symbol, `Start = <user start>`.
    start: String,
    user_start: String,
    prefix: String,
}

impl Job {
    /// Checks and converts the input grammar to bare form.
    pub fn prepare(mut grammar: Grammar, options: &Options) -> Result<Self, Error> {
        let user_start = options.start.clone();
        grammar.verify(&user_start)?;
        if let Some(eliminate_all) = options.inline_ebnf.eliminate_all() {
            grammar.inline(&user_start, eliminate_all)?;
        }
        if let Some(path) = options.pretty_output() {
            write_file(path, &grammar.to_string())?;
            info!("wrote {}", path.display());
        }

        let mut names = NameRegistry::new();
        for name in grammar.names() {
            if is_reserved_word(name) {
                return Err(Error::NameCollision(name.to_string()));
            }
        }
        for name in grammar.names() {
            names.reserve(name);
        }
        let start = names.allocate("Start", "");
        grammar.insert(start.clone(), Expr::Name(user_start.clone()));

        let (mut bnf, repetitions) =
            grammar.to_bnf(&start, |owner: &str| names.allocate(owner, ""))?;
        if let Some(eliminate_all) = options.inline_bnf.eliminate_all() {
            let mut protected = repetition_elements(&bnf, &repetitions);
            protected.extend(repetitions.iter().cloned());
            protected.insert(user_start.clone());
            bnf.inline(&start, eliminate_all, &protected)?;
        }
        debug!(
            "prepared {} nonterminals, {} repetitions, start {}",
            bnf.len(),
            repetitions.len(),
            start
        );

        Ok(Job {
            grammar: bnf,
            repetitions,
            names,
            start,
            user_start,
            prefix: options.prefix.clone(),
        })
    }

    pub fn grammar(&self) -> &BnfGrammar {
        &self.grammar
    }

    pub fn set_grammar(&mut self, grammar: BnfGrammar) {
        self.grammar = grammar;
    }

    pub fn repetitions(&self) -> &RepetitionSet {
        &self.repetitions
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn user_start(&self) -> &str {
        &self.user_start
    }

    pub fn names(&self) -> &NameRegistry {
        &self.names
    }

    /// Checks whether `name` may be inlined without breaking the start
    /// symbol or the shape of a repetition.
    pub fn is_candidate(&self, name: &str) -> bool {
        name != self.start
            && !self.repetitions.contains(name)
            && !self
                .repetitions
                .iter()
                .filter_map(|repetition| self.grammar.get(repetition))
                .any(|production| production.expr.refers_to(name))
    }

    /// Renders the current grammar. Symbols allocated for terminals are
    /// released afterwards, so every rendering starts from the same names.
    pub fn render(&mut self) -> Result<String, Error> {
        let checkpoint = self.names.checkpoint();
        let result = self.render_with_names();
        self.names.rollback(checkpoint);
        result
    }

    fn render_with_names(&mut self) -> Result<String, Error> {
        let report = self.grammar.analyze(&self.start)?;
        let classification = Classification::new(&report, &self.prefix, &mut self.names);
        Renderer {
            grammar: &self.grammar,
            repetitions: &self.repetitions,
            report: &report,
            classification: &classification,
            start: &self.start,
        }
        .render()
    }

    /// Writes the artifact to `path`, or to standard output.
    pub fn emit(&mut self, path: Option<&Path>) -> Result<(), Error> {
        let text = self.render()?;
        match path {
            Some(path) => write_file(path, &text),
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                out.write_all(text.as_bytes())
                    .and_then(|()| out.flush())
                    .map_err(|source| Error::Write {
                        target: "<stdout>".to_string(),
                        source,
                    })
            }
        }
    }
}

/// Nonterminals referenced by repetition productions.
fn repetition_elements(grammar: &BnfGrammar, repetitions: &RepetitionSet) -> BTreeSet<String> {
    let mut elements = BTreeSet::new();
    for production in repetitions.iter().filter_map(|name| grammar.get(name)) {
        production.expr.visit_names(&mut |name| {
            if is_exported(name) {
                elements.insert(name.to_string());
            }
        });
    }
    elements
}

fn write_file(path: &Path, text: &str) -> Result<(), Error> {
    let error = |source| Error::Write {
        target: path.display().to_string(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(error)?);
    out.write_all(text.as_bytes()).map_err(error)?;
    out.flush().map_err(error)
}
