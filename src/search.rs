//! Greedy search for a grammar with fewer parser conflicts.
//!
//! Each round scores the current grammar, then tries inlining every
//! candidate nonterminal on its own and keeps the single inlining that
//! lowers the score the most. Once no inlining helps, rules the parser
//! generator reports as never reduced are inlined one at a time, each
//! restarting the search.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use cfg_ebnf::BnfGrammar;
use log::{debug, info, warn, Level};

use crate::error::Error;
use crate::job::Job;
use crate::oracle::{never_reduced, score, ConflictOracle, Score};

/// Whether and how verbosely to search.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Render once.
    SingleShot,
    /// Search, logging every candidate when `verbose`.
    Search { verbose: bool },
}

/// An inlining kept by the search.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Improvement {
    pub name: String,
    pub from: usize,
    pub to: usize,
}

/// What the search changed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchReport {
    /// Inlinings that lowered the conflict count, in order.
    pub improvements: Vec<Improvement>,
    /// Nonterminals inlined because some of their rules were never reduced.
    pub repaired: Vec<String>,
    /// Never-reduced nonterminals that could not be inlined.
    pub unrepairable: Vec<String>,
}

#[derive(Debug)]
enum State {
    Emit,
    Score,
    Explore {
        baseline: usize,
    },
    Commit {
        normalized: BnfGrammar,
        baseline: usize,
        best: Option<(String, usize)>,
    },
    RepairUnreachable,
    Done,
}

/// Drives renderings of a [`Job`] and scores them with an oracle.
pub struct Search<'a, O> {
    job: &'a mut Job,
    oracle: &'a mut O,
    artifact: Option<PathBuf>,
    mode: Mode,
    /// Nonterminals already inlined to repair never-reduced rules.
    tried: BTreeSet<String>,
    report: SearchReport,
}

impl<'a, O: ConflictOracle> Search<'a, O> {
    /// Searching requires an `artifact` path for the oracle to read.
    pub fn new(
        job: &'a mut Job,
        oracle: &'a mut O,
        artifact: Option<&Path>,
        mode: Mode,
    ) -> Result<Self, Error> {
        if mode != Mode::SingleShot && artifact.is_none() {
            return Err(Error::Usage(
                "searching requires a named output file".to_string(),
            ));
        }
        Ok(Search {
            job,
            oracle,
            artifact: artifact.map(Path::to_path_buf),
            mode,
            tried: BTreeSet::new(),
            report: SearchReport::default(),
        })
    }

    pub fn run(mut self) -> Result<SearchReport, Error> {
        let mut state = State::Emit;
        loop {
            state = match self.step(state)? {
                State::Done => return Ok(self.report),
                next => next,
            };
        }
    }

    fn step(&mut self, state: State) -> Result<State, Error> {
        match state {
            State::Emit => {
                self.emit()?;
                match self.mode {
                    Mode::SingleShot => Ok(State::Done),
                    Mode::Search { .. } => Ok(State::Score),
                }
            }
            State::Score => match self.score()? {
                Score::Conflicts(baseline) => {
                    info!(target: "search", "baseline: {} conflicts", baseline);
                    Ok(State::Explore { baseline })
                }
                Score::Indeterminate => {
                    warn!(target: "search", "cannot read the conflict count, skipping exploration");
                    Ok(State::RepairUnreachable)
                }
            },
            State::Explore { baseline } => self.explore(baseline),
            State::Commit {
                mut normalized,
                baseline,
                best,
            } => match best {
                Some((name, to)) if to < baseline => {
                    normalized.inline_one(&name, true)?;
                    self.job.set_grammar(normalized);
                    info!(target: "search", "Inlined {:?}: conflicts {} -> {}", name, baseline, to);
                    self.report.improvements.push(Improvement {
                        name,
                        from: baseline,
                        to,
                    });
                    Ok(State::Emit)
                }
                _ => {
                    self.job.set_grammar(normalized);
                    Ok(State::RepairUnreachable)
                }
            },
            State::RepairUnreachable => self.repair(),
            State::Done => Ok(State::Done),
        }
    }

    fn explore(&mut self, baseline: usize) -> Result<State, Error> {
        let normalized = self.job.grammar().normalize();
        let candidates: Vec<String> = normalized
            .names()
            .filter(|name| self.job.is_candidate(name))
            .map(str::to_string)
            .collect();
        let mut best: Option<(String, usize)> = None;
        for name in candidates {
            let mut trial = normalized.normalize();
            if let Err(error) = trial.inline_one(&name, true) {
                self.log(format_args!("{:?}: skipped, {}", name, error));
                continue;
            }
            self.job.set_grammar(trial);
            self.emit()?;
            let score = self.score()?;
            self.log(format_args!("{:?}: {}", name, score));
            if let Score::Conflicts(n) = score {
                if best.as_ref().map_or(n < baseline, |(_, least)| n < *least) {
                    best = Some((name, n));
                }
            }
        }
        Ok(State::Commit {
            normalized,
            baseline,
            best,
        })
    }

    fn repair(&mut self) -> Result<State, Error> {
        self.emit()?;
        let diagnostics = self.diagnostics()?;
        for name in never_reduced(&diagnostics)? {
            if !self.tried.insert(name.clone()) {
                continue;
            }
            if !self.job.is_candidate(&name) {
                warn!(target: "search", "rule {:?} is never reduced, but cannot be inlined", name);
                self.report.unrepairable.push(name);
                continue;
            }
            let mut grammar = self.job.grammar().normalize();
            match grammar.inline_one(&name, true) {
                Ok(()) => {
                    info!(target: "search", "Inlined {:?}: rule never reduced", name);
                    self.job.set_grammar(grammar);
                    self.report.repaired.push(name);
                    return Ok(State::Emit);
                }
                Err(error) => {
                    warn!(target: "search", "rule {:?} is never reduced: {}", name, error);
                    self.report.unrepairable.push(name);
                }
            }
        }
        debug!(target: "search", "no rule left to repair");
        Ok(State::Done)
    }

    fn emit(&mut self) -> Result<(), Error> {
        self.job.emit(self.artifact.as_deref())
    }

    fn diagnostics(&mut self) -> Result<String, Error> {
        let artifact = match &self.artifact {
            Some(artifact) => artifact,
            None => return Err(Error::Usage("searching requires a named output file".to_string())),
        };
        let diagnostics = self.oracle.diagnostics(artifact)?;
        self.log(format_args!("oracle output:\n{}", diagnostics.trim_end()));
        Ok(diagnostics)
    }

    fn score(&mut self) -> Result<Score, Error> {
        let diagnostics = self.diagnostics()?;
        Ok(score(&diagnostics))
    }

    /// Candidate progress is logged at `info` in verbose mode, otherwise at
    /// `debug`.
    fn log(&self, args: std::fmt::Arguments) {
        let level = match self.mode {
            Mode::Search { verbose: true } => Level::Info,
            _ => Level::Debug,
        };
        log::log!(target: "search", level, "{}", args);
    }
}
