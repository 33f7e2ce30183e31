#![allow(dead_code)]

use std::path::Path;

use cfg_yacc::{ConflictOracle, Error, Job, Mode, Options, Search, SearchReport};
use clap::Parser;

pub fn options(args: &[&str]) -> Options {
    let argv = std::iter::once("cfg-yacc").chain(args.iter().copied());
    match Options::try_parse_from(argv) {
        Ok(options) => options,
        Err(error) => panic!("invalid test options {:?}: {}", args, error),
    }
}

pub fn job(source: &str, args: &[&str]) -> Job {
    let grammar = cfg_ebnf::parse("test", source).expect("failed to load test grammar");
    Job::prepare(grammar, &options(args)).expect("failed to prepare job")
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("cannot read artifact")
}

/// Oracle that answers from the artifact text alone.
pub fn stub(
    mut answer: impl FnMut(&str) -> String,
) -> impl FnMut(&Path) -> Result<String, Error> {
    move |path: &Path| Ok(answer(&read(path)))
}

pub fn conflicts(n: usize) -> String {
    format!("conflicts: {} shift/reduce\n", n)
}

/// Counts rule blocks of a rendered artifact.
pub fn rule_count(artifact: &str) -> usize {
    artifact
        .lines()
        .filter(|line| {
            line.ends_with(':') && line.chars().next().map_or(false, char::is_alphabetic)
        })
        .count()
}

/// Counts positional markers such as `$1` and `$<item>2`, ignoring `$$`.
pub fn marker_count(action: &str) -> usize {
    let chars: Vec<char> = action.chars().collect();
    chars
        .windows(2)
        .filter(|pair| pair[0] == '$' && (pair[1].is_ascii_digit() || pair[1] == '<'))
        .count()
}

/// Runs a full search writing to `artifact`.
pub fn search<O: ConflictOracle>(job: &mut Job, oracle: &mut O, artifact: &Path) -> SearchReport {
    let mode = Mode::Search { verbose: false };
    match Search::new(job, oracle, Some(artifact), mode).and_then(Search::run) {
        Ok(report) => report,
        Err(error) => panic!("search failed: {}", error),
    }
}
