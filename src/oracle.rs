//! Runs a parser generator on a rendered artifact and reads its conflict
//! report.

use std::fmt;
use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::Error;

/// Something that reports parser conflicts for an artifact on disk.
pub trait ConflictOracle {
    /// Returns the diagnostics printed for the artifact at `artifact`.
    fn diagnostics(&mut self, artifact: &Path) -> Result<String, Error>;
}

impl<F> ConflictOracle for F
where
    F: FnMut(&Path) -> Result<String, Error>,
{
    fn diagnostics(&mut self, artifact: &Path) -> Result<String, Error> {
        self(artifact)
    }
}

/// Runs goyacc, or a compatible command such as `go tool yacc`.
#[derive(Clone, Debug)]
pub struct YaccOracle {
    command: String,
}

impl YaccOracle {
    /// `command` is split on whitespace; the artifact path is appended as
    /// the last argument.
    pub fn new(command: impl Into<String>) -> Self {
        YaccOracle {
            command: command.into(),
        }
    }

    fn fail(&self, reason: impl fmt::Display) -> Error {
        Error::OracleInvocation {
            command: self.command.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ConflictOracle for YaccOracle {
    fn diagnostics(&mut self, artifact: &Path) -> Result<String, Error> {
        let mut words = self.command.split_whitespace();
        let program = words.next().ok_or_else(|| self.fail("empty command"))?;
        let artifact = artifact.canonicalize().map_err(|error| self.fail(error))?;
        // The generator writes y.go and y.output next to itself.
        let scratch = tempfile::tempdir().map_err(|error| self.fail(error))?;
        debug!("running {} {}", self.command, artifact.display());
        let output = Command::new(program)
            .args(words)
            .arg(&artifact)
            .current_dir(scratch.path())
            .output()
            .map_err(|error| self.fail(error))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.fail(format!("{}: {}", output.status, stderr.trim())));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Number of conflicts reported for one artifact.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Score {
    Conflicts(usize),
    /// The report could not be read.
    Indeterminate,
}

impl Score {
    /// The conflict count, or `-1` when indeterminate.
    pub fn value(self) -> i64 {
        match self {
            Score::Conflicts(n) => i64::try_from(n).unwrap_or(i64::MAX),
            Score::Indeterminate => -1,
        }
    }

    pub fn conflicts(self) -> Option<usize> {
        match self {
            Score::Conflicts(n) => Some(n),
            Score::Indeterminate => None,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Adds up the shift/reduce and reduce/reduce counts of a report.
///
/// A kind of conflict that is not mentioned counts as zero.
pub fn score(diagnostics: &str) -> Score {
    let mut total = 0usize;
    for marker in [" shift/reduce", " reduce/reduce"] {
        let count = match diagnostics.find(marker) {
            Some(at) => count_before(&diagnostics[..at]),
            None => Some(0),
        };
        match count.and_then(|count| total.checked_add(count)) {
            Some(sum) => total = sum,
            None => return Score::Indeterminate,
        }
    }
    Score::Conflicts(total)
}

/// Parses the run of digits that ends `text`.
fn count_before(text: &str) -> Option<usize> {
    let digits = text.len() - text.trim_end_matches(|ch: char| ch.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    text[text.len() - digits..].parse().ok()
}

/// Returns the nonterminals of the rules reported as never reduced, in
/// report order.
pub fn never_reduced(diagnostics: &str) -> Result<Vec<String>, Error> {
    let mut names = vec![];
    for line in diagnostics.lines() {
        let line = line.trim();
        let rule = match line
            .strip_prefix("rule ")
            .and_then(|rest| rest.strip_suffix("never reduced"))
        {
            Some(rule) => rule,
            None => continue,
        };
        let name = match rule.split_once(':') {
            Some((name, _)) => name.trim(),
            None => return Err(Error::MalformedDiagnostic(line.to_string())),
        };
        let identifier = name
            .chars()
            .all(|ch| ch == '_' || ch == '$' || ch.is_alphanumeric());
        if name.is_empty() || !identifier {
            return Err(Error::MalformedDiagnostic(line.to_string()));
        }
        names.push(name.to_string());
    }
    Ok(names)
}
