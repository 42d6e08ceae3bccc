//! Diagnostics and per-file analysis results.

use crate::blame::Attribution;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Reporter name used for diagnostics raised by lintblame itself.
pub const INTERNAL_REPORTER: &str = "lintblame";

/// One issue reported by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Adapter that produced it (`PEP8`, `Pylint`, `gobuild`).
    pub reporter: String,
    /// 1-based line.
    pub line: usize,
    /// 0 when the tool does not report columns.
    pub column: usize,
    /// Tool-specific issue code, `-` when the tool has none.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic; a line below 1 is clamped to 1.
    pub fn new(
        reporter: impl Into<String>,
        line: usize,
        column: usize,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            reporter: reporter.into(),
            line: line.max(1),
            column,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Placeholder reported when a file's analysis exceeded its budget.
    pub fn timed_out(budget: Duration) -> Self {
        Self::new(
            INTERNAL_REPORTER,
            1,
            0,
            "timeout",
            format!("analysis timed out after {}s", budget.as_secs_f64()),
        )
    }

    /// Whether this is the placeholder from [`Diagnostic::timed_out`].
    pub fn is_timeout(&self) -> bool {
        self.reporter == INTERNAL_REPORTER && self.code == "timeout"
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{} {}] {}",
            self.line, self.reporter, self.code, self.message
        )
    }
}

/// Diagnostics of one file keyed by line, in insertion order per line.
///
/// This is the mutable side used while a file is being analysed. It is
/// frozen into an [`AnalysisResult`] once every adapter has run.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticIndex {
    by_line: BTreeMap<usize, Vec<Diagnostic>>,
}

impl DiagnosticIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append after anything already on the same line.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.by_line
            .entry(diagnostic.line)
            .or_default()
            .push(diagnostic);
    }

    /// [`DiagnosticIndex::add`] each diagnostic in turn.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.add(diagnostic);
        }
    }

    /// True when nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }

    /// Number of diagnostics across all lines.
    pub fn len(&self) -> usize {
        self.by_line.values().map(Vec::len).sum()
    }
}

/// The immutable outcome of analysing one file.
///
/// A new value is produced on every pass; callers replace the previous one
/// rather than updating it.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    path: PathBuf,
    content_lines: Vec<String>,
    blame_lines: Vec<String>,
    diagnostics: BTreeMap<usize, Vec<Diagnostic>>,
}

impl AnalysisResult {
    /// Freeze an index into a result.
    ///
    /// Diagnostics pointing past the last content line are pinned to the
    /// last line so every key stays within `1..=content_lines.len()`.
    pub fn new(
        path: PathBuf,
        content_lines: Vec<String>,
        blame_lines: Vec<String>,
        index: DiagnosticIndex,
    ) -> Self {
        let last_line = content_lines.len().max(1);
        let mut diagnostics: BTreeMap<usize, Vec<Diagnostic>> = BTreeMap::new();
        for (line, entries) in index.by_line {
            let key = if line > last_line {
                debug!(
                    path = %path.display(),
                    line,
                    last_line,
                    "diagnostic past end of file, pinning to last line"
                );
                last_line
            } else {
                line
            };
            diagnostics.entry(key).or_default().extend(entries);
        }

        Self {
            path,
            content_lines,
            blame_lines,
            diagnostics,
        }
    }

    /// Result for a file that could not be analysed at all.
    pub fn empty(path: PathBuf) -> Self {
        Self::new(path, Vec::new(), Vec::new(), DiagnosticIndex::new())
    }

    /// Result for a file whose analysis ran past its budget.
    ///
    /// The content is unknown, so it holds a single empty line to carry
    /// the timeout diagnostic.
    pub fn timed_out(path: PathBuf, budget: Duration) -> Self {
        let mut index = DiagnosticIndex::new();
        index.add(Diagnostic::timed_out(budget));
        Self::new(path, vec![String::new()], Vec::new(), index)
    }

    /// The analysed file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File content split into lines, without line terminators.
    pub fn content_lines(&self) -> &[String] {
        &self.content_lines
    }

    /// Raw attribution lines, empty when attribution was unavailable.
    pub fn blame_lines(&self) -> &[String] {
        &self.blame_lines
    }

    /// Source text of a 1-based line.
    pub fn content_line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|i| self.content_lines.get(i))
            .map(String::as_str)
    }

    /// Diagnostics on a line; empty when there are none.
    pub fn diagnostics_at(&self, line: usize) -> &[Diagnostic] {
        self.diagnostics
            .get(&line)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Lines carrying diagnostics, ascending.
    pub fn flagged_lines(&self) -> impl Iterator<Item = (usize, &[Diagnostic])> {
        self.diagnostics
            .iter()
            .map(|(line, diagnostics)| (*line, diagnostics.as_slice()))
    }

    /// True when no adapter reported anything.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of diagnostics across all lines.
    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.values().map(Vec::len).sum()
    }

    /// Whether the analysis (or part of it) ran out of time.
    pub fn has_timed_out(&self) -> bool {
        self.diagnostics
            .values()
            .flatten()
            .any(Diagnostic::is_timeout)
    }

    /// Author of a 1-based line, or [`crate::UNKNOWN_AUTHOR`].
    pub fn author_of(&self, line: usize) -> &str {
        Attribution::new(&self.blame_lines).author(line)
    }
}
