//! Per-line authorship.

use crate::process::{CommandRunner, Invocation, SystemRunner};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Author reported when a line cannot be attributed.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Name immediately followed by a four digit year, as in
/// `4f2a91c0 (Jane Doe 2021-03-04 10:00:00 +0100 12) x = 1`.
static BLAME_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([\w\s]+)\d{4}").unwrap());

/// Supplies raw attribution text for a file.
pub trait BlameProvider: Send + Sync {
    /// One attribution line per content line, or empty when the file has
    /// no history (not under version control, tool failure, timeout).
    fn blame_lines(&self, path: &Path, timeout: Duration) -> Vec<String>;

    /// Author of a 1-based line of `path`.
    fn attribute(&self, path: &Path, line: usize, timeout: Duration) -> String {
        let lines = self.blame_lines(path, timeout);
        Attribution::new(&lines).author(line).to_string()
    }
}

/// Extracts author names from already fetched attribution lines.
#[derive(Debug, Clone, Copy)]
pub struct Attribution<'a> {
    lines: &'a [String],
}

impl<'a> Attribution<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Self { lines }
    }

    pub fn is_available(&self) -> bool {
        !self.lines.is_empty()
    }

    /// Author of a 1-based line, [`UNKNOWN_AUTHOR`] if there is none.
    pub fn author(&self, line: usize) -> &'a str {
        line.checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .and_then(|text| BLAME_NAME.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR)
    }
}

/// `git blame` run next to the file.
pub struct GitBlame {
    runner: Arc<dyn CommandRunner>,
}

impl GitBlame {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Default for GitBlame {
    fn default() -> Self {
        Self::new(Arc::new(SystemRunner))
    }
}

impl BlameProvider for GitBlame {
    fn blame_lines(&self, path: &Path, timeout: Duration) -> Vec<String> {
        let mut invocation = Invocation::new("git").arg("blame");
        invocation = match (path.parent(), path.file_name()) {
            (Some(dir), Some(name)) if !dir.as_os_str().is_empty() => invocation
                .current_dir(dir)
                .arg(name.to_string_lossy().into_owned()),
            _ => invocation.path_arg(path),
        };

        match self.runner.run(&invocation, timeout) {
            Ok(output) if output.succeeded() => output.text.lines().map(str::to_string).collect(),
            Ok(output) => {
                debug!(path = %path.display(), status = ?output.status, "no blame for file");
                Vec::new()
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "blame unavailable");
                Vec::new()
            }
        }
    }
}

/// Provider for trees without history.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBlame;

impl BlameProvider for NoBlame {
    fn blame_lines(&self, _path: &Path, _timeout: Duration) -> Vec<String> {
        Vec::new()
    }
}
