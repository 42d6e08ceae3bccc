//! Analyzer adapters: run one external tool and turn its report into
//! [`Diagnostic`]s.
//!
//! Each tool prints one issue per line, but the field order differs:
//!
//! | tool       | example                                  |
//! |------------|------------------------------------------|
//! | `pep8`     | `mod.py:3:80: E501 line too long`        |
//! | `pylint`   | `W: 12, 4: unused import`                |
//! | `go build` | `main.go:7: undefined: foo`              |
//!
//! A [`LinePattern`] names which capture group holds which field, so the
//! same extraction code serves all of them.

use crate::diagnostic::Diagnostic;
use crate::error::{LintError, Result};
use crate::process::{Capture, CommandRunner, Invocation, SystemRunner};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

static PEP8_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^.*?:(\d+):(\d+):\s(\w+)\s(.+)$").unwrap());
static PYLINT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\w):\s+(\d+),\s*(\d+):\s(.+)$").unwrap());
static GO_BUILD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^.*?\w:(\d+):(?:(\d+):)?\s(.+)$").unwrap());

/// Code used when a tool reports none.
pub const NO_CODE: &str = "-";

/// Where each diagnostic field sits in a tool's output line.
///
/// Indices are regex capture groups. `column` and `code` may be absent, in
/// which case they default to 0 and [`NO_CODE`].
#[derive(Debug, Clone, Copy)]
pub struct LinePattern {
    regex: &'static Lazy<Regex>,
    line: usize,
    column: Option<usize>,
    code: Option<usize>,
    message: usize,
}

impl LinePattern {
    /// `path:line:column: CODE message`
    pub fn pep8() -> Self {
        Self {
            regex: &PEP8_LINE,
            line: 1,
            column: Some(2),
            code: Some(3),
            message: 4,
        }
    }

    /// `C: line, column: message`
    pub fn pylint() -> Self {
        Self {
            regex: &PYLINT_LINE,
            line: 2,
            column: Some(3),
            code: Some(1),
            message: 4,
        }
    }

    /// `path:line: message`, or `path:line:column: message`
    pub fn go_build() -> Self {
        Self {
            regex: &GO_BUILD_LINE,
            line: 1,
            column: Some(2),
            code: None,
            message: 3,
        }
    }

    /// Extract every diagnostic in `output`, attributing them to `reporter`.
    ///
    /// Lines that do not match are ignored. A matching line with a number
    /// that does not fit means the tool is not speaking the format this
    /// pattern was written for. Line 0 (whole-file issues) lands on line 1.
    pub fn extract(&self, reporter: &str, output: &str) -> Result<Vec<Diagnostic>> {
        self.regex
            .captures_iter(output)
            .map(|caps| self.diagnostic(reporter, &caps))
            .collect()
    }

    fn diagnostic(&self, reporter: &str, caps: &Captures<'_>) -> Result<Diagnostic> {
        let line = number(reporter, "line", caps, self.line)?.unwrap_or(1);
        let column = match self.column {
            Some(group) => number(reporter, "column", caps, group)?.unwrap_or(0),
            None => 0,
        };
        let code = self
            .code
            .and_then(|group| caps.get(group))
            .map(|m| m.as_str())
            .unwrap_or(NO_CODE);
        let message = caps
            .get(self.message)
            .map(|m| m.as_str().trim_end())
            .unwrap_or_default();

        Ok(Diagnostic::new(reporter, line, column, code, message))
    }
}

fn number(
    reporter: &str,
    field: &'static str,
    caps: &Captures<'_>,
    group: usize,
) -> Result<Option<usize>> {
    match caps.get(group) {
        None => Ok(None),
        Some(m) => m
            .as_str()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| malformed(reporter, field, m.as_str(), caps)),
    }
}

fn malformed(reporter: &str, field: &'static str, value: &str, caps: &Captures<'_>) -> LintError {
    LintError::MalformedToolOutput {
        reporter: reporter.to_string(),
        field,
        value: value.to_string(),
        line: caps
            .get(0)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    }
}

/// Runs one external analyzer against a file.
pub trait AnalyzerAdapter: Send + Sync {
    /// Reporter name attached to every diagnostic.
    fn name(&self) -> &str;

    /// Whether this adapter handles `path` at all.
    fn applies_to(&self, path: &Path) -> bool;

    /// Run the tool and return its raw report.
    ///
    /// Launch failures and timeouts are returned as errors; a tool that
    /// exits non-zero still hands back whatever it printed.
    fn run(&self, path: &Path, timeout: Duration) -> Result<String>;

    /// Turn a raw report into diagnostics.
    fn extract(&self, output: &str) -> Result<Vec<Diagnostic>>;
}

/// Static description of a supported tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub reporter: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub extension: &'static str,
    pub capture: Capture,
    /// Run inside the file's directory and pass only the file name.
    pub run_in_file_dir: bool,
    pub pattern: fn() -> LinePattern,
}

pub const PEP8: ToolSpec = ToolSpec {
    reporter: "PEP8",
    program: "pep8",
    args: &[],
    extension: "py",
    capture: Capture::Stdout,
    run_in_file_dir: false,
    pattern: LinePattern::pep8,
};

pub const PYLINT: ToolSpec = ToolSpec {
    reporter: "Pylint",
    program: "pylint",
    args: &["--output-format=text"],
    extension: "py",
    capture: Capture::Stdout,
    run_in_file_dir: false,
    pattern: LinePattern::pylint,
};

pub const GO_BUILD: ToolSpec = ToolSpec {
    reporter: "gobuild",
    program: "go",
    args: &["build"],
    extension: "go",
    capture: Capture::Combined,
    run_in_file_dir: true,
    pattern: LinePattern::go_build,
};

/// The tools lintblame knows about, in invocation order.
pub const BUILTIN_TOOLS: [ToolSpec; 3] = [PEP8, PYLINT, GO_BUILD];

/// An adapter backed by an external command.
pub struct CommandAdapter {
    spec: ToolSpec,
    pattern: LinePattern,
    runner: Arc<dyn CommandRunner>,
}

impl CommandAdapter {
    pub fn new(spec: ToolSpec, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            spec,
            pattern: (spec.pattern)(),
            runner,
        }
    }

    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn invocation(&self, path: &Path) -> Invocation {
        let mut invocation = Invocation::new(self.spec.program).capture(self.spec.capture);
        for arg in self.spec.args {
            invocation = invocation.arg(*arg);
        }
        if self.spec.run_in_file_dir {
            if let (Some(dir), Some(name)) = (path.parent(), path.file_name()) {
                return invocation
                    .current_dir(dir)
                    .arg(name.to_string_lossy().into_owned());
            }
        }
        invocation.path_arg(path)
    }
}

impl AnalyzerAdapter for CommandAdapter {
    fn name(&self) -> &str {
        self.spec.reporter
    }

    fn applies_to(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext == self.spec.extension)
            .unwrap_or(false)
    }

    fn run(&self, path: &Path, timeout: Duration) -> Result<String> {
        let output = self.runner.run(&self.invocation(path), timeout)?;
        if !output.succeeded() {
            debug!(
                tool = self.spec.reporter,
                path = %path.display(),
                status = ?output.status,
                "tool exited non-zero"
            );
        }
        Ok(output.text)
    }

    fn extract(&self, output: &str) -> Result<Vec<Diagnostic>> {
        self.pattern.extract(self.spec.reporter, output)
    }
}

/// One adapter per built-in tool, sharing `runner`.
pub fn builtin_adapters(runner: Arc<dyn CommandRunner>) -> Vec<Arc<dyn AnalyzerAdapter>> {
    BUILTIN_TOOLS
        .iter()
        .map(|spec| Arc::new(CommandAdapter::new(*spec, runner.clone())) as Arc<dyn AnalyzerAdapter>)
        .collect()
}

/// Built-in adapters launching real processes.
pub fn default_adapters() -> Vec<Arc<dyn AnalyzerAdapter>> {
    builtin_adapters(Arc::new(SystemRunner))
}

/// File extensions handled by the built-in tools, deduplicated.
pub fn recognized_extensions() -> Vec<&'static str> {
    let mut extensions: Vec<&'static str> = BUILTIN_TOOLS.iter().map(|t| t.extension).collect();
    extensions.dedup();
    extensions
}
