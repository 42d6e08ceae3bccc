//! Launching external tools with a deadline.
//!
//! Every analyzer and the blame provider go through [`CommandRunner`], so a
//! hung tool can be killed and tests can substitute canned output.

use crate::error::{LintError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_STEP: Duration = Duration::from_millis(10);

/// Which output streams a tool's report is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Only stdout (linters).
    Stdout,
    /// stdout followed by stderr (build tools report on stderr).
    Combined,
}

/// A fully described tool launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    pub capture: Capture,
}

impl Invocation {
    /// Run `program` with no arguments, capturing stdout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            capture: Capture::Stdout,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a path argument.
    pub fn path_arg(self, path: &Path) -> Self {
        let arg = path.to_string_lossy().into_owned();
        self.arg(arg)
    }

    /// Run in `dir` instead of the inherited working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Choose which streams end up in [`ToolOutput::text`].
    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    /// `program arg1 arg2`, for logs.
    pub fn display(&self) -> String {
        let mut text = self.program.clone();
        for arg in &self.args {
            text.push(' ');
            text.push_str(arg);
        }
        text
    }
}

/// What a finished tool left behind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    /// Exit code, `None` when killed by a signal.
    pub status: Option<i32>,
    pub text: String,
}

impl ToolOutput {
    /// Exit code 0 with `text`.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            text: text.into(),
        }
    }

    /// Exit code `code` with `text`.
    pub fn failure(code: i32, text: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            text: text.into(),
        }
    }

    /// Exit code 0; false when killed by a signal.
    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs external programs.
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` to completion or until `timeout` elapses.
    ///
    /// A non-zero exit is not an error; launch failures and timeouts are.
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<ToolOutput>;
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<ToolOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| LintError::ToolLaunchFailed {
            program: invocation.program.clone(),
            reason: e.to_string(),
        })?;

        // Pipes are drained on their own threads so a chatty tool cannot
        // block on a full pipe while we poll for its exit.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    warn!(command = %invocation.display(), ?timeout, "tool timed out, killing it");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(LintError::ToolTimedOut {
                        program: invocation.program.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                None => thread::sleep(POLL_STEP),
            }
        };

        let mut text = collect(stdout);
        let errors = collect(stderr);
        if invocation.capture == Capture::Combined {
            text.push_str(&errors);
        }

        debug!(
            command = %invocation.display(),
            status = ?status.code(),
            bytes = text.len(),
            "tool finished"
        );

        Ok(ToolOutput {
            status: status.code(),
            text,
        })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
