//! Error types for lintblame_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lintblame_core operations.
///
/// Only a few of these stop the watch loop. Per-file problems (unreadable
/// content, a tool that fails to launch, a missing blame) are degraded into
/// an empty result for that file and never surface as a `LintError` from a
/// scan.
#[derive(Error, Debug)]
pub enum LintError {
    /// The target handed to a path source does not exist or cannot be read.
    #[error("unable to process target {}: {reason}", path.display())]
    TargetUnavailable {
        /// The offending target
        path: PathBuf,
        /// Why it could not be used
        reason: String,
    },

    /// A directory listing failed.
    #[error("could not read directory {}: {source}", path.display())]
    DirectoryUnreadable {
        /// Directory that was listed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A git command needed to resolve the tracked set failed.
    #[error("git {command} failed: {reason}")]
    GitFailed {
        /// The git subcommand, e.g. `diff --name-only`
        command: String,
        /// stderr or spawn error
        reason: String,
    },

    /// A tool could not be spawned at all.
    #[error("failed to launch {program}: {reason}")]
    ToolLaunchFailed {
        /// Program name
        program: String,
        /// Spawn error
        reason: String,
    },

    /// A tool ran past its deadline and was killed.
    #[error("{program} timed out after {timeout_ms}ms")]
    ToolTimedOut {
        /// Program name
        program: String,
        /// Budget that was exceeded
        timeout_ms: u64,
    },

    /// A tool's output matched its extraction pattern but a numeric field
    /// could not be parsed. The output format of the tool is assumed stable,
    /// so this means the installed tool does not speak the expected format.
    #[error("{reporter} produced malformed {field} {value:?} in: {line}")]
    MalformedToolOutput {
        /// Adapter that parsed the output
        reporter: String,
        /// Field name (`line` or `column`)
        field: &'static str,
        /// Raw captured text
        value: String,
        /// The whole matched output line
        line: String,
    },

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LintError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::TargetUnavailable { .. } => {
                Some("Pass an existing file or directory, or use --branch inside a git checkout.")
            }
            Self::GitFailed { .. } => {
                Some("Check that you are inside a git repository and that the base branch exists (git.base_branch in .lintblame.toml).")
            }
            Self::MalformedToolOutput { .. } => {
                Some("The installed linter prints an unexpected format. Check its version against the supported output formats.")
            }
            Self::ConfigError(_) => Some("Fix or remove .lintblame.toml to fall back to defaults."),
            _ => None,
        }
    }

    /// Whether this error must stop the watch loop.
    ///
    /// Everything else is confined to the file that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MalformedToolOutput { .. } | Self::ConfigError(_) | Self::TargetUnavailable { .. }
        )
    }
}

/// Convenience Result type for lintblame_core operations.
pub type Result<T> = std::result::Result<T, LintError>;
