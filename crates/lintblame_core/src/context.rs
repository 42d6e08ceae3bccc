//! Process-wide environment, resolved lazily and cached.

use crate::error::{LintError, Result};
use crate::process::{CommandRunner, Invocation, SystemRunner};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const GIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Working directory and git identity.
///
/// Built once at startup and handed to whatever needs it. The git lookups
/// run on first access and are cached for the life of the process.
pub struct Environment {
    working_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
    git_root: OnceCell<PathBuf>,
    git_user: OnceCell<Option<String>>,
}

impl Environment {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self::with_runner(working_dir, Arc::new(SystemRunner))
    }

    pub fn with_runner(working_dir: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            working_dir: working_dir.into(),
            runner,
            git_root: OnceCell::new(),
            git_user: OnceCell::new(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::clone(&self.runner)
    }

    /// Top level of the enclosing git checkout.
    pub fn git_root(&self) -> Result<&Path> {
        self.git_root
            .get_or_try_init(|| {
                self.git(&["rev-parse", "--show-toplevel"])
                    .map(|out| PathBuf::from(out.trim()))
            })
            .map(PathBuf::as_path)
    }

    /// `user.name` from git config, if set.
    pub fn git_user_name(&self) -> Option<&str> {
        self.git_user
            .get_or_init(|| match self.git(&["config", "user.name"]) {
                Ok(name) if !name.trim().is_empty() => Some(name.trim().to_string()),
                Ok(_) => None,
                Err(e) => {
                    debug!(error = %e, "no git user name");
                    None
                }
            })
            .as_deref()
    }

    /// Name of the checked out branch. Not cached, it can change under us.
    pub fn current_branch(&self) -> Result<String> {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
            .map(|out| out.trim().to_string())
    }

    /// Run `git args...` in the working directory and return stdout.
    pub(crate) fn git(&self, args: &[&str]) -> Result<String> {
        self.git_in(&self.working_dir, args)
    }

    pub(crate) fn git_in(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let mut invocation = Invocation::new("git").current_dir(dir);
        for arg in args {
            invocation = invocation.arg(*arg);
        }
        let output = self
            .runner
            .run(&invocation, GIT_TIMEOUT)
            .map_err(|e| LintError::GitFailed {
                command: args.join(" "),
                reason: e.to_string(),
            })?;
        if !output.succeeded() {
            return Err(LintError::GitFailed {
                command: args.join(" "),
                reason: format!("exit status {:?}", output.status),
            });
        }
        Ok(output.text)
    }
}
