//! Where the tracked file set comes from.

use crate::adapter::recognized_extensions;
use crate::context::Environment;
use crate::error::{LintError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Supplies the set of files to watch.
///
/// Called once at startup and again on every full refresh, so it must
/// reflect files that appeared or disappeared since the last call.
pub trait PathSource: Send {
    /// Absolute paths of every file with a recognized extension.
    fn initial_paths(&self) -> Result<Vec<PathBuf>>;

    /// Short label for logs and the report header.
    fn describe(&self) -> String;
}

/// Keep paths with a recognized extension, resolve them against `base`,
/// drop blanks and duplicates. Order is preserved.
pub fn filter_paths<I, P>(paths: I, base: &Path) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let extensions = recognized_extensions();
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter_map(|p| {
            let path = p.as_ref();
            if path.as_os_str().is_empty() {
                return None;
            }
            let ext = path.extension()?.to_str()?;
            if !extensions.iter().any(|known| *known == ext) {
                return None;
            }
            Some(if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            })
        })
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

/// A single file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PathSource for FileSource {
    fn initial_paths(&self) -> Result<Vec<PathBuf>> {
        let base = self.path.parent().unwrap_or_else(|| Path::new(""));
        Ok(filter_paths([&self.path], base))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Files directly inside a directory (not recursive).
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PathSource for DirectorySource {
    fn initial_paths(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|source| LintError::DirectoryUnreadable {
            path: self.dir.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            files.push(entry.path());
        }
        files.sort();
        Ok(filter_paths(files, &self.dir))
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Files touched on the current branch: uncommitted changes plus
/// everything that differs from the base branch.
pub struct BranchSource {
    env: Arc<Environment>,
    base_branch: String,
}

impl BranchSource {
    pub fn new(env: Arc<Environment>, base_branch: impl Into<String>) -> Self {
        Self {
            env,
            base_branch: base_branch.into(),
        }
    }
}

impl PathSource for BranchSource {
    fn initial_paths(&self) -> Result<Vec<PathBuf>> {
        let root = self.env.git_root()?;
        let dirty = self.env.git_in(root, &["diff", "--name-only"])?;
        let range = format!("{}..HEAD", self.base_branch);
        let branch = self.env.git_in(root, &["diff", "--name-only", &range])?;

        let files = filter_paths(dirty.lines().chain(branch.lines()), root);
        debug!(root = %root.display(), count = files.len(), "branch files");
        Ok(files)
    }

    fn describe(&self) -> String {
        match self.env.current_branch() {
            Ok(branch) => format!("branch {} vs {}", branch, self.base_branch),
            Err(_) => format!("branch vs {}", self.base_branch),
        }
    }
}

/// Pick a source for a command-line target: the file itself, or the
/// directory's immediate children.
///
/// Returns the source and the directory relative paths are resolved
/// against.
pub fn resolve_target(target: &Path) -> Result<(Box<dyn PathSource>, PathBuf)> {
    let unavailable = |reason: String| LintError::TargetUnavailable {
        path: target.to_path_buf(),
        reason,
    };
    let meta = fs::metadata(target).map_err(|e| unavailable(e.to_string()))?;
    let absolute = fs::canonicalize(target).map_err(|e| unavailable(e.to_string()))?;

    if meta.is_dir() {
        Ok((Box::new(DirectorySource::new(absolute.clone())), absolute))
    } else {
        let dir = absolute
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| unavailable("file has no parent directory".into()))?;
        Ok((Box::new(FileSource::new(absolute)), dir))
    }
}
