use super::clock::FileClock;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

/// Manages isolated test environments with tempfile
pub struct TestWorkspace {
    dir: TempDir,
    clock: FileClock,
}

impl TestWorkspace {
    /// Create an empty workspace
    pub fn empty(clock: FileClock) -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp directory")?;
        Ok(Self { dir, clock })
    }

    /// Load workspace from fixtures directory
    pub fn from_fixture(name: &str, clock: FileClock) -> Result<Self> {
        let workspace = Self::empty(clock)?;
        let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(name);

        if !fixture_path.exists() {
            anyhow::bail!("Fixture not found: {}", fixture_path.display());
        }

        let mut names: Vec<PathBuf> = fs::read_dir(&fixture_path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        names.sort();
        for src in names {
            let name = src
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("bad fixture name: {}", src.display()))?
                .to_string();
            let content = fs::read(&src)?;
            workspace.write_file(&name, &content)?;
        }

        Ok(workspace)
    }

    /// Get workspace path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a workspace file
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file and stamp it with the next clock tick
    pub fn write_file(&self, name: &str, content: &[u8]) -> Result<()> {
        let path = self.file(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", name))?;
        self.stamp(name, self.clock.next())
    }

    /// Bump a file's modification time without changing it
    pub fn touch(&self, name: &str) -> Result<()> {
        self.stamp(name, self.clock.next())
    }

    /// Remove a file
    pub fn remove_file(&self, name: &str) -> Result<()> {
        fs::remove_file(self.file(name)).with_context(|| format!("Failed to remove {}", name))
    }

    fn stamp(&self, name: &str, modified: SystemTime) -> Result<()> {
        File::options()
            .write(true)
            .open(self.file(name))
            .and_then(|f| f.set_modified(modified))
            .with_context(|| format!("Failed to set mtime of {}", name))
    }
}
