//! Modification-time snapshot of the tracked files.

use crate::config::OrderPolicy;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Last observed modification time of every tracked path.
///
/// Owned by the watch loop and never touched while a scan is running.
/// Entries are kept in path order, which makes every traversal (and so the
/// heuristic ordering) deterministic.
#[derive(Debug, Default, Clone)]
pub struct ChangeTracker {
    snapshot: BTreeMap<PathBuf, SystemTime>,
    policy: OrderPolicy,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: OrderPolicy) -> Self {
        Self {
            snapshot: BTreeMap::new(),
            policy,
        }
    }

    /// Stat `path` and record its modification time.
    ///
    /// Returns true when the path is new or its time differs from the
    /// stored one. An unreadable path is reported as unchanged and the
    /// snapshot is left alone; it is not dropped.
    pub fn observe(&mut self, path: &Path) -> bool {
        match fs::metadata(path).and_then(|meta| meta.modified()) {
            Ok(modified) => self.record(path, modified),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "couldn't access file, skipping it");
                false
            }
        }
    }

    /// Record an already known modification time. See [`Self::observe`].
    pub fn record(&mut self, path: &Path, modified: SystemTime) -> bool {
        match self.snapshot.get_mut(path) {
            Some(stored) if *stored == modified => false,
            Some(stored) => {
                debug!(path = %path.display(), "modified");
                *stored = modified;
                true
            }
            None => {
                debug!(path = %path.display(), "now tracking");
                self.snapshot.insert(path.to_path_buf(), modified);
                true
            }
        }
    }

    /// Observe every tracked path; true if any of them changed.
    ///
    /// Unlike a short-circuiting scan this refreshes every stored time, so
    /// two edits landing in the same interval are both absorbed by one scan.
    pub fn observe_all(&mut self) -> bool {
        let paths: Vec<PathBuf> = self.snapshot.keys().cloned().collect();
        let mut changed = false;
        for path in paths {
            changed |= self.observe(&path);
        }
        changed
    }

    /// Drop everything and start over from `paths`.
    ///
    /// Returns true when the new snapshot differs from the old one: a path
    /// appeared, disappeared, or was modified in between.
    pub fn refresh<I, P>(&mut self, paths: I) -> bool
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let previous = std::mem::take(&mut self.snapshot);
        for path in paths {
            self.observe(path.as_ref());
        }
        let changed = self.snapshot != previous;
        if changed {
            debug!(before = previous.len(), after = self.snapshot.len(), "tracked set changed");
        }
        changed
    }

    pub fn count(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.snapshot.contains_key(path)
    }

    /// Stored modification time of `path`.
    pub fn modified(&self, path: &Path) -> Option<SystemTime> {
        self.snapshot.get(path).copied()
    }

    /// The path with the newest modification time.
    pub fn most_recent(&self) -> Option<&Path> {
        let mut best: Option<(&PathBuf, &SystemTime)> = None;
        for (path, modified) in &self.snapshot {
            if best.map(|(_, t)| t < modified).unwrap_or(true) {
                best = Some((path, modified));
            }
        }
        best.map(|(path, _)| path.as_path())
    }

    /// Tracked paths, most recently modified towards the end.
    pub fn recency_order(&self) -> Vec<PathBuf> {
        match self.policy {
            OrderPolicy::Heuristic => self.heuristic_order(),
            OrderPolicy::TimeSorted => self.time_sorted_order(),
        }
    }

    /// One pass keeping a running maximum: a path strictly newer than
    /// everything before it is appended and becomes the new maximum, any
    /// other path is pushed to the front. Only the last element is
    /// guaranteed to be the newest; the rest is not a time sort.
    fn heuristic_order(&self) -> Vec<PathBuf> {
        let mut order = VecDeque::with_capacity(self.snapshot.len());
        let mut newest: Option<SystemTime> = None;
        for (path, modified) in &self.snapshot {
            if newest.map(|t| *modified > t).unwrap_or(true) {
                newest = Some(*modified);
                order.push_back(path.clone());
            } else {
                order.push_front(path.clone());
            }
        }
        order.into()
    }

    fn time_sorted_order(&self) -> Vec<PathBuf> {
        let mut entries: Vec<(&PathBuf, &SystemTime)> = self.snapshot.iter().collect();
        entries.sort_by_key(|(_, modified)| **modified);
        entries.into_iter().map(|(path, _)| path.clone()).collect()
    }
}
