//! The watch loop: poll, refresh, re-dispatch.

use crate::config::WatchConfig;
use crate::diagnostic::AnalysisResult;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::source::PathSource;
use crate::tracker::ChangeTracker;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Receives finished scans.
pub trait Reporter {
    /// A scan over `paths` (in presentation order) is about to start.
    fn scan_started(&mut self, _paths: &[PathBuf]) {}

    /// One file finished; called in completion order.
    fn file_completed(&mut self, _result: &AnalysisResult) {}

    /// Every file finished; `results` follow the presentation order.
    fn scan_finished(&mut self, results: &[AnalysisResult]);
}

/// What the loop is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Waiting for the next tick.
    Idle,
    /// A scan is in flight.
    Scanning,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Some tracked file was modified.
    pub changed: bool,
    /// A full refresh ran on this tick.
    pub refreshed: bool,
    /// The refresh found a different file set.
    pub set_changed: bool,
    /// A scan was dispatched.
    pub scanned: bool,
}

/// Drives the [`ChangeTracker`] and [`Dispatcher`] on a fixed interval.
///
/// The tracker is only touched between scans, from the thread calling
/// [`CycleController::tick`]; a scan always runs to completion.
pub struct CycleController<R: Reporter> {
    source: Box<dyn PathSource>,
    tracker: ChangeTracker,
    dispatcher: Dispatcher,
    reporter: R,
    state: CycleState,
    ticks: u64,
    refresh_every: u32,
    poll_interval: Duration,
}

impl<R: Reporter> CycleController<R> {
    pub fn new(
        source: Box<dyn PathSource>,
        dispatcher: Dispatcher,
        reporter: R,
        watch: &WatchConfig,
    ) -> Self {
        Self {
            source,
            tracker: ChangeTracker::with_policy(watch.order),
            dispatcher,
            reporter,
            state: CycleState::Idle,
            ticks: 0,
            refresh_every: watch.refresh_every.max(1),
            poll_interval: watch.poll_interval(),
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Load the initial file set and run the first scan.
    ///
    /// Failing to resolve the file set here is fatal.
    pub fn start(&mut self) -> Result<()> {
        let paths = self.source.initial_paths()?;
        info!(source = %self.source.describe(), files = paths.len(), "watching");
        self.tracker.refresh(paths);
        self.scan()
    }

    /// One poll: observe every tracked file, refresh the file set every
    /// `refresh_every` ticks, and scan if anything moved.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.ticks += 1;
        let mut outcome = TickOutcome {
            changed: self.tracker.observe_all(),
            refreshed: false,
            set_changed: false,
            scanned: false,
        };

        if self.ticks % u64::from(self.refresh_every) == 0 {
            outcome.refreshed = true;
            match self.source.initial_paths() {
                Ok(paths) => outcome.set_changed = self.tracker.refresh(paths),
                Err(e) => {
                    warn!(error = %e, "refresh failed, keeping the current file set");
                }
            }
        }

        if outcome.changed || outcome.set_changed {
            self.scan()?;
            outcome.scanned = true;
        }
        debug!(tick = self.ticks, ?outcome, "tick");
        Ok(outcome)
    }

    /// Analyse every tracked file and hand the results to the reporter.
    pub fn scan(&mut self) -> Result<()> {
        let order = self.tracker.recency_order();
        self.state = CycleState::Scanning;
        self.reporter.scan_started(&order);

        let reporter = &mut self.reporter;
        let results = self
            .dispatcher
            .dispatch_with(&order, |result| reporter.file_completed(result));
        self.state = CycleState::Idle;

        self.reporter.scan_finished(&results?);
        Ok(())
    }

    /// Start, then tick forever. Returns only on a fatal error.
    pub fn run(&mut self) -> Result<()> {
        self.start()?;
        loop {
            thread::sleep(self.poll_interval);
            self.tick()?;
        }
    }
}
