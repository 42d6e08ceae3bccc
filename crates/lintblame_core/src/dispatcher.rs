//! Fan-out of per-file analyses over a fixed worker pool, and fan-in of
//! their results.

use crate::adapter::AnalyzerAdapter;
use crate::blame::BlameProvider;
use crate::diagnostic::{AnalysisResult, Diagnostic, DiagnosticIndex};
use crate::error::{LintError, Result};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Extra time the fan-in waits beyond the task budget before it considers
/// the pool stuck.
const STALL_GRACE: Duration = Duration::from_secs(1);

/// Everything needed to analyse a single file.
pub struct FileAnalyzer {
    adapters: Vec<Arc<dyn AnalyzerAdapter>>,
    blame: Arc<dyn BlameProvider>,
    task_timeout: Duration,
}

impl FileAnalyzer {
    /// Analyse with `adapters` in order, attributing lines with `blame`.
    pub fn new(
        adapters: Vec<Arc<dyn AnalyzerAdapter>>,
        blame: Arc<dyn BlameProvider>,
        task_timeout: Duration,
    ) -> Self {
        Self {
            adapters,
            blame,
            task_timeout,
        }
    }

    /// Budget for one file.
    pub fn task_timeout(&self) -> Duration {
        self.task_timeout
    }

    /// Read, blame and lint one file.
    ///
    /// Every step shares one budget of `task_timeout`. Unreadable content,
    /// missing blame and tools that fail to launch only thin out the
    /// result; running out of budget adds a timeout diagnostic. The only
    /// error returned is a tool whose output breaks its expected format.
    pub fn analyze(&self, path: &Path) -> Result<AnalysisResult> {
        let started = Instant::now();
        let remaining = || self.task_timeout.saturating_sub(started.elapsed());

        let content = match fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unable to read file");
                return Ok(AnalysisResult::empty(path.to_path_buf()));
            }
        };
        let content_lines: Vec<String> = content
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();

        let blame_lines = self.blame.blame_lines(path, remaining());

        let mut index = DiagnosticIndex::new();
        for adapter in self.adapters.iter().filter(|a| a.applies_to(path)) {
            let budget = remaining();
            if budget.is_zero() {
                index.add(Diagnostic::timed_out(self.task_timeout));
                break;
            }
            match adapter.run(path, budget) {
                Ok(output) => index.extend(adapter.extract(&output)?),
                Err(LintError::ToolTimedOut { .. }) => {
                    index.add(Diagnostic::timed_out(self.task_timeout));
                    break;
                }
                Err(e) => {
                    debug!(tool = adapter.name(), path = %path.display(), error = %e, "tool skipped");
                }
            }
        }

        debug!(
            path = %path.display(),
            diagnostics = index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "file analysed"
        );
        Ok(AnalysisResult::new(
            path.to_path_buf(),
            content_lines,
            blame_lines,
            index,
        ))
    }
}

/// Starts one named worker thread.
type Spawner = fn(String, Box<dyn FnOnce() + Send>) -> std::io::Result<()>;

fn spawn_thread(name: String, work: Box<dyn FnOnce() + Send>) -> std::io::Result<()> {
    thread::Builder::new().name(name).spawn(work).map(|_| ())
}

/// Runs [`FileAnalyzer::analyze`] for many files at once.
///
/// Work goes through a queue drained by at most `workers` threads, so a
/// large tree never spawns one thread per file.
pub struct Dispatcher {
    analyzer: Arc<FileAnalyzer>,
    workers: usize,
    spawner: Spawner,
}

impl Dispatcher {
    /// Create a dispatcher running at most `workers` analyses at once
    /// (at least one).
    pub fn new(analyzer: FileAnalyzer, workers: usize) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            workers: workers.max(1),
            spawner: spawn_thread,
        }
    }

    #[cfg(test)]
    fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = spawner;
        self
    }

    /// Upper bound on concurrent analyses.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Analyse `paths` and return the results in the same order.
    pub fn dispatch(&self, paths: &[PathBuf]) -> Result<Vec<AnalysisResult>> {
        self.dispatch_with(paths, |_| {})
    }

    /// Analyse `paths`, calling `on_complete` for every result as soon as
    /// it arrives (completion order), and return them in input order.
    ///
    /// If no file finishes within the task budget plus a grace period the
    /// pool is considered stuck: files a worker had picked up are reported
    /// as timed out, files still waiting in the queue come back empty. A
    /// malformed tool report from any file fails the whole call, but only
    /// after every other file has been collected.
    ///
    /// Workers that cannot be started are skipped; if none starts, the
    /// files are analysed on the calling thread.
    pub fn dispatch_with<F>(&self, paths: &[PathBuf], mut on_complete: F) -> Result<Vec<AnalysisResult>>
    where
        F: FnMut(&AnalysisResult),
    {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let picked: Arc<Vec<AtomicBool>> =
            Arc::new(paths.iter().map(|_| AtomicBool::new(false)).collect());
        let (job_tx, job_rx) = channel::unbounded::<(usize, PathBuf)>();
        let (done_tx, done_rx) = channel::unbounded::<(usize, Result<AnalysisResult>)>();

        for job in paths.iter().cloned().enumerate() {
            // The receiver is alive until the end of this call.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let pool = self.workers.min(paths.len());
        let mut spawned = 0;
        for n in 0..pool {
            let jobs = job_rx.clone();
            let done = done_tx.clone();
            let analyzer = Arc::clone(&self.analyzer);
            let picked = Arc::clone(&picked);
            let work = Box::new(move || drain(&analyzer, &jobs, &done, &picked));
            match (self.spawner)(format!("lintblame-worker-{n}"), work) {
                Ok(()) => spawned += 1,
                Err(e) => warn!(worker = n, error = %e, "couldn't start analysis worker"),
            }
        }
        if spawned == 0 {
            warn!(files = paths.len(), "no analysis worker started, analysing inline");
            drain(&self.analyzer, &job_rx, &done_tx, &picked);
        }
        drop(done_tx);

        let stall = self.analyzer.task_timeout() + STALL_GRACE;
        let mut slots: Vec<Option<AnalysisResult>> = paths.iter().map(|_| None).collect();
        let mut outstanding = paths.len();
        let mut fatal: Option<LintError> = None;
        let mut stalled = false;

        while outstanding > 0 {
            match done_rx.recv_timeout(stall) {
                Ok((i, Ok(result))) => {
                    on_complete(&result);
                    slots[i] = Some(result);
                    outstanding -= 1;
                }
                Ok((i, Err(e))) => {
                    warn!(path = %paths[i].display(), error = %e, "analysis failed");
                    if fatal.is_none() && e.is_fatal() {
                        fatal = Some(e);
                    }
                    let result = AnalysisResult::empty(paths[i].clone());
                    on_complete(&result);
                    slots[i] = Some(result);
                    outstanding -= 1;
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(outstanding, ?stall, "no analysis finished in time, giving up on the rest");
                    stalled = true;
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!(outstanding, "analysis workers exited early");
                    break;
                }
            }
        }

        if let Some(e) = fatal {
            return Err(e);
        }

        let timeout = self.analyzer.task_timeout();
        let results: Vec<AnalysisResult> = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    let path = paths[i].clone();
                    let result = if stalled && picked[i].load(Ordering::SeqCst) {
                        AnalysisResult::timed_out(path, timeout)
                    } else {
                        AnalysisResult::empty(path)
                    };
                    on_complete(&result);
                    result
                })
            })
            .collect();

        info!(
            files = paths.len(),
            workers = spawned,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan complete"
        );
        Ok(results)
    }
}

/// Worker loop: analyse queued files until the queue is empty or nobody
/// listens for results any more.
fn drain(
    analyzer: &FileAnalyzer,
    jobs: &Receiver<(usize, PathBuf)>,
    done: &Sender<(usize, Result<AnalysisResult>)>,
    picked: &[AtomicBool],
) {
    for (i, path) in jobs.iter() {
        picked[i].store(true, Ordering::SeqCst);
        let result = analyzer.analyze(&path);
        if done.send((i, result)).is_err() {
            break;
        }
    }
}
