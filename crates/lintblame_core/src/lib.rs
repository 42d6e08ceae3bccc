//! lintblame core library
//!
//! Watches a set of source files and re-runs external linters whenever one
//! of them changes, attributing every reported line to its last author:
//! - Polling change detection over the tracked files
//! - Bounded fan-out of per-file analyses with a per-file time budget
//! - Extraction of diagnostics from `pep8`, `pylint` and `go build` output
//! - `git blame` attribution
//!
//! # Quick Start
//!
//! ```no_run
//! use lintblame_core::{
//!     default_adapters, Config, CycleController, Dispatcher, FileAnalyzer, GitBlame,
//!     AnalysisResult, Reporter, resolve_target,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct Print;
//!
//! impl Reporter for Print {
//!     fn scan_finished(&mut self, results: &[AnalysisResult]) {
//!         for result in results {
//!             println!("{}: {} issues", result.path().display(), result.diagnostic_count());
//!         }
//!     }
//! }
//!
//! let (source, dir) = resolve_target(Path::new("src")).unwrap();
//! let config = Config::load(&dir).unwrap();
//! let analyzer = FileAnalyzer::new(
//!     default_adapters(),
//!     Arc::new(GitBlame::default()),
//!     config.analysis.task_timeout(),
//! );
//! let dispatcher = Dispatcher::new(analyzer, config.analysis.worker_count());
//! CycleController::new(source, dispatcher, Print, &config.watch).run().unwrap();
//! ```
//!
//! # Change tracking
//!
//! ```
//! use lintblame_core::ChangeTracker;
//! use std::path::{Path, PathBuf};
//! use std::time::{Duration, SystemTime};
//!
//! let now = SystemTime::now();
//! let day = Duration::from_secs(86_400);
//! let mut tracker = ChangeTracker::new();
//! tracker.record(Path::new("abc"), now - day);
//! tracker.record(Path::new("def"), now);
//! tracker.record(Path::new("ghi"), now - 2 * day);
//!
//! // The newest file always comes last.
//! let order = tracker.recency_order();
//! assert_eq!(order.last(), Some(&PathBuf::from("def")));
//! ```
//!
//! # Extracting diagnostics
//!
//! ```
//! use lintblame_core::{Diagnostic, LinePattern};
//!
//! let found = LinePattern::pylint().extract("Pylint", "W: 12, 4: unused import\n").unwrap();
//! assert_eq!(found, vec![Diagnostic::new("Pylint", 12, 4, "W", "unused import")]);
//! ```

mod adapter;
mod blame;
mod config;
mod context;
mod cycle;
mod diagnostic;
mod dispatcher;
mod error;
mod process;
mod source;
mod tracker;

pub use adapter::{
    builtin_adapters, default_adapters, recognized_extensions, AnalyzerAdapter, CommandAdapter,
    LinePattern, ToolSpec, BUILTIN_TOOLS, GO_BUILD, NO_CODE, PEP8, PYLINT,
};
pub use blame::{Attribution, BlameProvider, GitBlame, NoBlame, UNKNOWN_AUTHOR};
pub use config::{AnalysisConfig, Config, GitConfig, OrderPolicy, WatchConfig, CONFIG_FILE_NAME};
pub use context::Environment;
pub use cycle::{CycleController, CycleState, Reporter, TickOutcome};
pub use diagnostic::{AnalysisResult, Diagnostic, DiagnosticIndex, INTERNAL_REPORTER};
pub use dispatcher::{Dispatcher, FileAnalyzer};
pub use error::{LintError, Result};
pub use process::{Capture, CommandRunner, Invocation, SystemRunner, ToolOutput};
pub use source::{
    filter_paths, resolve_target, BranchSource, DirectorySource, FileSource, PathSource,
};
pub use tracker::ChangeTracker;
