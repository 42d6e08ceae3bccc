//! lintblame CLI - re-run linters on every save and blame what they flag.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lintblame_core::{
    default_adapters, resolve_target, BranchSource, Config, CycleController, Dispatcher,
    Environment, FileAnalyzer, GitBlame, LintError, PathSource, Reporter,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod render;

use render::{JsonReporter, TerminalReporter};

#[derive(Parser)]
#[command(name = "lintblame")]
#[command(about = "Watch source files, re-run linters on change, blame the flagged lines", long_about = None)]
#[command(version)]
struct Cli {
    /// Track the files changed on the current git branch
    #[arg(short, long)]
    branch: bool,

    /// File or directory to watch (default: current directory)
    #[arg(conflicts_with = "branch")]
    path: Option<PathBuf>,

    /// Configuration file (default: .lintblame.toml in the watched directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scan once and exit instead of watching
    #[arg(long)]
    once: bool,

    /// Order in which files are printed
    #[arg(long, value_enum, default_value_t = Presentation::Recency)]
    order: Presentation,

    /// Print one JSON document per scan instead of the terminal report
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Presentation {
    /// Most recently modified files last
    Recency,
    /// As soon as each file finishes
    Completion,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve the working directory")?;

    let env = Arc::new(Environment::new(&cwd));

    let (source, config): (Box<dyn PathSource>, Config) = if cli.branch {
        let root = env.git_root().map_err(fatal)?.to_path_buf();
        let config = load_config(cli.config.as_deref(), &root)?;
        let source: Box<dyn PathSource> = Box::new(BranchSource::new(
            Arc::clone(&env),
            config.git.base_branch.clone(),
        ));
        (source, config)
    } else {
        let target = cli.path.clone().unwrap_or_else(|| cwd.clone());
        let (source, dir) = resolve_target(&target).map_err(fatal)?;
        let config = load_config(cli.config.as_deref(), &dir)?;
        (source, config)
    };

    let header = source.describe();
    let analyzer = FileAnalyzer::new(
        default_adapters(),
        Arc::new(GitBlame::new(env.runner())),
        config.analysis.task_timeout(),
    );
    let dispatcher = Dispatcher::new(analyzer, config.analysis.worker_count());

    if cli.json {
        watch(source, dispatcher, JsonReporter::stdout(), &config, cli.once)
    } else {
        let user = env.git_user_name().map(str::to_string);
        let reporter = TerminalReporter::stdout(header, user, cli.order);
        watch(source, dispatcher, reporter, &config, cli.once)
    }
}

fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<Config> {
    match explicit {
        Some(path) => Config::load_file(path).map_err(fatal),
        None => Config::load(dir).map_err(fatal),
    }
}

fn watch<R: Reporter>(
    source: Box<dyn PathSource>,
    dispatcher: Dispatcher,
    reporter: R,
    config: &Config,
    once: bool,
) -> Result<()> {
    let mut cycle = CycleController::new(source, dispatcher, reporter, &config.watch);
    if once {
        cycle.start().map_err(fatal)
    } else {
        cycle.run().map_err(fatal)
    }
}

/// Attach the recovery hint, if any, to a core error.
fn fatal(e: LintError) -> anyhow::Error {
    match e.recovery_suggestion() {
        Some(hint) => anyhow::anyhow!("{}\n\nhint: {}", e, hint),
        None => anyhow::Error::new(e),
    }
}
