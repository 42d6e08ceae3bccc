use super::runner::Recording;
use anyhow::Result;

/// Declarative assertions on the watch loop and its last scan
pub enum Assertion {
    // Scans
    ScanCount(usize),
    LastTickScanned(bool),
    LastTickSetChanged(bool),
    ReportOrder(Vec<String>),
    CompletedCount(usize),

    // Tracking
    TrackedCount(usize),
    Tracks(String),

    // Results of the last scan
    FileClean(String),
    DiagnosticCount { file: String, count: usize },
    DiagnosticAt {
        file: String,
        line: usize,
        reporter: String,
        code: String,
    },
    MessageContains { file: String, line: usize, text: String },
    AuthorOf { file: String, line: usize, author: String },
    TimedOut(String),

    // Tools
    ToolCalls {
        program: String,
        file: String,
        count: usize,
    },

    // Custom
    Custom(Box<dyn Fn(&Recording) -> Result<()> + Send + Sync>),
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScanCount(n) => write!(f, "ScanCount({})", n),
            Self::LastTickScanned(b) => write!(f, "LastTickScanned({})", b),
            Self::LastTickSetChanged(b) => write!(f, "LastTickSetChanged({})", b),
            Self::ReportOrder(names) => write!(f, "ReportOrder({:?})", names),
            Self::CompletedCount(n) => write!(f, "CompletedCount({})", n),
            Self::TrackedCount(n) => write!(f, "TrackedCount({})", n),
            Self::Tracks(name) => write!(f, "Tracks({:?})", name),
            Self::FileClean(name) => write!(f, "FileClean({:?})", name),
            Self::DiagnosticCount { file, count } => {
                write!(f, "DiagnosticCount {{ file: {:?}, count: {} }}", file, count)
            }
            Self::DiagnosticAt {
                file,
                line,
                reporter,
                code,
            } => write!(
                f,
                "DiagnosticAt {{ file: {:?}, line: {}, reporter: {:?}, code: {:?} }}",
                file, line, reporter, code
            ),
            Self::MessageContains { file, line, text } => write!(
                f,
                "MessageContains {{ file: {:?}, line: {}, text: {:?} }}",
                file, line, text
            ),
            Self::AuthorOf { file, line, author } => write!(
                f,
                "AuthorOf {{ file: {:?}, line: {}, author: {:?} }}",
                file, line, author
            ),
            Self::TimedOut(name) => write!(f, "TimedOut({:?})", name),
            Self::ToolCalls {
                program,
                file,
                count,
            } => write!(
                f,
                "ToolCalls {{ program: {:?}, file: {:?}, count: {} }}",
                program, file, count
            ),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}
