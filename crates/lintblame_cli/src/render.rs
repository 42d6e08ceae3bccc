//! Terminal and JSON presentation of scan results.

use crate::Presentation;
use console::{style, Term};
use lintblame_core::{AnalysisResult, Reporter};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;

/// Redraws the whole report after every scan.
pub struct TerminalReporter<W: Write> {
    out: W,
    term: Option<Term>,
    header: String,
    user: Option<String>,
    order: Presentation,
}

impl TerminalReporter<Term> {
    pub fn stdout(header: String, user: Option<String>, order: Presentation) -> Self {
        let term = Term::stdout();
        let clear = term.is_term().then(|| term.clone());
        Self {
            out: term,
            term: clear,
            header,
            user,
            order,
        }
    }
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W, header: String, user: Option<String>, order: Presentation) -> Self {
        Self {
            out,
            term: None,
            header,
            user,
            order,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn redraw(&mut self) {
        if let Some(term) = &self.term {
            let _ = term.clear_screen();
        }
        let title = format!("--- LintBlame: {} ---", self.header);
        self.emit(&format!("{}\n", style(title).magenta()));
    }

    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }
}

impl<W: Write> Reporter for TerminalReporter<W> {
    fn scan_started(&mut self, _paths: &[PathBuf]) {
        if self.order == Presentation::Completion {
            self.redraw();
        }
    }

    fn file_completed(&mut self, result: &AnalysisResult) {
        if self.order == Presentation::Completion {
            let text = render_file(result, self.user.as_deref());
            self.emit(&text);
        }
    }

    fn scan_finished(&mut self, results: &[AnalysisResult]) {
        if self.order == Presentation::Recency {
            self.redraw();
            for result in results {
                let text = render_file(result, self.user.as_deref());
                self.emit(&text);
            }
        }
        let issues: usize = results.iter().map(AnalysisResult::diagnostic_count).sum();
        let summary = format!("{} files, {} issues", results.len(), issues);
        self.emit(&format!("{}\n", style(summary).dim()));
    }
}

/// One file's block: its path, then every flagged line with its author and
/// the diagnostics on it. Lines owned by `user` are highlighted.
pub fn render_file(result: &AnalysisResult, user: Option<&str>) -> String {
    let mut text = format!("{}\n", style(result.path().display()).green());
    if result.is_clean() {
        text.push_str(&format!("{}\n", style("- All clean!").bold()));
    }
    for (line, diagnostics) in result.flagged_lines() {
        let author = result.author_of(line);
        let name = if Some(author) == user {
            style(author).yellow()
        } else {
            style(author).blue()
        };
        text.push_str(&format!(
            "{}: ({}) {}\n",
            style(line).bold(),
            name,
            result.content_line(line).unwrap_or_default().trim()
        ));
        for diagnostic in diagnostics {
            text.push_str(&format!(
                "    [{} {}] {}\n",
                diagnostic.reporter,
                diagnostic.code,
                style(&diagnostic.message).bold()
            ));
        }
    }
    text.push('\n');
    text
}

/// Writes one JSON document per scan, one line each.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl JsonReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn scan_finished(&mut self, results: &[AnalysisResult]) {
        let files: Vec<_> = results.iter().map(file_json).collect();
        let document = json!({ "files": files });
        if serde_json::to_writer(&mut self.out, &document).is_ok() {
            let _ = self.out.write_all(b"\n");
            let _ = self.out.flush();
        }
    }
}

fn file_json(result: &AnalysisResult) -> serde_json::Value {
    let lines: Vec<_> = result
        .flagged_lines()
        .map(|(line, diagnostics)| {
            json!({
                "line": line,
                "author": result.author_of(line),
                "source": result.content_line(line).unwrap_or_default(),
                "diagnostics": diagnostics,
            })
        })
        .collect();
    json!({
        "path": result.path(),
        "clean": result.is_clean(),
        "lines": lines,
    })
}
