use lintblame_core::{BlameProvider, CommandRunner, Invocation, LintError, Result, ToolOutput};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

/// Scripted stand-in for the external linters.
///
/// Answers are keyed by program and file name; anything unscripted prints
/// nothing and exits 0, like a linter with no complaints.
#[derive(Default)]
pub struct ScriptedTools {
    answers: Mutex<HashMap<(String, String), Answer>>,
    calls: Mutex<Vec<(String, String)>>,
}

#[derive(Clone, Debug)]
pub enum Answer {
    Output(ToolOutput),
    Missing,
    Hang,
}

impl ScriptedTools {
    pub fn set(&self, program: &str, file: &str, answer: Answer) {
        self.answers
            .lock()
            .unwrap()
            .insert((program.to_string(), file.to_string()), answer);
    }

    /// How often `program` ran against `file`
    pub fn calls(&self, program: &str, file: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, f)| p == program && f == file)
            .count()
    }
}

impl CommandRunner for ScriptedTools {
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<ToolOutput> {
        let file = invocation
            .args
            .last()
            .and_then(|arg| Path::new(arg).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = (invocation.program.clone(), file);
        self.calls.lock().unwrap().push(key.clone());

        let answer = self.answers.lock().unwrap().get(&key).cloned();
        match answer {
            None => Ok(ToolOutput::success("")),
            Some(Answer::Output(output)) => Ok(output),
            Some(Answer::Missing) => Err(LintError::ToolLaunchFailed {
                program: invocation.program.clone(),
                reason: "No such file or directory".into(),
            }),
            Some(Answer::Hang) => {
                thread::sleep(timeout);
                Err(LintError::ToolTimedOut {
                    program: invocation.program.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

/// Blame text per file name; unknown files have no history.
#[derive(Default)]
pub struct ScriptedBlame {
    lines: Mutex<HashMap<String, Vec<String>>>,
}

impl ScriptedBlame {
    pub fn set(&self, file: &str, authors: &[&str]) {
        let lines = authors
            .iter()
            .enumerate()
            .map(|(i, author)| {
                format!("1a2b3c4d ({} 2023-05-06 07:08:09 +0000 {}) ...", author, i + 1)
            })
            .collect();
        self.lines.lock().unwrap().insert(file.to_string(), lines);
    }
}

impl BlameProvider for ScriptedBlame {
    fn blame_lines(&self, path: &Path, _timeout: Duration) -> Vec<String> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.lines
            .lock()
            .unwrap()
            .get(&name)
            .cloned()
            .unwrap_or_default()
    }
}
