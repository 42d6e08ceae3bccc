use super::assertions::Assertion;
use super::tools::Answer;

/// All possible actions in a test scenario
#[derive(Debug)]
pub enum ScenarioStep {
    // Workspace edits
    WriteFile { name: String, content: Vec<u8> },
    Touch { name: String },
    RemoveFile { name: String },

    // Tool behaviour
    ToolAnswers {
        program: String,
        file: String,
        answer: Answer,
    },
    Blame { file: String, authors: Vec<String> },

    // Watch loop
    Start,
    Tick,
    TickFails { contains: String },

    // Assertions (can be interspersed)
    Assert { assertion: Assertion },
}
