//! E2E test harness for lintblame.
//!
//! Scenarios drive a real [`lintblame_core::CycleController`] over a temp
//! directory. External linters and `git blame` are scripted so every run is
//! deterministic and needs no tools on the machine.

#![allow(dead_code)]

pub mod assertions;
pub mod clock;
pub mod steps;
pub mod tools;
pub mod workspace;

// Re-export commonly used types
pub use assertions::Assertion;
pub use scenario::Scenario;
pub use tools::Answer;
