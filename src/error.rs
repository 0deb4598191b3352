use std::time::Duration;

use thiserror::Error;

/// Failures that prevent a transcript from being built.
///
/// These abort a profiling run before any LLM call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconstructError {
    #[error("empty input: {0} list is empty")]
    EmptyInput(&'static str),

    #[error("malformed timestamp on {kind} #{index}: start {start}, end {end}")]
    MalformedTimestamp {
        kind: &'static str,
        index: usize,
        start: f64,
        end: f64,
    },
}

/// Failure of a single profiling slot (one aspect or one sentiment channel).
///
/// Captured as a value next to the slot's label so sibling slots keep
/// their results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("no JSON object found in model output")]
    NoJsonFound,

    #[error("model output is not valid JSON after repair: {message}")]
    UnrecoverableJson { candidate: String, message: String },

    #[error("model returned an unusable result: {0}")]
    InvalidResult(String),

    #[error("LLM provider failed: {0}")]
    Provider(String),

    #[error("prompt timed out after {0:?}")]
    TimedOut(Duration),

    #[error("profiling task failed: {0}")]
    Task(String),
}
