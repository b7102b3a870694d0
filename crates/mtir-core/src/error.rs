use thiserror::Error;

/// Failure taxonomy for an evaluation run.
///
/// Configuration and input-validation errors are raised before any indexing
/// or search work; collaborator-integrity errors abort the run immediately.
/// Queries with zero search hits are not errors (they are logged and the
/// judgment file still covers them via the 0.0-default-score convention).
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid score: {0}")]
    InvalidScore(String),

    #[error("index integrity: indexed {indexed} of {expected} documents")]
    IndexIntegrity { indexed: usize, expected: usize },

    #[error("metrics evaluator unavailable: {0}")]
    EvaluatorUnavailable(String),

    #[error("parse failure: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
