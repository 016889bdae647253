use thiserror::Error;

/// Failures that reach the caller of a planning request.
///
/// Oracle trouble never shows up here; it is absorbed by the planner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("paragraph is empty")]
    EmptyInput,

    #[error("segmentation produced no chunks")]
    NoChunksProduced,
}

/// Why an oracle reply was thrown away.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleRejection {
    #[error("reply is not valid JSON: {0}")]
    NotJson(String),

    #[error("reply is JSON but not an array")]
    NotArray,

    #[error("reply has {got} entries for {expected} chunks")]
    LengthMismatch { expected: usize, got: usize },
}
