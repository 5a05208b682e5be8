use thiserror::Error;

/// Failures that cross the prediction client boundary.
///
/// Malformed model output is never an error here; it is absorbed by the assembler.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("failed to reach model service: {0}")]
    Transport(String),

    #[error("model service returned an error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("prediction failed after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<PredictError>,
    },

    #[error("prediction request was cancelled")]
    Cancelled,
}

impl PredictError {
    /// Transport and service failures are transient and worth another attempt
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Service { .. })
    }
}
