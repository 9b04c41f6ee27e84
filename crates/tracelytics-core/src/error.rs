use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid trace {trace_id}: {reason}")]
    InvalidTrace { trace_id: String, reason: String },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}
