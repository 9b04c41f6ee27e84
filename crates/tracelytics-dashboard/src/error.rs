use thiserror::Error;

use tracelytics_core::error::CoreError;

/// Errors surfaced by dashboard queries.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CoreError> for DashboardError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Serialization(e) => DashboardError::Internal(e.into()),
            other => DashboardError::BadRequest(other.to_string()),
        }
    }
}

impl DashboardError {
    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            DashboardError::NotFound(_) => 3,
            DashboardError::BadRequest(_) => 2,
            DashboardError::Internal(_) => 1,
        }
    }
}
