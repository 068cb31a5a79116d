use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Logs a failed pipeline stage and wraps the cause as an internal error.
    pub fn stage(stage: &'static str) -> impl FnOnce(anyhow::Error) -> AppError {
        move |err| {
            error!("{} failed: {:#}", stage, err);
            AppError::Internal(err.context(format!("{} failed", stage)))
        }
    }
}
