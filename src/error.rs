/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// An attempt exceeded its per-attempt time budget.
    #[error("request timed out")]
    TimedOut,
    /// Non-empty response body that is not valid JSON.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
    /// Non-success HTTP status, with the message extracted from the
    /// body's `error` field when present.
    #[error("request failed ({status}): {message}")]
    Failed {
        /// HTTP status code of the failing response.
        status: u16,
        /// Human-readable message, `"Request failed"` if the body had none.
        message: String,
    },
}

impl FetchError {
    /// Status code for [`FetchError::Failed`], `None` for every other variant.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Failed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
