use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid token pair: {0}")]
    InvalidAddress(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("backend reported failure: {0}")]
    BackendFailure(String),

    #[error("malformed orderbook payload: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Transport-level failures are worth retrying on the next tick.
    /// Anything the backend explicitly rejected, or that we could not
    /// understand, will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Http(_) | FetchError::Status(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Http(e) if e.is_timeout())
    }
}
