use crate::auth::AuthFailure;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The session was torn down by the unauthorized handler. Callers must
    /// stop and propagate this; the page is already navigating to login.
    #[error(transparent)]
    Unauthorized(#[from] AuthFailure),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl Error {
    /// Whether this error is the terminal auth-failure signal.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
