use thiserror::Error;

/// Failure of an auth operation. Callers only need to branch on success or
/// failure; the variant is kept for logging and status mapping.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Transport-level failure, including timeouts.
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx status or an undecodable body.
    #[error("{message}")]
    BadResponse { status: u16, message: String },
    /// A 2xx response without a field the operation requires.
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
    /// Local input rejected before any network call.
    #[error("{0}")]
    Validation(String),
}

impl AuthError {
    /// HTTP status returned by the backend, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}
