//! Registration request: the backend emails a verification link.

use crate::client::{AuthClient, AuthError};
use regex::Regex;
use tracing::{error, instrument};

const DEFAULT_SUCCESS_MESSAGE: &str = "registration requested, check your email";

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Requests a verification email and returns the message to show the user.
///
/// # Errors
/// `Validation` for a malformed email, otherwise a generic registration error.
#[instrument(skip_all)]
pub async fn request_verification(client: &AuthClient, email: &str) -> Result<String, AuthError> {
    let email = email.trim();
    if !valid_email(email) {
        return Err(AuthError::Validation("a valid email is required".to_string()));
    }

    match client.request_verification(email).await {
        Ok(message) => Ok(message.unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string())),
        Err(err) => {
            error!("Registration request failed: {err}");
            Err(err)
        }
    }
}
