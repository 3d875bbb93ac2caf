//! Password login.

use crate::client::{AuthClient, AuthError};
use crate::session::{SessionContext, TokenStore};
use crate::Destination;
use tracing::{info, instrument, warn};

/// Logs in with email and password and stores the returned token.
///
/// On success the caller navigates to the returned destination. On failure
/// any stale token is dropped and the error is meant to be shown inline on the
/// login page.
///
/// # Errors
/// `Validation` for an empty field (no network call), otherwise the client's
/// error.
#[instrument(skip_all)]
pub async fn password_login<S: TokenStore>(
    session: &mut SessionContext<S>,
    client: &AuthClient,
    email: &str,
    password: &str,
) -> Result<Destination, AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Validation("email is required".to_string()));
    }
    if password.is_empty() {
        return Err(AuthError::Validation("password is required".to_string()));
    }

    match client.password_login(email, password).await {
        Ok(token) => {
            session.sign_in(&token);
            info!("Password login succeeded");
            Ok(Destination::Dashboard)
        }
        Err(err) => {
            warn!("Password login failed: {err}");
            session.clear_token();
            Err(err)
        }
    }
}
