//! Email verification and password setup for new accounts.

use crate::client::{AuthClient, AuthError};
use regex::Regex;
use thiserror::Error;
use tracing::{info, instrument, warn};

pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Characters that satisfy the special-character rule.
pub const SPECIAL_CHARACTERS: &str = ".,-;+*/\\";

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("passwords do not match")]
    Mismatch,
    #[error("password must be at least 8 characters long")]
    TooShort,
    #[error("password must contain a number")]
    MissingDigit,
    #[error("password must contain a lowercase letter")]
    MissingLowercase,
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    #[error("password must contain one of . , - ; + * / \\")]
    MissingSpecial,
}

/// Checks password strength, reporting the first rule that fails.
///
/// # Errors
/// The first unmet rule, in length, digit, lowercase, uppercase, special order.
pub fn check_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }

    let rules = [
        (r"[0-9]", PasswordError::MissingDigit),
        (r"[a-z]", PasswordError::MissingLowercase),
        (r"[A-Z]", PasswordError::MissingUppercase),
    ];
    for (pattern, error) in rules {
        if !Regex::new(pattern).is_ok_and(|re| re.is_match(password)) {
            return Err(error);
        }
    }

    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(PasswordError::MissingSpecial);
    }

    Ok(())
}

#[must_use]
pub fn validate_password(password: &str) -> bool {
    check_password(password).is_ok()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationState {
    /// Nothing checked yet.
    Pending,
    Validating,
    Valid { email: String },
    /// Terminal for this token.
    Invalid(String),
}

/// Verification of one emailed token, then password setup for its account.
#[derive(Debug)]
pub struct VerificationFlow {
    token: Option<String>,
    state: VerificationState,
}

impl VerificationFlow {
    #[must_use]
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToString::to_string),
            state: VerificationState::Pending,
        }
    }

    /// Restores a flow whose token the backend already accepted.
    #[must_use]
    pub fn resume(token: &str, email: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            state: VerificationState::Valid {
                email: email.to_string(),
            },
        }
    }

    #[must_use]
    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match &self.state {
            VerificationState::Valid { email } => Some(email),
            _ => None,
        }
    }

    /// Checks the token with the backend. A missing token is invalid without
    /// a network call; a flow that already left `Pending` is not re-checked.
    #[instrument(skip_all)]
    pub async fn validate(&mut self, client: &AuthClient) {
        if self.state != VerificationState::Pending {
            return;
        }

        let Some(token) = self.token.as_deref() else {
            self.state = VerificationState::Invalid("missing verification token".to_string());
            return;
        };

        self.state = VerificationState::Validating;
        self.state = match client.verify_email(token).await {
            Ok(email) => {
                info!("Verification token accepted");
                VerificationState::Valid { email }
            }
            Err(err) => {
                warn!("Verification token rejected: {err}");
                VerificationState::Invalid(err.to_string())
            }
        };
    }

    /// Sets the account password once the token is valid. Local checks run
    /// first; a server rejection leaves the flow valid so the user can retry.
    ///
    /// # Errors
    /// `Validation` when the flow is not valid or the password fails a local
    /// check (no network call), otherwise the client's error.
    #[instrument(skip_all)]
    pub async fn submit_password(
        &self,
        client: &AuthClient,
        password: &str,
        confirmation: &str,
    ) -> Result<(), AuthError> {
        let Some(email) = self.email() else {
            return Err(AuthError::Validation("email is not verified".to_string()));
        };

        if password != confirmation {
            return Err(AuthError::Validation(PasswordError::Mismatch.to_string()));
        }
        check_password(password).map_err(|err| AuthError::Validation(err.to_string()))?;

        client.finalize_password(email, password).await.map_err(|err| {
            warn!("Password setup rejected: {err}");
            err
        })?;
        info!("Password setup completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_TIMEOUT;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn offline_client() -> AuthClient {
        AuthClient::new("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_validate_password() {
        assert!(!validate_password("abc"));
        assert!(validate_password("Abcdef1."));
        assert!(validate_password("Abcdef1\\"));
        assert!(validate_password("Zz9/zzzz"));
    }

    #[test]
    fn check_password_reports_first_failure() {
        assert_eq!(check_password("Ab1."), Err(PasswordError::TooShort));
        assert_eq!(check_password("Abcdefg."), Err(PasswordError::MissingDigit));
        assert_eq!(check_password("ABCDEF1."), Err(PasswordError::MissingLowercase));
        assert_eq!(check_password("abcdef1."), Err(PasswordError::MissingUppercase));
        assert_eq!(check_password("Abcdef12"), Err(PasswordError::MissingSpecial));
        assert_eq!(check_password("Abcdef1!"), Err(PasswordError::MissingSpecial));
        assert_eq!(check_password("Abcdef1-"), Ok(()));
    }

    #[tokio::test]
    async fn missing_token_is_invalid_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = AuthClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();

        for token in [None, Some(""), Some("   ")] {
            let mut flow = VerificationFlow::new(token);
            flow.validate(&client).await;
            assert!(matches!(flow.state(), VerificationState::Invalid(_)));
        }
    }

    #[tokio::test]
    async fn accepted_token_is_valid_with_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pre-enrollment/verify-email"))
            .and(query_param("token", "v-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "new@example.com"})))
            .expect(1)
            .mount(&server)
            .await;
        let client = AuthClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();

        let mut flow = VerificationFlow::new(Some("v-1"));
        assert_eq!(flow.state(), &VerificationState::Pending);
        flow.validate(&client).await;
        assert_eq!(flow.email(), Some("new@example.com"));

        // already valid, no second lookup
        flow.validate(&client).await;
        assert_eq!(flow.email(), Some("new@example.com"));
    }

    #[tokio::test]
    async fn rejected_token_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pre-enrollment/verify-email"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;
        let client = AuthClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();

        let mut flow = VerificationFlow::new(Some("expired"));
        flow.validate(&client).await;
        assert_eq!(
            flow.state(),
            &VerificationState::Invalid("invalid or expired token".to_string())
        );
    }

    #[tokio::test]
    async fn mismatch_is_reported_before_strength() {
        let flow = VerificationFlow::resume("v-1", "new@example.com");
        let err = flow
            .submit_password(&offline_client(), "abc", "abd")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Validation("passwords do not match".to_string()));
    }

    #[tokio::test]
    async fn weak_password_never_calls_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let client = AuthClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();

        let flow = VerificationFlow::resume("v-1", "new@example.com");
        let err = flow.submit_password(&client, "abc", "abc").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn submit_requires_valid_state() {
        let flow = VerificationFlow::new(Some("v-1"));
        let err = flow
            .submit_password(&offline_client(), "Abcdef1.", "Abcdef1.")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Validation("email is not verified".to_string()));
    }

    #[tokio::test]
    async fn server_rejection_keeps_flow_valid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/user"))
            .and(body_json(json!({
                "password": "Abcdef1.",
                "userType": 1,
                "email": "new@example.com"
            })))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "User exists"})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        let client = AuthClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();

        let flow = VerificationFlow::resume("v-1", "new@example.com");
        let err = flow
            .submit_password(&client, "Abcdef1.", "Abcdef1.")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User exists");
        assert_eq!(flow.email(), Some("new@example.com"));

        flow.submit_password(&client, "Abcdef1.", "Abcdef1.")
            .await
            .unwrap();
    }
}
