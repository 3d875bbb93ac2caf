//! HTTP client for the external auth backend. Every call is a single attempt;
//! transport failures, timeouts, rejected statuses and malformed bodies all come
//! back as [`AuthError`]. The client never touches the token store or decides
//! navigation; callers own both.

mod error;
mod types;

pub use error::AuthError;
pub use types::UserProfile;

use crate::session::SessionToken;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use types::{
    FinalizePasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    OAuthExchangeRequest, OAuthExchangeResponse, RawProfile, USER_TYPE, VerificationRequest,
    VerifyEmailResponse,
};

/// Default request timeout applied to all backend calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

const LOGIN_PATH: &str = "/api/auth/login";
const OAUTH_EXCHANGE_PATH: &str = "/auth/google/callback";
const CURRENT_USER_PATH: &str = "/auth/me";
const REQUEST_VERIFICATION_PATH: &str = "/api/pre-enrollment/request-verification";
const VERIFY_EMAIL_PATH: &str = "/api/pre-enrollment/verify-email";
const FINALIZE_PASSWORD_PATH: &str = "/api/user";

#[derive(Clone, Debug)]
pub struct AuthClient {
    http: Client,
    base_url: String,
}

impl AuthClient {
    /// Builds a client for the backend at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchanges email and password for a session token.
    ///
    /// # Errors
    /// Fails on transport errors, non-2xx statuses (surfacing the backend
    /// `message`) and 2xx bodies without a `token`.
    #[instrument(skip_all)]
    pub async fn password_login(&self, email: &str, password: &str) -> Result<SessionToken, AuthError> {
        let request = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { email, password });
        let response = send(request).await?;

        if !response.status().is_success() {
            return Err(rejection(response, "invalid credentials").await);
        }

        let body: LoginResponse = decode(response).await?;
        non_empty(body.token)
            .map(SessionToken::new)
            .ok_or(AuthError::MissingField("token"))
    }

    /// Exchanges an OAuth authorization code for a session token.
    ///
    /// # Errors
    /// Fails on transport errors, non-2xx statuses and 2xx bodies without an
    /// `access_token`.
    #[instrument(skip_all)]
    pub async fn exchange_oauth_code(
        &self,
        code: &str,
        state: &str,
        redirect_uri: &str,
    ) -> Result<SessionToken, AuthError> {
        let request = self
            .http
            .post(self.url(OAUTH_EXCHANGE_PATH))
            .json(&OAuthExchangeRequest {
                code,
                state,
                redirect_uri,
            });
        let response = send(request).await?;

        if !response.status().is_success() {
            return Err(rejection(response, "OAuth sign-in failed").await);
        }

        let body: OAuthExchangeResponse = decode(response).await?;
        non_empty(body.access_token)
            .map(SessionToken::new)
            .ok_or(AuthError::MissingField("access_token"))
    }

    /// Looks up the user the token belongs to.
    ///
    /// # Errors
    /// Any non-2xx status is reported as unauthorized; the caller is expected
    /// to drop the token.
    #[instrument(skip_all)]
    pub async fn fetch_current_user(&self, token: &SessionToken) -> Result<UserProfile, AuthError> {
        let request = self
            .http
            .get(self.url(CURRENT_USER_PATH))
            .bearer_auth(token.expose());
        let response = send(request).await?;

        let status = response.status();
        if !status.is_success() {
            debug!("User lookup rejected: {}", status);
            return Err(AuthError::BadResponse {
                status: status.as_u16(),
                message: "unauthorized".to_string(),
            });
        }

        let profile: RawProfile = decode(response).await?;
        let email = non_empty(profile.email).ok_or(AuthError::MissingField("email"))?;
        Ok(UserProfile {
            email,
            name: profile.name,
            picture: profile.picture,
        })
    }

    /// Asks the backend to email a verification link. Returns the backend's
    /// informational message when it sends one.
    ///
    /// # Errors
    /// Fails on transport errors and non-2xx statuses.
    #[instrument(skip_all)]
    pub async fn request_verification(&self, email: &str) -> Result<Option<String>, AuthError> {
        let request = self
            .http
            .post(self.url(REQUEST_VERIFICATION_PATH))
            .json(&VerificationRequest {
                email,
                user_type: USER_TYPE,
            });
        let response = send(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::BadResponse {
                status: status.as_u16(),
                message: "failed to register email".to_string(),
            });
        }

        let body = response.json::<MessageResponse>().await.unwrap_or_default();
        Ok(non_empty(body.message))
    }

    /// Checks a one-time verification token and returns the email it was
    /// issued for.
    ///
    /// # Errors
    /// Fails on transport errors, non-2xx statuses and bodies without `email`.
    #[instrument(skip_all)]
    pub async fn verify_email(&self, token: &str) -> Result<String, AuthError> {
        let request = self
            .http
            .get(self.url(VERIFY_EMAIL_PATH))
            .query(&[("token", token)]);
        let response = send(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::BadResponse {
                status: status.as_u16(),
                message: "invalid or expired token".to_string(),
            });
        }

        let body: VerifyEmailResponse = decode(response).await?;
        non_empty(body.email).ok_or(AuthError::MissingField("email"))
    }

    /// Sets the password of a verified account.
    ///
    /// # Errors
    /// Fails on transport errors and non-2xx statuses, surfacing the backend
    /// `message`.
    #[instrument(skip_all)]
    pub async fn finalize_password(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let request = self
            .http
            .post(self.url(FINALIZE_PASSWORD_PATH))
            .json(&FinalizePasswordRequest {
                password,
                user_type: USER_TYPE,
                email,
            });
        let response = send(request).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response, "failed to register password").await)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

async fn send(request: RequestBuilder) -> Result<Response, AuthError> {
    request.send().await.map_err(map_request_error)
}

fn map_request_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        warn!("Backend request timed out");
        AuthError::Network("request timed out".to_string())
    } else {
        warn!("Backend unreachable: {err}");
        AuthError::Network("unable to reach the server".to_string())
    }
}

/// Decodes a 2xx JSON body; a malformed body counts as a bad response.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    let status = response.status().as_u16();
    response.json::<T>().await.map_err(|err| {
        warn!("Failed to decode backend response: {err}");
        AuthError::BadResponse {
            status,
            message: "malformed response".to_string(),
        }
    })
}

/// Builds the error for a rejected request, preferring the backend `message`.
async fn rejection(response: Response, fallback: &str) -> AuthError {
    let status = response.status().as_u16();
    let body = response.json::<MessageResponse>().await.unwrap_or_default();
    let message = non_empty(body.message)
        .map_or_else(|| fallback.to_string(), |message| sanitize_message(&message));
    debug!("Backend rejected request ({status}): {message}");
    AuthError::BadResponse { status, message }
}

fn sanitize_message(message: &str) -> String {
    message.trim().chars().take(MAX_ERROR_CHARS).collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
