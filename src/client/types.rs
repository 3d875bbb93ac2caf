//! Request and response payloads for the backend API. Requests carry passwords
//! and codes, so none of them derive `Debug`.

use serde::{Deserialize, Serialize};

/// Account type sent on registration and password setup.
pub(crate) const USER_TYPE: u8 = 1;

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    pub token: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct OAuthExchangeRequest<'a> {
    pub code: &'a str,
    pub state: &'a str,
    pub redirect_uri: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct OAuthExchangeResponse {
    pub access_token: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct VerificationRequest<'a> {
    pub email: &'a str,
    #[serde(rename = "userType")]
    pub user_type: u8,
}

#[derive(Deserialize)]
pub(crate) struct VerifyEmailResponse {
    pub email: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct FinalizePasswordRequest<'a> {
    pub password: &'a str,
    #[serde(rename = "userType")]
    pub user_type: u8,
    pub email: &'a str,
}

/// Body shape of backend errors and informational replies.
#[derive(Deserialize, Default)]
pub(crate) struct MessageResponse {
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct RawProfile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Current user as returned by the backend. Held in memory for one view only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl UserProfile {
    /// Name to greet the user with, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}
