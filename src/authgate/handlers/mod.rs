pub mod dashboard;
pub mod health;
pub mod login;
pub mod oauth;
pub mod register;
pub mod verify_email;

// common functions for the handlers
use crate::client::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Client input errors are 400, backend 4xx rejections keep their status,
/// anything else is a bad gateway.
pub fn error_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::BadResponse { status, .. } if (400..500).contains(status) => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        AuthError::Network(_) | AuthError::BadResponse { .. } | AuthError::MissingField(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

pub fn error_response(err: &AuthError) -> Response {
    (error_status(err), MessageBody::new(err.to_string())).into_response()
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, MessageBody::new("not found"))
}
