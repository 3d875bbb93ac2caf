use super::{error_response, MessageBody};
use crate::authgate::GatewayState;
use crate::verification::{VerificationFlow, VerificationState};
use crate::Destination;
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Deserialize, Debug)]
pub struct VerifyQuery {
    token: Option<String>,
}

#[derive(Deserialize)]
pub struct PasswordForm {
    token: String,
    password: String,
    confirm_password: String,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VerificationView {
    Valid { email: String },
    Invalid { message: String, register: String },
}

pub async fn check(
    state: Extension<Arc<GatewayState>>,
    Query(query): Query<VerifyQuery>,
) -> impl IntoResponse {
    let flow = verified_flow(&state, query.token.as_deref()).await;

    match flow.state() {
        VerificationState::Valid { email } => (
            StatusCode::OK,
            Json(VerificationView::Valid {
                email: email.clone(),
            }),
        ),
        VerificationState::Invalid(message) => (
            StatusCode::BAD_REQUEST,
            Json(invalid_view(message)),
        ),
        VerificationState::Pending | VerificationState::Validating => (
            StatusCode::BAD_REQUEST,
            Json(invalid_view("verification did not complete")),
        ),
    }
}

pub async fn finalize(
    state: Extension<Arc<GatewayState>>,
    payload: Option<Json<PasswordForm>>,
) -> Response {
    let Some(Json(form)) = payload else {
        return (StatusCode::BAD_REQUEST, MessageBody::new("missing payload")).into_response();
    };

    let flow = verified_flow(&state, Some(&form.token)).await;
    if let VerificationState::Invalid(message) = flow.state() {
        return (StatusCode::BAD_REQUEST, Json(invalid_view(message))).into_response();
    }

    match flow
        .submit_password(state.client(), &form.password, &form.confirm_password)
        .await
    {
        Ok(()) => {
            if let Some(token) = flow.token() {
                state.pending().remove(token).await;
            }
            Redirect::to(Destination::Login.path()).into_response()
        }
        Err(err) => error_response(&err),
    }
}

/// Flow for `token`, reusing a recent successful check when there is one.
async fn verified_flow(state: &GatewayState, token: Option<&str>) -> VerificationFlow {
    let token = token.map(str::trim).filter(|t| !t.is_empty());
    if let Some(token) = token {
        if let Some(email) = state.pending().get(token).await {
            debug!("Reusing verified token");
            return VerificationFlow::resume(token, &email);
        }
    }

    let mut flow = VerificationFlow::new(token);
    flow.validate(state.client()).await;
    if let (Some(token), Some(email)) = (flow.token(), flow.email()) {
        state.pending().insert(token, email).await;
    }
    flow
}

fn invalid_view(message: &str) -> VerificationView {
    VerificationView::Invalid {
        message: message.to_string(),
        register: Destination::Register.path().to_string(),
    }
}
