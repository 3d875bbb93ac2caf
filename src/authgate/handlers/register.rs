use super::{error_response, MessageBody};
use crate::authgate::GatewayState;
use crate::register::request_verification;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Debug)]
pub struct RegisterPage {
    register: &'static str,
    login: &'static str,
}

#[derive(Deserialize, Debug)]
pub struct RegisterForm {
    email: String,
}

pub async fn page() -> impl IntoResponse {
    Json(RegisterPage {
        register: "/register",
        login: "/login",
    })
}

pub async fn submit(
    state: Extension<Arc<GatewayState>>,
    payload: Option<Json<RegisterForm>>,
) -> Response {
    let Some(Json(form)) = payload else {
        return (StatusCode::BAD_REQUEST, MessageBody::new("missing payload")).into_response();
    };

    match request_verification(state.client(), &form.email).await {
        Ok(message) => (StatusCode::ACCEPTED, MessageBody::new(message)).into_response(),
        Err(err) => error_response(&err),
    }
}
