use super::{error_response, MessageBody};
use crate::authgate::GatewayState;
use crate::login::password_login;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Actions available on the login page.
#[derive(Serialize, Debug)]
pub struct LoginPage {
    password_login: &'static str,
    google_login: &'static str,
    register: &'static str,
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

pub async fn page() -> impl IntoResponse {
    Json(LoginPage {
        password_login: "/login",
        google_login: "/login/google",
        register: "/register",
    })
}

pub async fn submit(
    headers: HeaderMap,
    state: Extension<Arc<GatewayState>>,
    payload: Option<Json<LoginForm>>,
) -> Response {
    let Some(Json(form)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            MessageBody::new("missing payload"),
        )
            .into_response();
    };

    let mut session = state.session(&headers);
    let result = password_login(&mut session, state.client(), &form.email, &form.password).await;
    let cookies = session.into_store();

    match result {
        Ok(destination) => (cookies, Redirect::to(destination.path())).into_response(),
        Err(err) => (cookies, error_response(&err)).into_response(),
    }
}
