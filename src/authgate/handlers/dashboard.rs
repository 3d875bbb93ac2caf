use crate::authgate::GatewayState;
use crate::client::UserProfile;
use crate::dashboard::{self, DashboardView};
use crate::Destination;
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize, Debug)]
pub struct DashboardPage {
    greeting: String,
    user: UserProfile,
    logout: &'static str,
}

pub async fn root() -> impl IntoResponse {
    Redirect::to(Destination::Dashboard.path())
}

pub async fn page(headers: HeaderMap, state: Extension<Arc<GatewayState>>) -> Response {
    let mut session = state.session(&headers);
    let view = dashboard::load(&mut session, state.client()).await;
    let cookies = session.into_store();

    match view {
        DashboardView::Ready(user) => (
            cookies,
            Json(DashboardPage {
                greeting: format!("Welcome, {}", user.display_name()),
                user,
                logout: "/logout",
            }),
        )
            .into_response(),
        DashboardView::Redirect(destination) => {
            (cookies, Redirect::to(destination.path())).into_response()
        }
    }
}

pub async fn logout(headers: HeaderMap, state: Extension<Arc<GatewayState>>) -> impl IntoResponse {
    let mut session = state.session(&headers);
    let destination = dashboard::logout(&mut session);

    (session.into_store(), Redirect::to(destination.path()))
}
