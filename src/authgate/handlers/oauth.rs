use crate::authgate::GatewayState;
use crate::oauth::{CallbackParams, OAuthFlow};
use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
};
use std::sync::Arc;

/// Starts Google sign-in: stores the state cookie and redirects to the
/// provider.
pub async fn start(headers: HeaderMap, state: Extension<Arc<GatewayState>>) -> impl IntoResponse {
    let mut session = state.session(&headers);
    let destination = OAuthFlow::new(state.oauth()).begin(&mut session);

    (session.into_store(), Redirect::to(destination.path()))
}

pub async fn callback(
    headers: HeaderMap,
    state: Extension<Arc<GatewayState>>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse {
    let mut session = state.session(&headers);
    let destination = OAuthFlow::new(state.oauth())
        .complete(&mut session, state.client(), &params)
        .await;

    (session.into_store(), Redirect::to(destination.path()))
}
