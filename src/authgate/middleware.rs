use super::GatewayState;
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Redirects navigations the session guard rejects; everything else passes
/// through untouched.
pub async fn session_guard(
    Extension(state): Extension<Arc<GatewayState>>,
    request: Request,
    next: Next,
) -> Response {
    let rules = state.config().guard_rules();
    let path = request.uri().path();

    if !rules.is_gated(path) {
        return next.run(request).await;
    }

    let session = state.session(request.headers());
    match session.guard(rules, path).destination() {
        Some(destination) => {
            debug!("Guard redirecting {} to {}", path, destination.path());
            Redirect::to(destination.path()).into_response()
        }
        None => next.run(request).await,
    }
}
