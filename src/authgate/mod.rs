//! HTTP gateway: serves the auth routes and gates every other navigation on
//! the session cookie.

pub mod cookies;
pub(crate) mod handlers;
mod middleware;
pub mod pending;

use crate::client::AuthClient;
use crate::oauth::OAuthConfig;
use crate::session::{GuardRules, SessionContext};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    routing::get,
    Extension, Router,
};
use cookies::CookieStore;
use pending::PendingVerifications;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub const DEFAULT_VERIFICATION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    cookie_secure: bool,
    verification_ttl: Duration,
    guard_rules: GuardRules,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cookie_secure: false,
            verification_ttl: DEFAULT_VERIFICATION_TTL,
            guard_rules: GuardRules::default(),
        }
    }
}

impl GatewayConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark cookies `Secure`; only when served over HTTPS.
    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_verification_ttl(mut self, ttl: Duration) -> Self {
        self.verification_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_guard_rules(mut self, rules: GuardRules) -> Self {
        self.guard_rules = rules;
        self
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn verification_ttl(&self) -> Duration {
        self.verification_ttl
    }

    #[must_use]
    pub fn guard_rules(&self) -> &GuardRules {
        &self.guard_rules
    }
}

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct GatewayState {
    config: GatewayConfig,
    client: AuthClient,
    oauth: OAuthConfig,
    pending: PendingVerifications,
}

impl GatewayState {
    #[must_use]
    pub fn new(config: GatewayConfig, client: AuthClient, oauth: OAuthConfig) -> Self {
        let pending = PendingVerifications::new(config.verification_ttl());
        Self {
            config,
            client,
            oauth,
            pending,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    #[must_use]
    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    #[must_use]
    pub fn oauth(&self) -> &OAuthConfig {
        &self.oauth
    }

    pub(crate) fn pending(&self) -> &PendingVerifications {
        &self.pending
    }

    /// Session backed by the request cookies.
    pub(crate) fn session(&self, headers: &HeaderMap) -> SessionContext<CookieStore> {
        SessionContext::new(CookieStore::from_headers(
            headers,
            self.config.cookie_secure(),
        ))
    }
}

/// Builds the gateway router with tracing, request ids and the session guard.
pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard::root))
        .route("/health", get(handlers::health::health))
        .route(
            "/login",
            get(handlers::login::page).post(handlers::login::submit),
        )
        .route("/login/google", get(handlers::oauth::start))
        .route("/auth/callback", get(handlers::oauth::callback))
        .route(
            "/register",
            get(handlers::register::page).post(handlers::register::submit),
        )
        .route(
            "/verify-email",
            get(handlers::verify_email::check).post(handlers::verify_email::finalize),
        )
        .route("/dashboard", get(handlers::dashboard::page))
        .route("/logout", get(handlers::dashboard::logout))
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state))
                .layer(axum::middleware::from_fn(middleware::session_guard)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: GatewayState) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
