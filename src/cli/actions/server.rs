use crate::{
    authgate::{self, GatewayConfig, GatewayState},
    cli::{
        commands::{backend, oauth, session},
        telemetry,
    },
    client::AuthClient,
    oauth::OAuthConfig,
};
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub backend: backend::Options,
    pub oauth: oauth::Options,
    pub session: session::Options,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the backend client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let client = AuthClient::new(args.backend.api_url.as_str(), args.backend.request_timeout)
        .context("Failed to build backend HTTP client")?;
    let oauth = OAuthConfig::new(
        args.oauth.client_id,
        args.oauth.redirect_uri,
        args.oauth.auth_url,
    );
    let config = GatewayConfig::new()
        .with_cookie_secure(args.session.cookie_secure)
        .with_verification_ttl(args.session.verification_ttl);

    let result = authgate::new(args.port, GatewayState::new(config, client, oauth)).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("api_url", args.backend.api_url.to_string()),
        (
            "request_timeout",
            format!("{}s", args.backend.request_timeout.as_secs()),
        ),
        ("oauth_client_id", args.oauth.client_id.clone()),
        ("oauth_redirect_uri", args.oauth.redirect_uri.to_string()),
        ("oauth_auth_url", args.oauth.auth_url.to_string()),
        ("cookie_secure", args.session.cookie_secure.to_string()),
        (
            "verification_ttl",
            format!("{}s", args.session.verification_ttl.as_secs()),
        ),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
