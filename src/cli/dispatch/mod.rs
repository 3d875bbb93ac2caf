use crate::cli::{
    actions::{server::Args, Action},
    commands::{backend, oauth, session, ARG_PORT},
};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    Ok(Action::Server(Args {
        port,
        backend: backend::Options::parse(matches)?,
        oauth: oauth::Options::parse(matches)?,
        session: session::Options::parse(matches),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use std::time::Duration;

    const ENV_KEYS: [&str; 8] = [
        "AUTHGATE_PORT",
        "AUTHGATE_API_URL",
        "AUTHGATE_OAUTH_CLIENT_ID",
        "AUTHGATE_OAUTH_REDIRECT_URI",
        "AUTHGATE_OAUTH_AUTH_URL",
        "AUTHGATE_REQUEST_TIMEOUT_SECONDS",
        "AUTHGATE_COOKIE_SECURE",
        "AUTHGATE_VERIFICATION_TTL_SECONDS",
    ];

    fn dispatch(args: &[&str]) -> Result<Action> {
        let matches = commands::new().try_get_matches_from(args)?;
        handler(&matches)
    }

    #[test]
    fn test_handler_builds_server_action() {
        temp_env::with_vars_unset(ENV_KEYS, || {
            let action = dispatch(&[
                "authgate",
                "--api-url",
                "https://api.example.com/",
                "--oauth-client-id",
                "client-123",
                "--oauth-redirect-uri",
                "https://app.example.com/auth/callback",
                "--request-timeout-seconds",
                "5",
            ])
            .unwrap();

            let Action::Server(args) = action;
            assert_eq!(args.port, 8080);
            assert_eq!(args.backend.api_url.as_str(), "https://api.example.com/");
            assert_eq!(args.backend.request_timeout, Duration::from_secs(5));
            assert_eq!(args.oauth.client_id, "client-123");
            assert_eq!(
                args.oauth.auth_url.as_str(),
                crate::oauth::GOOGLE_AUTH_URL
            );
            assert!(!args.session.cookie_secure);
            assert_eq!(args.session.verification_ttl, Duration::from_secs(1800));
        });
    }

    #[test]
    fn test_handler_rejects_invalid_urls() {
        temp_env::with_vars_unset(ENV_KEYS, || {
            let err = dispatch(&[
                "authgate",
                "--api-url",
                "not a url",
                "--oauth-client-id",
                "client-123",
                "--oauth-redirect-uri",
                "https://app.example.com/auth/callback",
            ])
            .unwrap_err();
            assert!(err.to_string().contains("Invalid API URL"));

            let err = dispatch(&[
                "authgate",
                "--api-url",
                "ftp://api.example.com",
                "--oauth-client-id",
                "client-123",
                "--oauth-redirect-uri",
                "https://app.example.com/auth/callback",
            ])
            .unwrap_err();
            assert!(err.to_string().contains("http or https"));

            let err = dispatch(&[
                "authgate",
                "--api-url",
                "https://api.example.com",
                "--oauth-client-id",
                "client-123",
                "--oauth-redirect-uri",
                "/auth/callback",
            ])
            .unwrap_err();
            assert!(err.to_string().contains("Invalid OAuth redirect URI"));
        });
    }

    #[test]
    fn test_handler_rejects_blank_client_id() {
        temp_env::with_vars_unset(ENV_KEYS, || {
            let err = dispatch(&[
                "authgate",
                "--api-url",
                "https://api.example.com",
                "--oauth-client-id",
                "  ",
                "--oauth-redirect-uri",
                "https://app.example.com/auth/callback",
            ])
            .unwrap_err();
            assert!(err.to_string().contains("--oauth-client-id"));
        });
    }

    #[test]
    fn test_handler_rejects_zero_timeout() {
        temp_env::with_vars_unset(ENV_KEYS, || {
            let err = dispatch(&[
                "authgate",
                "--api-url",
                "https://api.example.com",
                "--oauth-client-id",
                "client-123",
                "--oauth-redirect-uri",
                "https://app.example.com/auth/callback",
                "--request-timeout-seconds",
                "0",
            ])
            .unwrap_err();
            assert!(err.to_string().contains("greater than zero"));
        });
    }
}
