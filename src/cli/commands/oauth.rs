use crate::oauth::GOOGLE_AUTH_URL;
use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use url::Url;

pub const ARG_OAUTH_CLIENT_ID: &str = "oauth-client-id";
pub const ARG_OAUTH_REDIRECT_URI: &str = "oauth-redirect-uri";
pub const ARG_OAUTH_AUTH_URL: &str = "oauth-auth-url";

#[derive(Debug, Clone)]
pub struct Options {
    pub client_id: String,
    pub redirect_uri: Url,
    pub auth_url: Url,
}

impl Options {
    /// Parse OAuth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing or a URL is invalid.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let client_id = get_non_empty(ARG_OAUTH_CLIENT_ID)
            .with_context(|| format!("missing required argument: --{ARG_OAUTH_CLIENT_ID}"))?;
        let redirect_uri = get_non_empty(ARG_OAUTH_REDIRECT_URI)
            .with_context(|| format!("missing required argument: --{ARG_OAUTH_REDIRECT_URI}"))?;
        let redirect_uri = Url::parse(&redirect_uri)
            .with_context(|| format!("Invalid OAuth redirect URI: {redirect_uri}"))?;
        let auth_url = get_non_empty(ARG_OAUTH_AUTH_URL).unwrap_or_else(|| GOOGLE_AUTH_URL.to_string());
        let auth_url =
            Url::parse(&auth_url).with_context(|| format!("Invalid OAuth auth URL: {auth_url}"))?;

        Ok(Self {
            client_id,
            redirect_uri,
            auth_url,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_OAUTH_CLIENT_ID)
                .long(ARG_OAUTH_CLIENT_ID)
                .help("Google OAuth client id")
                .env("AUTHGATE_OAUTH_CLIENT_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_OAUTH_REDIRECT_URI)
                .long(ARG_OAUTH_REDIRECT_URI)
                .help("Callback URL registered with the provider, e.g. https://app.tld/auth/callback")
                .env("AUTHGATE_OAUTH_REDIRECT_URI")
                .required(true),
        )
        .arg(
            Arg::new(ARG_OAUTH_AUTH_URL)
                .long(ARG_OAUTH_AUTH_URL)
                .help("Provider authorization endpoint")
                .env("AUTHGATE_OAUTH_AUTH_URL")
                .default_value(GOOGLE_AUTH_URL),
        )
}
