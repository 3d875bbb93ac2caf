use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use std::time::Duration;
use url::Url;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_REQUEST_TIMEOUT_SECONDS: &str = "request-timeout-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub api_url: Url,
    pub request_timeout: Duration,
}

impl Options {
    /// Parse backend arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the API URL is missing or not a valid http(s) URL.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let api_url = match matches.get_one::<String>(ARG_API_URL) {
            Some(value) if !value.trim().is_empty() => value.trim(),
            _ => anyhow::bail!("missing required argument: --{ARG_API_URL}"),
        };
        let api_url =
            Url::parse(api_url).with_context(|| format!("Invalid API URL: {api_url}"))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            anyhow::bail!("API URL must use http or https: {api_url}");
        }

        let timeout_seconds = matches
            .get_one::<u64>(ARG_REQUEST_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(10);
        if timeout_seconds == 0 {
            anyhow::bail!("--{ARG_REQUEST_TIMEOUT_SECONDS} must be greater than zero");
        }

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_seconds),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the auth backend API")
                .env("AUTHGATE_API_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT_SECONDS)
                .long(ARG_REQUEST_TIMEOUT_SECONDS)
                .help("Timeout for backend requests in seconds")
                .env("AUTHGATE_REQUEST_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}
