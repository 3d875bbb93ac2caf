use clap::{builder::BoolishValueParser, Arg, ArgMatches, Command};
use std::time::Duration;

pub const ARG_COOKIE_SECURE: &str = "cookie-secure";
pub const ARG_VERIFICATION_TTL_SECONDS: &str = "verification-ttl-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub cookie_secure: bool,
    pub verification_ttl: Duration,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            cookie_secure: matches
                .get_one::<bool>(ARG_COOKIE_SECURE)
                .copied()
                .unwrap_or(false),
            verification_ttl: Duration::from_secs(
                matches
                    .get_one::<u64>(ARG_VERIFICATION_TTL_SECONDS)
                    .copied()
                    .unwrap_or(1800),
            ),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark session cookies Secure (enable when served over HTTPS)")
                .env("AUTHGATE_COOKIE_SECURE")
                .num_args(0..=1)
                .default_value("false")
                .default_missing_value("true")
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_VERIFICATION_TTL_SECONDS)
                .long(ARG_VERIFICATION_TTL_SECONDS)
                .help("How long a verified email token is remembered for password retries")
                .env("AUTHGATE_VERIFICATION_TTL_SECONDS")
                .default_value("1800")
                .value_parser(clap::value_parser!(u64)),
        )
}
