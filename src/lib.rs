//! # Authgate (session gateway)
//!
//! `authgate` fronts a web application whose authentication lives in an
//! external backend. It holds the session credential, gates every navigation,
//! and performs the credential exchanges against the backend API.
//!
//! ## Session model
//!
//! The session is a single opaque token held in a [`session::TokenStore`]. Its
//! presence is the only signal the [`session::guard`] uses; validity is decided
//! by the backend when the dashboard looks up the current user. A rejected token
//! is cleared and the user is sent back to login.
//!
//! ## Flows
//!
//! - **Password login:** `POST /api/auth/login`, the returned `token` is stored.
//! - **OAuth (Google):** a random state is stored, the browser is redirected to
//!   the provider, and the returned `code` is exchanged for an `access_token`.
//! - **Registration:** the backend emails a verification link.
//! - **Verification:** the link token is checked once, then a password that
//!   passes local rules finalises the account.
//!
//! Tokens, passwords and OAuth codes must never be logged.

pub mod authgate;
pub mod cli;
pub mod client;
pub mod dashboard;
pub mod login;
pub mod oauth;
pub mod register;
pub mod session;
pub mod verification;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Where a flow wants the browser to go next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Login,
    Dashboard,
    Register,
    /// Off-site redirect, e.g. the OAuth provider.
    External(url::Url),
}

impl Destination {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Register => "/register",
            Self::External(url) => url.as_str(),
        }
    }
}
