//! Session context over an injectable [`TokenStore`]. Components that need the
//! session credential receive a `SessionContext` instead of reaching for a
//! global slot. Token values are secrets and must never be logged.

pub mod guard;
mod store;

pub use guard::{GuardDecision, GuardRules};
pub use store::{MemoryStore, Slot, TokenStore};

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Opaque backend-issued session credential.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    #[must_use]
    pub fn new(value: String) -> Self {
        Self(SecretString::from(value))
    }

    /// Raw token, only for attaching to outgoing requests or cookies.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("SessionToken([REDACTED])")
    }
}

impl From<SecretString> for SessionToken {
    fn from(value: SecretString) -> Self {
        Self(value)
    }
}

/// Session state for one browser context.
#[derive(Debug)]
pub struct SessionContext<S> {
    store: S,
}

impl<S: TokenStore> SessionContext<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn token(&self) -> Option<SessionToken> {
        self.store.get(Slot::Token).map(SessionToken::from)
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get(Slot::Token).is_some()
    }

    /// Stores a new token, replacing any previous one.
    pub fn sign_in(&mut self, token: &SessionToken) {
        self.store
            .set(Slot::Token, SecretString::from(token.expose().to_string()));
    }

    pub fn clear_token(&mut self) {
        self.store.remove(Slot::Token);
    }

    /// Clears both the token and any pending OAuth state.
    pub fn sign_out(&mut self) {
        for slot in Slot::ALL {
            self.store.remove(slot);
        }
    }

    pub fn remember_oauth_state(&mut self, state: &str) {
        self.store
            .set(Slot::OAuthState, SecretString::from(state.to_string()));
    }

    /// Returns the stored OAuth state and clears it; a state is single use.
    pub fn take_oauth_state(&mut self) -> Option<SecretString> {
        let state = self.store.get(Slot::OAuthState);
        if state.is_some() {
            self.store.remove(Slot::OAuthState);
        }
        state
    }

    /// Runs the navigation gate for `path` against the held token.
    pub fn guard(&self, rules: &GuardRules, path: &str) -> GuardDecision {
        guard::decide(rules, path, self.is_authenticated())
    }
}
