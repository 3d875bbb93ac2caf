//! Persisted session slots. Each slot holds at most one value and writes are
//! last-writer-wins.

use secrecy::SecretString;
use std::collections::HashMap;

/// Named slot in the token store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Backend-issued session credential.
    Token,
    /// Anti-forgery value generated before an OAuth redirect.
    OAuthState,
}

impl Slot {
    /// Storage key, also used as the cookie name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::OAuthState => "oauth_state",
        }
    }

    pub(crate) const ALL: [Slot; 2] = [Slot::Token, Slot::OAuthState];
}

/// Storage backend for the session slots.
///
/// Implementations only persist values; deciding what a value means is left to
/// [`super::SessionContext`].
pub trait TokenStore {
    fn get(&self, slot: Slot) -> Option<SecretString>;
    fn set(&mut self, slot: Slot, value: SecretString);
    fn remove(&mut self, slot: Slot);
}

/// Store kept in process memory, used by tests and embedders without cookies.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slots: HashMap<Slot, SecretString>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, slot: Slot) -> Option<SecretString> {
        self.slots.get(&slot).cloned()
    }

    fn set(&mut self, slot: Slot, value: SecretString) {
        self.slots.insert(slot, value);
    }

    fn remove(&mut self, slot: Slot) {
        self.slots.remove(&slot);
    }
}

impl<T: TokenStore + ?Sized> TokenStore for &mut T {
    fn get(&self, slot: Slot) -> Option<SecretString> {
        (**self).get(slot)
    }

    fn set(&mut self, slot: Slot, value: SecretString) {
        (**self).set(slot, value);
    }

    fn remove(&mut self, slot: Slot) {
        (**self).remove(slot);
    }
}
