//! Verification tokens the backend already accepted, kept for a bounded time so
//! a password retry does not re-check the token.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug)]
struct Entry {
    email: String,
    created: Instant,
}

#[derive(Debug)]
pub struct PendingVerifications {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl PendingVerifications {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Remembers the email a token was issued for, dropping expired entries.
    pub async fn insert(&self, token: &str, email: &str) {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.created.elapsed() < self.ttl);
        entries.insert(
            token.to_string(),
            Entry {
                email: email.to_string(),
                created: Instant::now(),
            },
        );
    }

    /// Email for a token that has not expired.
    pub async fn get(&self, token: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries
            .get(token)
            .filter(|entry| entry.created.elapsed() < self.ttl)
            .map(|entry| entry.email.clone())
    }

    pub async fn remove(&self, token: &str) {
        self.entries.lock().await.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_get_remove() {
        let pending = PendingVerifications::new(Duration::from_secs(60));
        pending.insert("v-1", "new@example.com").await;

        assert_eq!(pending.get("v-1").await.as_deref(), Some("new@example.com"));
        assert!(pending.get("v-2").await.is_none());

        pending.remove("v-1").await;
        assert!(pending.get("v-1").await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_ignored_and_pruned() {
        let pending = PendingVerifications::new(Duration::ZERO);
        pending.insert("old", "old@example.com").await;
        assert!(pending.get("old").await.is_none());

        pending.insert("new", "new@example.com").await;
        assert!(!pending.entries.lock().await.contains_key("old"));
    }
}
