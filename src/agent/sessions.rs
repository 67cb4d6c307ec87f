//! Per-user session store
//!
//! Replaces an unbounded in-process map with an explicit store keyed by
//! user id. Each session holds the (user, assistant) turn pairs of past
//! exchanges; tool traffic is not retained. Sessions are evicted after an
//! idle TTL, and the store caps the total session count by dropping the
//! longest-idle session first.

use crate::config::SessionConfig;
use crate::providers::Message;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

struct Session {
    turns: Vec<Message>,
    last_active: DateTime<Utc>,
}

/// Concurrency-safe store of per-user conversation history
pub struct SessionStore {
    inner: Mutex<HashMap<String, Session>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl SessionStore {
    /// Create a session store from configuration
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            max_sessions: config.max_sessions,
            idle_ttl: Duration::seconds(config.idle_ttl_seconds as i64),
        }
    }

    /// Fetch a user's conversation history
    ///
    /// Returns an empty history for unknown users and for sessions that
    /// expired since the last exchange.
    pub async fn history(&self, user_id: &str) -> Vec<Message> {
        let mut sessions = self.inner.lock().await;
        Self::evict_expired(&mut sessions, self.idle_ttl);
        sessions
            .get(user_id)
            .map(|s| s.turns.clone())
            .unwrap_or_default()
    }

    /// Record one completed exchange for a user
    ///
    /// Appends the (user, assistant) pair, refreshes the session's idle
    /// clock, and enforces the store capacity.
    pub async fn record_exchange(&self, user_id: &str, user_text: &str, assistant_text: &str) {
        let mut sessions = self.inner.lock().await;
        Self::evict_expired(&mut sessions, self.idle_ttl);

        let session = sessions.entry(user_id.to_string()).or_insert_with(|| Session {
            turns: Vec::new(),
            last_active: Utc::now(),
        });
        session.turns.push(Message::user(user_text));
        session.turns.push(Message::assistant(assistant_text));
        session.last_active = Utc::now();

        while sessions.len() > self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_active)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    tracing::debug!("Evicting session over capacity: {}", id);
                    sessions.remove(&id);
                }
                None => break,
            }
        }
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether the store holds no sessions
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    fn evict_expired(sessions: &mut HashMap<String, Session>, idle_ttl: Duration) {
        let cutoff = Utc::now() - idle_ttl;
        sessions.retain(|id, session| {
            let live = session.last_active >= cutoff;
            if !live {
                tracing::debug!("Evicting idle session: {}", id);
            }
            live
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(max_sessions: usize, idle_ttl_seconds: u64) -> SessionStore {
        SessionStore::new(&SessionConfig {
            max_sessions,
            idle_ttl_seconds,
        })
    }

    #[tokio::test]
    async fn test_unknown_user_has_empty_history() {
        let store = store(10, 3600);
        assert!(store.history("42").await.is_empty());
    }

    #[tokio::test]
    async fn test_exchanges_accumulate_as_turn_pairs() {
        let store = store(10, 3600);
        store.record_exchange("42", "2 idli", "Here are the facts").await;
        store.record_exchange("42", "thanks", "You're welcome!").await;

        let history = store.history("42").await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[0].content.as_deref(), Some("2 idli"));
        assert_eq!(history[3].role, "assistant");
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = store(10, 3600);
        store.record_exchange("a", "hello", "hi").await;
        assert!(store.history("b").await.is_empty());
        assert_eq!(store.history("a").await.len(), 2);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        // Zero TTL: everything is expired on the next touch
        let store = store(10, 0);
        store.record_exchange("42", "hello", "hi").await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(store.history("42").await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let store = store(2, 3600);
        store.record_exchange("first", "a", "b").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.record_exchange("second", "a", "b").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.record_exchange("third", "a", "b").await;

        assert_eq!(store.len().await, 2);
        assert!(store.history("first").await.is_empty());
        assert!(!store.history("third").await.is_empty());
    }
}
