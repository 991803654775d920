use std::collections::HashMap;

use async_trait::async_trait;
use invochat_core::Message;
use tokio::sync::RwLock;

/// Server-side transcript storage, keyed by an opaque client session id.
///
/// Clients that keep their own transcript simply send `history` with every
/// request and never set a session id; the store is only consulted when a
/// request names a session and omits `history`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Option<Vec<Message>>;
    async fn put(&self, session_id: &str, history: Vec<Message>);
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<Message>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Option<Vec<Message>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    async fn put(&self, session_id: &str, history: Vec<Message>) {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), history);
    }
}
