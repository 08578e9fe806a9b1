//! Session storage keyed by chat.
//!
//! The navigator only sees the `SessionStore` trait, so the in-memory map
//! used by the bot can be swapped for an external key-value store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::session::Session;
use crate::domain::ChatId;

/// Per-chat session storage; `put` always replaces the previous session
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat: ChatId) -> Option<Session>;
    async fn put(&self, chat: ChatId, session: Session);
    #[allow(dead_code)]
    async fn remove(&self, chat: ChatId) -> Option<Session>;
}

/// Process-lifetime session map. Nothing is ever evicted.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<ChatId, Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, chat: ChatId) -> Option<Session> {
        self.sessions.read().await.get(&chat).cloned()
    }

    async fn put(&self, chat: ChatId, session: Session) {
        self.sessions.write().await.insert(chat, session);
    }

    async fn remove(&self, chat: ChatId) -> Option<Session> {
        self.sessions.write().await.remove(&chat)
    }
}
