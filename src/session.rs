//! Server-side session store.
//!
//! Sessions map an opaque token (sent back as a cookie) to a user id. The
//! store is injected into the auth gate through `AppState` so handlers and
//! tests never touch global state.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, token: &str, user_id: i32);
    async fn get(&self, token: &str) -> Option<i32>;
    async fn remove(&self, token: &str);
}

pub fn new_token() -> String {
    Uuid::new_v4().to_string()
}

/// In-memory store. Sessions do not survive a restart; the server runs as a
/// single process and employees just log in again.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, i32>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, token: &str, user_id: i32) {
        self.sessions
            .write()
            .expect("session lock poisoned")
            .insert(token.to_string(), user_id);
    }

    async fn get(&self, token: &str) -> Option<i32> {
        self.sessions
            .read()
            .expect("session lock poisoned")
            .get(token)
            .copied()
    }

    async fn remove(&self, token: &str) {
        self.sessions
            .write()
            .expect("session lock poisoned")
            .remove(token);
    }
}
