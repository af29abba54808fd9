//! Application state shared across all handlers

use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::Arc;

use crate::session::{MemorySessionStore, SessionStore};

#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Session token -> user id store
    pub sessions: Arc<dyn SessionStore>,
    /// Directory component images are written to
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(db: DatabaseConnection, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            sessions: Arc::new(MemorySessionStore::new()),
            upload_dir: upload_dir.into(),
        }
    }
}

// Allow handlers that only need the database to take State<DatabaseConnection>
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
