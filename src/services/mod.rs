pub mod component_service;
pub mod inventory_service;
pub mod user_service;

use chrono::Utc;

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    NotFound,
    /// Bad input, rejected before any mutation
    Validation(String),
    /// Business-rule violation (duplicate key, wrong state, last admin, ...)
    Conflict(String),
    /// Actor is not allowed to perform this operation
    Forbidden,
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Database(msg) => write!(f, "Database error: {}", msg),
            ServiceError::NotFound => write!(f, "Not found"),
            ServiceError::Validation(msg) => write!(f, "{}", msg),
            ServiceError::Conflict(msg) => write!(f, "{}", msg),
            ServiceError::Forbidden => write!(f, "Not allowed"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Timestamp format used for every stored date column.
pub fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
