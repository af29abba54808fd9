use sea_orm::DatabaseConnection;
use std::env;

use crate::models::user::ROLE_ADMIN;
use crate::services::{user_service, ServiceError};

/// Create the bootstrap admin when no active admin exists yet, so a fresh
/// database is immediately usable. Credentials come from the environment;
/// the defaults are for local development only.
pub async fn ensure_first_admin(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if user_service::count_active_admins(db).await? > 0 {
        return Ok(());
    }

    let name = env::var("FIRST_ADMIN_NAME").unwrap_or_else(|_| "admin".to_string());
    let employee_id = env::var("FIRST_ADMIN_EMPLOYEE_ID").unwrap_or_else(|_| "admin".to_string());
    let password = env::var("FIRST_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

    user_service::create_user(db, &name, &employee_id, ROLE_ADMIN, &password).await?;
    tracing::info!("Created bootstrap admin '{}'", employee_id);

    Ok(())
}
