//! User administration and self-service profile logic
//!
//! Guards the two account invariants: a user can never change or disable
//! their own standing, and at least one active admin always remains.

use sea_orm::*;

use super::{now_timestamp, ServiceError};
use crate::auth::{hash_password, verify_password};
use crate::models::user::{self, Entity as User, ROLE_ADMIN, ROLE_USER};

pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>, ServiceError> {
    let users = User::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(users)
}

pub async fn find_by_employee_id(
    db: &DatabaseConnection,
    employee_id: &str,
) -> Result<Option<user::Model>, ServiceError> {
    let user = User::find()
        .filter(user::Column::EmployeeId.eq(employee_id))
        .one(db)
        .await?;
    Ok(user)
}

pub async fn count_active_admins<C: ConnectionTrait>(conn: &C) -> Result<u64, ServiceError> {
    let count = User::find()
        .filter(user::Column::Role.eq(ROLE_ADMIN))
        .filter(user::Column::IsActive.eq(true))
        .count(conn)
        .await?;
    Ok(count)
}

fn validate_role(role: &str) -> Result<(), ServiceError> {
    if role != ROLE_ADMIN && role != ROLE_USER {
        return Err(ServiceError::Validation(format!(
            "Unknown role '{}'",
            role
        )));
    }
    Ok(())
}

pub async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    employee_id: &str,
    role: &str,
    password: &str,
) -> Result<user::Model, ServiceError> {
    if name.is_empty() || employee_id.is_empty() || password.is_empty() {
        return Err(ServiceError::Validation(
            "Name, employee ID and password are required".to_string(),
        ));
    }
    validate_role(role)?;

    if find_by_employee_id(db, employee_id).await?.is_some() {
        return Err(ServiceError::Conflict(
            "Employee ID already exists".to_string(),
        ));
    }

    let password_hash =
        hash_password(password).map_err(ServiceError::Database)?;

    let new_user = user::ActiveModel {
        name: Set(name.to_string()),
        employee_id: Set(employee_id.to_string()),
        role: Set(role.to_string()),
        password_hash: Set(password_hash),
        is_active: Set(true),
        created_at: Set(now_timestamp()),
        ..Default::default()
    };

    Ok(new_user.insert(db).await?)
}

/// Admin sets a new password for any user. Immediate effect, no
/// old-password check.
pub async fn reset_password(
    db: &DatabaseConnection,
    user_id: i32,
    new_password: &str,
) -> Result<(), ServiceError> {
    if new_password.is_empty() {
        return Err(ServiceError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }

    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let password_hash =
        hash_password(new_password).map_err(ServiceError::Database)?;

    let mut active: user::ActiveModel = user.into();
    active.password_hash = Set(password_hash);
    active.update(db).await?;

    Ok(())
}

/// Enable or disable an account. Disabling is refused for the actor's own
/// account and for the last active admin.
pub async fn set_active(
    db: &DatabaseConnection,
    actor: &user::Model,
    user_id: i32,
    active: bool,
) -> Result<(), ServiceError> {
    if !active && actor.id == user_id {
        return Err(ServiceError::Conflict(
            "Cannot disable yourself".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let user = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if !active && user.is_admin() && user.is_active && count_active_admins(&txn).await? <= 1 {
        txn.rollback().await?;
        return Err(ServiceError::Conflict(
            "Cannot disable the last admin".to_string(),
        ));
    }

    let mut model: user::ActiveModel = user.into();
    model.is_active = Set(active);
    model.update(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Admin edit of name, employee id and role.
pub async fn edit_user(
    db: &DatabaseConnection,
    actor: &user::Model,
    user_id: i32,
    name: &str,
    employee_id: &str,
    role: &str,
) -> Result<user::Model, ServiceError> {
    validate_role(role)?;

    let txn = db.begin().await?;

    let user = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    // Admins can rename themselves but never change their own role
    if user.id == actor.id && role != user.role {
        txn.rollback().await?;
        return Err(ServiceError::Conflict(
            "You cannot change your own role".to_string(),
        ));
    }

    // Demoting the last active admin would lock everyone out
    if user.role == ROLE_ADMIN && role == ROLE_USER && user.is_active {
        if count_active_admins(&txn).await? <= 1 {
            txn.rollback().await?;
            return Err(ServiceError::Conflict(
                "Cannot remove the last admin".to_string(),
            ));
        }
    }

    let collision = User::find()
        .filter(user::Column::EmployeeId.eq(employee_id))
        .filter(user::Column::Id.ne(user.id))
        .one(&txn)
        .await?;
    if collision.is_some() {
        txn.rollback().await?;
        return Err(ServiceError::Conflict(
            "Employee ID already exists".to_string(),
        ));
    }

    let mut active: user::ActiveModel = user.into();
    active.name = Set(name.to_string());
    active.employee_id = Set(employee_id.to_string());
    active.role = Set(role.to_string());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Self-service password change: current password must verify and the new
/// password must match its confirmation.
pub async fn change_own_password(
    db: &DatabaseConnection,
    actor: &user::Model,
    current_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), ServiceError> {
    let verified = verify_password(current_password, &actor.password_hash)
        .map_err(ServiceError::Database)?;
    if !verified {
        return Err(ServiceError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }

    if new_password.is_empty() {
        return Err(ServiceError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }
    if new_password != confirm_password {
        return Err(ServiceError::Validation(
            "New password and confirmation do not match".to_string(),
        ));
    }

    let password_hash =
        hash_password(new_password).map_err(ServiceError::Database)?;

    let mut active: user::ActiveModel = actor.clone().into();
    active.password_hash = Set(password_hash);
    active.update(db).await?;

    Ok(())
}

/// Self-service edit of name and employee id.
pub async fn update_own_profile(
    db: &DatabaseConnection,
    actor: &user::Model,
    name: &str,
    employee_id: &str,
) -> Result<user::Model, ServiceError> {
    if name.is_empty() || employee_id.is_empty() {
        return Err(ServiceError::Validation(
            "Name and employee ID are required".to_string(),
        ));
    }

    let collision = User::find()
        .filter(user::Column::EmployeeId.eq(employee_id))
        .filter(user::Column::Id.ne(actor.id))
        .one(db)
        .await?;
    if collision.is_some() {
        return Err(ServiceError::Conflict(
            "Employee ID already exists".to_string(),
        ));
    }

    let mut active: user::ActiveModel = actor.clone().into();
    active.name = Set(name.to_string());
    active.employee_id = Set(employee_id.to_string());

    Ok(active.update(db).await?)
}
