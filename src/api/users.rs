use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AdminUser;
use crate::services::user_service;
use crate::state::AppState;

use super::error_response;

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> impl IntoResponse {
    match user_service::list_users(&state.db).await {
        Ok(users) => (StatusCode::OK, Json(json!({ "users": users }))).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct CreateUserPayload {
    pub name: String,
    pub employee_id: String,
    pub role: String,
    pub password: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateUserPayload>,
) -> impl IntoResponse {
    match user_service::create_user(
        &state.db,
        &payload.name,
        &payload.employee_id,
        &payload.role,
        &payload.password,
    )
    .await
    {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({ "user": user, "message": "User created" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct ResetPasswordPayload {
    pub user_id: i32,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<ResetPasswordPayload>,
) -> impl IntoResponse {
    match user_service::reset_password(&state.db, payload.user_id, &payload.new_password).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Password reset" }))).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct UserIdPayload {
    pub user_id: i32,
}

pub async fn disable_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<UserIdPayload>,
) -> impl IntoResponse {
    match user_service::set_active(&state.db, &admin, payload.user_id, false).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "User disabled" }))).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn enable_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<UserIdPayload>,
) -> impl IntoResponse {
    match user_service::set_active(&state.db, &admin, payload.user_id, true).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "User enabled" }))).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct EditUserPayload {
    pub user_id: i32,
    pub name: String,
    pub employee_id: String,
    pub role: String,
}

pub async fn edit_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<EditUserPayload>,
) -> impl IntoResponse {
    match user_service::edit_user(
        &state.db,
        &admin,
        payload.user_id,
        &payload.name,
        &payload.employee_id,
        &payload.role,
    )
    .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({ "user": user, "message": "User updated successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
