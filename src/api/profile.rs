use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AdminUser;
use crate::services::user_service;
use crate::state::AppState;

use super::error_response;

// Profile self-service is admin-only for now, matching the rest of the
// administration surface.

#[derive(Deserialize)]
pub struct ChangePasswordPayload {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<ChangePasswordPayload>,
) -> impl IntoResponse {
    match user_service::change_own_password(
        &state.db,
        &admin,
        &payload.current_password,
        &payload.new_password,
        &payload.confirm_password,
    )
    .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Password updated successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct UpdateProfilePayload {
    pub name: String,
    pub employee_id: String,
}

pub async fn update_profile(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> impl IntoResponse {
    match user_service::update_own_profile(&state.db, &admin, &payload.name, &payload.employee_id)
        .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({ "user": user, "message": "Profile updated successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
