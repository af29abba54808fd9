use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::services::inventory_service;
use crate::state::AppState;

use super::error_response;

#[derive(Deserialize)]
pub struct CreateRequestPayload {
    pub component_id: i32,
    pub quantity: i32,
    pub remarks: Option<String>,
}

pub async fn create_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateRequestPayload>,
) -> impl IntoResponse {
    match inventory_service::create_request(
        &state.db,
        user.id,
        payload.component_id,
        payload.quantity,
        payload.remarks,
    )
    .await
    {
        Ok(request) => (
            StatusCode::CREATED,
            Json(json!({ "request": request, "message": "Request created successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
