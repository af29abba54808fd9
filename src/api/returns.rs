use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::services::inventory_service;
use crate::state::AppState;

use super::error_response;

/// All outstanding borrows. Visibility is deliberately not scoped to the
/// requester; only the confirm action is ownership-gated.
pub async fn list_borrowed(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> impl IntoResponse {
    match inventory_service::list_borrowed(&state.db).await {
        Ok(items) => (StatusCode::OK, Json(json!({ "borrowed_items": items }))).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct ConfirmReturnPayload {
    pub request_id: i32,
    pub return_quantity: i32,
}

pub async fn confirm_return(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ConfirmReturnPayload>,
) -> impl IntoResponse {
    match inventory_service::confirm_return(
        &state.db,
        &user,
        payload.request_id,
        payload.return_quantity,
    )
    .await
    {
        Ok(request) => (
            StatusCode::OK,
            Json(json!({ "request": request, "message": "Return confirmed" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
