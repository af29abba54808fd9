use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{session_token, verify_password, AuthUser, SESSION_COOKIE};
use crate::services::user_service;
use crate::session;
use crate::state::AppState;

use super::error_response;

#[derive(Deserialize)]
pub struct LoginRequest {
    employee_id: String,
    password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for employee: {}", payload.employee_id);

    let user = match user_service::find_by_employee_id(&state.db, &payload.employee_id).await {
        Ok(user) => user,
        Err(e) => return error_response(e).into_response(),
    };

    // Unknown employee id and wrong password produce the same message
    let verified = user
        .as_ref()
        .map(|u| verify_password(&payload.password, &u.password_hash).unwrap_or(false))
        .unwrap_or(false);

    let Some(user) = user.filter(|_| verified) else {
        tracing::warn!(
            "Failed login for employee: {}",
            payload.employee_id
        );
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid employee ID or password" })),
        )
            .into_response();
    };

    if !user.is_active {
        tracing::warn!("Login rejected for disabled account: {}", user.employee_id);
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Your account is disabled. Please contact an administrator." })),
        )
            .into_response();
    }

    let token = session::new_token();
    state.sessions.insert(&token, user.id).await;

    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, token
    );
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie.parse().unwrap());

    tracing::info!("Session established for employee: {}", user.employee_id);
    (StatusCode::OK, headers, Json(json!({ "user": user }))).into_response()
}

pub async fn logout(State(state): State<AppState>, req_headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&req_headers) {
        state.sessions.remove(&token).await;
    }

    let clear = format!("{}=; Max-Age=0; HttpOnly; Path=/", SESSION_COOKIE);
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, clear.parse().unwrap());

    (StatusCode::OK, headers, Json(json!({ "message": "Logged out" })))
}

pub async fn get_me(AuthUser(user): AuthUser) -> impl IntoResponse {
    (StatusCode::OK, Json(user))
}
