pub mod auth;
pub mod components;
pub mod health;
pub mod profile;
pub mod reports;
pub mod requests;
pub mod returns;
pub mod users;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::services::ServiceError;
use crate::state::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_me))
        // Component catalog
        .route(
            "/components",
            get(components::list_components).post(components::add_component),
        )
        .route("/components/paged", get(components::browse_components))
        .route(
            "/components/:id",
            get(components::get_component).post(components::edit_component),
        )
        .route("/components/:id/delete", post(components::delete_component))
        // Borrow requests
        .route("/requests", post(requests::create_request))
        // Returns
        .route("/returns", get(returns::list_borrowed))
        .route("/returns/confirm", post(returns::confirm_return))
        // User administration
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/reset-password", post(users::reset_password))
        .route("/users/disable", post(users::disable_user))
        .route("/users/enable", post(users::enable_user))
        .route("/users/edit", post(users::edit_user))
        // Own account
        .route("/profile", post(profile::update_profile))
        .route("/profile/password", post(profile::change_password))
        // Reports
        .route("/reports/components.csv", get(reports::export_components))
        .route("/reports/transactions.csv", get(reports::export_transactions))
        .with_state(state)
}

/// Map a service failure onto a status code and a user-facing message.
pub(crate) fn error_response(err: ServiceError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Forbidden => StatusCode::FORBIDDEN,
        ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}
