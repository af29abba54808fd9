use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDateTime, Utc};
use serde_json::json;

use crate::auth::AdminUser;
use crate::services::component_service::{self, ComponentFilter};
use crate::services::inventory_service;
use crate::state::AppState;

use super::error_response;

/// Stored timestamps are second precision; reports show minutes.
fn short_date(ts: &str) -> String {
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| ts.to_string())
}

fn csv_response(filename: String, body: Vec<u8>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, "text/csv".parse().unwrap());
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", filename)
            .parse()
            .unwrap(),
    );
    (StatusCode::OK, headers, body)
}

fn csv_error(e: impl std::fmt::Display) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("Failed to build report: {}", e) })),
    )
        .into_response()
}

/// Full component inventory, ordered by (category, part_no).
pub async fn export_components(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> impl IntoResponse {
    let components =
        match component_service::list_components(&state.db, &ComponentFilter::default()).await {
            Ok(components) => components,
            Err(e) => return error_response(e).into_response(),
        };

    let mut writer = csv::Writer::from_writer(Vec::new());

    if let Err(e) = writer.write_record([
        "Category", "Description", "Value", "Size", "Voltage", "Watt", "Type", "Part No", "Rack",
        "Location", "Quantity", "Created At",
    ]) {
        return csv_error(e);
    }

    for c in components {
        let record = [
            c.category,
            c.description,
            c.value.unwrap_or_default(),
            c.size.unwrap_or_default(),
            c.voltage.unwrap_or_default(),
            c.watt.unwrap_or_default(),
            c.kind.unwrap_or_default(),
            c.part_no,
            c.rack.unwrap_or_default(),
            c.location.unwrap_or_default(),
            c.quantity.to_string(),
            short_date(&c.created_at),
        ];
        if let Err(e) = writer.write_record(&record) {
            return csv_error(e);
        }
    }

    let body = match writer.into_inner() {
        Ok(body) => body,
        Err(e) => return csv_error(e),
    };

    let filename = format!("components_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));
    csv_response(filename, body).into_response()
}

/// Complete borrow/return history, newest first.
pub async fn export_transactions(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> impl IntoResponse {
    let transactions = match inventory_service::list_transactions(&state.db).await {
        Ok(transactions) => transactions,
        Err(e) => return error_response(e).into_response(),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());

    if let Err(e) = writer.write_record([
        "Request ID", "Category", "Part No", "Description", "Borrowed By", "Employee ID",
        "Quantity", "Borrowed At", "Returned At", "Status",
    ]) {
        return csv_error(e);
    }

    for t in transactions {
        let record = [
            t.id.to_string(),
            t.category,
            t.part_no,
            t.description,
            t.borrowed_by,
            t.employee_id,
            t.quantity.to_string(),
            short_date(&t.requested_at),
            t.returned_at.as_deref().map(short_date).unwrap_or_default(),
            t.status,
        ];
        if let Err(e) = writer.write_record(&record) {
            return csv_error(e);
        }
    }

    let body = match writer.into_inner() {
        Ok(body) => body,
        Err(e) => return csv_error(e),
    };

    let filename = format!("transactions_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));
    csv_response(filename, body).into_response()
}
