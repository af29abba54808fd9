use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{AdminUser, AuthUser};
use crate::services::component_service::{self, ComponentFilter, ComponentInput};
use crate::state::AppState;
use crate::utils::upload;

use super::error_response;

/// Stock management view: full filter set, unpaged.
pub async fn list_components(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(filter): Query<ComponentFilter>,
) -> impl IntoResponse {
    match component_service::list_components(&state.db, &filter).await {
        Ok(components) => {
            (StatusCode::OK, Json(json!({ "components": components }))).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct BrowseQuery {
    pub page: Option<u64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub part_no: Option<String>,
    pub rack: Option<String>,
}

/// Request browser: restricted filter set, 20 rows per page.
pub async fn browse_components(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(query): Query<BrowseQuery>,
) -> impl IntoResponse {
    let filter = ComponentFilter {
        category: query.category,
        description: query.description,
        part_no: query.part_no,
        rack: query.rack,
        ..Default::default()
    };
    let page = query.page.unwrap_or(1);

    match component_service::page_components(&state.db, &filter, page).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn get_component(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match component_service::get_component(&state.db, id).await {
        Ok(component) => (StatusCode::OK, Json(component)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

struct ComponentForm {
    input: ComponentInput,
    image: Option<(String, Bytes)>,
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

async fn parse_component_form(
    mut multipart: Multipart,
) -> Result<ComponentForm, (StatusCode, Json<Value>)> {
    let mut input = ComponentInput::default();
    let mut quantity: Option<i32> = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let filename = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| bad_request(&e.to_string()))?;
            // An empty file part means no image was picked
            if let Some(filename) = filename {
                if !data.is_empty() {
                    image = Some((filename, data));
                }
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| bad_request(&e.to_string()))?;

        match name.as_str() {
            "category" => input.category = text,
            "description" => input.description = text,
            "value" => input.value = non_empty(text),
            "size" => input.size = non_empty(text),
            "voltage" => input.voltage = non_empty(text),
            "watt" => input.watt = non_empty(text),
            "type" => input.kind = non_empty(text),
            "part_no" => input.part_no = text,
            "rack" => input.rack = non_empty(text),
            "location" => input.location = non_empty(text),
            "quantity" => {
                quantity = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| bad_request("Invalid quantity"))?,
                )
            }
            _ => {}
        }
    }

    input.quantity = quantity.ok_or_else(|| bad_request("Quantity is required"))?;

    Ok(ComponentForm { input, image })
}

pub async fn add_component(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    multipart: Multipart,
) -> impl IntoResponse {
    let form = match parse_component_form(multipart).await {
        Ok(form) => form,
        Err(reject) => return reject.into_response(),
    };

    // Field and duplicate checks before touching the filesystem
    if let Err(e) = component_service::validate_input(&form.input) {
        return error_response(e).into_response();
    }
    match component_service::part_no_taken(&state.db, &form.input.part_no, None).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "Part No already exists" })),
            )
                .into_response()
        }
        Ok(false) => {}
        Err(e) => return error_response(e).into_response(),
    }

    // The image is written before the row commits; a failed write aborts
    // the request so the database never references a missing file.
    let image_path = match &form.image {
        Some((original_name, data)) => {
            let filename = upload::image_filename(&form.input.part_no, original_name);
            match upload::save_image(&state.upload_dir, &filename, data) {
                Ok(path) => Some(path),
                Err(e) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": format!("Failed to store image: {}", e) })),
                    )
                        .into_response()
                }
            }
        }
        None => None,
    };

    match component_service::create_component(&state.db, form.input, image_path.clone()).await {
        Ok(component) => (
            StatusCode::CREATED,
            Json(json!({ "component": component, "message": "Component added" })),
        )
            .into_response(),
        Err(e) => {
            // The row was never created; take the orphan file back out
            if let Some(path) = &image_path {
                upload::delete_image(&state.upload_dir, path);
            }
            error_response(e).into_response()
        }
    }
}

pub async fn edit_component(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> impl IntoResponse {
    let form = match parse_component_form(multipart).await {
        Ok(form) => form,
        Err(reject) => return reject.into_response(),
    };

    let existing = match component_service::get_component(&state.db, id).await {
        Ok(component) => component,
        Err(e) => return error_response(e).into_response(),
    };

    // A form that will be rejected must not touch the image store
    if let Err(e) = component_service::validate_input(&form.input) {
        return error_response(e).into_response();
    }
    match component_service::part_no_taken(&state.db, &form.input.part_no, Some(id)).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "Part No already exists" })),
            )
                .into_response()
        }
        Ok(false) => {}
        Err(e) => return error_response(e).into_response(),
    }

    let image_path = match &form.image {
        Some((original_name, data)) => {
            let filename = upload::image_filename(&form.input.part_no, original_name);
            match upload::save_image(&state.upload_dir, &filename, data) {
                Ok(path) => Some(path),
                Err(e) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": format!("Failed to store image: {}", e) })),
                    )
                        .into_response()
                }
            }
        }
        None => None,
    };

    match component_service::update_component(&state.db, id, form.input, image_path.clone()).await {
        Ok(component) => {
            // The replaced file goes away only once the row points at the
            // new one. Same filename means the write above overwrote it.
            if let (Some(old), Some(new)) = (&existing.image_path, &image_path) {
                if old != new {
                    upload::delete_image(&state.upload_dir, old);
                }
            }
            (
                StatusCode::OK,
                Json(json!({ "component": component, "message": "Component updated" })),
            )
                .into_response()
        }
        Err(e) => {
            if let Some(new) = &image_path {
                if existing.image_path.as_deref() != Some(new.as_str()) {
                    upload::delete_image(&state.upload_dir, new);
                }
            }
            error_response(e).into_response()
        }
    }
}

pub async fn delete_component(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match component_service::delete_component(&state.db, id).await {
        Ok(component) => {
            if let Some(image_path) = &component.image_path {
                upload::delete_image(&state.upload_dir, image_path);
            }
            (StatusCode::OK, Json(json!({ "message": "Component deleted" }))).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}
