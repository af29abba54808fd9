use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use stockroom::api;
use stockroom::db;
use stockroom::services::component_service::{self, ComponentInput};
use stockroom::services::{inventory_service, user_service};
use stockroom::state::AppState;

async fn setup_app() -> (Router, DatabaseConnection, std::path::PathBuf) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let upload_dir =
        std::env::temp_dir().join(format!("stockroom-test-uploads-{}", uuid::Uuid::new_v4()));
    let state = AppState::new(db.clone(), upload_dir.clone());
    (api::api_router(state), db, upload_dir)
}

async fn create_test_user(db: &DatabaseConnection, employee_id: &str, role: &str) {
    user_service::create_user(db, "Test User", employee_id, role, "password123")
        .await
        .expect("Failed to create user");
}

async fn create_test_component(db: &DatabaseConnection, part_no: &str, quantity: i32) -> i32 {
    let input = ComponentInput {
        category: "Resistor".to_string(),
        description: "1k metal film".to_string(),
        part_no: part_no.to_string(),
        quantity,
        ..Default::default()
    };
    component_service::create_component(db, input, None)
        .await
        .expect("Failed to create component")
        .id
}

/// Log in and return the session cookie (the `name=value` pair).
async fn login(app: &Router, employee_id: &str, password: &str) -> String {
    let payload = json!({ "employee_id": employee_id, "password": password });
    let req = Request::builder()
        .uri("/auth/login")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Login must set a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> axum::response::Response {
    let req = Request::builder()
        .uri(uri)
        .method("GET")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_login_and_me_round_trip() {
    let (app, db, _upload_dir) = setup_app().await;
    create_test_user(&db, "E001", "user").await;

    let cookie = login(&app, "E001", "password123").await;
    assert!(cookie.starts_with("stockroom_session="));

    let response = get_with_cookie(&app, "/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    let me = body_json(response).await;
    assert_eq!(me["employee_id"], "E001");
    // The hash must never leave the server
    assert!(me.get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let (app, db, _upload_dir) = setup_app().await;
    create_test_user(&db, "E001", "user").await;

    for payload in [
        json!({ "employee_id": "E001", "password": "wrong" }),
        json!({ "employee_id": "ghost", "password": "password123" }),
    ] {
        let req = Request::builder()
            .uri("/auth/login")
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload).unwrap()))
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid employee ID or password");
    }
}

#[tokio::test]
async fn test_disabled_account_cannot_log_in() {
    let (app, db, _upload_dir) = setup_app().await;
    create_test_user(&db, "A001", "admin").await;
    create_test_user(&db, "E001", "user").await;

    let admin = user_service::find_by_employee_id(&db, "A001")
        .await
        .unwrap()
        .unwrap();
    let user = user_service::find_by_employee_id(&db, "E001")
        .await
        .unwrap()
        .unwrap();
    user_service::set_active(&db, &admin, user.id, false)
        .await
        .unwrap();

    let payload = json!({ "employee_id": "E001", "password": "password123" });
    let req = Request::builder()
        .uri("/auth/login")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_endpoints_require_session() {
    let (app, _db, _upload_dir) = setup_app().await;

    for uri in ["/returns", "/users", "/components", "/auth/me"] {
        let req = Request::builder()
            .uri(uri)
            .method("GET")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_admin_endpoints_reject_regular_users() {
    let (app, db, _upload_dir) = setup_app().await;
    create_test_user(&db, "A001", "admin").await;
    create_test_user(&db, "E001", "user").await;

    let user_cookie = login(&app, "E001", "password123").await;
    let admin_cookie = login(&app, "A001", "password123").await;

    for uri in ["/users", "/reports/components.csv", "/reports/transactions.csv"] {
        let response = get_with_cookie(&app, uri, &user_cookie).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);

        let response = get_with_cookie(&app, uri, &admin_cookie).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    // The catalog itself is open to every logged-in user
    let response = get_with_cookie(&app, "/components", &user_cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let (app, db, _upload_dir) = setup_app().await;
    create_test_user(&db, "E001", "user").await;

    let cookie = login(&app, "E001", "password123").await;

    let req = Request::builder()
        .uri("/auth/logout")
        .method("POST")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_with_cookie(&app, "/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_borrow_and_return_over_http() {
    let (app, db, _upload_dir) = setup_app().await;
    create_test_user(&db, "E001", "user").await;
    let component_id = create_test_component(&db, "R-1001", 50).await;

    let cookie = login(&app, "E001", "password123").await;

    let payload = json!({ "component_id": component_id, "quantity": 10 });
    let req = Request::builder()
        .uri("/requests")
        .method("POST")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let request_id = body["request"]["id"].as_i64().unwrap();

    let response = get_with_cookie(&app, "/returns", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["borrowed_items"].as_array().unwrap().len(), 1);

    let payload = json!({ "request_id": request_id, "return_quantity": 10 });
    let req = Request::builder()
        .uri("/returns/confirm")
        .method("POST")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stock = component_service::get_component(&db, component_id)
        .await
        .unwrap();
    assert_eq!(stock.quantity, 50);
}

#[tokio::test]
async fn test_transactions_export_shape() {
    let (app, db, _upload_dir) = setup_app().await;
    create_test_user(&db, "A001", "admin").await;
    let component_id = create_test_component(&db, "R-1001", 20).await;

    let admin = user_service::find_by_employee_id(&db, "A001")
        .await
        .unwrap()
        .unwrap();
    inventory_service::create_request(&db, admin.id, component_id, 3, None)
        .await
        .unwrap();

    let cookie = login(&app, "A001", "password123").await;
    let response = get_with_cookie(&app, "/reports/transactions.csv", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(content_type, "text/csv");

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"transactions_"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "Request ID,Category,Part No,Description,Borrowed By,Employee ID,Quantity,Borrowed At,Returned At,Status"
    );

    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields[1], "Resistor");
    assert_eq!(fields[2], "R-1001");
    assert_eq!(fields[6], "3");
    // Dates render as YYYY-MM-DD HH:MM
    assert_eq!(fields[7].len(), 16);
    assert_eq!(fields[8], "");
    assert_eq!(fields[9], "borrowed");
}

#[tokio::test]
async fn test_components_export_shape() {
    let (app, db, _upload_dir) = setup_app().await;
    create_test_user(&db, "A001", "admin").await;
    create_test_component(&db, "R-1001", 20).await;

    let cookie = login(&app, "A001", "password123").await;
    let response = get_with_cookie(&app, "/reports/components.csv", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(content_type, "text/csv");

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"components_"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "Category,Description,Value,Size,Voltage,Watt,Type,Part No,Rack,Location,Quantity,Created At"
    );

    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields[0], "Resistor");
    assert_eq!(fields[1], "1k metal film");
    assert_eq!(fields[7], "R-1001");
    assert_eq!(fields[10], "20");
    // Dates render as YYYY-MM-DD HH:MM
    assert_eq!(fields[11].len(), 16);
}

/// Build a multipart form body the way a browser would.
fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let boundary = "stockroom-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                boundary, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    (
        format!("multipart/form-data; boundary={}", boundary),
        body,
    )
}

async fn post_component_form(
    app: &Router,
    uri: &str,
    cookie: &str,
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> axum::response::Response {
    let (content_type, body) = multipart_body(fields, image);
    let req = Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

#[tokio::test]
async fn test_rejected_edit_keeps_referenced_image() {
    let (app, db, upload_dir) = setup_app().await;
    create_test_user(&db, "A001", "admin").await;

    let input = ComponentInput {
        category: "Resistor".to_string(),
        description: "1k metal film".to_string(),
        part_no: "R-1".to_string(),
        quantity: 5,
        ..Default::default()
    };
    let component = component_service::create_component(
        &db,
        input,
        Some("uploads/components/R-1.png".to_string()),
    )
    .await
    .unwrap();
    std::fs::create_dir_all(&upload_dir).unwrap();
    std::fs::write(upload_dir.join("R-1.png"), b"old-image").unwrap();

    let cookie = login(&app, "A001", "password123").await;

    // Empty category fails validation; the stored file must survive and no
    // new file may appear.
    let response = post_component_form(
        &app,
        &format!("/components/{}", component.id),
        &cookie,
        &[
            ("category", ""),
            ("description", "1k metal film"),
            ("part_no", "R-2"),
            ("quantity", "5"),
        ],
        Some(("new.png", b"new-image")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(upload_dir.join("R-1.png").exists());
    assert!(!upload_dir.join("R-2.png").exists());
    let stored = component_service::get_component(&db, component.id)
        .await
        .unwrap();
    assert_eq!(stored.image_path.as_deref(), Some("uploads/components/R-1.png"));

    let _ = std::fs::remove_dir_all(&upload_dir);
}

#[tokio::test]
async fn test_edit_replaces_image_only_after_update() {
    let (app, db, upload_dir) = setup_app().await;
    create_test_user(&db, "A001", "admin").await;

    let input = ComponentInput {
        category: "Resistor".to_string(),
        description: "1k metal film".to_string(),
        part_no: "R-1".to_string(),
        quantity: 5,
        ..Default::default()
    };
    let component = component_service::create_component(
        &db,
        input,
        Some("uploads/components/R-1.png".to_string()),
    )
    .await
    .unwrap();
    std::fs::create_dir_all(&upload_dir).unwrap();
    std::fs::write(upload_dir.join("R-1.png"), b"old-image").unwrap();

    let cookie = login(&app, "A001", "password123").await;

    let response = post_component_form(
        &app,
        &format!("/components/{}", component.id),
        &cookie,
        &[
            ("category", "Resistor"),
            ("description", "1k metal film"),
            ("part_no", "R-2"),
            ("quantity", "5"),
        ],
        Some(("new.png", b"new-image")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(upload_dir.join("R-2.png").exists());
    assert!(!upload_dir.join("R-1.png").exists());
    let stored = component_service::get_component(&db, component.id)
        .await
        .unwrap();
    assert_eq!(stored.image_path.as_deref(), Some("uploads/components/R-2.png"));

    let _ = std::fs::remove_dir_all(&upload_dir);
}
