use sea_orm::DatabaseConnection;

use stockroom::db;
use stockroom::services::component_service::{self, ComponentFilter, ComponentInput};
use stockroom::services::{inventory_service, user_service, ServiceError};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn input(category: &str, description: &str, part_no: &str, quantity: i32) -> ComponentInput {
    ComponentInput {
        category: category.to_string(),
        description: description.to_string(),
        part_no: part_no.to_string(),
        quantity,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_filters_are_case_insensitive_substrings() {
    let db = setup_test_db().await;
    component_service::create_component(&db, input("Resistor", "1k metal film", "R-1", 10), None)
        .await
        .unwrap();
    component_service::create_component(&db, input("Capacitor", "100nF X7R", "C-1", 10), None)
        .await
        .unwrap();

    let filter = ComponentFilter {
        category: Some("resis".to_string()),
        ..Default::default()
    };
    let found = component_service::list_components(&db, &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].part_no, "R-1");

    // Empty strings add no constraint
    let filter = ComponentFilter {
        category: Some(String::new()),
        ..Default::default()
    };
    let found = component_service::list_components(&db, &filter).await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn test_filters_intersect() {
    let db = setup_test_db().await;
    let mut a = input("Resistor", "1k metal film", "R-1", 10);
    a.rack = Some("A3".to_string());
    let mut b = input("Resistor", "10k metal film", "R-2", 10);
    b.rack = Some("B1".to_string());
    component_service::create_component(&db, a, None).await.unwrap();
    component_service::create_component(&db, b, None).await.unwrap();

    let filter = ComponentFilter {
        category: Some("resistor".to_string()),
        rack: Some("a3".to_string()),
        ..Default::default()
    };
    let found = component_service::list_components(&db, &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].part_no, "R-1");
}

#[tokio::test]
async fn test_listing_is_ordered_by_category_then_part_no() {
    let db = setup_test_db().await;
    component_service::create_component(&db, input("Resistor", "desc", "R-2", 1), None)
        .await
        .unwrap();
    component_service::create_component(&db, input("Capacitor", "desc", "C-1", 1), None)
        .await
        .unwrap();
    component_service::create_component(&db, input("Resistor", "desc", "R-1", 1), None)
        .await
        .unwrap();

    let found = component_service::list_components(&db, &ComponentFilter::default())
        .await
        .unwrap();
    let part_nos: Vec<&str> = found.iter().map(|c| c.part_no.as_str()).collect();
    assert_eq!(part_nos, ["C-1", "R-1", "R-2"]);
}

#[tokio::test]
async fn test_pagination_clamps_page_number() {
    let db = setup_test_db().await;
    for i in 0..25 {
        component_service::create_component(
            &db,
            input("Resistor", "desc", &format!("R-{:03}", i), 1),
            None,
        )
        .await
        .unwrap();
    }

    let filter = ComponentFilter::default();

    let first = component_service::page_components(&db, &filter, 1).await.unwrap();
    assert_eq!(first.page, 1);
    assert_eq!(first.total, 25);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.components.len(), 20);

    // Out-of-range pages clamp instead of erroring
    let high = component_service::page_components(&db, &filter, 99).await.unwrap();
    assert_eq!(high.page, 2);
    assert_eq!(high.components.len(), 5);

    let low = component_service::page_components(&db, &filter, 0).await.unwrap();
    assert_eq!(low.page, 1);
    assert_eq!(low.components.len(), 20);
}

#[tokio::test]
async fn test_empty_catalog_pages_to_one_empty_page() {
    let db = setup_test_db().await;
    let page = component_service::page_components(&db, &ComponentFilter::default(), 1)
        .await
        .unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
    assert!(page.components.is_empty());
}

#[tokio::test]
async fn test_duplicate_part_no_rejected() {
    let db = setup_test_db().await;
    let existing = component_service::create_component(&db, input("Resistor", "desc", "R-1", 1), None)
        .await
        .unwrap();
    let other = component_service::create_component(&db, input("Resistor", "desc", "R-2", 1), None)
        .await
        .unwrap();

    let err = component_service::create_component(&db, input("Resistor", "desc", "R-1", 1), None)
        .await
        .expect_err("Duplicate part no must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));

    // Updating onto a taken part no fails as well
    let err =
        component_service::update_component(&db, other.id, input("Resistor", "desc", "R-1", 1), None)
            .await
            .expect_err("Update onto taken part no must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));

    // Keeping your own part no on update is fine
    let updated = component_service::update_component(
        &db,
        existing.id,
        input("Resistor", "new description", "R-1", 4),
        None,
    )
    .await
    .expect("Update should succeed");
    assert_eq!(updated.description, "new description");
    assert_eq!(updated.quantity, 4);
}

#[tokio::test]
async fn test_required_fields_validated() {
    let db = setup_test_db().await;

    let err = component_service::create_component(&db, input("", "desc", "R-1", 1), None)
        .await
        .expect_err("Missing category must fail");
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = component_service::create_component(&db, input("Resistor", "desc", "R-1", -1), None)
        .await
        .expect_err("Negative quantity must fail");
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_delete_blocked_by_borrow_history() {
    let db = setup_test_db().await;
    let user = user_service::create_user(&db, "Alice", "E001", "user", "password123")
        .await
        .unwrap();
    let component = component_service::create_component(&db, input("Resistor", "desc", "R-1", 10), None)
        .await
        .unwrap();

    let request = inventory_service::create_request(&db, user.id, component.id, 2, None)
        .await
        .unwrap();

    let err = component_service::delete_component(&db, component.id)
        .await
        .expect_err("Delete with open history must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));

    // Even a fully returned request keeps the component pinned
    inventory_service::confirm_return(&db, &user, request.id, 2)
        .await
        .unwrap();
    let err = component_service::delete_component(&db, component.id)
        .await
        .expect_err("Delete with closed history must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));

    // A component with no history goes away cleanly
    let fresh = component_service::create_component(&db, input("Resistor", "desc", "R-2", 1), None)
        .await
        .unwrap();
    component_service::delete_component(&db, fresh.id)
        .await
        .expect("Delete without history should succeed");
    assert!(matches!(
        component_service::get_component(&db, fresh.id).await,
        Err(ServiceError::NotFound)
    ));
}
