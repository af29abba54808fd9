//! Catalog queries and admin-side component management

use sea_orm::*;

use super::{now_timestamp, ServiceError};
use crate::models::borrow_request::{self, Entity as BorrowRequest};
use crate::models::component::{self, Entity as Component};

pub const PAGE_SIZE: u64 = 20;

/// Substring filters for the catalog. Absent fields add no constraint;
/// matching is case-insensitive (SQLite LIKE).
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct ComponentFilter {
    pub category: Option<String>,
    pub description: Option<String>,
    pub value: Option<String>,
    pub size: Option<String>,
    pub voltage: Option<String>,
    pub watt: Option<String>,
    pub part_no: Option<String>,
    pub rack: Option<String>,
    pub location: Option<String>,
}

impl ComponentFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        let clauses = [
            (&self.category, component::Column::Category),
            (&self.description, component::Column::Description),
            (&self.value, component::Column::Value),
            (&self.size, component::Column::Size),
            (&self.voltage, component::Column::Voltage),
            (&self.watt, component::Column::Watt),
            (&self.part_no, component::Column::PartNo),
            (&self.rack, component::Column::Rack),
            (&self.location, component::Column::Location),
        ];

        for (term, column) in clauses {
            if let Some(term) = term {
                if !term.is_empty() {
                    condition = condition.add(column.contains(term));
                }
            }
        }

        condition
    }
}

/// One page of the catalog plus paging metadata
#[derive(Debug, serde::Serialize)]
pub struct ComponentPage {
    pub components: Vec<component::Model>,
    pub page: u64,
    pub total_pages: u64,
    pub total: u64,
}

/// Unpaged filtered listing (stock management view)
pub async fn list_components(
    db: &DatabaseConnection,
    filter: &ComponentFilter,
) -> Result<Vec<component::Model>, ServiceError> {
    let components = Component::find()
        .filter(filter.condition())
        .order_by_asc(component::Column::Category)
        .order_by_asc(component::Column::PartNo)
        .all(db)
        .await?;
    Ok(components)
}

/// Paged listing for the request browser. The page number is clamped into
/// `[1, total_pages]`; total_pages is never below 1.
pub async fn page_components(
    db: &DatabaseConnection,
    filter: &ComponentFilter,
    page: u64,
) -> Result<ComponentPage, ServiceError> {
    let paginator = Component::find()
        .filter(filter.condition())
        .order_by_asc(component::Column::Category)
        .order_by_asc(component::Column::PartNo)
        .paginate(db, PAGE_SIZE);

    let total = paginator.num_items().await?;
    let total_pages = paginator.num_pages().await?.max(1);
    let page = page.clamp(1, total_pages);

    let components = paginator.fetch_page(page - 1).await?;

    Ok(ComponentPage {
        components,
        page,
        total_pages,
        total,
    })
}

pub async fn get_component(
    db: &DatabaseConnection,
    id: i32,
) -> Result<component::Model, ServiceError> {
    Component::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)
}

#[derive(Debug, Default, Clone)]
pub struct ComponentInput {
    pub category: String,
    pub description: String,
    pub value: Option<String>,
    pub size: Option<String>,
    pub voltage: Option<String>,
    pub watt: Option<String>,
    pub kind: Option<String>,
    pub part_no: String,
    pub rack: Option<String>,
    pub location: Option<String>,
    pub quantity: i32,
}

/// Field validation shared with the HTTP layer, which must reject a bad
/// form before it touches the image store.
pub fn validate_input(input: &ComponentInput) -> Result<(), ServiceError> {
    if input.category.is_empty() || input.description.is_empty() || input.part_no.is_empty() {
        return Err(ServiceError::Validation(
            "Category, description and part number are required".to_string(),
        ));
    }
    if input.quantity < 0 {
        return Err(ServiceError::Validation(
            "Quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}

pub async fn part_no_taken(
    db: &DatabaseConnection,
    part_no: &str,
    exclude_id: Option<i32>,
) -> Result<bool, ServiceError> {
    let mut query = Component::find().filter(component::Column::PartNo.eq(part_no));
    if let Some(id) = exclude_id {
        query = query.filter(component::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

pub async fn create_component(
    db: &DatabaseConnection,
    input: ComponentInput,
    image_path: Option<String>,
) -> Result<component::Model, ServiceError> {
    validate_input(&input)?;

    if part_no_taken(db, &input.part_no, None).await? {
        return Err(ServiceError::Conflict("Part No already exists".to_string()));
    }

    let component = component::ActiveModel {
        category: Set(input.category),
        description: Set(input.description),
        value: Set(input.value),
        size: Set(input.size),
        voltage: Set(input.voltage),
        watt: Set(input.watt),
        kind: Set(input.kind),
        part_no: Set(input.part_no),
        rack: Set(input.rack),
        location: Set(input.location),
        quantity: Set(input.quantity),
        image_path: Set(image_path),
        created_at: Set(now_timestamp()),
        ..Default::default()
    };

    Ok(component.insert(db).await?)
}

/// Authoritative admin edit of every field including quantity. When
/// `image_path` is Some the stored path is replaced as well.
pub async fn update_component(
    db: &DatabaseConnection,
    id: i32,
    input: ComponentInput,
    image_path: Option<String>,
) -> Result<component::Model, ServiceError> {
    validate_input(&input)?;

    let existing = get_component(db, id).await?;

    if part_no_taken(db, &input.part_no, Some(id)).await? {
        return Err(ServiceError::Conflict("Part No already exists".to_string()));
    }

    let mut active: component::ActiveModel = existing.into();
    active.category = Set(input.category);
    active.description = Set(input.description);
    active.value = Set(input.value);
    active.size = Set(input.size);
    active.voltage = Set(input.voltage);
    active.watt = Set(input.watt);
    active.kind = Set(input.kind);
    active.part_no = Set(input.part_no);
    active.rack = Set(input.rack);
    active.location = Set(input.location);
    active.quantity = Set(input.quantity);
    if let Some(path) = image_path {
        active.image_path = Set(Some(path));
    }

    Ok(active.update(db).await?)
}

/// Delete a component. Refused while any borrow request references it so the
/// transaction history never points at a missing part.
pub async fn delete_component(
    db: &DatabaseConnection,
    id: i32,
) -> Result<component::Model, ServiceError> {
    let component = get_component(db, id).await?;

    let references = BorrowRequest::find()
        .filter(borrow_request::Column::ComponentId.eq(id))
        .count(db)
        .await?;

    if references > 0 {
        return Err(ServiceError::Conflict(
            "Component has borrow history and cannot be deleted".to_string(),
        ));
    }

    component.clone().delete(db).await?;
    Ok(component)
}
