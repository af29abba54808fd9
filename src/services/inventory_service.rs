//! Inventory state machine - stock check-out and return without the HTTP layer
//!
//! The two mutating commands run inside a database transaction and guard the
//! stock update with a conditional UPDATE, so concurrent borrowers can never
//! drive a component's quantity below zero and a return can never be credited
//! twice.

use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::collections::HashMap;

use super::{now_timestamp, ServiceError};
use crate::models::borrow_request::{self, Entity as BorrowRequest, STATUS_BORROWED, STATUS_RETURNED};
use crate::models::component::{self, Entity as Component};
use crate::models::user::{self, Entity as User};

/// Borrow request joined with its component and requester identity
#[derive(Debug, Clone, serde::Serialize)]
pub struct RequestWithDetails {
    pub id: i32,
    pub component_id: i32,
    pub user_id: i32,
    pub quantity: i32,
    pub status: String,
    pub requested_at: String,
    pub returned_at: Option<String>,
    pub remarks: Option<String>,
    pub category: String,
    pub part_no: String,
    pub description: String,
    pub borrowed_by: String,
    pub employee_id: String,
}

/// Take `quantity` units of a component out of stock and open a borrow
/// request for `user_id`.
pub async fn create_request(
    db: &DatabaseConnection,
    user_id: i32,
    component_id: i32,
    quantity: i32,
    remarks: Option<String>,
) -> Result<borrow_request::Model, ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::Validation(
            "Quantity must be greater than zero".to_string(),
        ));
    }

    let txn = db.begin().await?;

    // Guarded decrement: only succeeds when enough stock is available, so
    // two competing requests cannot both pass a stale check.
    let update = Component::update_many()
        .col_expr(
            component::Column::Quantity,
            Expr::col(component::Column::Quantity).sub(quantity),
        )
        .filter(component::Column::Id.eq(component_id))
        .filter(component::Column::Quantity.gte(quantity))
        .exec(&txn)
        .await?;

    if update.rows_affected == 0 {
        let exists = Component::find_by_id(component_id).one(&txn).await?;
        txn.rollback().await?;
        return Err(match exists {
            None => ServiceError::NotFound,
            Some(_) => ServiceError::Validation("Insufficient stock".to_string()),
        });
    }

    let request = borrow_request::ActiveModel {
        user_id: Set(user_id),
        component_id: Set(component_id),
        quantity: Set(quantity),
        status: Set(STATUS_BORROWED.to_owned()),
        requested_at: Set(now_timestamp()),
        returned_at: Set(None),
        remarks: Set(remarks),
        ..Default::default()
    };

    let saved = request.insert(&txn).await?;
    txn.commit().await?;

    Ok(saved)
}

/// Close a borrow request and credit the stock back.
///
/// `return_quantity` is validated against the borrowed amount but only a
/// full return is accepted: the previous behavior of closing the request
/// while crediting a smaller amount silently lost stock.
pub async fn confirm_return(
    db: &DatabaseConnection,
    actor: &user::Model,
    request_id: i32,
    return_quantity: i32,
) -> Result<borrow_request::Model, ServiceError> {
    let txn = db.begin().await?;

    let request = BorrowRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    // Only the borrower or an admin may confirm
    if !actor.is_admin() && request.user_id != actor.id {
        txn.rollback().await?;
        return Err(ServiceError::Forbidden);
    }

    if return_quantity <= 0 {
        txn.rollback().await?;
        return Err(ServiceError::Validation(
            "Invalid return quantity".to_string(),
        ));
    }
    if return_quantity > request.quantity {
        txn.rollback().await?;
        return Err(ServiceError::Validation(
            "Return quantity exceeds borrowed quantity".to_string(),
        ));
    }
    if return_quantity < request.quantity {
        txn.rollback().await?;
        return Err(ServiceError::Validation(
            "Partial returns are not supported".to_string(),
        ));
    }

    let returned_at = now_timestamp();

    // Guarded status flip: a request that is already returned matches zero
    // rows, so stock can never be credited twice.
    let flip = BorrowRequest::update_many()
        .col_expr(
            borrow_request::Column::Status,
            Expr::value(STATUS_RETURNED),
        )
        .col_expr(
            borrow_request::Column::ReturnedAt,
            Expr::value(returned_at.clone()),
        )
        .filter(borrow_request::Column::Id.eq(request_id))
        .filter(borrow_request::Column::Status.eq(STATUS_BORROWED))
        .exec(&txn)
        .await?;

    if flip.rows_affected == 0 {
        txn.rollback().await?;
        return Err(ServiceError::Conflict("Request already returned".to_string()));
    }

    let credit = Component::update_many()
        .col_expr(
            component::Column::Quantity,
            Expr::col(component::Column::Quantity).add(return_quantity),
        )
        .filter(component::Column::Id.eq(request.component_id))
        .exec(&txn)
        .await?;

    if credit.rows_affected == 0 {
        txn.rollback().await?;
        return Err(ServiceError::NotFound);
    }

    txn.commit().await?;

    Ok(borrow_request::Model {
        status: STATUS_RETURNED.to_owned(),
        returned_at: Some(returned_at),
        ..request
    })
}

/// All outstanding borrows with component and requester info, newest first.
pub async fn list_borrowed(
    db: &DatabaseConnection,
) -> Result<Vec<RequestWithDetails>, ServiceError> {
    list_with_details(db, Some(STATUS_BORROWED)).await
}

/// Full transaction history, newest first. Used by the export report.
pub async fn list_transactions(
    db: &DatabaseConnection,
) -> Result<Vec<RequestWithDetails>, ServiceError> {
    list_with_details(db, None).await
}

async fn list_with_details(
    db: &DatabaseConnection,
    status: Option<&str>,
) -> Result<Vec<RequestWithDetails>, ServiceError> {
    let mut query = BorrowRequest::find();
    if let Some(status) = status {
        query = query.filter(borrow_request::Column::Status.eq(status));
    }

    let requests_with_components = query
        .order_by_desc(borrow_request::Column::RequestedAt)
        .find_also_related(Component)
        .all(db)
        .await?;

    // Fetch requester identities in one go
    let user_ids: Vec<i32> = requests_with_components
        .iter()
        .map(|(r, _)| r.user_id)
        .collect();

    let mut user_map: HashMap<i32, user::Model> = HashMap::new();
    if !user_ids.is_empty() {
        let users = User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?;
        for u in users {
            user_map.insert(u.id, u);
        }
    }

    let result = requests_with_components
        .into_iter()
        .map(|(request, component)| {
            let requester = user_map.get(&request.user_id);
            RequestWithDetails {
                id: request.id,
                component_id: request.component_id,
                user_id: request.user_id,
                quantity: request.quantity,
                status: request.status,
                requested_at: request.requested_at,
                returned_at: request.returned_at,
                remarks: request.remarks,
                category: component
                    .as_ref()
                    .map(|c| c.category.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                part_no: component
                    .as_ref()
                    .map(|c| c.part_no.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                description: component
                    .map(|c| c.description)
                    .unwrap_or_else(|| "Unknown".to_string()),
                borrowed_by: requester
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                employee_id: requester
                    .map(|u| u.employee_id.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
            }
        })
        .collect();

    Ok(result)
}
