use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "components")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub category: String,
    pub description: String,
    pub value: Option<String>,
    pub size: Option<String>,
    pub voltage: Option<String>,
    pub watt: Option<String>,
    /// Component type (resistor, capacitor, ...). Column stays `type`;
    /// the field is renamed because `type` is a Rust keyword.
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub part_no: String,
    pub rack: Option<String>,
    pub location: Option<String>,
    /// Units currently on the shelf. Mutated only by the borrow/return
    /// state machine or a direct admin edit. Never negative.
    pub quantity: i32,
    pub image_path: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::borrow_request::Entity")]
    BorrowRequest,
}

impl Related<super::borrow_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BorrowRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
