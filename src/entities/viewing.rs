//! Viewing schedule entity - Requests to visit a property on a given day.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Viewing request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "viewing_schedules")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property to be visited
    pub property_id: String,
    /// Visitor's name
    pub name: String,
    /// Visitor's email address
    pub email: String,
    /// Visitor's phone number
    pub phone: Option<String>,
    /// Requested day of the visit
    pub preferred_date: Date,
    /// Requested time slot, free text (e.g. `"10:00 AM"`)
    pub preferred_time: String,
    /// Optional note from the visitor
    pub message: Option<String>,
    /// `pending`, `confirmed`, `completed` or `cancelled`
    pub status: String,
    /// When the request was submitted
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Viewing and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each viewing request belongs to one property
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id",
        on_delete = "Cascade"
    )]
    Property,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
