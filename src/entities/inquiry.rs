//! Contact inquiry entity - Messages sent to the listing owner from a property page.
//!
//! `status` moves through `new`, `contacted` and `closed` as an admin works the inquiry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contact inquiry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_inquiries")]
pub struct Model {
    /// Unique identifier for the inquiry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property the inquiry is about
    pub property_id: String,
    /// Sender's name
    pub name: String,
    /// Sender's email address
    pub email: String,
    /// Sender's phone number
    pub phone: Option<String>,
    /// Free-form message
    pub message: String,
    /// `new`, `contacted` or `closed`
    pub status: String,
    /// When the inquiry was submitted
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Inquiry and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each inquiry belongs to one property
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
