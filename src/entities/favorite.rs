//! Favorite entity - A user's bookmark on a property.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Favorite database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favorites")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who saved the property
    pub user_id: String,
    /// Saved property
    pub property_id: String,
    /// When the property was saved
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Favorite and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each favorite points at one property
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
