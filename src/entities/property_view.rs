//! Property view entity - One row per detail-page visit, used for analytics.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Page view database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property_views")]
pub struct Model {
    /// Unique identifier for the view event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property that was viewed
    pub property_id: String,
    /// Browser session, when known
    pub session_id: Option<String>,
    /// Client user agent, when known
    pub user_agent: Option<String>,
    /// When the page was viewed
    pub viewed_at: DateTimeUtc,
}

/// Defines relationships between `PropertyView` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each view belongs to one property
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
