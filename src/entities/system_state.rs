//! System state entity - Stores key-value pairs that must survive restarts.
//! The comparison selection is persisted here under its storage key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// System state database model - stores key-value pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Storage key (e.g. `"comparison-properties"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Stored value, usually JSON
    pub value: String,
    /// When this value was last written
    pub updated_at: DateTimeUtc,
}

/// `SystemState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
