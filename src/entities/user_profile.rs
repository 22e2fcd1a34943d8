//! User profile entity - Account metadata and subscription tier.
//!
//! Authentication lives with the identity provider; this table only keeps what the listing
//! service needs to gate features (`free`, `premium`, `admin`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    /// Identity-provider user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Contact email
    pub email: String,
    /// `free`, `premium` or `admin`
    pub subscription_tier: String,
    /// `active`, `cancelled` or `none`
    pub subscription_status: String,
    /// Start of the current paid period
    pub subscription_started_at: Option<DateTimeUtc>,
    /// End of the current paid period
    pub subscription_expires_at: Option<DateTimeUtc>,
    /// When the profile was created
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

/// `UserProfile` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
