//! Property entity - One row per listing.
//!
//! Enum-like columns (`property_type`, `listing_type`, `status`) are stored as lowercase
//! strings and the image list as a JSON array. Rows are validated into
//! [`crate::models::Property`] before the rest of the crate sees them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    /// Opaque unique identifier (uuid v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// When the listing was created
    pub created_at: DateTimeUtc,
    /// When the listing was last edited
    pub updated_at: DateTimeUtc,
    /// Listing headline
    pub title: String,
    /// Localized (Amharic) headline
    pub title_am: Option<String>,
    /// Long description
    pub description: String,
    /// Localized (Amharic) description
    pub description_am: Option<String>,
    /// Asking price or monthly rent
    pub price: f64,
    /// `house`, `apartment`, `commercial` or `land`
    pub property_type: String,
    /// `sale` or `rent`
    pub listing_type: String,
    /// Number of bedrooms, if applicable
    pub bedrooms: Option<i32>,
    /// Number of bathrooms, if applicable
    pub bathrooms: Option<i32>,
    /// Floor or plot area in square meters
    pub area_sqm: Option<f64>,
    /// Street address or neighbourhood
    pub address: String,
    /// City name
    pub city: String,
    /// Region name
    pub region: String,
    /// Latitude, paired with `longitude`
    pub latitude: Option<f64>,
    /// Longitude, paired with `latitude`
    pub longitude: Option<f64>,
    /// JSON array of image URLs
    pub images: Json,
    /// Promoted listing
    pub featured: bool,
    /// `active`, `pending`, `sold` or `rented`
    pub status: String,
    /// Account that created the listing
    pub owner_id: Option<String>,
}

/// Defines relationships between Property and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One property has many recorded page views
    #[sea_orm(has_many = "super::property_view::Entity")]
    Views,
    /// One property has many contact inquiries
    #[sea_orm(has_many = "super::inquiry::Entity")]
    Inquiries,
    /// One property has many viewing requests
    #[sea_orm(has_many = "super::viewing::Entity")]
    Viewings,
    /// One property can be favourited by many users
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,
}

impl Related<super::property_view::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Views.def()
    }
}

impl Related<super::inquiry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inquiries.def()
    }
}

impl Related<super::viewing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Viewings.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
