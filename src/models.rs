//! Validated domain types.
//!
//! Rows coming back from the store are loosely typed (strings for enums, JSON for the image
//! list). They are converted into [`Property`] here, once, so the listing pipeline, the
//! comparison set and the analytics code can rely on every field being well-formed.

use crate::{
    entities::property,
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Kind of real estate being listed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PropertyType {
    /// Detached house or villa
    House,
    /// Apartment or condominium unit
    Apartment,
    /// Office, retail or industrial space
    Commercial,
    /// Bare plot
    Land,
}

/// Whether the property is offered for sale or for rent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListingType {
    /// Offered for purchase
    Sale,
    /// Offered for lease
    Rent,
}

/// Lifecycle status of a listing. Only `Active` listings are publicly browsable.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PropertyStatus {
    /// Visible to the public
    #[default]
    Active,
    /// Under offer
    Pending,
    /// Sold
    Sold,
    /// Rented out
    Rented,
}

/// Latitude/longitude pair. Both are present or the location is absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Degrees north, in [-90, 90]
    pub latitude: f64,
    /// Degrees east, in [-180, 180]
    pub longitude: f64,
}

/// A fully validated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub title_am: Option<String>,
    pub description: String,
    pub description_am: Option<String>,
    pub price: f64,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area_sqm: Option<f64>,
    pub address: String,
    pub city: String,
    pub region: String,
    pub coordinates: Option<Coordinates>,
    /// Ordered image URLs; the first one is the primary image
    pub images: Vec<String>,
    pub featured: bool,
    pub status: PropertyStatus,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// The image shown on cards, if the listing has any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

fn invalid_row(message: String) -> Error {
    Error::InvalidRow {
        table: "properties",
        message,
    }
}

fn room_count(value: Option<i32>, field: &str) -> Result<Option<u32>> {
    value
        .map(|n| u32::try_from(n).map_err(|_| invalid_row(format!("negative {field}: {n}"))))
        .transpose()
}

impl TryFrom<property::Model> for Property {
    type Error = Error;

    fn try_from(row: property::Model) -> Result<Self> {
        let property_type = row
            .property_type
            .parse::<PropertyType>()
            .map_err(|_| invalid_row(format!("unknown property_type '{}'", row.property_type)))?;
        let listing_type = row
            .listing_type
            .parse::<ListingType>()
            .map_err(|_| invalid_row(format!("unknown listing_type '{}'", row.listing_type)))?;
        let status = row
            .status
            .parse::<PropertyStatus>()
            .map_err(|_| invalid_row(format!("unknown status '{}'", row.status)))?;

        let images: Vec<String> = serde_json::from_value(row.images)
            .map_err(|e| invalid_row(format!("images is not a list of strings: {e}")))?;

        let coordinates = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            (None, None) => None,
            _ => {
                return Err(invalid_row(format!(
                    "property {} has only one of latitude/longitude",
                    row.id
                )));
            }
        };

        Ok(Self {
            bedrooms: room_count(row.bedrooms, "bedrooms")?,
            bathrooms: room_count(row.bathrooms, "bathrooms")?,
            id: row.id,
            title: row.title,
            title_am: row.title_am,
            description: row.description,
            description_am: row.description_am,
            price: row.price,
            property_type,
            listing_type,
            area_sqm: row.area_sqm,
            address: row.address,
            city: row.city,
            region: row.region,
            coordinates,
            images,
            featured: row.featured,
            status,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Create/edit form payload. Also the shape of `[[properties]]` seed entries in config.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInput {
    pub title: String,
    #[serde(default)]
    pub title_am: Option<String>,
    pub description: String,
    #[serde(default)]
    pub description_am: Option<String>,
    pub price: f64,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub area_sqm: Option<f64>,
    pub address: String,
    pub city: String,
    pub region: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: PropertyStatus,
}

impl PropertyInput {
    /// Checks the form invariants the store relies on.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] describing the first rule that failed.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("Title cannot be empty"));
        }
        if self.address.trim().is_empty() {
            return Err(Error::validation("Address cannot be empty"));
        }
        if self.city.trim().is_empty() {
            return Err(Error::validation("City cannot be empty"));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(Error::validation(format!(
                "Price must be a positive number, got {}",
                self.price
            )));
        }
        if let Some(area) = self.area_sqm
            && (!area.is_finite() || area <= 0.0)
        {
            return Err(Error::validation(format!(
                "Area must be a positive number, got {area}"
            )));
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(Error::validation(format!("Latitude out of range: {lat}")));
                }
                if !(-180.0..=180.0).contains(&lng) {
                    return Err(Error::validation(format!("Longitude out of range: {lng}")));
                }
            }
            (None, None) => {}
            _ => {
                return Err(Error::validation(
                    "Latitude and longitude must be provided together",
                ));
            }
        }
        Ok(())
    }

    /// The paired location, if both halves are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    /// Images with blank entries removed, order preserved.
    #[must_use]
    pub fn cleaned_images(&self) -> Vec<String> {
        self.images
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }
}
