//! Shared test utilities for the listing service.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test listings and form payloads with sensible defaults.

use crate::{
    core::{inquiry::InquiryInput, property, viewing::ViewingInput},
    errors::Result,
    models::{ListingType, Property, PropertyInput, PropertyStatus, PropertyType},
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes `tracing` output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("gojo=debug")
        .try_init();
}

/// A valid create form.
///
/// # Defaults
/// * `property_type`: house, `listing_type`: sale
/// * 3 bedrooms, 2 bathrooms, 120 m²
/// * city and region: "Addis Ababa"
/// * no images, not featured, active
pub fn property_input(title: &str, price: f64) -> PropertyInput {
    PropertyInput {
        title: title.to_string(),
        title_am: None,
        description: format!("{title} description"),
        description_am: None,
        price,
        property_type: PropertyType::House,
        listing_type: ListingType::Sale,
        bedrooms: Some(3),
        bathrooms: Some(2),
        area_sqm: Some(120.0),
        address: "Bole Road".to_string(),
        city: "Addis Ababa".to_string(),
        region: "Addis Ababa".to_string(),
        latitude: None,
        longitude: None,
        images: Vec::new(),
        featured: false,
        status: PropertyStatus::Active,
    }
}

/// Stores an unowned listing built from [`property_input`].
pub async fn create_test_property(
    db: &DatabaseConnection,
    title: &str,
    price: f64,
) -> Result<Property> {
    property::create_property(db, &property_input(title, price), None).await
}

/// An in-memory listing for pipeline tests. `age_days` moves `created_at` back from a fixed
/// reference instant, so a larger age means an older listing.
pub fn sample_property(id: &str, price: f64, age_days: i64) -> Property {
    let reference = Utc
        .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_default();
    let created_at = reference - Duration::days(age_days);
    Property {
        id: id.to_string(),
        title: format!("Listing {id}"),
        title_am: None,
        description: String::new(),
        description_am: None,
        price,
        property_type: PropertyType::House,
        listing_type: ListingType::Sale,
        bedrooms: Some(3),
        bathrooms: Some(2),
        area_sqm: Some(120.0),
        address: "Main Street".to_string(),
        city: "Addis Ababa".to_string(),
        region: "Addis Ababa".to_string(),
        coordinates: None,
        images: Vec::new(),
        featured: false,
        status: PropertyStatus::Active,
        owner_id: None,
        created_at,
        updated_at: created_at,
    }
}

/// A valid contact form.
pub fn inquiry_input() -> InquiryInput {
    InquiryInput {
        name: "Abebe Kebede".to_string(),
        email: "abebe@example.com".to_string(),
        phone: Some("+251911000000".to_string()),
        message: "Is this still available?".to_string(),
    }
}

/// A valid viewing request for `date`.
pub fn viewing_input(date: NaiveDate) -> ViewingInput {
    ViewingInput {
        name: "Sara Tesfaye".to_string(),
        email: "sara@example.com".to_string(),
        phone: None,
        preferred_date: date,
        preferred_time: "10:00 AM".to_string(),
        message: None,
    }
}
