//! Maintenance tasks behind the `check` and `seed` commands.

use crate::{
    core::property::{self, PropertyQuery},
    errors::Result,
    models::{Property, PropertyInput},
};
use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument, warn};

/// Number of sample listings printed by `gojo check`.
const SAMPLE_SIZE: u64 = 3;

/// What `gojo check` found.
#[derive(Debug, Clone)]
pub struct DatabaseReport {
    pub property_count: u64,
    /// Up to three of the newest listings
    pub samples: Vec<Property>,
}

/// Read-only connectivity check: counts listings and fetches a few samples.
///
/// # Errors
/// Returns an error if the store cannot be queried.
#[instrument(skip(db))]
pub async fn check_database(db: &DatabaseConnection) -> Result<DatabaseReport> {
    let property_count = property::count_properties(db, None).await?;
    let samples = property::list_properties(
        db,
        &PropertyQuery {
            limit: Some(SAMPLE_SIZE),
            ..PropertyQuery::default()
        },
    )
    .await?;
    info!("Database reachable, {} listing(s)", property_count);
    Ok(DatabaseReport {
        property_count,
        samples,
    })
}

/// Result of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store already had listings and `force` was not set
    Skipped { existing: u64 },
    Inserted { count: usize },
}

/// Inserts the demo listings, unless the store already has listings and `force` is false.
/// Either every seed is inserted or none is.
///
/// # Errors
/// Returns a validation error for a bad seed (nothing is inserted) or a database error.
#[instrument(skip(db, seeds), fields(seeds = seeds.len()))]
pub async fn seed_demo_data(
    db: &DatabaseConnection,
    seeds: &[PropertyInput],
    force: bool,
) -> Result<SeedOutcome> {
    let existing = property::count_properties(db, None).await?;
    if existing > 0 && !force {
        warn!("Store already has {} listing(s), not seeding", existing);
        return Ok(SeedOutcome::Skipped { existing });
    }

    let txn = db.begin().await?;
    for seed in seeds {
        property::create_property(&txn, seed, None).await?;
    }
    txn.commit().await?;

    info!("Seeded {} demo listing(s)", seeds.len());
    Ok(SeedOutcome::Inserted { count: seeds.len() })
}

/// Builds in-memory listings from the seed entries, for display when the store is down.
///
/// Ids are `demo-1`, `demo-2`, ... in seed order, and earlier seeds count as newer. Seeds
/// that fail validation are skipped.
#[must_use]
pub fn demo_listings(seeds: &[PropertyInput]) -> Vec<Property> {
    let now = Utc::now();
    seeds
        .iter()
        .filter(|seed| seed.validate().is_ok())
        .zip(0_i64..)
        .map(|(seed, index)| {
            let created_at = now - Duration::minutes(index);
            Property {
                id: format!("demo-{}", index + 1),
                title: seed.title.trim().to_string(),
                title_am: seed.title_am.clone(),
                description: seed.description.clone(),
                description_am: seed.description_am.clone(),
                price: seed.price,
                property_type: seed.property_type,
                listing_type: seed.listing_type,
                bedrooms: seed.bedrooms,
                bathrooms: seed.bathrooms,
                area_sqm: seed.area_sqm,
                address: seed.address.trim().to_string(),
                city: seed.city.trim().to_string(),
                region: seed.region.trim().to_string(),
                coordinates: seed.coordinates(),
                images: seed.cleaned_images(),
                featured: seed.featured,
                status: seed.status,
                owner_id: None,
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}
