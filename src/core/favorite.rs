//! Favorites - Per-user saved listings.

use crate::{
    core::{inquiry::ensure_property_exists, property::to_properties},
    entities::{Favorite, Property as PropertyEntity, favorite, property},
    errors::{Error, Result},
    models::Property,
};
use chrono::Utc;
use sea_orm::{JoinType, QueryOrder, QuerySelect, Set, prelude::*};
use tracing::{debug, instrument};

async fn find_favorite(
    db: &DatabaseConnection,
    user_id: &str,
    property_id: &str,
) -> Result<Option<favorite::Model>> {
    Ok(Favorite::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::PropertyId.eq(property_id))
        .one(db)
        .await?)
}

/// Adds the listing to the user's favorites, or removes it if already there.
/// Returns whether it is a favorite afterwards.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank user id, [`Error::PropertyNotFound`], or a
/// database error.
#[instrument(skip(db))]
pub async fn toggle_favorite(
    db: &DatabaseConnection,
    user_id: &str,
    property_id: &str,
) -> Result<bool> {
    if user_id.trim().is_empty() {
        return Err(Error::validation("A user is required to save favorites"));
    }

    if let Some(existing) = find_favorite(db, user_id, property_id).await? {
        existing.delete(db).await?;
        debug!("Removed favorite {} for {}", property_id, user_id);
        return Ok(false);
    }

    ensure_property_exists(db, property_id).await?;
    let model = favorite::ActiveModel {
        user_id: Set(user_id.to_string()),
        property_id: Set(property_id.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await?;
    debug!("Added favorite {} for {}", property_id, user_id);
    Ok(true)
}

/// # Errors
/// Returns an error if the query fails.
pub async fn is_favorite(
    db: &DatabaseConnection,
    user_id: &str,
    property_id: &str,
) -> Result<bool> {
    Ok(find_favorite(db, user_id, property_id).await?.is_some())
}

/// The user's favorite listings, most recently saved first. Invalid rows are skipped.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn list_favorite_properties(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<Property>> {
    let rows = PropertyEntity::find()
        .join(JoinType::InnerJoin, property::Relation::Favorites.def())
        .filter(favorite::Column::UserId.eq(user_id))
        .order_by_desc(favorite::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(to_properties(rows))
}

/// How many favorites the user has saved.
///
/// # Errors
/// Returns an error if the count query fails.
pub async fn count_favorites(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    Ok(Favorite::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .count(db)
        .await?)
}
