//! Property store client - Reads and writes listings.
//!
//! This is the only module that touches the `properties` table. Reads convert rows into the
//! validated [`Property`] type, writes take a validated [`PropertyInput`]. Callers decide what
//! to do with a failed read; nothing here substitutes placeholder data.

use crate::{
    entities::{Property as PropertyEntity, property},
    errors::{Error, Result},
    models::{Property, PropertyInput, PropertyStatus},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Filters applied by the store itself, before the listing pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PropertyQuery {
    /// Only rows with this status (`Active` for public views)
    pub status: Option<PropertyStatus>,
    /// Only rows created by this account ("my properties")
    pub owner_id: Option<String>,
    /// Only featured (or only non-featured) rows
    pub featured: Option<bool>,
    /// Cap on the number of rows returned
    pub limit: Option<u64>,
}

impl PropertyQuery {
    /// Query for the public browse page: active listings only.
    #[must_use]
    pub fn public() -> Self {
        Self {
            status: Some(PropertyStatus::Active),
            ..Self::default()
        }
    }

    /// Query for one owner's listings, any status.
    #[must_use]
    pub fn owned_by(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Self::default()
        }
    }
}

/// Validates rows one by one. A row that fails is logged and left out so the rest of the
/// listings still show.
pub(crate) fn to_properties(rows: Vec<property::Model>) -> Vec<Property> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            Property::try_from(row)
                .inspect_err(|e| warn!("Skipping unreadable property {}: {}", id, e))
                .ok()
        })
        .collect()
}

fn to_i32(value: Option<u32>, field: &str) -> Result<Option<i32>> {
    value
        .map(|n| i32::try_from(n).map_err(|_| Error::validation(format!("{field} is too large"))))
        .transpose()
}

/// Copies the form fields of `input` onto an active model.
fn apply_input(model: &mut property::ActiveModel, input: &PropertyInput) -> Result<()> {
    model.title = Set(input.title.trim().to_string());
    model.title_am = Set(input.title_am.clone());
    model.description = Set(input.description.clone());
    model.description_am = Set(input.description_am.clone());
    model.price = Set(input.price);
    model.property_type = Set(input.property_type.as_ref().to_string());
    model.listing_type = Set(input.listing_type.as_ref().to_string());
    model.bedrooms = Set(to_i32(input.bedrooms, "bedrooms")?);
    model.bathrooms = Set(to_i32(input.bathrooms, "bathrooms")?);
    model.area_sqm = Set(input.area_sqm);
    model.address = Set(input.address.trim().to_string());
    model.city = Set(input.city.trim().to_string());
    model.region = Set(input.region.trim().to_string());
    model.latitude = Set(input.latitude);
    model.longitude = Set(input.longitude);
    model.images = Set(serde_json::to_value(input.cleaned_images())?);
    model.featured = Set(input.featured);
    model.status = Set(input.status.as_ref().to_string());
    Ok(())
}

async fn find_row(db: &DatabaseConnection, id: &str) -> Result<property::Model> {
    PropertyEntity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::PropertyNotFound { id: id.to_string() })
}

/// Lists properties matching the store-side query, newest first. Rows that fail validation
/// are skipped.
///
/// # Errors
/// Returns an error if the query fails.
#[instrument(skip(db))]
pub async fn list_properties(
    db: &DatabaseConnection,
    query: &PropertyQuery,
) -> Result<Vec<Property>> {
    let mut select = PropertyEntity::find();
    if let Some(status) = query.status {
        select = select.filter(property::Column::Status.eq(status.as_ref()));
    }
    if let Some(owner_id) = &query.owner_id {
        select = select.filter(property::Column::OwnerId.eq(owner_id.as_str()));
    }
    if let Some(featured) = query.featured {
        select = select.filter(property::Column::Featured.eq(featured));
    }
    if let Some(limit) = query.limit {
        select = select.limit(limit);
    }

    let rows = select
        .order_by_desc(property::Column::CreatedAt)
        .all(db)
        .await?;
    debug!("Fetched {} property rows", rows.len());
    Ok(to_properties(rows))
}

/// Finds a property by id, returning None if it does not exist.
///
/// # Errors
/// Returns an error if the query fails or the row cannot be validated.
pub async fn get_property(db: &DatabaseConnection, id: &str) -> Result<Option<Property>> {
    PropertyEntity::find_by_id(id.to_string())
        .one(db)
        .await?
        .map(Property::try_from)
        .transpose()
}

/// Fetches several properties by id, in no particular order. Unknown ids and invalid rows
/// are skipped.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn get_properties_by_ids(
    db: &DatabaseConnection,
    ids: &[String],
) -> Result<Vec<Property>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = PropertyEntity::find()
        .filter(property::Column::Id.is_in(ids.iter().cloned()))
        .all(db)
        .await?;
    Ok(to_properties(rows))
}

/// Creates a new listing from a validated form. Works inside a transaction too.
///
/// # Errors
/// Returns an error if:
/// - The input fails validation
/// - The database insert fails
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_property<C>(
    db: &C,
    input: &PropertyInput,
    owner_id: Option<String>,
) -> Result<Property>
where
    C: ConnectionTrait,
{
    input.validate()?;

    let now = Utc::now();
    let mut model = property::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        owner_id: Set(owner_id),
        ..Default::default()
    };
    apply_input(&mut model, input)?;

    let row = model.insert(db).await?;
    info!("Created property '{}' ({})", row.title, row.id);
    Property::try_from(row)
}

/// Replaces the form fields of an existing listing and bumps `updated_at`.
///
/// # Errors
/// Returns [`Error::PropertyNotFound`] if no such listing exists, or a validation/database error.
#[instrument(skip(db, input))]
pub async fn update_property(
    db: &DatabaseConnection,
    id: &str,
    input: &PropertyInput,
) -> Result<Property> {
    input.validate()?;

    let existing = find_row(db, id).await?;
    let mut model: property::ActiveModel = existing.into();
    apply_input(&mut model, input)?;
    model.updated_at = Set(Utc::now());

    let row = model.update(db).await?;
    info!("Updated property {}", row.id);
    Property::try_from(row)
}

/// Moves a listing to a new status (e.g. marks it sold).
///
/// # Errors
/// Returns [`Error::PropertyNotFound`] if no such listing exists.
#[instrument(skip(db))]
pub async fn set_status(
    db: &DatabaseConnection,
    id: &str,
    status: PropertyStatus,
) -> Result<Property> {
    let existing = find_row(db, id).await?;
    let mut model: property::ActiveModel = existing.into();
    model.status = Set(status.as_ref().to_string());
    model.updated_at = Set(Utc::now());
    let row = model.update(db).await?;
    info!("Property {} is now {}", row.id, status);
    Property::try_from(row)
}

/// Promotes or demotes a listing.
///
/// # Errors
/// Returns [`Error::PropertyNotFound`] if no such listing exists.
#[instrument(skip(db))]
pub async fn set_featured(db: &DatabaseConnection, id: &str, featured: bool) -> Result<Property> {
    let existing = find_row(db, id).await?;
    let mut model: property::ActiveModel = existing.into();
    model.featured = Set(featured);
    model.updated_at = Set(Utc::now());
    let row = model.update(db).await?;
    Property::try_from(row)
}

/// Hard-deletes a listing. Views, inquiries, viewings and favorites go with it.
///
/// # Errors
/// Returns [`Error::PropertyNotFound`] if nothing was deleted.
#[instrument(skip(db))]
pub async fn delete_property(db: &DatabaseConnection, id: &str) -> Result<()> {
    let result = PropertyEntity::delete_by_id(id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        warn!("Delete requested for unknown property {}", id);
        return Err(Error::PropertyNotFound { id: id.to_string() });
    }
    info!("Deleted property {}", id);
    Ok(())
}

/// Deletes every listing in `ids`, returning how many rows were removed.
/// Unknown ids are ignored.
///
/// # Errors
/// Returns an error if the delete statement fails.
#[instrument(skip(db, ids), fields(requested = ids.len()))]
pub async fn bulk_delete_properties(db: &DatabaseConnection, ids: &[String]) -> Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let result = PropertyEntity::delete_many()
        .filter(property::Column::Id.is_in(ids.iter().cloned()))
        .exec(db)
        .await?;
    info!("Bulk-deleted {} properties", result.rows_affected);
    Ok(result.rows_affected)
}

/// Counts listings, optionally only those with the given status.
///
/// # Errors
/// Returns an error if the count query fails.
pub async fn count_properties(
    db: &DatabaseConnection,
    status: Option<PropertyStatus>,
) -> Result<u64> {
    let mut select = PropertyEntity::find();
    if let Some(status) = status {
        select = select.filter(property::Column::Status.eq(status.as_ref()));
    }
    select.count(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::models::{ListingType, PropertyType};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_get_property() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_property(&db, "Modern Villa", 15_000_000.0).await?;

        assert_eq!(created.title, "Modern Villa");
        assert_eq!(created.status, PropertyStatus::Active);

        let fetched = get_property(&db, &created.id).await?.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, created.title);
        assert_eq!(fetched.price, created.price);

        assert!(get_property(&db, "missing").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_property_rejects_invalid_input() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = property_input("Bad", 100.0);
        input.price = -5.0;

        let result = create_property(&db, &input, None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(count_properties(&db, None).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_property_trims_and_cleans_images() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = property_input("  Padded  ", 100.0);
        input.images = vec![String::new(), "one.jpg".to_string()];

        let created = create_property(&db, &input, Some("owner-1".to_string())).await?;
        assert_eq!(created.title, "Padded");
        assert_eq!(created.images, vec!["one.jpg"]);
        assert_eq!(created.owner_id.as_deref(), Some("owner-1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_properties_filters_by_status_and_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let active = create_test_property(&db, "Active", 100.0).await?;
        let sold = create_test_property(&db, "Sold", 200.0).await?;
        set_status(&db, &sold.id, PropertyStatus::Sold).await?;
        create_property(&db, &property_input("Mine", 300.0), Some("me".to_string())).await?;

        let public = list_properties(&db, &PropertyQuery::public()).await?;
        assert_eq!(public.len(), 2);
        assert!(public.iter().all(|p| p.status == PropertyStatus::Active));
        assert!(public.iter().any(|p| p.id == active.id));

        let mine = list_properties(&db, &PropertyQuery::owned_by("me")).await?;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Mine");

        let everything = list_properties(&db, &PropertyQuery::default()).await?;
        assert_eq!(everything.len(), 3);

        let limited = list_properties(
            &db,
            &PropertyQuery {
                limit: Some(1),
                ..PropertyQuery::default()
            },
        )
        .await?;
        assert_eq!(limited.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_property_replaces_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_property(&db, "Before", 100.0).await?;

        let mut input = property_input("After", 250.0);
        input.property_type = PropertyType::Land;
        input.listing_type = ListingType::Rent;
        input.bedrooms = None;
        let updated = update_property(&db, &created.id, &input).await?;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "After");
        assert_eq!(updated.price, 250.0);
        assert_eq!(updated.property_type, PropertyType::Land);
        assert_eq!(updated.bedrooms, None);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_property_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_property(&db, "nope", &property_input("X", 1.0)).await;
        assert!(matches!(result, Err(Error::PropertyNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_featured_and_status() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_property(&db, "Plain", 100.0).await?;
        assert!(!created.featured);

        let featured = set_featured(&db, &created.id, true).await?;
        assert!(featured.featured);

        let rented = set_status(&db, &created.id, PropertyStatus::Rented).await?;
        assert_eq!(rented.status, PropertyStatus::Rented);
        assert!(rented.featured);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_property() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_property(&db, "Doomed", 100.0).await?;

        delete_property(&db, &created.id).await?;
        assert!(get_property(&db, &created.id).await?.is_none());

        let again = delete_property(&db, &created.id).await;
        assert!(matches!(again, Err(Error::PropertyNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreadable_row_is_skipped_by_list_reads() -> Result<()> {
        let db = setup_test_db().await?;
        let good = create_test_property(&db, "Good", 100.0).await?;
        let bad = create_test_property(&db, "Half located", 100.0).await?;
        db.execute_unprepared(&format!(
            "UPDATE properties SET latitude = 9.0, longitude = NULL WHERE id = '{}'",
            bad.id
        ))
        .await?;

        let listed = list_properties(&db, &PropertyQuery::public()).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, good.id);

        let by_id = get_properties_by_ids(&db, &[good.id.clone(), bad.id.clone()]).await?;
        assert_eq!(by_id.len(), 1);

        assert!(matches!(
            get_property(&db, &bad.id).await,
            Err(Error::InvalidRow { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_deletes_cascade_to_child_rows() -> Result<()> {
        use crate::core::{analytics, favorite, inquiry, viewing};
        use crate::entities::{Favorite, Inquiry, PropertyView, Viewing};

        let db = setup_test_db().await?;
        let single = create_test_property(&db, "Single", 100.0).await?;
        let bulk = create_test_property(&db, "Bulk", 100.0).await?;
        let today = Utc::now().date_naive();
        for id in [&single.id, &bulk.id] {
            analytics::record_view(&db, id, None, None).await?;
            inquiry::create_inquiry(&db, id, &inquiry_input()).await?;
            viewing::create_viewing(&db, id, &viewing_input(today)).await?;
            favorite::toggle_favorite(&db, "u1", id).await?;
        }
        assert_eq!(PropertyView::find().count(&db).await?, 2);

        delete_property(&db, &single.id).await?;
        assert_eq!(PropertyView::find().count(&db).await?, 1);
        assert_eq!(Inquiry::find().count(&db).await?, 1);
        assert_eq!(Viewing::find().count(&db).await?, 1);
        assert_eq!(Favorite::find().count(&db).await?, 1);

        bulk_delete_properties(&db, &[bulk.id.clone()]).await?;
        assert_eq!(PropertyView::find().count(&db).await?, 0);
        assert_eq!(Inquiry::find().count(&db).await?, 0);
        assert_eq!(Viewing::find().count(&db).await?, 0);
        assert_eq!(Favorite::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_delete_and_counts() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_property(&db, "A", 100.0).await?;
        let b = create_test_property(&db, "B", 100.0).await?;
        let c = create_test_property(&db, "C", 100.0).await?;
        set_status(&db, &c.id, PropertyStatus::Sold).await?;

        assert_eq!(count_properties(&db, None).await?, 3);
        assert_eq!(count_properties(&db, Some(PropertyStatus::Sold)).await?, 1);

        let removed =
            bulk_delete_properties(&db, &[a.id.clone(), b.id.clone(), "ghost".to_string()])
                .await?;
        assert_eq!(removed, 2);
        assert_eq!(count_properties(&db, None).await?, 1);
        assert_eq!(bulk_delete_properties(&db, &[]).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_properties_by_ids() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_property(&db, "A", 100.0).await?;
        create_test_property(&db, "B", 100.0).await?;

        let found = get_properties_by_ids(&db, &[a.id.clone(), "ghost".to_string()]).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);
        assert!(get_properties_by_ids(&db, &[]).await?.is_empty());
        Ok(())
    }
}
