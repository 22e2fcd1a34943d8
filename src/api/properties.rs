//! Public listing endpoints and the visitor actions on a listing.

use super::{AppState, acting_user, require_user};
use crate::{
    core::{
        analytics, favorite,
        inquiry::{self, InquiryInput},
        listing::{self, ListingPage, ListingParams},
        maintenance,
        property::{self, PropertyQuery},
        user,
        viewing::{self, ViewingInput},
    },
    entities::{InquiryModel, UserProfileModel, ViewingModel},
    errors::{Error, Result},
    models::{Property, PropertyStatus},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Active listings, or the active demo listings when the store is down and the fallback is
/// enabled.
/// The flag is true when demo data was substituted.
async fn public_listings(state: &AppState) -> Result<(Vec<Property>, bool)> {
    match property::list_properties(&state.db, &PropertyQuery::public()).await {
        Ok(properties) => Ok((properties, false)),
        Err(e) if state.config.listing.demo_fallback => {
            warn!("Store unavailable, serving demo listings: {}", e);
            let demo = maintenance::demo_listings(&state.config.properties)
                .into_iter()
                .filter(|p| p.status == PropertyStatus::Active)
                .collect();
            Ok((demo, true))
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    #[serde(flatten)]
    pub page: ListingPage,
    /// Options for the city filter
    pub cities: Vec<String>,
    /// True when the listings are demo data rather than the store's
    pub demo: bool,
}

pub async fn browse(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<BrowseResponse>> {
    let (properties, demo) = public_listings(&state).await?;
    let query = params.to_query(
        state.config.listing.browse_page_size,
        state.config.listing.featured_first,
    );
    Ok(Json(BrowseResponse {
        page: listing::run(&properties, &query),
        cities: listing::distinct_cities(&properties),
        demo,
    }))
}

pub async fn cities(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let (properties, _) = public_listings(&state).await?;
    Ok(Json(listing::distinct_cities(&properties)))
}

#[derive(Debug, Serialize)]
pub struct PropertyDetail {
    pub property: Property,
    pub favorite: bool,
    pub in_comparison: bool,
}

/// One listing. Each successful fetch counts as a view; failing to record it is only logged.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PropertyDetail>> {
    let property = property::get_property(&state.db, &id)
        .await?
        .ok_or_else(|| Error::PropertyNotFound { id: id.clone() })?;

    let session_id = headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Err(e) = analytics::record_view(&state.db, &id, session_id, user_agent).await {
        warn!("Could not record view of {}: {}", id, e);
    }

    let favorite = match acting_user(&headers) {
        Some(user_id) => favorite::is_favorite(&state.db, &user_id, &id).await?,
        None => false,
    };
    let in_comparison = state.comparison.lock().await.contains(&id);

    Ok(Json(PropertyDetail {
        property,
        favorite,
        in_comparison,
    }))
}

pub async fn send_inquiry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<InquiryInput>,
) -> Result<(StatusCode, Json<InquiryModel>)> {
    let row = inquiry::create_inquiry(&state.db, &id, &input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn schedule_viewing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ViewingInput>,
) -> Result<(StatusCode, Json<ViewingModel>)> {
    let row = viewing::create_viewing(&state.db, &id, &input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Debug, Serialize)]
pub struct FavoriteState {
    pub property_id: String,
    pub favorite: bool,
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<FavoriteState>> {
    let user_id = require_user(&headers)?;
    let favorite = favorite::toggle_favorite(&state.db, &user_id, &id).await?;
    Ok(Json(FavoriteState {
        property_id: id,
        favorite,
    }))
}

pub async fn my_favorites(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Property>>> {
    let user_id = require_user(&headers)?;
    Ok(Json(
        favorite::list_favorite_properties(&state.db, &user_id).await?,
    ))
}

/// The caller's own listings, any status, run through the admin pipeline settings.
pub async fn my_properties(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
    headers: HeaderMap,
) -> Result<Json<ListingPage>> {
    let user_id = require_user(&headers)?;
    let owned = property::list_properties(&state.db, &PropertyQuery::owned_by(user_id)).await?;
    let query = params.to_query(
        state.config.listing.admin_page_size,
        state.config.listing.admin_featured_first,
    );
    Ok(Json(listing::run(&owned, &query)))
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub email: String,
}

pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ProfileForm>,
) -> Result<Json<UserProfileModel>> {
    let user_id = require_user(&headers)?;
    Ok(Json(
        user::upsert_profile(&state.db, &user_id, &form.email).await?,
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::test_support::*;
    use crate::config::AppConfig;
    use crate::core::property::{create_property, set_status};
    use crate::errors::Result;
    use crate::models::PropertyStatus;
    use crate::test_utils::{create_test_property, property_input};
    use axum::http::StatusCode;
    use sea_orm::ConnectionTrait;
    use serde_json::json;

    #[tokio::test]
    async fn test_browse_filters_sorts_and_pages() -> Result<()> {
        let mut config = AppConfig::default();
        config.listing.browse_page_size = 2;
        let (app, db) = test_app(config).await?;

        let listings = [
            ("A", 1000.0),
            ("B", 500.0),
            ("C", 3000.0),
            ("D", 2000.0),
            ("E", 1500.0),
        ];
        for (title, price) in listings {
            create_property(&db, &property_input(title, price), None).await?;
        }

        let (status, body) = send(
            &app,
            "GET",
            "/properties?min_price=800&max_price=2500&sort=price-low",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_matches"], 3);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["items"][0]["price"], 1000.0);
        assert_eq!(body["items"][1]["price"], 1500.0);
        assert_eq!(body["demo"], false);
        assert_eq!(body["cities"], json!(["Addis Ababa"]));

        let (_, page_two) = send(
            &app,
            "GET",
            "/properties?min_price=800&max_price=2500&sort=price-low&page=2",
            None,
            None,
        )
        .await;
        assert_eq!(page_two["items"][0]["price"], 2000.0);

        let (_, beyond) = send(&app, "GET", "/properties?page=9", None, None).await;
        assert_eq!(beyond["items"], json!([]));
        assert_eq!(beyond["total_pages"], 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_browse_hides_inactive_listings() -> Result<()> {
        let (app, db) = test_app(AppConfig::default()).await?;
        let sold = create_property(&db, &property_input("Sold", 100.0), None).await?;
        set_status(&db, &sold.id, PropertyStatus::Sold).await?;
        create_property(&db, &property_input("Open", 100.0), None).await?;

        let (_, body) = send(&app, "GET", "/properties", None, None).await;
        assert_eq!(body["total_matches"], 1);
        assert_eq!(body["items"][0]["title"], "Open");
        Ok(())
    }

    #[tokio::test]
    async fn test_browse_falls_back_to_demo_data() -> Result<()> {
        let mut config = AppConfig::default();
        config.properties = vec![property_input("Demo Villa", 100.0)];
        let (app, db) = test_app(config).await?;
        db.execute_unprepared("DROP TABLE favorites").await?;
        db.execute_unprepared("DROP TABLE viewing_schedules").await?;
        db.execute_unprepared("DROP TABLE contact_inquiries").await?;
        db.execute_unprepared("DROP TABLE property_views").await?;
        db.execute_unprepared("DROP TABLE properties").await?;

        let (status, body) = send(&app, "GET", "/properties", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["demo"], true);
        assert_eq!(body["items"][0]["title"], "Demo Villa");
        Ok(())
    }

    #[tokio::test]
    async fn test_demo_fallback_shows_only_active_seeds() -> Result<()> {
        let mut config = AppConfig::default();
        let mut sold = property_input("Sold Demo", 100.0);
        sold.status = PropertyStatus::Sold;
        config.properties = vec![sold, property_input("Open Demo", 100.0)];
        let (app, db) = test_app(config).await?;
        db.execute_unprepared("DROP TABLE favorites").await?;
        db.execute_unprepared("DROP TABLE viewing_schedules").await?;
        db.execute_unprepared("DROP TABLE contact_inquiries").await?;
        db.execute_unprepared("DROP TABLE property_views").await?;
        db.execute_unprepared("DROP TABLE properties").await?;

        let (_, body) = send(&app, "GET", "/properties", None, None).await;
        assert_eq!(body["demo"], true);
        assert_eq!(body["total_matches"], 1);
        assert_eq!(body["items"][0]["title"], "Open Demo");
        Ok(())
    }

    #[tokio::test]
    async fn test_unreadable_row_does_not_hide_the_catalog() -> Result<()> {
        let (app, db) = test_app(AppConfig::default()).await?;
        create_test_property(&db, "Good", 100.0).await?;
        let bad = create_test_property(&db, "Half located", 100.0).await?;
        db.execute_unprepared(&format!(
            "UPDATE properties SET latitude = 9.0, longitude = NULL WHERE id = '{}'",
            bad.id
        ))
        .await?;

        let (status, body) = send(&app, "GET", "/properties", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["demo"], false);
        assert_eq!(body["total_matches"], 1);
        assert_eq!(body["items"][0]["title"], "Good");
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_query_values_are_forgiven() -> Result<()> {
        let (app, db) = test_app(AppConfig::default()).await?;
        create_test_property(&db, "Villa", 100.0).await?;

        for uri in [
            "/properties?page=abc",
            "/properties?featured=yes",
            "/properties?min_price=abc&bedrooms=lots",
        ] {
            let (status, body) = send(&app, "GET", uri, None, None).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["page"], 1, "{uri}");
            assert_eq!(body["total_matches"], 1, "{uri}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_store_failure_without_fallback_is_500() -> Result<()> {
        let mut config = AppConfig::default();
        config.listing.demo_fallback = false;
        let (app, db) = test_app(config).await?;
        db.execute_unprepared("DROP TABLE favorites").await?;
        db.execute_unprepared("DROP TABLE viewing_schedules").await?;
        db.execute_unprepared("DROP TABLE contact_inquiries").await?;
        db.execute_unprepared("DROP TABLE property_views").await?;
        db.execute_unprepared("DROP TABLE properties").await?;

        let (status, body) = send(&app, "GET", "/properties", None, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_detail_records_views() -> Result<()> {
        let (app, db) = test_app(AppConfig::default()).await?;
        let property = create_property(&db, &property_input("Villa", 100.0), None).await?;
        let uri = format!("/properties/{}", property.id);

        let (status, body) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["property"]["title"], "Villa");
        assert_eq!(body["favorite"], false);
        send(&app, "GET", &uri, None, None).await;

        let views = crate::core::analytics::list_analytics(&db, None, chrono::Utc::now()).await?;
        assert_eq!(views[0].total_views, 2);

        let (status, _) = send(&app, "GET", "/properties/ghost", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_inquiry_and_viewing_forms() -> Result<()> {
        let (app, db) = test_app(AppConfig::default()).await?;
        let property = create_property(&db, &property_input("Villa", 100.0), None).await?;
        let base = format!("/properties/{}", property.id);

        let inquiry = json!({
            "name": "Abebe",
            "email": "abebe@example.com",
            "message": "Still available?"
        });
        let inquiries = format!("{base}/inquiries");
        let (status, body) = send(&app, "POST", &inquiries, None, Some(inquiry)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "new");

        let bad = json!({ "name": "Abebe", "email": "nope", "message": "Hi" });
        let (status, _) = send(&app, "POST", &inquiries, None, Some(bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let today = chrono::Utc::now().date_naive();
        let viewing = json!({
            "name": "Sara",
            "email": "sara@example.com",
            "preferred_date": today.to_string(),
            "preferred_time": "10:00 AM"
        });
        let viewings = format!("{base}/viewings");
        let (status, body) = send(&app, "POST", &viewings, None, Some(viewing)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        Ok(())
    }

    #[tokio::test]
    async fn test_favorites_need_a_user() -> Result<()> {
        let (app, db) = test_app(AppConfig::default()).await?;
        let property = create_property(&db, &property_input("Villa", 100.0), None).await?;
        let uri = format!("/properties/{}/favorite", property.id);

        let (status, _) = send(&app, "POST", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, "POST", &uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorite"], true);

        let (_, saved) = send(&app, "GET", "/favorites", Some("u1"), None).await;
        assert_eq!(saved.as_array().unwrap().len(), 1);

        let detail_uri = format!("/properties/{}", property.id);
        let (_, detail) = send(&app, "GET", &detail_uri, Some("u1"), None).await;
        assert_eq!(detail["favorite"], true);
        Ok(())
    }

    #[tokio::test]
    async fn test_my_properties() -> Result<()> {
        let (app, db) = test_app(AppConfig::default()).await?;
        let mine =
            create_property(&db, &property_input("Mine", 100.0), Some("u1".to_string())).await?;
        set_status(&db, &mine.id, PropertyStatus::Pending).await?;
        create_property(&db, &property_input("Theirs", 100.0), Some("u2".to_string())).await?;

        let (status, body) = send(&app, "GET", "/my/properties", Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_matches"], 1);
        assert_eq!(body["items"][0]["status"], "pending");
        Ok(())
    }
}
