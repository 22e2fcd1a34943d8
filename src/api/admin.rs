//! Admin panel endpoints: listing management, inquiries, viewings and users.

use super::{AppState, acting_user};
use crate::{
    core::{
        dashboard::{self, DashboardStats},
        inquiry::{self, InquiryStatus},
        listing::{self, ListingPage, ListingParams, parse_choice},
        property::{self, PropertyQuery},
        user::{self, SubscriptionTier, UserStats, UserSummary},
        viewing::{self, ViewingStatus},
    },
    entities::{InquiryModel, UserProfileModel, ViewingModel},
    errors::Result,
    models::{Property, PropertyInput, PropertyStatus},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Rows per page on the user analytics table.
const USERS_PAGE_SIZE: usize = 15;

/// Every listing regardless of status, through the admin pipeline settings.
pub async fn list_properties(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ListingPage>> {
    let properties = property::list_properties(&state.db, &PropertyQuery::default()).await?;
    let query = params.to_query(
        state.config.listing.admin_page_size,
        state.config.listing.admin_featured_first,
    );
    Ok(Json(listing::run(&properties, &query)))
}

pub async fn create_property(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<PropertyInput>,
) -> Result<(StatusCode, Json<Property>)> {
    let created = property::create_property(&state.db, &input, acting_user(&headers)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PropertyInput>,
) -> Result<Json<Property>> {
    Ok(Json(property::update_property(&state.db, &id, &input).await?))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    property::delete_property(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<Value>> {
    let deleted = property::bulk_delete_properties(&state.db, &request.ids).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest<T> {
    pub status: T,
}

pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest<PropertyStatus>>,
) -> Result<Json<Property>> {
    Ok(Json(property::set_status(&state.db, &id, request.status).await?))
}

#[derive(Debug, Deserialize)]
pub struct FeaturedRequest {
    pub featured: bool,
}

pub async fn set_featured(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<FeaturedRequest>,
) -> Result<Json<Property>> {
    Ok(Json(
        property::set_featured(&state.db, &id, request.featured).await?,
    ))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(dashboard::dashboard_stats(&state.db).await?))
}

/// Query string of the inquiry, viewing and user tables. `all` means no filter.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusFilter {
    pub status: Option<String>,
    pub tier: Option<String>,
    pub page: Option<String>,
}

pub async fn list_inquiries(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<InquiryModel>>> {
    let status = parse_choice::<InquiryStatus>(filter.status.as_deref());
    Ok(Json(inquiry::list_inquiries(&state.db, status).await?))
}

pub async fn update_inquiry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<StatusRequest<InquiryStatus>>,
) -> Result<Json<InquiryModel>> {
    Ok(Json(
        inquiry::update_inquiry_status(&state.db, id, request.status).await?,
    ))
}

pub async fn list_viewings(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<ViewingModel>>> {
    let status = parse_choice::<ViewingStatus>(filter.status.as_deref());
    Ok(Json(viewing::list_viewings(&state.db, status).await?))
}

pub async fn update_viewing(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<StatusRequest<ViewingStatus>>,
) -> Result<Json<ViewingModel>> {
    Ok(Json(
        viewing::update_viewing_status(&state.db, id, request.status).await?,
    ))
}

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub items: Vec<UserStats>,
    pub total: usize,
    pub total_pages: usize,
    pub page: usize,
}

/// User statistics, most listings first, 15 per page, optionally one tier only.
pub async fn list_users(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<UserPage>> {
    let mut stats = user::list_user_stats(&state.db).await?;
    if let Some(tier) = parse_choice::<SubscriptionTier>(filter.tier.as_deref()) {
        stats.retain(|u| u.subscription_tier == tier);
    }
    let page = listing::parse_page(filter.page.as_deref());
    Ok(Json(UserPage {
        items: listing::paginate(&stats, page, USERS_PAGE_SIZE),
        total: stats.len(),
        total_pages: listing::total_pages(stats.len(), USERS_PAGE_SIZE),
        page,
    }))
}

pub async fn users_summary(State(state): State<AppState>) -> Result<Json<UserSummary>> {
    let stats = user::list_user_stats(&state.db).await?;
    Ok(Json(user::summarize_users(&stats)))
}

pub async fn upgrade_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserProfileModel>> {
    Ok(Json(user::upgrade_to_premium(&state.db, &id).await?))
}

pub async fn downgrade_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserProfileModel>> {
    Ok(Json(user::downgrade_to_free(&state.db, &id).await?))
}
