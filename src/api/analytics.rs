//! Analytics endpoints.
//!
//! Owners see their own listings, and only on a premium or admin tier. The admin endpoint
//! covers every listing.

use super::{AppState, require_user};
use crate::{
    core::{
        analytics::{self, AnalyticsReport, AnalyticsScope, ReportRequest, TimeRange},
        property::{self, PropertyQuery},
        user::{self, SubscriptionTier},
    },
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::error;

/// Raw report parameters. Every field is text so a malformed value falls back instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportParams {
    /// `7d`, `30d`, `90d`, `all` or `custom`
    pub range: Option<String>,
    /// `YYYY-MM-DD`, custom ranges only
    pub from: Option<String>,
    pub to: Option<String>,
    /// Narrow the report to one listing
    pub property_id: Option<String>,
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| v.trim().parse().ok())
}

impl ReportParams {
    fn into_request(self, property_ids: Option<Vec<String>>, max_range_days: u32) -> ReportRequest {
        let range = TimeRange::parse(
            self.range.as_deref().unwrap_or_default(),
            parse_date(self.from.as_deref()),
            parse_date(self.to.as_deref()),
        );
        ReportRequest {
            property_ids,
            scope: self
                .property_id
                .filter(|id| !id.trim().is_empty())
                .map_or(AnalyticsScope::All, AnalyticsScope::Property),
            range,
            max_range_days,
        }
    }
}

/// Owner analytics. Below the premium tier this is 403. Once the caller is known, store
/// failures are logged and answered with an all-zero report, like the report itself.
pub async fn owner_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
    headers: HeaderMap,
) -> Result<Json<AnalyticsReport>> {
    let user_id = require_user(&headers)?;
    let tier = match user::tier_of(&state.db, &user_id).await {
        Ok(tier) => tier,
        Err(e) => {
            error!("Failed to read the tier of {}, showing zeros: {}", user_id, e);
            return Ok(Json(AnalyticsReport::zero()));
        }
    };
    if !tier.can_view_analytics() {
        return Err(Error::Forbidden {
            message: "Analytics are available on the premium plan".to_string(),
        });
    }

    let property_ids = if tier == SubscriptionTier::Admin {
        None
    } else {
        let query = PropertyQuery::owned_by(user_id.as_str());
        match property::list_properties(&state.db, &query).await {
            Ok(owned) => Some(owned.into_iter().map(|p| p.id).collect()),
            Err(e) => {
                error!("Failed to load the listings of {}, showing zeros: {}", user_id, e);
                return Ok(Json(AnalyticsReport::zero()));
            }
        }
    };

    let request = params.into_request(property_ids, state.config.analytics.max_range_days);
    Ok(Json(analytics::build_report(&state.db, &request, Utc::now()).await))
}

pub async fn admin_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Json<AnalyticsReport> {
    let request = params.into_request(None, state.config.analytics.max_range_days);
    Json(analytics::build_report(&state.db, &request, Utc::now()).await)
}
