//! User profiles - Subscription tiers and per-user listing statistics.
//!
//! Identity is owned by the external auth provider. Profiles are keyed by that provider's
//! user id and only carry what the service needs to gate features.

use crate::{
    entities::{Property as PropertyEntity, UserProfile, property, user_profile},
    errors::{Error, Result},
    models::PropertyStatus,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use strum::{AsRefStr, Display, EnumString};
use tracing::{info, instrument, warn};

/// Length of a premium subscription.
const PREMIUM_DAYS: i64 = 365;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
    Admin,
}

impl SubscriptionTier {
    /// Owner analytics are a paid feature.
    #[must_use]
    pub const fn can_view_analytics(self) -> bool {
        matches!(self, Self::Premium | Self::Admin)
    }

    /// Reads a stored tier, treating anything unknown as `free`.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("Unknown subscription tier '{}', treating as free", value);
            Self::Free
        })
    }
}

async fn find_profile(db: &DatabaseConnection, id: &str) -> Result<user_profile::Model> {
    UserProfile::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound { id: id.to_string() })
}

/// # Errors
/// Returns an error if the query fails.
pub async fn get_profile(db: &DatabaseConnection, id: &str) -> Result<Option<user_profile::Model>> {
    Ok(UserProfile::find_by_id(id.to_string()).one(db).await?)
}

/// Creates a free profile for `id`, or refreshes the email of an existing one.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank id or email, or a database error.
#[instrument(skip(db))]
pub async fn upsert_profile(
    db: &DatabaseConnection,
    id: &str,
    email: &str,
) -> Result<user_profile::Model> {
    if id.trim().is_empty() || !email.contains('@') {
        return Err(Error::validation("A user id and a valid email are required"));
    }
    let now = Utc::now();

    if let Some(existing) = get_profile(db, id).await? {
        let mut model: user_profile::ActiveModel = existing.into();
        model.email = Set(email.trim().to_string());
        model.updated_at = Set(now);
        return Ok(model.update(db).await?);
    }

    let model = user_profile::ActiveModel {
        id: Set(id.to_string()),
        email: Set(email.trim().to_string()),
        subscription_tier: Set(SubscriptionTier::Free.as_ref().to_string()),
        subscription_status: Set("active".to_string()),
        subscription_started_at: Set(None),
        subscription_expires_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let row = model.insert(db).await?;
    info!("Created profile for {}", row.email);
    Ok(row)
}

/// Tier of `id`; users without a profile are `free`.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn tier_of(db: &DatabaseConnection, id: &str) -> Result<SubscriptionTier> {
    Ok(get_profile(db, id)
        .await?
        .map_or(SubscriptionTier::Free, |p| {
            SubscriptionTier::from_stored(&p.subscription_tier)
        }))
}

/// Grants a one-year premium subscription starting now.
///
/// # Errors
/// Returns [`Error::UserNotFound`] if the profile does not exist.
#[instrument(skip(db))]
pub async fn upgrade_to_premium(db: &DatabaseConnection, id: &str) -> Result<user_profile::Model> {
    let existing = find_profile(db, id).await?;
    let now = Utc::now();
    let mut model: user_profile::ActiveModel = existing.into();
    model.subscription_tier = Set(SubscriptionTier::Premium.as_ref().to_string());
    model.subscription_status = Set("active".to_string());
    model.subscription_started_at = Set(Some(now));
    model.subscription_expires_at = Set(Some(now + Duration::days(PREMIUM_DAYS)));
    model.updated_at = Set(now);
    let row = model.update(db).await?;
    info!("Upgraded {} to premium", row.email);
    Ok(row)
}

/// Returns the user to the free tier and marks the subscription cancelled.
///
/// # Errors
/// Returns [`Error::UserNotFound`] if the profile does not exist.
#[instrument(skip(db))]
pub async fn downgrade_to_free(db: &DatabaseConnection, id: &str) -> Result<user_profile::Model> {
    let existing = find_profile(db, id).await?;
    let mut model: user_profile::ActiveModel = existing.into();
    model.subscription_tier = Set(SubscriptionTier::Free.as_ref().to_string());
    model.subscription_status = Set("cancelled".to_string());
    model.updated_at = Set(Utc::now());
    let row = model.update(db).await?;
    info!("Downgraded {} to free", row.email);
    Ok(row)
}

/// Profiles newest first, optionally only one tier.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn list_profiles(
    db: &DatabaseConnection,
    tier: Option<SubscriptionTier>,
) -> Result<Vec<user_profile::Model>> {
    let mut select = UserProfile::find();
    if let Some(tier) = tier {
        select = select.filter(user_profile::Column::SubscriptionTier.eq(tier.as_ref()));
    }
    Ok(select
        .order_by_desc(user_profile::Column::CreatedAt)
        .all(db)
        .await?)
}

/// One row of the user analytics table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub id: String,
    pub email: String,
    pub subscription_tier: SubscriptionTier,
    pub subscription_status: String,
    pub created_at: DateTime<Utc>,
    pub total_properties: u64,
    pub active_properties: u64,
    pub featured_properties: u64,
}

/// Listing counts per user, most listings first.
///
/// # Errors
/// Returns an error if either query fails.
#[instrument(skip(db))]
pub async fn list_user_stats(db: &DatabaseConnection) -> Result<Vec<UserStats>> {
    let profiles = list_profiles(db, None).await?;
    let listings = PropertyEntity::find()
        .filter(property::Column::OwnerId.is_not_null())
        .all(db)
        .await?;

    let mut counts: HashMap<String, (u64, u64, u64)> = HashMap::new();
    for listing in listings {
        let Some(owner) = listing.owner_id else {
            continue;
        };
        let entry = counts.entry(owner).or_default();
        entry.0 += 1;
        entry.1 += u64::from(listing.status == PropertyStatus::Active.as_ref());
        entry.2 += u64::from(listing.featured);
    }

    let mut stats: Vec<UserStats> = profiles
        .into_iter()
        .map(|profile| {
            let (total, active, featured) = counts.get(&profile.id).copied().unwrap_or_default();
            UserStats {
                subscription_tier: SubscriptionTier::from_stored(&profile.subscription_tier),
                id: profile.id,
                email: profile.email,
                subscription_status: profile.subscription_status,
                created_at: profile.created_at,
                total_properties: total,
                active_properties: active,
                featured_properties: featured,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.total_properties.cmp(&a.total_properties));
    Ok(stats)
}

/// Number of users whose listing count falls in a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionBucket {
    pub label: &'static str,
    pub count: u64,
}

/// Headline numbers of the user analytics page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserSummary {
    pub total_users: u64,
    pub users_with_listings: u64,
    pub total_listings: u64,
    pub average_listings_per_user: f64,
    pub tiers: BTreeMap<SubscriptionTier, u64>,
    /// Only buckets with at least one user
    pub listing_distribution: Vec<DistributionBucket>,
}

/// Aggregates [`UserStats`] rows into the page summary.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize_users(stats: &[UserStats]) -> UserSummary {
    let total_users = stats.len() as u64;
    let total_listings: u64 = stats.iter().map(|u| u.total_properties).sum();

    let mut tiers = BTreeMap::new();
    for user in stats {
        *tiers.entry(user.subscription_tier).or_insert(0) += 1;
    }

    let buckets: [(&'static str, fn(u64) -> bool); 5] = [
        ("0 listings", |n| n == 0),
        ("1 listing", |n| n == 1),
        ("2-5 listings", |n| (2..=5).contains(&n)),
        ("6-10 listings", |n| (6..=10).contains(&n)),
        ("10+ listings", |n| n > 10),
    ];
    let listing_distribution = buckets
        .into_iter()
        .map(|(label, in_bucket)| DistributionBucket {
            label,
            count: stats.iter().filter(|u| in_bucket(u.total_properties)).count() as u64,
        })
        .filter(|bucket| bucket.count > 0)
        .collect();

    UserSummary {
        total_users,
        users_with_listings: stats.iter().filter(|u| u.total_properties > 0).count() as u64,
        total_listings,
        average_listings_per_user: if total_users == 0 {
            0.0
        } else {
            total_listings as f64 / total_users as f64
        },
        tiers,
        listing_distribution,
    }
}
