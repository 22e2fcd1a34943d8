//! Viewing requests - Visitors asking to see a listing on a given day.

use crate::{
    core::inquiry::{ensure_property_exists, non_blank, validate_contact},
    entities::{Viewing, viewing},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::{info, instrument};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ViewingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// Schedule-a-viewing form payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewingInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub preferred_date: NaiveDate,
    /// Free-form slot such as `"10:00 AM"`
    pub preferred_time: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ViewingInput {
    /// Validates the form against `today`; the preferred date may not be in the past.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] describing the first failed rule.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        validate_contact(&self.name, &self.email)?;
        if self.preferred_date < today {
            return Err(Error::validation(format!(
                "Preferred date {} is in the past",
                self.preferred_date
            )));
        }
        if self.preferred_time.trim().is_empty() {
            return Err(Error::validation("Preferred time cannot be empty"));
        }
        Ok(())
    }
}

/// Stores a new viewing request with status `pending`.
///
/// # Errors
/// Returns a validation error, [`Error::PropertyNotFound`], or a database error.
#[instrument(skip(db, input))]
pub async fn create_viewing(
    db: &DatabaseConnection,
    property_id: &str,
    input: &ViewingInput,
) -> Result<viewing::Model> {
    let now = Utc::now();
    input.validate(now.date_naive())?;
    ensure_property_exists(db, property_id).await?;

    let model = viewing::ActiveModel {
        property_id: Set(property_id.to_string()),
        name: Set(input.name.trim().to_string()),
        email: Set(input.email.trim().to_string()),
        phone: Set(non_blank(input.phone.as_ref())),
        preferred_date: Set(input.preferred_date),
        preferred_time: Set(input.preferred_time.trim().to_string()),
        message: Set(non_blank(input.message.as_ref())),
        status: Set(ViewingStatus::Pending.as_ref().to_string()),
        created_at: Set(now),
        ..Default::default()
    };
    let row = model.insert(db).await?;
    info!(
        "Viewing {} requested for property {} on {}",
        row.id, property_id, row.preferred_date
    );
    Ok(row)
}

/// Lists viewing requests by preferred date, earliest first.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn list_viewings(
    db: &DatabaseConnection,
    status: Option<ViewingStatus>,
) -> Result<Vec<viewing::Model>> {
    let mut select = Viewing::find();
    if let Some(status) = status {
        select = select.filter(viewing::Column::Status.eq(status.as_ref()));
    }
    Ok(select
        .order_by_asc(viewing::Column::PreferredDate)
        .order_by_asc(viewing::Column::Id)
        .all(db)
        .await?)
}

/// Moves a viewing request to `status`.
///
/// # Errors
/// Returns [`Error::ViewingNotFound`] if the id is unknown.
#[instrument(skip(db))]
pub async fn update_viewing_status(
    db: &DatabaseConnection,
    id: i64,
    status: ViewingStatus,
) -> Result<viewing::Model> {
    let existing = Viewing::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::ViewingNotFound { id })?;
    let mut model: viewing::ActiveModel = existing.into();
    model.status = Set(status.as_ref().to_string());
    Ok(model.update(db).await?)
}

/// Counts viewing requests, optionally only those with `status`.
///
/// # Errors
/// Returns an error if the count query fails.
pub async fn count_viewings(db: &DatabaseConnection, status: Option<ViewingStatus>) -> Result<u64> {
    let mut select = Viewing::find();
    if let Some(status) = status {
        select = select.filter(viewing::Column::Status.eq(status.as_ref()));
    }
    Ok(select.count(db).await?)
}
