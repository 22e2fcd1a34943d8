//! Contact inquiries sent from a listing's detail page, and their admin workflow.

use crate::{
    entities::{Inquiry, Property as PropertyEntity, inquiry},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::{info, instrument};

/// Where an inquiry is in the follow-up workflow.
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
pub enum InquiryStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

/// Contact form payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InquiryInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}

/// Name and email checks shared by the contact and viewing forms.
pub(crate) fn validate_contact(name: &str, email: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Name cannot be empty"));
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation(format!("Invalid email address: '{email}'")));
    }
    Ok(())
}

/// Blank optional text becomes None.
pub(crate) fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) async fn ensure_property_exists(
    db: &DatabaseConnection,
    property_id: &str,
) -> Result<()> {
    PropertyEntity::find_by_id(property_id.to_string())
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| Error::PropertyNotFound {
            id: property_id.to_string(),
        })
}

impl InquiryInput {
    /// # Errors
    /// Returns [`Error::Validation`] for a blank name or message or a malformed email.
    pub fn validate(&self) -> Result<()> {
        validate_contact(&self.name, &self.email)?;
        if self.message.trim().is_empty() {
            return Err(Error::validation("Message cannot be empty"));
        }
        Ok(())
    }
}

/// Stores a new inquiry with status `new`.
///
/// # Errors
/// Returns a validation error, [`Error::PropertyNotFound`], or a database error.
#[instrument(skip(db, input))]
pub async fn create_inquiry(
    db: &DatabaseConnection,
    property_id: &str,
    input: &InquiryInput,
) -> Result<inquiry::Model> {
    input.validate()?;
    ensure_property_exists(db, property_id).await?;

    let model = inquiry::ActiveModel {
        property_id: Set(property_id.to_string()),
        name: Set(input.name.trim().to_string()),
        email: Set(input.email.trim().to_string()),
        phone: Set(non_blank(input.phone.as_ref())),
        message: Set(input.message.trim().to_string()),
        status: Set(InquiryStatus::New.as_ref().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let row = model.insert(db).await?;
    info!("New inquiry {} for property {}", row.id, property_id);
    Ok(row)
}

/// Lists inquiries newest first, optionally only those with `status`.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn list_inquiries(
    db: &DatabaseConnection,
    status: Option<InquiryStatus>,
) -> Result<Vec<inquiry::Model>> {
    let mut select = Inquiry::find();
    if let Some(status) = status {
        select = select.filter(inquiry::Column::Status.eq(status.as_ref()));
    }
    Ok(select
        .order_by_desc(inquiry::Column::CreatedAt)
        .order_by_desc(inquiry::Column::Id)
        .all(db)
        .await?)
}

/// Moves an inquiry to `status`.
///
/// # Errors
/// Returns [`Error::InquiryNotFound`] if the id is unknown.
#[instrument(skip(db))]
pub async fn update_inquiry_status(
    db: &DatabaseConnection,
    id: i64,
    status: InquiryStatus,
) -> Result<inquiry::Model> {
    let existing = Inquiry::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::InquiryNotFound { id })?;
    let mut model: inquiry::ActiveModel = existing.into();
    model.status = Set(status.as_ref().to_string());
    Ok(model.update(db).await?)
}

/// Counts inquiries, optionally only those with `status`.
///
/// # Errors
/// Returns an error if the count query fails.
pub async fn count_inquiries(
    db: &DatabaseConnection,
    status: Option<InquiryStatus>,
) -> Result<u64> {
    let mut select = Inquiry::find();
    if let Some(status) = status {
        select = select.filter(inquiry::Column::Status.eq(status.as_ref()));
    }
    Ok(select.count(db).await?)
}
