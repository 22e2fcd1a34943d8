//! Admin dashboard counters.

use crate::{
    core::{inquiry, property, viewing},
    errors::Result,
    models::PropertyStatus,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Headline numbers on the admin landing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_properties: u64,
    pub active_properties: u64,
    pub sold_properties: u64,
    pub rented_properties: u64,
    pub inquiries: u64,
    pub viewings: u64,
}

/// Counts everything the dashboard shows.
///
/// # Errors
/// Returns an error if any count query fails.
pub async fn dashboard_stats(db: &DatabaseConnection) -> Result<DashboardStats> {
    Ok(DashboardStats {
        total_properties: property::count_properties(db, None).await?,
        active_properties: property::count_properties(db, Some(PropertyStatus::Active)).await?,
        sold_properties: property::count_properties(db, Some(PropertyStatus::Sold)).await?,
        rented_properties: property::count_properties(db, Some(PropertyStatus::Rented)).await?,
        inquiries: inquiry::count_inquiries(db, None).await?,
        viewings: viewing::count_viewings(db, None).await?,
    })
}
