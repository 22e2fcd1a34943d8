//! Core business logic, independent of the HTTP layer.
//!
//! Store-facing functions take a `&DatabaseConnection` and return [`crate::errors::Result`].
//! The listing pipeline and the analytics aggregation helpers are pure.

pub mod analytics;
pub mod comparison;
pub mod dashboard;
pub mod favorite;
pub mod inquiry;
pub mod listing;
pub mod maintenance;
pub mod property;
pub mod user;
pub mod viewing;
