//! Unified error type for the listing service.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants carry enough context
//! for the HTTP layer to pick a status code and for logs to be useful on their own.

use thiserror::Error;

/// All errors the service can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file missing, unreadable, or semantically invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Caller-supplied input failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description
        message: String,
    },

    /// The request does not say who is acting
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable description
        message: String,
    },

    /// The acting user may not use this feature
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable description
        message: String,
    },

    /// No property with the given id exists
    #[error("Property not found: {id}")]
    PropertyNotFound {
        /// Requested property id
        id: String,
    },

    /// No contact inquiry with the given id exists
    #[error("Inquiry not found: {id}")]
    InquiryNotFound {
        /// Requested inquiry id
        id: i64,
    },

    /// No viewing request with the given id exists
    #[error("Viewing request not found: {id}")]
    ViewingNotFound {
        /// Requested viewing id
        id: i64,
    },

    /// No user profile with the given id exists
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user id
        id: String,
    },

    /// The comparison set already holds its maximum number of properties
    #[error("You can only compare up to {capacity} properties at a time")]
    ComparisonFull {
        /// Maximum number of properties in the set
        capacity: usize,
    },

    /// A stored row could not be turned into a domain value
    #[error("Invalid row in {table}: {message}")]
    InvalidRow {
        /// Table the row came from
        table: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// Error reported by the database driver
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O failure (config file, socket bind)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether this error means "the thing you asked for does not exist".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PropertyNotFound { .. }
                | Self::InquiryNotFound { .. }
                | Self::ViewingNotFound { .. }
                | Self::UserNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
