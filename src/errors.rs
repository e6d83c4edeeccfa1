//! Typed errors for the backoffice application.
//!
//! `AppError` covers storage, rendering and listing failures raised below
//! the HTTP layer. Handlers convert it into `admin::api::ApiError`, which
//! owns the status-code mapping.

use backoffice_kit::KitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("User {id} not found")]
    UserNotFound { id: i64 },

    #[error("Item {id} not found")]
    ItemNotFound { id: i64 },

    #[error("Unknown listing '{slug}'")]
    UnknownListing { slug: String },

    #[error("Unknown export format '{format}'")]
    UnknownFormat { format: String },

    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Listing(#[from] KitError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::UserNotFound { .. }
                | AppError::ItemNotFound { .. }
                | AppError::UnknownListing { .. }
                | AppError::Listing(KitError::NotFound { .. })
        )
    }
}
