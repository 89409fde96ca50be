//! Error handling for the Pasta Stock Management engine
//!
//! Provides a consistent error taxonomy for callers; user-facing variants
//! carry English and Italian messages.

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // User input errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_it: String,
    },

    #[error("Duplicate name for {0}")]
    DuplicateName(String),

    // Delete blocked by dependent records
    #[error("Referential conflict: {message}")]
    ReferentialConflict {
        resource: String,
        message: String,
        message_it: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for shell collaborators to map onto
    /// their own status handling.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::DuplicateName(_) => "DUPLICATE_NAME",
            AppError::ReferentialConflict { .. } => "REFERENTIAL_CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Migration(_) => "MIGRATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Map a unique-constraint violation onto `DuplicateName`, passing every
/// other database error through unchanged.
pub(crate) fn map_unique_violation(err: sqlx::Error, resource: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::DuplicateName(resource.to_string());
        }
    }
    AppError::Database(err)
}

/// Result type alias for the engine
pub type AppResult<T> = Result<T, AppError>;
