//! Service layer: the blob store, the two resource services orchestrating
//! blob upload + record persistence, and bearer-token issuance/validation.

pub mod blob_service;
pub mod product_service;
pub mod token_service;
pub mod user_service;

use std::io;
use thiserror::Error;

/// Domain error taxonomy shared by all services and repositories.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required input field is absent, empty, or fails type coercion.
    #[error("missing or invalid field `{field}`")]
    Validation { field: &'static str },

    /// A path identifier is not syntactically well-formed.
    #[error("invalid {0} id")]
    InvalidId(&'static str),

    #[error("email already in use")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Failed to generate token")]
    TokenCreation,

    /// A well-formed identifier that resolves to nothing.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("password hashing failed")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Persistence(#[from] sqlx::Error),

    #[error(transparent)]
    Storage(#[from] io::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Require a field to be present and non-empty on create.
pub(crate) fn required(value: Option<String>, field: &'static str) -> ServiceResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::Validation { field }),
    }
}

/// Treat empty form values as absent, per sparse-update semantics.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
pub(crate) mod testutil {
    use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
    use std::sync::Arc;

    pub(crate) const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

    /// In-memory SQLite pool with the full schema applied. A single pooled
    /// connection that never recycles, so the database survives the test.
    pub(crate) async fn memory_pool() -> Arc<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        for stmt in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(stmt).execute(&pool).await.expect("schema statement");
        }
        Arc::new(pool)
    }
}
