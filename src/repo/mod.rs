//! Resource repositories: CRUD persistence of structured records over
//! SQLite. Repositories own the persisted rows; services own orchestration.

pub mod product_repo;
pub mod user_repo;

/// Return true if a SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
