//! User record persistence.

use crate::{
    models::user::User,
    repo::is_unique_violation,
    services::{ServiceError, ServiceResult},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepo {
    db: Arc<SqlitePool>,
}

impl UserRepo {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> ServiceResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, image_id FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ServiceError::NotFound("user"),
            other => ServiceError::Persistence(other),
        })
    }

    pub async fn find_by_email(&self, email: &str) -> ServiceResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, image_id FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ServiceError::NotFound("user"),
            other => ServiceError::Persistence(other),
        })
    }

    pub async fn list(&self) -> ServiceResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, image_id FROM users ORDER BY name ASC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(users)
    }

    pub async fn insert(&self, user: &User) -> ServiceResult<()> {
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password, image_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.image_id)
        .execute(&*self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(ServiceError::DuplicateEmail),
            Err(err) => Err(ServiceError::Persistence(err)),
        }
    }

    /// Replace the mutable fields of a user row in a single statement.
    /// Zero matched rows means the record vanished since it was fetched.
    pub async fn update(&self, user: &User) -> ServiceResult<()> {
        let result = sqlx::query(
            "UPDATE users SET name = ?, email = ?, password = ?, image_id = ? WHERE id = ?",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.image_id)
        .bind(user.id)
        .execute(&*self.db)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(ServiceError::NotFound("user")),
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(ServiceError::DuplicateEmail),
            Err(err) => Err(ServiceError::Persistence(err)),
        }
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("user"));
        }
        Ok(())
    }
}
