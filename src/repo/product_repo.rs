//! Product record persistence.

use crate::{
    models::product::Product,
    services::{ServiceError, ServiceResult},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, name, brand, quantity, price, image_id, description, created_at, updated_at";

#[derive(Clone)]
pub struct ProductRepo {
    db: Arc<SqlitePool>,
}

impl ProductRepo {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> ServiceResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ServiceError::NotFound("product"),
            other => ServiceError::Persistence(other),
        })
    }

    pub async fn list(&self) -> ServiceResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at ASC"
        ))
        .fetch_all(&*self.db)
        .await?;
        Ok(products)
    }

    pub async fn insert(&self, product: &Product) -> ServiceResult<()> {
        sqlx::query(
            "INSERT INTO products (id, name, brand, quantity, price, image_id, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.quantity)
        .bind(product.price)
        .bind(&product.image_id)
        .bind(&product.description)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    /// Replace the mutable fields of a product row in a single statement.
    /// Zero matched rows means the record vanished since it was fetched.
    pub async fn update(&self, product: &Product) -> ServiceResult<()> {
        let result = sqlx::query(
            "UPDATE products SET name = ?, brand = ?, quantity = ?, price = ?, image_id = ?, description = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.quantity)
        .bind(product.price)
        .bind(&product.image_id)
        .bind(&product.description)
        .bind(product.updated_at)
        .bind(product.id)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("product"));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("product"));
        }
        Ok(())
    }
}
