//! Represents a catalog product and its attached image.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A catalog product with an attached image.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Product {
    /// Unique identifier, assigned at creation and never reassigned.
    pub id: Uuid,

    /// Product name.
    pub name: String,

    /// Brand name. May be empty.
    pub brand: String,

    /// Units in stock.
    pub quantity: i64,

    /// Unit price.
    pub price: f64,

    /// Encoded reference to the image blob in the `products-images` namespace.
    pub image_id: String,

    /// Free-form description. May be empty.
    pub description: String,

    /// When this product was created.
    pub created_at: DateTime<Utc>,

    /// When this product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The shape products take in list responses: timestamps omitted.
#[derive(Serialize, Clone, Debug)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub quantity: i64,
    pub price: f64,
    pub image_id: String,
    pub description: String,
}

impl From<Product> for ProductSummary {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            brand: product.brand,
            quantity: product.quantity,
            price: product.price,
            image_id: product.image_id,
            description: product.description,
        }
    }
}
