//! ProductService - orchestrates blob upload + product record persistence.
//!
//! Mirrors `UserService`, with typed numeric fields coerced from form input
//! and creation/update timestamps on the record.

use crate::{
    models::product::{Product, ProductSummary},
    repo::product_repo::ProductRepo,
    services::{
        ServiceError, ServiceResult,
        blob_service::{BlobMeta, BlobRef, BlobStore, ImageUpload},
        present, required,
    },
};
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

/// Parsed form fields for product create/update. Numeric fields stay raw
/// strings until coerced; empty strings count as absent.
#[derive(Debug, Default)]
pub struct ProductInput {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepo,
    images: BlobStore,
    require_image_on_update: bool,
}

impl ProductService {
    pub fn new(repo: ProductRepo, images: BlobStore, require_image_on_update: bool) -> Self {
        Self {
            repo,
            images,
            require_image_on_update,
        }
    }

    /// Create a product from form input plus a mandatory image payload.
    ///
    /// All field coercion happens before any storage I/O; the first failure
    /// aborts the whole operation. If the record insert fails after the
    /// upload, the fresh blob is removed again.
    pub async fn create(&self, input: ProductInput) -> ServiceResult<Product> {
        let name = required(input.name, "name")?;
        let quantity = parse_quantity(&required(input.quantity, "quantity")?)?;
        let price = parse_price(&required(input.price, "price")?)?;
        let brand = input.brand.unwrap_or_default();
        let description = input.description.unwrap_or_default();
        let image = input
            .image
            .ok_or(ServiceError::Validation { field: "image" })?;

        let image_ref = self.images.upload(&image.filename, &image.bytes).await?;
        let now = Utc::now();

        let product = Product {
            id: Uuid::new_v4(),
            name,
            brand,
            quantity,
            price,
            image_id: image_ref.encode(),
            description,
            created_at: now,
            updated_at: now,
        };

        if let Err(err) = self.repo.insert(&product).await {
            self.discard(&image_ref).await;
            return Err(err);
        }
        Ok(product)
    }

    /// Sparse update: only supplied, non-empty fields change. A new image
    /// replaces the stored reference; no image leaves it untouched (unless
    /// the legacy mandatory-image policy is enabled). `updated_at` is
    /// refreshed on every successful update.
    pub async fn update(&self, id: &str, input: ProductInput) -> ServiceResult<Product> {
        let id = parse_product_id(id)?;
        let mut product = self.repo.find_by_id(id).await?;

        if let Some(name) = present(input.name) {
            product.name = name;
        }
        if let Some(brand) = present(input.brand) {
            product.brand = brand;
        }
        if let Some(quantity) = present(input.quantity) {
            product.quantity = parse_quantity(&quantity)?;
        }
        if let Some(price) = present(input.price) {
            product.price = parse_price(&price)?;
        }
        if let Some(description) = present(input.description) {
            product.description = description;
        }

        let fresh_image = match input.image {
            Some(image) => {
                let image_ref = self.images.upload(&image.filename, &image.bytes).await?;
                product.image_id = image_ref.encode();
                Some(image_ref)
            }
            None if self.require_image_on_update => {
                return Err(ServiceError::Validation { field: "image" });
            }
            None => None,
        };

        product.updated_at = Utc::now();

        if let Err(err) = self.repo.update(&product).await {
            if let Some(image_ref) = fresh_image {
                self.discard(&image_ref).await;
            }
            return Err(err);
        }
        Ok(product)
    }

    /// Delete the record. The associated blob is intentionally left behind.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let id = parse_product_id(id)?;
        self.repo.delete(id).await
    }

    pub async fn find(&self, id: &str) -> ServiceResult<Product> {
        let id = parse_product_id(id)?;
        self.repo.find_by_id(id).await
    }

    pub async fn list(&self) -> ServiceResult<Vec<ProductSummary>> {
        let products = self.repo.list().await?;
        Ok(products.into_iter().map(ProductSummary::from).collect())
    }

    /// Resolve a stored image reference to its metadata and bytes.
    pub async fn image(&self, id: &str) -> ServiceResult<(BlobMeta, Vec<u8>)> {
        let image_ref = BlobRef::parse(id)?;
        self.images.download(&image_ref).await
    }

    async fn discard(&self, image_ref: &BlobRef) {
        if let Err(err) = self.images.remove(image_ref).await {
            warn!("failed to remove orphaned blob {image_ref}: {err}");
        }
    }
}

fn parse_product_id(raw: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::InvalidId("product"))
}

fn parse_quantity(raw: &str) -> ServiceResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| ServiceError::Validation { field: "quantity" })
}

fn parse_price(raw: &str) -> ServiceResult<f64> {
    raw.trim()
        .parse()
        .map_err(|_| ServiceError::Validation { field: "price" })
}
