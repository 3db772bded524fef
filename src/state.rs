//! Shared application state handed to every handler.
//!
//! All store handles are injected at construction; nothing is ambient.

use crate::{
    config::AppConfig,
    repo::{product_repo::ProductRepo, user_repo::UserRepo},
    services::{
        blob_service::{BlobStore, PRODUCT_IMAGE_NAMESPACE, USER_IMAGE_NAMESPACE},
        product_service::ProductService,
        token_service::TokenService,
        user_service::UserService,
    },
};
use sqlx::SqlitePool;
use std::{path::PathBuf, sync::Arc};

#[derive(Clone)]
pub struct AppState {
    /// Shared SQLite pool, kept for readiness probes.
    pub db: Arc<SqlitePool>,
    /// Blob payload root, kept for readiness probes.
    pub storage_dir: PathBuf,
    pub users: UserService,
    pub products: ProductService,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, cfg: &AppConfig) -> Self {
        let user_images = BlobStore::new(db.clone(), &cfg.storage_dir, USER_IMAGE_NAMESPACE);
        let product_images = BlobStore::new(db.clone(), &cfg.storage_dir, PRODUCT_IMAGE_NAMESPACE);

        let users = UserService::new(
            UserRepo::new(db.clone()),
            user_images,
            cfg.require_image_on_update,
        );
        let products = ProductService::new(
            ProductRepo::new(db.clone()),
            product_images,
            cfg.require_image_on_update,
        );
        let tokens = TokenService::new(&cfg.secret_key);

        Self {
            db,
            storage_dir: PathBuf::from(&cfg.storage_dir),
            users,
            products,
            tokens,
        }
    }
}
