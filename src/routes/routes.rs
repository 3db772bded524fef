//! Defines routes for the user/product CRUD API and image serving.
//!
//! ## Structure
//! - **Public endpoints**
//!   - `POST   /api/login` - exchange credentials for a bearer token
//!   - `DELETE /api/logout` - clear the token cookie
//!   - `GET    /api/user/get` - list users
//!   - `GET    /api/product/get` - list products
//!   - `GET    /image/{image_id}` - serve a user image
//!   - `GET    /image2/{image_id}` - serve a product image
//!
//! - **Bearer-gated endpoints**
//!   - `POST   /api/user/create`, `PUT /api/user/update/{id}`,
//!     `DELETE /api/user/delete/{id}`
//!   - `POST   /api/product/create`, `PUT /api/product/update/{id}`,
//!     `DELETE /api/product/delete/{id}`

use crate::{
    handlers::{
        auth_handlers::{login, logout},
        health_handlers::{healthz, readyz},
        product_handlers::{
            create_product, delete_product, list_products, serve_product_image, update_product,
        },
        user_handlers::{create_user, delete_user, list_users, serve_user_image, update_user},
    },
    middleware::auth::require_auth,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

/// Build and return the router for all API routes.
///
/// Mutating user/product routes sit behind the bearer-token middleware; the
/// router carries shared state (`AppState`) to all handlers.
pub fn routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/user/create", post(create_user))
        .route("/api/user/update/{id}", put(update_user))
        .route("/api/user/delete/{id}", delete(delete_user))
        .route("/api/product/create", post(create_product))
        .route("/api/product/update/{id}", put(update_product))
        .route("/api/product/delete/{id}", delete(delete_product))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // authentication
        .route("/api/login", post(login))
        .route("/api/logout", delete(logout))
        // public reads
        .route("/api/user/get", get(list_users))
        .route("/api/product/get", get(list_products))
        .route("/image/{image_id}", get(serve_user_image))
        .route("/image2/{image_id}", get(serve_product_image))
        .merge(protected)
        .with_state(state)
}
