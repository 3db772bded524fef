//! HTTP handlers for product CRUD and product image serving.

use crate::{
    errors::AppError,
    middleware::auth::AuthenticatedUser,
    services::{blob_service::ImageUpload, product_service::ProductInput},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// `GET /api/product/get` - list all products.
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.products.list().await?;
    Ok(Json(json!({ "products": products })))
}

/// `POST /api/product/create` - multipart form fields plus a mandatory image.
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let input = parse_product_form(multipart).await?;
    let file_size = input.image.as_ref().map(|image| image.bytes.len()).unwrap_or(0);

    let product = state.products.create(input).await?;
    Ok(Json(json!({
        "fileId": product.image_id,
        "fileSize": file_size,
        "product": product,
    })))
}

/// `PUT /api/product/update/{id}` - sparse update, image optional.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let input = parse_product_form(multipart).await?;
    let product = state.products.update(&id, input).await?;
    Ok(Json(json!({ "product": product })))
}

/// `DELETE /api/product/delete/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.products.delete(&id).await?;
    tracing::info!(actor = %identity.email, "deleted product {id}");
    Ok(StatusCode::OK)
}

/// `GET /image2/{image_id}` - raw product image bytes, content type sniffed.
pub async fn serve_product_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Response, AppError> {
    let (meta, bytes) = state.products.image(&image_id).await?;
    Ok(super::image_response(&meta, bytes))
}

/// Collect product form fields from a multipart body. Numeric fields stay
/// raw strings; the service coerces them.
async fn parse_product_form(mut multipart: Multipart) -> Result<ProductInput, AppError> {
    let mut input = ProductInput::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => input.name = Some(field.text().await?),
            "brand" => input.brand = Some(field.text().await?),
            "quantity" => input.quantity = Some(field.text().await?),
            "price" => input.price = Some(field.text().await?),
            "description" => input.description = Some(field.text().await?),
            "image" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await?;
                input.image = Some(ImageUpload { filename, bytes });
            }
            _ => {}
        }
    }
    Ok(input)
}
