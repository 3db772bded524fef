//! HTTP handlers for user CRUD and profile image serving.
//!
//! Multipart parsing happens here; the orchestration of blob upload and
//! record persistence is delegated to `UserService`.

use crate::{
    errors::AppError,
    middleware::auth::AuthenticatedUser,
    services::{blob_service::ImageUpload, user_service::UserInput},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// `GET /api/user/get` - list all users, password material excluded.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.users.list().await?;
    Ok(Json(json!({ "users": users })))
}

/// `POST /api/user/create` - multipart form fields plus a mandatory image.
pub async fn create_user(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let input = parse_user_form(multipart).await?;
    let file_size = input.image.as_ref().map(|image| image.bytes.len()).unwrap_or(0);

    let user = state.users.create(input).await?;
    Ok(Json(json!({
        "fileId": user.image_id,
        "fileSize": file_size,
        "user": user,
    })))
}

/// `PUT /api/user/update/{id}` - sparse update, image optional.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let input = parse_user_form(multipart).await?;
    let user = state.users.update(&id, input).await?;
    Ok(Json(json!({ "user": user })))
}

/// `DELETE /api/user/delete/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.users.delete(&id).await?;
    tracing::info!(actor = %identity.email, "deleted user {id}");
    Ok(StatusCode::OK)
}

/// `GET /image/{image_id}` - raw profile image bytes, content type sniffed.
pub async fn serve_user_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Response, AppError> {
    let (meta, bytes) = state.users.image(&image_id).await?;
    Ok(super::image_response(&meta, bytes))
}

/// Collect user form fields from a multipart body. Unknown fields are
/// ignored; empty text fields are handed on as-is and treated as absent by
/// the service.
async fn parse_user_form(mut multipart: Multipart) -> Result<UserInput, AppError> {
    let mut input = UserInput::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => input.name = Some(field.text().await?),
            "email" => input.email = Some(field.text().await?),
            "password" => input.password = Some(field.text().await?),
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
