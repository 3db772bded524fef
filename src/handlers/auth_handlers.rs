//! Login and logout.
//!
//! Login verifies credentials, mints a bearer token, and also sets it as a
//! `Token` cookie for browser clients. Logout only clears that cookie; the
//! token itself stays valid until its expiry.

use crate::{
    errors::AppError, models::user::LoginRequest, services::token_service::TOKEN_TTL_SECS,
    state::AppState,
};
use axum::{Json, extract::State, http::header, response::IntoResponse};
use serde_json::json;

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.authenticate(&req.email, &req.password).await?;
    let token = state.tokens.mint(&user.email)?;

    let cookie = format!("Token={token}; Path=/; Max-Age={TOKEN_TTL_SECS}; HttpOnly");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "token": token })),
    ))
}

/// `DELETE /api/logout` - clears the token cookie.
pub async fn logout() -> impl IntoResponse {
    let cookie = "Token=; Path=/; Max-Age=0".to_string();
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "data": "Logout successful!" })),
    )
}
