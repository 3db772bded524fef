//! Bearer-token gate for mutating endpoints.
//!
//! Verifies the `Authorization` header and makes the authenticated identity
//! available to downstream handlers via request extensions. Handlers and
//! services never re-check identity themselves.

use crate::{errors::AppError, state::AppState};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

/// Identity claim extracted from a verified bearer token.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub email: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Authorization header required"))?;
    let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value);

    let claims = state.tokens.verify(token)?;
    tracing::debug!(subject = %claims.sub, "authenticated request");

    req.extensions_mut().insert(AuthenticatedUser {
        email: claims.sub,
    });
    Ok(next.run(req).await)
}
