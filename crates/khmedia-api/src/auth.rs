//! Bearer-token authentication for the admin routes.
//!
//! A missing or wrong token is answered with `401`, which the admin guard
//! middleware counts as a failed attempt for the client IP.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use khmedia_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Require `Authorization: Bearer {ADMIN_API_TOKEN}`.
///
/// With no token configured (only allowed in debug mode) every request passes.
pub async fn admin_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.admin.admin_api_token.as_deref() else {
        return next.run(request).await;
    };

    match bearer_token(&request) {
        Some(token) if secure_compare(token, expected) => next.run(request).await,
        Some(_) => HttpAppError(AppError::Unauthorized("Invalid admin token".to_string()))
            .into_response(),
        None => HttpAppError(AppError::Unauthorized(
            "Missing bearer token".to_string(),
        ))
        .into_response(),
    }
}
