/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It extracts and verifies JWT tokens from the
 * Authorization header and attaches the authenticated user to the request.
 */

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;

use crate::backend::auth::tokens::verify_token;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from a JWT token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the JWT token from the Authorization header
/// 2. Verifies the token
/// 3. Confirms the user still exists in the database
/// 4. Attaches user data to request extensions for use in handlers
///
/// Returns 401 Unauthorized if the token is missing or invalid
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Get Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            StatusCode::UNAUTHORIZED
        })?;

    // Extract token (format: "Bearer <token>")
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid Authorization header format");
        StatusCode::UNAUTHORIZED
    })?;

    // Verify token
    let claims = verify_token(token).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        StatusCode::UNAUTHORIZED
    })?;

    // Verify the user still exists
    let user = lookup_user(&app_state.pool, &claims.sub).await.map_err(|e| {
        tracing::warn!("Token for unknown user {}: {:?}", claims.sub, e);
        StatusCode::UNAUTHORIZED
    })?;

    // Attach authenticated user to request extensions
    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.0,
        username: user.1,
    });

    Ok(next.run(request).await)
}

/// Fetch (id, username) for an existing user
async fn lookup_user(pool: &SqlitePool, user_id: &str) -> Result<(String, String), sqlx::Error> {
    let user = get_user_by_id(pool, user_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok((user.id, user.username))
}

/// Axum extractor for the authenticated user
///
/// Used as a handler parameter to pull the user the middleware attached
/// to the request extensions.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                StatusCode::UNAUTHORIZED
            })?;

        Ok(AuthUser(user))
    }
}
