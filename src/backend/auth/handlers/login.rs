/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/login.
 *
 * # Security
 *
 * - Passwords are verified using bcrypt
 * - Unknown usernames and wrong passwords both return 401 (no information
 *   leakage)
 * - Passwords are never logged or returned in responses
 */

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::verify;
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest, UserResponse};
use crate::backend::auth::tokens::create_token;
use crate::backend::auth::users::get_user_by_username;

/// Login handler
///
/// # Arguments
///
/// * `State(pool)` - Database connection pool
/// * `Json(request)` - Login request containing username and password
///
/// # Returns
///
/// JSON response with JWT token and user info
///
/// # Errors
///
/// * `401 Unauthorized` - If the user is not found or the password is wrong
/// * `500 Internal Server Error` - If the query or token generation fails
pub async fn login(
    State(pool): State<SqlitePool>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    tracing::info!("Login request for: {}", request.username);

    let user = get_user_by_username(&pool, &request.username)
        .await
        .map_err(|e| {
            tracing::error!("Database error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
        })?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", request.username);
            (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials.".to_string(),
            )
        })?;

    // Verify password
    let valid = verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
    })?;

    if !valid {
        tracing::warn!("Invalid password for user: {}", request.username);
        return Err((
            StatusCode::UNAUTHORIZED,
            "Invalid credentials.".to_string(),
        ));
    }

    // Create token
    let token = create_token(&user.id, &user.username).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
    })?;

    tracing::info!("User logged in successfully: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: UserResponse {
            id: user.id,
            username: user.username,
        },
    }))
}
