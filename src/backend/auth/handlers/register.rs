/**
 * Registration Handler
 *
 * This module implements the user registration handler for POST /api/register.
 *
 * # Registration Process
 *
 * 1. Validate that username and password are present
 * 2. Check whether the username is taken
 * 3. Hash the password with bcrypt
 * 4. Create the user and issue a JWT token
 *
 * # Security
 *
 * - Passwords are hashed using bcrypt with DEFAULT_COST
 * - Passwords are never returned in responses
 */

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::{hash, DEFAULT_COST};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{AuthResponse, RegisterRequest, UserResponse};
use crate::backend::auth::tokens::create_token;
use crate::backend::auth::users::{create_user, get_user_by_username};

/// Whether an insert failed on the users.username unique constraint
fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Registration handler
///
/// # Arguments
///
/// * `State(pool)` - Database connection pool
/// * `Json(request)` - Registration request containing username and password
///
/// # Returns
///
/// `201 Created` with a JWT token and user info
///
/// # Errors
///
/// * `400 Bad Request` - If username or password is empty
/// * `409 Conflict` - If the username is already taken
/// * `500 Internal Server Error` - If hashing, insertion, or token generation fails
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, String)> {
    tracing::info!("Registration request for username: {}", request.username);

    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Username and password are required.".to_string(),
        ));
    }

    // Check if username already exists
    let existing = get_user_by_username(&pool, &request.username)
        .await
        .map_err(|e| {
            tracing::error!("Database error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
        })?;
    if existing.is_some() {
        tracing::warn!("Username already exists: {}", request.username);
        return Err((StatusCode::CONFLICT, "Username already taken.".to_string()));
    }

    // Hash password
    let password_hash = hash(&request.password, DEFAULT_COST).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
    })?;

    // Create user; a concurrent registration of the same name surfaces here
    // as a unique violation rather than in the pre-check above
    let user = create_user(&pool, request.username.clone(), password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                tracing::warn!("Username already exists: {}", request.username);
                (StatusCode::CONFLICT, "Username already taken.".to_string())
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create user.".to_string(),
                )
            }
        })?;

    // Create token
    let token = create_token(&user.id, &user.username).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
    })?;

    tracing::info!("User created successfully: {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse {
                id: user.id,
                username: user.username,
            },
        }),
    ))
}
