/**
 * Get Current User Handler
 *
 * Handler for GET /api/me. The route is protected by the bearer-token
 * middleware, which verifies the JWT and checks the user still exists;
 * this handler only shapes the response.
 */

use axum::response::Json;
use serde::Serialize;

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::middleware::auth::AuthUser;

/// Response wrapper for GET /api/me
#[derive(Serialize, Debug)]
pub struct MeResponse {
    pub user: UserResponse,
}

/// Get current user handler
///
/// Returns the authenticated user attached to the request by the
/// auth middleware.
pub async fn get_me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: UserResponse {
            id: user.user_id,
            username: user.username,
        },
    })
}
