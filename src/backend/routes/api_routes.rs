/**
 * API Route Handlers
 *
 * Route table for the credential endpoints.
 *
 * # Routes
 *
 * - `POST /api/register` - User registration (public)
 * - `POST /api/login` - User login (public)
 * - `GET /api/me` - Current user info (requires bearer token)
 */

use axum::Router;

use crate::backend::auth::{get_me, login, register};
use crate::backend::middleware::auth::auth_middleware;
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// `/api/me` is wrapped in the bearer-token middleware; the other routes
/// are public.
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    router
        .route("/api/register", axum::routing::post(register))
        .route("/api/login", axum::routing::post(login))
        .route(
            "/api/me",
            axum::routing::get(get_me).route_layer(axum::middleware::from_fn_with_state(
                app_state.clone(),
                auth_middleware,
            )),
        )
}
