/**
 * Router Configuration
 *
 * Combines the synchronization endpoint and the API routes into the
 * application router.
 */

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;
use crate::backend::sync::handlers::ws_handler;

/// Create the Axum router with all routes configured
///
/// # Routes
///
/// - `GET /ws` - WebSocket synchronization channel
/// - `POST /api/register`, `POST /api/login`, `GET /api/me` - credentials
///
/// Unknown routes fall through to a 404 handler. The API is CORS-permissive
/// so browser clients served from another origin can reach it.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/ws", axum::routing::get(ws_handler));

    // Add API routes
    let router = configure_api_routes(router, &app_state);

    // Browser clients are served from a separate origin
    let router = router.layer(CorsLayer::permissive());

    // Fallback handler for 404
    let router = router.fallback(|| async { "404 Not Found" });

    // Use AppState as router state
    router.with_state(app_state)
}
