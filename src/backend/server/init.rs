/**
 * Server Initialization
 *
 * Assembles the application: database pool, room registry, router, and the
 * periodic room-cleanup task.
 *
 * # Initialization Process
 *
 * 1. Connect to the database and run migrations (fatal on failure)
 * 2. Create the in-memory room registry
 * 3. Create the router with all routes
 * 4. Start the periodic cleanup task for idle broadcast rooms
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::connect_database;
use crate::backend::server::state::AppState;
use crate::backend::sync::rooms::RoomRegistry;

/// How often idle rooms are swept out of the registry
const ROOM_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Create and configure the Axum application
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Errors
///
/// Returns the underlying error when the database cannot be reached or
/// migrated; callers treat this as fatal.
pub async fn create_app() -> Result<Router<()>, sqlx::Error> {
    tracing::info!("Initializing CartSync backend server");

    let pool = connect_database().await?;

    let app_state = AppState {
        pool,
        rooms: RoomRegistry::new(),
    };

    let app = create_router(app_state.clone());

    // Rooms whose last subscriber disconnected linger until this sweep
    let cleanup_rooms = app_state.rooms.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(ROOM_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            cleanup_rooms.cleanup_idle();
            tracing::debug!("Cleaned up idle broadcast rooms");
        }
    });

    tracing::info!("Router configured with periodic room cleanup task");

    Ok(app)
}
