/**
 * Application State Management
 *
 * This module defines the application state structure and implements the
 * `FromRef` traits for Axum state extraction.
 *
 * # Thread Safety
 *
 * Both fields are cheaply cloneable handles to shared resources: the sqlx
 * pool is internally reference-counted, and the room registry shares one
 * channel map across clones.
 */

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::sync::rooms::RoomRegistry;

/// Application state shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (the single source of truth)
    pub pool: SqlitePool,

    /// In-memory per-list broadcast rooms
    ///
    /// Membership lives only as long as the subscribing connections;
    /// nothing here survives a restart.
    pub rooms: RoomRegistry,
}

/// Allow handlers to extract the pool directly with `State<SqlitePool>`
impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.pool.clone()
    }
}

/// Allow handlers to extract the room registry directly
impl FromRef<AppState> for RoomRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rooms.clone()
    }
}
