//! Backend Module
//!
//! This module contains all server-side code for the CartSync application:
//! an Axum HTTP server exposing the credential endpoints and the WebSocket
//! synchronization channel, backed by a SQLite store via sqlx.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - User accounts, password hashing, JWT tokens
//! - **`middleware`** - Bearer-token request middleware
//! - **`lists`** - List repository: access checks, snapshots, item mutations
//! - **`sync`** - Per-connection session coordinator and broadcast rooms
//! - **`error`** - Command-level error taxonomy
//!
//! # State Management
//!
//! `AppState` holds the database pool and the in-memory room registry. Rooms
//! are per-list `tokio::sync::broadcast` channels; membership lives only as
//! long as the subscribing connection.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// List repository and access checks
pub mod lists;

/// Real-time session coordination and fan-out
pub mod sync;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::SyncError;
pub use server::state::AppState;
pub use sync::rooms::RoomRegistry;
