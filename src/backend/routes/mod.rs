//! Route Configuration Module
//!
//! Configures all HTTP routes for the backend server.
//!
//! # Routes
//!
//! - `POST /api/register` - User registration
//! - `POST /api/login` - User login
//! - `GET /api/me` - Get current user (bearer token)
//! - `GET /ws` - WebSocket synchronization channel (token at handshake)

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
