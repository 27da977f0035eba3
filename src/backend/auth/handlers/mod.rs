//! Authentication Handlers Module
//!
//! HTTP handlers for the credential endpoints.
//!
//! # Handlers
//!
//! - **`register`** - POST /api/register - User registration
//! - **`login`** - POST /api/login - User authentication
//! - **`get_me`** - GET /api/me - Get current user info

/// Request and response types
pub mod types;

/// Registration handler
pub mod register;

/// Login handler
pub mod login;

/// Get current user handler
pub mod me;

// Re-export commonly used types
pub use types::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

// Re-export handlers
pub use login::login;
pub use me::get_me;
pub use register::register;
