//! Authentication Module
//!
//! This module handles user accounts, password verification, and JWT tokens.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports
//! ├── users.rs        - User model and database operations
//! ├── tokens.rs       - JWT token management
//! └── handlers/       - HTTP handlers
//!     ├── mod.rs      - Handler exports
//!     ├── types.rs    - Request/response types
//!     ├── register.rs - User registration handler
//!     ├── login.rs    - User authentication handler
//!     └── me.rs       - Get current user handler
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register**: username + password → user created → JWT token returned
//! 2. **Login**: credentials verified → JWT token returned
//! 3. **WebSocket connect**: token verified before the upgrade completes
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt before storage
//! - Tokens expire after 1 hour
//! - Invalid credentials return 401 with no information leakage

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod tokens;

/// HTTP handlers for authentication endpoints
pub mod handlers;

// Re-export commonly used types and handlers
pub use handlers::types::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
pub use handlers::{get_me, login, register};
