/**
 * Authentication Handler Types
 *
 * Request and response types used by the authentication handlers.
 */

use serde::{Deserialize, Serialize};

/// Registration request
#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    /// User's chosen username (unique, case-sensitive)
    pub username: String,
    /// User's password (will be hashed before storage)
    pub password: String,
}

/// Login request
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    /// User's username
    pub username: String,
    /// User's password (will be verified against the stored hash)
    pub password: String,
}

/// Auth response
///
/// Returned by register and login. Contains the JWT token and user
/// information for immediate authentication.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    /// JWT token (1-hour expiration)
    pub token: String,
    /// User information (without sensitive data)
    pub user: UserResponse,
}

/// User response (without sensitive data)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserResponse {
    /// User's unique ID
    pub id: String,
    /// User's username
    pub username: String,
}
