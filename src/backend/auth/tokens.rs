/**
 * JWT Token Management
 *
 * This module handles JWT token generation and validation. Tokens gate both
 * the HTTP API and WebSocket connection establishment.
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token validity window in seconds
const TOKEN_TTL_SECS: u64 = 60 * 60;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Username
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Get JWT secret from environment
fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|err| {
        tracing::warn!("Missing JWT_SECRET, using development default: {}", err);
        "your-secret-key-change-in-production".to_string()
    })
}

/// Create a JWT token for a user
///
/// # Arguments
/// * `user_id` - User ID
/// * `username` - Username
///
/// # Returns
/// JWT token string, valid for one hour
pub fn create_token(
    user_id: &str,
    username: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_secs();

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: now + TOKEN_TTL_SECS,
        iat: now,
    };

    let secret = get_jwt_secret();
    let key = EncodingKey::from_secret(secret.as_ref());

    encode(&Header::default(), &claims, &key)
}

/// Verify and decode a JWT token
///
/// # Arguments
/// * `token` - JWT token string
///
/// # Returns
/// Decoded claims or error
pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let secret = get_jwt_secret();
    let key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}
