//! Shared test fixtures and utilities
//!
//! Provides an in-memory database fixture plus helpers for creating users
//! and in-process coordinator sessions.

#![allow(dead_code)]

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::mpsc;

use cartsync::backend::auth::users::{create_user, User};
use cartsync::backend::middleware::auth::AuthenticatedUser;
use cartsync::backend::server::state::AppState;
use cartsync::backend::sync::rooms::RoomRegistry;
use cartsync::backend::sync::session::SyncSession;
use cartsync::shared::protocol::ServerEvent;

/// Test database fixture
///
/// Each fixture gets its own in-memory SQLite database with the full schema
/// applied. A single pooled connection keeps the in-memory database alive
/// for the fixture's lifetime.
pub struct TestDatabase {
    pool: SqlitePool,
}

impl TestDatabase {
    /// Create a new test database fixture
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("valid sqlite url")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create test database pool");

        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Self { pool }
    }

    /// Get the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Build an application state over this database
    pub fn app_state(&self) -> AppState {
        AppState {
            pool: self.pool.clone(),
            rooms: RoomRegistry::new(),
        }
    }
}

/// Insert a user directly, bypassing the HTTP registration handler
///
/// The stored hash is a placeholder; these users never log in through
/// bcrypt in coordinator tests.
pub async fn seed_user(pool: &SqlitePool, username: &str) -> User {
    create_user(pool, username.to_string(), "test-hash".to_string())
        .await
        .expect("failed to seed user")
}

/// Open an in-process coordinator session for a seeded user
///
/// Returns the session and the receiver draining its outbound event queue,
/// exactly what the WebSocket plumbing would otherwise consume.
pub fn connect_session(user: &User) -> (SyncSession, mpsc::Receiver<ServerEvent>) {
    let (tx, rx) = mpsc::channel(32);
    let session = SyncSession::new(
        AuthenticatedUser {
            user_id: user.id.clone(),
            username: user.username.clone(),
        },
        tx,
    );
    (session, rx)
}

/// Receive the next event for a session, failing the test after a second
pub async fn recv_event(rx: &mut mpsc::Receiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Assert that no event arrives for a session within a short window
pub async fn assert_no_event(rx: &mut mpsc::Receiver<ServerEvent>) {
    let outcome = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(outcome.is_err(), "expected no event, got {:?}", outcome);
}
