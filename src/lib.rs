//! CartSync - Main Library
//!
//! CartSync is a real-time collaborative shopping-list server built with Rust.
//! Clients authenticate over HTTP, then open a WebSocket through which list
//! commands flow in and full list snapshots flow back out to every
//! collaborator watching the same list.
//!
//! # Module Structure
//!
//! The library is organized into two main modules:
//!
//! - **`shared`** - Wire types shared between server and clients
//!   - Client command and server event enums
//!   - Item and list summary payload shapes
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server with WebSocket synchronization
//!   - Authentication, JWT tokens, user management
//!   - List repository and per-list broadcast rooms
//!   - Database persistence via sqlx
//!
//! # Usage
//!
//! ```rust,no_run
//! use cartsync::backend::server::init::create_app;
//!
//! # async fn example() -> Result<(), sqlx::Error> {
//! let app = create_app().await?;
//! // Use app with an Axum server
//! # Ok(())
//! # }
//! ```

/// Wire types shared between server and clients
pub mod shared;

/// Backend server-side code
pub mod backend;
