//! Synchronization Module
//!
//! The real-time core: per-connection session state machines and the
//! per-list broadcast rooms they fan snapshots out through.
//!
//! # Architecture
//!
//! - **`rooms`** - `RoomRegistry`, one broadcast channel per list id
//! - **`session`** - `SyncSession`, the per-connection command state machine
//! - **`handlers`** - the `/ws` upgrade endpoint and socket plumbing
//!
//! Every mutating command re-verifies the caller's access against current
//! ownership/sharing state, applies the mutation, re-reads the canonical
//! snapshot, and broadcasts it to every session joined to that list. A
//! failed precondition emits a caller-scoped `error` event and mutates
//! nothing.

/// Per-list broadcast rooms
pub mod rooms;

/// Per-connection session state machine
pub mod session;

/// WebSocket endpoint
pub mod handlers;

// Re-export commonly used types
pub use handlers::ws_handler;
pub use rooms::RoomRegistry;
pub use session::SyncSession;
