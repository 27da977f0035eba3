//! Backend Error Module
//!
//! Defines the error taxonomy for synchronization commands. Every command
//! failure is recovered at the session-coordinator boundary and converted to
//! a caller-scoped `error` event; nothing here escapes to take the process
//! down.

/// Error type definitions
pub mod types;

// Re-export commonly used types
pub use types::SyncError;
