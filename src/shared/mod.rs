//! Shared Module
//!
//! This module contains the wire types exchanged between the server and its
//! clients over the WebSocket synchronization channel. All types are designed
//! for JSON serialization.

/// Client commands and server events
pub mod protocol;

/// Re-export commonly used types for convenience
pub use protocol::{ClientCommand, ItemView, ListSummary, ServerEvent, UserLists};
