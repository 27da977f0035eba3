//! Lists Module
//!
//! The list repository: shopping lists, their items, and sharing grants.
//! This is the single source of truth mutated by the session coordinator.
//!
//! Access rule: a user may read or mutate a list's items iff they own the
//! list or hold a sharing grant for it. Only the owner may create grants.

/// List, item, and sharing-grant database operations
pub mod db;

// Re-export commonly used types
pub use db::{ListItem, ShoppingList};
