/**
 * Synchronization Error Types
 *
 * This module defines the errors a synchronization command can fail with.
 * The variants mirror how failures are presented to clients:
 *
 * - `Denied` - authenticated but lacking ownership or a sharing grant; the
 *   same message is used whether the list is missing or merely forbidden,
 *   so callers cannot probe for list existence
 * - `Validation` - bad input (empty item text, unknown item, unknown
 *   grantee, self-share)
 * - `Conflict` - the operation collides with existing state (duplicate
 *   sharing grant)
 * - `Storage` - an underlying sqlx failure; logged with full detail for
 *   operators, surfaced to the client as a generic message
 */

use thiserror::Error;

/// Errors produced while handling a synchronization command
///
/// All variants are recovered at the session boundary and turned into a
/// caller-scoped `error` event. No variant mutates state.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Caller is not the owner and holds no sharing grant
    #[error("{0}")]
    Denied(String),

    /// Command payload failed a precondition
    #[error("{0}")]
    Validation(String),

    /// Command conflicts with existing state
    #[error("{0}")]
    Conflict(String),

    /// Underlying storage failure
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl SyncError {
    /// Create a denied error
    pub fn denied(message: impl Into<String>) -> Self {
        Self::Denied(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// The message sent to the client
    ///
    /// Storage failures are collapsed to a generic message; their detail is
    /// for operator logs only.
    pub fn client_message(&self) -> String {
        match self {
            Self::Denied(message) => message.clone(),
            Self::Validation(message) => message.clone(),
            Self::Conflict(message) => message.clone(),
            Self::Storage(_) => "Operation failed.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_passthrough() {
        let error = SyncError::denied("You do not have access to this list.");
        assert_eq!(
            error.client_message(),
            "You do not have access to this list."
        );

        let error = SyncError::conflict("List is already shared with bob.");
        assert_eq!(error.client_message(), "List is already shared with bob.");
    }

    #[test]
    fn test_storage_detail_not_exposed() {
        let error = SyncError::from(sqlx::Error::RowNotFound);
        assert_eq!(error.client_message(), "Operation failed.");
        // The Display impl keeps the detail for logging
        assert!(error.to_string().contains("storage error"));
    }
}
