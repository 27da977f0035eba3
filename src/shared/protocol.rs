/**
 * Synchronization Wire Protocol
 *
 * This module defines the messages exchanged over the WebSocket channel:
 * the commands a client may send and the events the server emits in reply.
 *
 * # Framing
 *
 * Every frame is a JSON object with an `event` discriminant and an optional
 * `data` payload:
 *
 * ```json
 * {"event":"addItem","data":{"listId":"l1","text":"milk"}}
 * {"event":"listUpdate","data":[{"id":"i1","text":"milk","checked":false,"timestamp":"..."}]}
 * ```
 *
 * # Snapshots
 *
 * `listUpdate` always carries the full ordered item list for one shopping
 * list. Clients must treat it as authoritative replacement state, never as
 * a delta.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Commands a client may send over the synchronization channel
///
/// Every command is dispatched against the session's authenticated user.
/// Mutating commands re-verify list access before touching storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientCommand {
    /// Request the caller's owned and shared lists
    GetUsersLists,
    /// Create a new list owned by the caller
    CreateList {
        /// Display name; a default is applied when blank or omitted
        #[serde(default)]
        list_name: Option<String>,
    },
    /// Join a list's broadcast room, leaving any previously joined room
    JoinList { list_id: String },
    /// Append an item to a list
    AddItem { list_id: String, text: String },
    /// Delete an item from a list
    RemoveItem { list_id: String, item_id: String },
    /// Flip an item's checked state
    ToggleItem { list_id: String, item_id: String },
    /// Grant another user access to a list the caller owns
    ShareList { list_id: String, username: String },
}

/// Events the server emits to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// The caller's lists, split into owned and shared-with-them
    UsersLists(UserLists),
    /// Full replacement snapshot of one list's items
    ListUpdate(Vec<ItemView>),
    /// Caller-scoped failure notification
    Error(String),
    /// Caller-scoped confirmation of a successful share
    ShareSuccess(String),
}

/// One shopping-list item as sent to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: String,
    pub text: String,
    pub checked: bool,
    /// Last state change (creation or toggle); snapshots are ordered by this
    pub timestamp: DateTime<Utc>,
}

/// Summary of one list in a `usersLists` reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    /// Present only on lists shared with the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
}

/// Payload of the `usersLists` event
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserLists {
    pub owned: Vec<ListSummary>,
    pub shared: Vec<ListSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"addItem","data":{"listId":"l1","text":"milk"}}"#)
                .unwrap();
        assert_eq!(
            cmd,
            ClientCommand::AddItem {
                list_id: "l1".to_string(),
                text: "milk".to_string(),
            }
        );
    }

    #[test]
    fn test_command_without_payload() {
        let cmd: ClientCommand = serde_json::from_str(r#"{"event":"getUsersLists"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::GetUsersLists);
    }

    #[test]
    fn test_create_list_name_optional() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"createList","data":{}}"#).unwrap();
        assert_eq!(cmd, ClientCommand::CreateList { list_name: None });

        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"createList","data":{"listName":"Groceries"}}"#)
                .unwrap();
        assert_eq!(
            cmd,
            ClientCommand::CreateList {
                list_name: Some("Groceries".to_string()),
            }
        );
    }

    #[test]
    fn test_event_wire_format() {
        let event = ServerEvent::Error("You do not have access to this list.".to_string());
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"event":"error","data":"You do not have access to this list."}"#
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let event = ServerEvent::ListUpdate(vec![ItemView {
            id: "i1".to_string(),
            text: "milk".to_string(),
            checked: false,
            timestamp: Utc::now(),
        }]);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.starts_with(r#"{"event":"listUpdate","data":["#));

        let parsed: ServerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_owner_username_omitted_for_owned_lists() {
        let summary = ListSummary {
            id: "l1".to_string(),
            name: "Groceries".to_string(),
            owner_id: "u1".to_string(),
            owner_username: None,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("ownerUsername"));
    }
}
