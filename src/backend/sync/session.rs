/**
 * Session Coordinator
 *
 * One `SyncSession` exists per live WebSocket connection. It binds the
 * authenticated user to at most one joined list and drives every command
 * through the same sequence: re-verify access against current ownership and
 * sharing state, apply the mutation, re-read the canonical snapshot, fan it
 * out to the list's room.
 *
 * # State Machine
 *
 * A session starts unjoined. A successful `joinList` subscribes it to that
 * list's room; joining another list releases the previous subscription
 * before the new one is announced. Dropping the session (disconnect)
 * releases whatever subscription is held.
 *
 * # Failure Policy
 *
 * A failed precondition produces a caller-scoped `error` event and no state
 * change. Storage failures are logged in full and reach the client only as
 * a generic message.
 */

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::auth::users::get_user_by_username;
use crate::backend::error::SyncError;
use crate::backend::lists::db;
use crate::backend::middleware::auth::AuthenticatedUser;
use crate::backend::server::state::AppState;
use crate::backend::sync::rooms::RoomRegistry;
use crate::shared::protocol::{ClientCommand, ItemView, ServerEvent};

/// A session's subscription to one list's room
///
/// Holds the forwarder task copying room broadcasts into the session's
/// outbound queue. Dropping the membership aborts the forwarder, which
/// releases the broadcast subscription.
struct RoomMembership {
    list_id: String,
    forwarder: JoinHandle<()>,
}

impl Drop for RoomMembership {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// Per-connection session state
pub struct SyncSession {
    session_id: Uuid,
    user: AuthenticatedUser,
    outbound: mpsc::Sender<ServerEvent>,
    room: Option<RoomMembership>,
}

impl SyncSession {
    /// Create a session for an authenticated connection
    ///
    /// `outbound` is the connection's event queue; everything the session
    /// wants the client to see goes through it.
    pub fn new(user: AuthenticatedUser, outbound: mpsc::Sender<ServerEvent>) -> Self {
        let session_id = Uuid::new_v4();
        tracing::info!(
            "Session {} opened for user {} ({})",
            session_id,
            user.username,
            user.user_id
        );
        Self {
            session_id,
            user,
            outbound,
            room: None,
        }
    }

    /// The session's identifier (for logging)
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The list this session is currently joined to, if any
    pub fn joined_list(&self) -> Option<&str> {
        self.room.as_ref().map(|room| room.list_id.as_str())
    }

    /// Queue an event for this session's client
    pub async fn send(&self, event: ServerEvent) {
        // A closed queue means the client is gone; the receive loop will end
        let _ = self.outbound.send(event).await;
    }

    /// Process one client command
    ///
    /// Commands from one connection are handled strictly in submission
    /// order: the caller awaits this before reading the next frame.
    pub async fn handle(&mut self, state: &AppState, command: ClientCommand) {
        let result = match command {
            ClientCommand::GetUsersLists => self.get_users_lists(state).await,
            ClientCommand::CreateList { list_name } => self.create_list(state, list_name).await,
            ClientCommand::JoinList { list_id } => self.join_list(state, &list_id).await,
            ClientCommand::AddItem { list_id, text } => {
                self.add_item(state, &list_id, &text).await
            }
            ClientCommand::RemoveItem { list_id, item_id } => {
                self.remove_item(state, &list_id, &item_id).await
            }
            ClientCommand::ToggleItem { list_id, item_id } => {
                self.toggle_item(state, &list_id, &item_id).await
            }
            ClientCommand::ShareList { list_id, username } => {
                self.share_list(state, &list_id, &username).await
            }
        };

        if let Err(error) = result {
            if let SyncError::Storage(ref cause) = error {
                tracing::error!("Session {}: storage failure: {:?}", self.session_id, cause);
            }
            self.send(ServerEvent::Error(error.client_message())).await;
        }
    }

    /// Reply with the caller's owned and shared lists
    async fn get_users_lists(&self, state: &AppState) -> Result<(), SyncError> {
        let lists = db::user_lists(&state.pool, &self.user.user_id).await?;
        self.send(ServerEvent::UsersLists(lists)).await;
        Ok(())
    }

    /// Create a list owned by the caller and reply with the refreshed
    /// list-of-lists
    async fn create_list(
        &self,
        state: &AppState,
        list_name: Option<String>,
    ) -> Result<(), SyncError> {
        let list = db::create_list(&state.pool, &self.user.user_id, list_name).await?;
        tracing::info!(
            "Session {}: user {} created list {}",
            self.session_id,
            self.user.user_id,
            list.id
        );

        let lists = db::user_lists(&state.pool, &self.user.user_id).await?;
        self.send(ServerEvent::UsersLists(lists)).await;
        Ok(())
    }

    /// Join a list's room and reply with its snapshot
    async fn join_list(&mut self, state: &AppState, list_id: &str) -> Result<(), SyncError> {
        let items = db::accessible_items(&state.pool, list_id, &self.user.user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(
                    "Session {}: user {} denied join on list {}",
                    self.session_id,
                    self.user.user_id,
                    list_id
                );
                SyncError::denied("You do not have access to this list.")
            })?;

        self.join_room(&state.rooms, list_id).await;
        tracing::info!(
            "Session {}: user {} joined list {}",
            self.session_id,
            self.user.user_id,
            list_id
        );

        self.send(ServerEvent::ListUpdate(snapshot_views(items))).await;
        Ok(())
    }

    /// Append an item and broadcast the refreshed snapshot to the room
    async fn add_item(
        &self,
        state: &AppState,
        list_id: &str,
        text: &str,
    ) -> Result<(), SyncError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SyncError::validation("Item text cannot be empty."));
        }
        if !db::user_can_access(&state.pool, list_id, &self.user.user_id).await? {
            return Err(SyncError::denied("Unauthorized to add item to this list."));
        }

        let item = db::insert_item(&state.pool, list_id, text).await?;
        tracing::info!(
            "Session {}: item {} added to list {}",
            self.session_id,
            item.id,
            list_id
        );

        self.broadcast_snapshot(state, list_id).await
    }

    /// Delete an item and broadcast the refreshed snapshot to the room
    async fn remove_item(
        &self,
        state: &AppState,
        list_id: &str,
        item_id: &str,
    ) -> Result<(), SyncError> {
        if !db::user_can_access(&state.pool, list_id, &self.user.user_id).await? {
            return Err(SyncError::denied(
                "Unauthorized to remove item from this list.",
            ));
        }

        db::delete_item(&state.pool, list_id, item_id).await?;
        tracing::info!(
            "Session {}: item {} removed from list {}",
            self.session_id,
            item_id,
            list_id
        );

        self.broadcast_snapshot(state, list_id).await
    }

    /// Flip an item's checked state and broadcast the refreshed snapshot
    async fn toggle_item(
        &self,
        state: &AppState,
        list_id: &str,
        item_id: &str,
    ) -> Result<(), SyncError> {
        if !db::user_can_access(&state.pool, list_id, &self.user.user_id).await? {
            return Err(SyncError::denied(
                "Unauthorized to toggle item in this list.",
            ));
        }

        let found = db::toggle_item(&state.pool, list_id, item_id).await?;
        if !found {
            return Err(SyncError::validation("Item not found."));
        }

        self.broadcast_snapshot(state, list_id).await
    }

    /// Grant another user access to a list the caller owns
    ///
    /// The owner check uses one denial message for both "not yours" and
    /// "does not exist", so non-owners cannot probe for list ids.
    async fn share_list(
        &self,
        state: &AppState,
        list_id: &str,
        username: &str,
    ) -> Result<(), SyncError> {
        let list = match db::find_list(&state.pool, list_id).await? {
            Some(list) if list.owner_id == self.user.user_id => list,
            _ => {
                return Err(SyncError::denied("You can only share lists you own."));
            }
        };

        let grantee = get_user_by_username(&state.pool, username)
            .await?
            .ok_or_else(|| SyncError::validation(format!("User '{}' not found.", username)))?;

        if grantee.id == self.user.user_id {
            return Err(SyncError::validation("Cannot share a list with yourself."));
        }

        if db::share_exists(&state.pool, list_id, &grantee.id).await? {
            return Err(SyncError::conflict(format!(
                "List is already shared with {}.",
                username
            )));
        }

        // A concurrent identical grant lands on the composite primary key
        db::insert_share(&state.pool, list_id, &grantee.id)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    SyncError::conflict(format!("List is already shared with {}.", username))
                }
                other => SyncError::from(other),
            })?;

        tracing::info!(
            "Session {}: list {} ('{}') shared by {} with {} ({})",
            self.session_id,
            list_id,
            list.name,
            self.user.user_id,
            grantee.id,
            username
        );

        self.send(ServerEvent::ShareSuccess(format!(
            "List '{}' shared with {}.",
            list.name, username
        )))
        .await;
        Ok(())
    }

    /// Re-read the list's snapshot and deliver it to every joined session
    async fn broadcast_snapshot(&self, state: &AppState, list_id: &str) -> Result<(), SyncError> {
        let items = db::list_items(&state.pool, list_id).await?;
        state
            .rooms
            .broadcast(list_id, ServerEvent::ListUpdate(snapshot_views(items)));
        Ok(())
    }

    /// Swap the session's room subscription to `list_id`
    ///
    /// The previous subscription is fully released before the new one is
    /// recorded; a session is never a member of two rooms.
    async fn join_room(&mut self, rooms: &RoomRegistry, list_id: &str) {
        if let Some(mut old) = self.room.take() {
            old.forwarder.abort();
            let _ = (&mut old.forwarder).await;
        }

        let receiver = rooms.sender(list_id).subscribe();
        let outbound = self.outbound.clone();
        let forwarder = tokio::spawn(forward_room_events(receiver, outbound));

        self.room = Some(RoomMembership {
            list_id: list_id.to_string(),
            forwarder,
        });
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        tracing::info!(
            "Session {} closed for user {}",
            self.session_id,
            self.user.user_id
        );
    }
}

/// Copy room broadcasts into one session's outbound queue
async fn forward_room_events(
    mut receiver: broadcast::Receiver<ServerEvent>,
    outbound: mpsc::Sender<ServerEvent>,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if outbound.send(event).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Room subscriber lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Map repository rows to the wire snapshot
fn snapshot_views(items: Vec<db::ListItem>) -> Vec<ItemView> {
    items.into_iter().map(ItemView::from).collect()
}
