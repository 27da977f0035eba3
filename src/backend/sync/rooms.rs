/**
 * Per-List Broadcast Rooms
 *
 * A room is the set of live sessions currently receiving snapshots for one
 * list id. Each room is a `tokio::sync::broadcast` channel created on
 * demand; all subscribers, including the session that triggered a mutation,
 * receive every event sent to the room.
 *
 * Membership is purely in-memory and tied to connection lifetime. Nothing
 * is persisted: after a reconnect the client must join again.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::shared::protocol::ServerEvent;

/// Capacity of each room's broadcast channel
const ROOM_CHANNEL_CAPACITY: usize = 64;

/// Registry of per-list broadcast channels
///
/// Cloning is cheap; all clones share the same channel map.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<ServerEvent>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get or create the broadcast sender for a list
    pub fn sender(&self, list_id: &str) -> broadcast::Sender<ServerEvent> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(list_id.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Broadcast an event to every session joined to a list
    ///
    /// Returns the number of sessions that received the event (0 when the
    /// room is empty or was never created).
    pub fn broadcast(&self, list_id: &str, event: ServerEvent) -> usize {
        let sender = {
            let channels = self.channels.lock().unwrap();
            channels.get(list_id).cloned()
        };
        match sender {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Drop channels that no session is subscribed to anymore
    pub fn cleanup_idle(&self) {
        self.channels
            .lock()
            .unwrap()
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Number of sessions currently joined to a list
    pub fn subscriber_count(&self, list_id: &str) -> usize {
        let channels = self.channels.lock().unwrap();
        channels
            .get(list_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}
