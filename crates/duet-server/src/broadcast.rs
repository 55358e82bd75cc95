use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::room::Room;

/// A serialized room snapshot, shared between all subscribers of a room.
pub type Snapshot = Arc<str>;

struct RoomChannel {
    tx: watch::Sender<Snapshot>,
    subscribers: usize,
}

type Registry = HashMap<String, RoomChannel>;

/// Per-room fan-out of room snapshots to stream subscribers.
///
/// Each watched room keeps a single latest-value channel. Publishing replaces
/// the value, so a subscriber that falls behind skips intermediate snapshots
/// but always ends on the newest one.
pub struct RoomBroadcaster {
    registry: Arc<Mutex<Registry>>,
}

impl Default for RoomBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomBroadcaster {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::new())),
        }
    }

    /// Register a subscriber for `room_id` whose first value is `current`.
    /// The subscriber stays registered until the returned [`Subscription`]
    /// is dropped.
    pub fn subscribe(
        &self,
        room_id: &str,
        current: Snapshot,
    ) -> (Subscription, watch::Receiver<Snapshot>) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let channel = registry
            .entry(room_id.to_string())
            .or_insert_with(|| RoomChannel {
                tx: watch::channel(Arc::clone(&current)).0,
                subscribers: 0,
            });
        channel.tx.send_if_modified(|latest| {
            if *latest == current {
                return false;
            }
            *latest = current;
            true
        });
        channel.subscribers += 1;
        let rx = channel.tx.subscribe();
        tracing::info!(room = room_id, subscribers = channel.subscribers, "Subscriber connected");

        let subscription = Subscription {
            registry: Arc::clone(&self.registry),
            room_id: room_id.to_string(),
        };
        (subscription, rx)
    }

    /// Serialize `room` once and make it the latest value for every
    /// subscriber of that room. Returns how many subscribers were notified.
    pub fn publish(&self, room: &Room) -> usize {
        let json: Snapshot = match serde_json::to_string(room) {
            Ok(json) => json.into(),
            Err(e) => {
                tracing::warn!(room = %room.id, "Failed to serialize room snapshot: {e}");
                return 0;
            },
        };

        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(channel) = registry.get(&room.id) else {
            return 0;
        };
        channel.tx.send_replace(json);
        channel.tx.receiver_count()
    }

    #[cfg(test)]
    fn room_subscribers(&self, room_id: &str) -> usize {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.get(room_id).map_or(0, |channel| channel.subscribers)
    }

    #[cfg(test)]
    fn watched_rooms(&self) -> usize {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.len()
    }
}

/// Keeps one subscriber registered. Dropping it releases that subscriber,
/// and the room's channel once no subscribers remain.
pub struct Subscription {
    registry: Arc<Mutex<Registry>>,
    room_id: String,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(channel) = registry.get_mut(&self.room_id) {
            channel.subscribers = channel.subscribers.saturating_sub(1);
            if channel.subscribers == 0 {
                registry.remove(&self.room_id);
            }
        }
        tracing::info!(room = %self.room_id, "Subscriber disconnected");
    }
}

#[cfg(test)]
mod tests {
    use duet_core::role::Role;

    use super::*;

    fn room(id: &str) -> Room {
        Room::new(id, 150, 0)
    }

    fn snapshot_of(room: &Room) -> Snapshot {
        serde_json::to_string(room).unwrap().into()
    }

    fn latest_json(rx: &mut watch::Receiver<Snapshot>) -> serde_json::Value {
        let snapshot = Arc::clone(&rx.borrow_and_update());
        serde_json::from_str(&snapshot).unwrap()
    }

    #[test]
    fn publish_reaches_room_subscribers_only() {
        let broadcaster = RoomBroadcaster::new();
        let (_a, mut rx_a) = broadcaster.subscribe("one", snapshot_of(&room("one")));
        let (_b, mut rx_b) = broadcaster.subscribe("two", snapshot_of(&room("two")));

        let mut changed = room("one");
        changed.join(Role::P1, "alice", 1).unwrap();
        assert_eq!(broadcaster.publish(&changed), 1);

        assert!(rx_a.has_changed().unwrap());
        assert_eq!(latest_json(&mut rx_a)["players"]["p1"], "alice");
        assert!(!rx_b.has_changed().unwrap());
    }

    #[test]
    fn lagging_subscriber_ends_on_latest_state() {
        let broadcaster = RoomBroadcaster::new();
        let mut live = room("r");
        let (_sub, mut rx) = broadcaster.subscribe("r", snapshot_of(&live));

        // Many publishes land before the subscriber reads anything.
        for _ in 0..100 {
            broadcaster.publish(&live);
        }
        live.join(Role::P1, "alice", 1).unwrap();
        assert_eq!(broadcaster.publish(&live), 1);

        let json = latest_json(&mut rx);
        assert_eq!(json["players"]["p1"], "alice");
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn late_subscriber_starts_from_given_snapshot() {
        let broadcaster = RoomBroadcaster::new();
        let (_first, _rx1) = broadcaster.subscribe("r", snapshot_of(&room("r")));

        let mut live = room("r");
        live.join(Role::P2, "bob", 1).unwrap();
        let (_second, mut rx2) = broadcaster.subscribe("r", snapshot_of(&live));
        assert_eq!(latest_json(&mut rx2)["players"]["p2"], "bob");
    }

    #[test]
    fn drop_removes_subscriber_and_empty_room() {
        let broadcaster = RoomBroadcaster::new();
        let (first, _rx1) = broadcaster.subscribe("r", snapshot_of(&room("r")));
        let (second, _rx2) = broadcaster.subscribe("r", snapshot_of(&room("r")));
        assert_eq!(broadcaster.room_subscribers("r"), 2);

        drop(first);
        assert_eq!(broadcaster.room_subscribers("r"), 1);
        assert_eq!(broadcaster.watched_rooms(), 1);

        drop(second);
        assert_eq!(broadcaster.room_subscribers("r"), 0);
        assert_eq!(broadcaster.watched_rooms(), 0);
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let broadcaster = RoomBroadcaster::new();
        assert_eq!(broadcaster.publish(&room("empty")), 0);
        assert_eq!(broadcaster.watched_rooms(), 0);
    }
}
