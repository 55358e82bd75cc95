use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;

use crate::broadcast::RoomBroadcaster;
use crate::config::ServerConfig;
use crate::room_manager::RoomManager;

pub type SharedRoomManager = Arc<RwLock<RoomManager>>;

#[derive(Clone)]
pub struct AppState {
    pub rooms: SharedRoomManager,
    pub broadcaster: Arc<RoomBroadcaster>,
    pub sse_subscriber_count: Arc<AtomicUsize>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let manager = RoomManager::from_limits(&config.limits);
        Self::with_manager(config, manager)
    }

    /// State around a prepared room manager, e.g. one with a fixed clock.
    pub fn with_manager(config: ServerConfig, manager: RoomManager) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(manager)),
            broadcaster: Arc::new(RoomBroadcaster::new()),
            sse_subscriber_count: Arc::new(AtomicUsize::new(0)),
            config: Arc::new(config),
        }
    }
}

/// Holds one slot of a bounded connection counter; releases it on drop.
pub struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    /// Take a slot if fewer than `max` are in use.
    pub fn try_acquire(counter: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()?;
        Some(Self {
            counter: Arc::clone(counter),
        })
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_enforces_limit_and_releases() {
        let counter = Arc::new(AtomicUsize::new(0));
        let first = ConnectionGuard::try_acquire(&counter, 2).unwrap();
        let _second = ConnectionGuard::try_acquire(&counter, 2).unwrap();
        assert!(ConnectionGuard::try_acquire(&counter, 2).is_none());
        assert_eq!(counter.load(Ordering::Acquire), 2);

        drop(first);
        assert_eq!(counter.load(Ordering::Acquire), 1);
        assert!(ConnectionGuard::try_acquire(&counter, 2).is_some());
    }
}
