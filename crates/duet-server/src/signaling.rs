use std::collections::VecDeque;

use serde::Serialize;

use duet_core::signal::{SignalKind, SignalMessage};

/// Default number of messages kept before the oldest are evicted.
pub const DEFAULT_SIGNAL_CAPACITY: usize = 150;

/// Bounded per-room queue of peer negotiation messages.
///
/// Delivered to clients as part of the room snapshot; recipients filter on
/// `toParticipantId` and track `lastSeq` themselves.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalQueue {
    messages: VecDeque<SignalMessage>,
    last_seq: u64,
    #[serde(skip)]
    capacity: usize,
}

impl Default for SignalQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SIGNAL_CAPACITY)
    }
}

impl SignalQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            last_seq: 0,
            capacity: capacity.max(1),
        }
    }

    /// Append a message and return its sequence number. Evicts the oldest
    /// messages beyond capacity.
    pub fn push(
        &mut self,
        from: &str,
        to: &str,
        kind: SignalKind,
        payload: serde_json::Value,
        now: u64,
    ) -> u64 {
        self.last_seq += 1;
        self.messages.push_back(SignalMessage {
            id: self.last_seq,
            from_participant_id: from.to_string(),
            to_participant_id: to.to_string(),
            kind,
            payload,
            created_at: now,
        });
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
        self.last_seq
    }

    #[cfg(test)]
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    #[cfg(test)]
    pub fn messages(&self) -> impl Iterator<Item = &SignalMessage> {
        self.messages.iter()
    }
}
