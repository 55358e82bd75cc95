use std::collections::HashMap;
use std::sync::Arc;

use duet_core::error::RoomError;
use duet_core::role::Role;
use duet_core::room::RoomStatus;
use duet_core::signal::SignalKind;
use duet_core::time::{Clock, SystemClock};
use duet_race::RacerUpdate;
use duet_tables::dice::{DiceRoller, ThreadRngDice};
use duet_tables::moves::{Destination, Source};

use crate::config::LimitsConfig;
use crate::room::Room;

/// Result of a room action: the room as it stands afterwards, and whether
/// the action changed it (and so must be published).
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub mutated: bool,
    pub room: Room,
}

/// Registry of all rooms in this process. Rooms are created on first access
/// and live until the process exits.
pub struct RoomManager {
    rooms: HashMap<String, Room>,
    clock: Arc<dyn Clock>,
    dice: Box<dyn DiceRoller>,
    signal_capacity: usize,
}

impl RoomManager {
    pub fn new(clock: Arc<dyn Clock>, dice: Box<dyn DiceRoller>, signal_capacity: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            clock,
            dice,
            signal_capacity,
        }
    }

    /// System clock and thread RNG dice.
    pub fn from_limits(limits: &LimitsConfig) -> Self {
        Self::new(
            Arc::new(SystemClock),
            Box::new(ThreadRngDice),
            limits.signal_queue_capacity,
        )
    }

    fn room_entry<'a>(
        rooms: &'a mut HashMap<String, Room>,
        room_id: &str,
        signal_capacity: usize,
        now: u64,
    ) -> &'a mut Room {
        rooms.entry(room_id.to_string()).or_insert_with(|| {
            tracing::info!(room = room_id, "Room created");
            Room::new(room_id, signal_capacity, now)
        })
    }

    /// Apply `action` to the room, creating it if needed.
    fn apply<F>(&mut self, room_id: &str, action: F) -> Result<ActionOutcome, RoomError>
    where
        F: FnOnce(&mut Room, &mut dyn DiceRoller, u64) -> Result<bool, RoomError>,
    {
        let now = self.clock.now_millis();
        let room = Self::room_entry(&mut self.rooms, room_id, self.signal_capacity, now);
        let mutated = action(room, self.dice.as_mut(), now)?;
        Ok(ActionOutcome {
            mutated,
            room: room.clone(),
        })
    }

    /// Current snapshot of `room_id`.
    pub fn snapshot(&mut self, room_id: &str) -> Room {
        let now = self.clock.now_millis();
        Self::room_entry(&mut self.rooms, room_id, self.signal_capacity, now).clone()
    }

    pub fn join(
        &mut self,
        room_id: &str,
        role: Role,
        participant: &str,
    ) -> Result<ActionOutcome, RoomError> {
        let outcome = self.apply(room_id, |room, _, now| {
            let was_playing = room.status == RoomStatus::Playing;
            room.join(role, participant, now)?;
            if !was_playing && room.status == RoomStatus::Playing {
                tracing::info!(room = room_id, "Match started");
            }
            Ok(true)
        })?;
        tracing::info!(room = room_id, %role, participant, "Participant joined");
        Ok(outcome)
    }

    pub fn leave(&mut self, room_id: &str, participant: &str) -> Result<ActionOutcome, RoomError> {
        let mut released = None;
        let outcome = self.apply(room_id, |room, _, now| {
            released = room.leave(participant, now);
            Ok(true)
        })?;
        match released {
            Some(role) => tracing::info!(room = room_id, %role, participant, "Participant left"),
            None => tracing::debug!(room = room_id, participant, "Leave without a seat"),
        }
        Ok(outcome)
    }

    pub fn restart(
        &mut self,
        room_id: &str,
        role: Role,
        participant: &str,
    ) -> Result<ActionOutcome, RoomError> {
        let outcome = self.apply(room_id, |room, _, now| {
            room.restart(role, participant, now)?;
            Ok(true)
        })?;
        tracing::info!(room = room_id, %role, "Match restarted");
        Ok(outcome)
    }

    pub fn sync_racer(
        &mut self,
        room_id: &str,
        role: Role,
        participant: &str,
        update: &RacerUpdate,
    ) -> Result<ActionOutcome, RoomError> {
        self.apply(room_id, |room, _, now| {
            let stage = room.stage_index;
            let changed = room.sync_racer(role, participant, update, now)?;
            if room.stage_index != stage {
                tracing::info!(room = room_id, winner = ?room.duo_race.winner, "Duo race resolved");
            }
            Ok(changed)
        })
    }

    pub fn collect_item(
        &mut self,
        room_id: &str,
        role: Role,
        participant: &str,
        item_id: &str,
    ) -> Result<ActionOutcome, RoomError> {
        self.apply(room_id, |room, _, now| {
            room.collect_item(role, participant, item_id, now)
        })
    }

    pub fn roll(
        &mut self,
        room_id: &str,
        role: Role,
        participant: &str,
    ) -> Result<ActionOutcome, RoomError> {
        self.apply(room_id, |room, dice, now| {
            room.roll(role, participant, dice, now)
        })
    }

    pub fn play_move(
        &mut self,
        room_id: &str,
        role: Role,
        participant: &str,
        from: Source,
        to: Destination,
    ) -> Result<ActionOutcome, RoomError> {
        self.apply(room_id, |room, _, now| {
            let changed = room.play_move(role, participant, from, to, now)?;
            if let Some(winner) = room.final_winner.filter(|_| changed) {
                tracing::info!(room = room_id, ?winner, score = ?room.score, "Match finished");
            }
            Ok(changed)
        })
    }

    pub fn relay_signal(
        &mut self,
        room_id: &str,
        role: Role,
        participant: &str,
        to: &str,
        kind: SignalKind,
        payload: serde_json::Value,
    ) -> Result<ActionOutcome, RoomError> {
        self.apply(room_id, |room, _, now| {
            let seq = room.relay_signal(role, participant, to, kind, payload, now)?;
            tracing::debug!(room = room_id, seq, ?kind, "Signal queued");
            Ok(true)
        })
    }

    /// (rooms, seated participants) across the registry.
    pub fn stats(&self) -> (usize, usize) {
        let seated = self.rooms.values().map(Room::seated).sum();
        (self.rooms.len(), seated)
    }

    pub fn room_exists(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }
}
