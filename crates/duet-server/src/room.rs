use serde::Serialize;

use duet_core::error::RoomError;
use duet_core::role::{PerRole, Role, Winner};
use duet_core::room::{RoomStatus, STAGES, Stage, is_last_stage, stage_at};
use duet_core::signal::SignalKind;
use duet_race::{RaceState, RacerUpdate};
use duet_tables::dice::DiceRoller;
use duet_tables::moves::{Destination, Source};
use duet_tables::{MoveResult, RollResult, TableGame};

use crate::signaling::SignalQueue;

const WAITING_MESSAGE: &str = "Waiting for both players.";

/// Authoritative state of one room. Serialized as the snapshot clients see.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub players: PerRole<Option<String>>,
    pub status: RoomStatus,
    pub stage_index: usize,
    pub stages: [Stage; 2],
    pub score: PerRole<u32>,
    pub final_winner: Option<Winner>,
    pub last_message: String,
    pub updated_at: u64,
    pub duo_race: RaceState,
    pub table_game: TableGame,
    pub signal_queue: SignalQueue,
}

impl Room {
    pub fn new(id: impl Into<String>, signal_capacity: usize, now: u64) -> Self {
        Self {
            id: id.into(),
            players: PerRole::default(),
            status: RoomStatus::Waiting,
            stage_index: 0,
            stages: STAGES,
            score: PerRole::default(),
            final_winner: None,
            last_message: WAITING_MESSAGE.to_string(),
            updated_at: now,
            duo_race: RaceState::new(now),
            table_game: TableGame::new(),
            signal_queue: SignalQueue::with_capacity(signal_capacity),
        }
    }

    /// The stage actions currently apply to, if a match is running.
    pub fn live_stage(&self) -> Option<Stage> {
        if self.status == RoomStatus::Playing {
            stage_at(self.stage_index)
        } else {
            None
        }
    }

    pub fn holds(&self, role: Role, participant: &str) -> bool {
        self.players[role].as_deref() == Some(participant)
    }

    pub fn role_of(&self, participant: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|&r| self.holds(r, participant))
    }

    pub fn seated(&self) -> usize {
        self.players.iter().filter(|(_, p)| p.is_some()).count()
    }

    pub fn has_both(&self) -> bool {
        self.seated() == 2
    }

    fn require_seat(&self, role: Role, participant: &str) -> Result<(), RoomError> {
        if self.holds(role, participant) {
            Ok(())
        } else {
            Err(RoomError::Forbidden)
        }
    }

    /// Start a fresh match: first stage, zero score, both games reset.
    /// Seats and the signal queue carry over.
    pub fn reset_match(&mut self, now: u64) {
        self.status = RoomStatus::Playing;
        self.stage_index = 0;
        self.score = PerRole::default();
        self.final_winner = None;
        self.duo_race = RaceState::new(now);
        self.table_game = TableGame::new();
        self.last_message = "Duo race started.".to_string();
        self.updated_at = now;
    }

    /// Close the current stage: move to the next one or finish the match.
    fn advance_or_finish(&mut self, now: u64) {
        if is_last_stage(self.stage_index) {
            self.status = RoomStatus::Finished;
            let winner = Winner::from_scores(&self.score);
            self.final_winner = Some(winner);
            self.last_message = match winner {
                Winner::Tie => "The match ended in a draw.".to_string(),
                Winner::P1 => "P1 wins the full match.".to_string(),
                Winner::P2 => "P2 wins the full match.".to_string(),
            };
        } else {
            self.stage_index += 1;
            if stage_at(self.stage_index) == Some(Stage::TableGame) {
                self.last_message = "Table game started. Roll the dice.".to_string();
            }
        }
        self.updated_at = now;
    }

    /// Seat `participant` as `role`. Starts a match when both seats fill
    /// while waiting.
    pub fn join(&mut self, role: Role, participant: &str, now: u64) -> Result<(), RoomError> {
        let mine = self.role_of(participant);
        if mine.is_none() && self.has_both() {
            return Err(RoomError::RoomFull);
        }
        if mine == Some(role.opponent()) {
            return Err(RoomError::RoleLocked);
        }
        if self.players[role].is_some() && mine != Some(role) {
            return Err(RoomError::RoleTaken);
        }

        self.players[role] = Some(participant.to_string());
        self.updated_at = now;
        if self.has_both() && self.status == RoomStatus::Waiting {
            self.reset_match(now);
        } else if self.status == RoomStatus::Waiting {
            self.last_message = format!("{role} joined. {WAITING_MESSAGE}");
        }
        Ok(())
    }

    /// Free the caller's seat, if any, and return the room to waiting.
    /// Returns the role that was released.
    pub fn leave(&mut self, participant: &str, now: u64) -> Option<Role> {
        let released = self.role_of(participant);
        self.last_message = match released {
            Some(role) => {
                self.players[role] = None;
                format!("{role} left. {WAITING_MESSAGE}")
            },
            None => WAITING_MESSAGE.to_string(),
        };
        self.status = RoomStatus::Waiting;
        self.updated_at = now;
        released
    }

    pub fn restart(&mut self, role: Role, participant: &str, now: u64) -> Result<(), RoomError> {
        self.require_seat(role, participant)?;
        if !self.has_both() {
            return Err(RoomError::NeedBothPlayers);
        }
        self.reset_match(now);
        Ok(())
    }

    /// Merge a racer update. Returns whether anything changed.
    pub fn sync_racer(
        &mut self,
        role: Role,
        participant: &str,
        update: &RacerUpdate,
        now: u64,
    ) -> Result<bool, RoomError> {
        if self.live_stage() != Some(Stage::DuoRace) {
            return Ok(false);
        }
        self.require_seat(role, participant)?;

        if let Some(resolution) = self.duo_race.sync_racer(role, update, now) {
            self.score.p1 += resolution.awards.p1;
            self.score.p2 += resolution.awards.p2;
            self.last_message = match resolution.winner {
                Winner::Tie => "Both racers finished together.".to_string(),
                Winner::P1 => "P1 finished the race first.".to_string(),
                Winner::P2 => "P2 finished the race first.".to_string(),
            };
            self.advance_or_finish(now);
        }
        self.updated_at = now;
        Ok(true)
    }

    pub fn collect_item(
        &mut self,
        role: Role,
        participant: &str,
        item_id: &str,
        now: u64,
    ) -> Result<bool, RoomError> {
        if self.live_stage() != Some(Stage::DuoRace) {
            return Ok(false);
        }
        self.require_seat(role, participant)?;

        if !self.duo_race.collect_item(role, item_id) {
            return Ok(false);
        }
        self.score[role] += duet_race::scoring::ITEM_POINTS;
        self.last_message = format!("{role} collected {item_id}.");
        self.updated_at = now;
        Ok(true)
    }

    pub fn roll(
        &mut self,
        role: Role,
        participant: &str,
        dice: &mut dyn DiceRoller,
        now: u64,
    ) -> Result<bool, RoomError> {
        if self.live_stage() != Some(Stage::TableGame) {
            return Ok(false);
        }
        self.require_seat(role, participant)?;

        match self.table_game.roll(role, dice) {
            RollResult::Ignored => Ok(false),
            RollResult::Rolled | RollResult::NoMoves => {
                self.updated_at = now;
                Ok(true)
            },
        }
    }

    pub fn play_move(
        &mut self,
        role: Role,
        participant: &str,
        from: Source,
        to: Destination,
        now: u64,
    ) -> Result<bool, RoomError> {
        if self.live_stage() != Some(Stage::TableGame) {
            return Ok(false);
        }
        self.require_seat(role, participant)?;

        match self.table_game.play(role, from, to) {
            MoveResult::Ignored => return Ok(false),
            MoveResult::Won(winner) => {
                self.score[winner] += duet_tables::WIN_POINTS;
                self.advance_or_finish(now);
            },
            MoveResult::Continue | MoveResult::TurnPassed => {},
        }
        self.updated_at = now;
        Ok(true)
    }

    /// Queue a negotiation message from the holder of `role`.
    pub fn relay_signal(
        &mut self,
        role: Role,
        participant: &str,
        to: &str,
        kind: SignalKind,
        payload: serde_json::Value,
        now: u64,
    ) -> Result<u64, RoomError> {
        self.require_seat(role, participant)?;
        let seq = self.signal_queue.push(participant, to, kind, payload, now);
        self.updated_at = now;
        Ok(seq)
    }
}
