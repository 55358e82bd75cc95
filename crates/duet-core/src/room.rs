use serde::{Deserialize, Serialize};

/// Lifecycle status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// One of the two games that make up a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    DuoRace,
    TableGame,
}

/// Fixed order in which the stages of a match are played.
pub const STAGES: [Stage; 2] = [Stage::DuoRace, Stage::TableGame];

/// Stage live at `index`, or `None` once the index has run past the sequence.
pub fn stage_at(index: usize) -> Option<Stage> {
    STAGES.get(index).copied()
}

/// Whether `index` is the final stage of the sequence.
pub fn is_last_stage(index: usize) -> bool {
    index + 1 >= STAGES.len()
}
