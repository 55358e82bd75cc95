pub mod arena;
pub mod scoring;

use serde::{Deserialize, Serialize};

use duet_core::role::{PerRole, Role, Winner};

use arena::{ARENA_HEIGHT, ARENA_WIDTH, Collectible, GOAL_X, START_POSITIONS, clamp_axis};

/// Horizontal facing of a racer. Serialized as `1` (right) or `-1` (left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", from = "i8")]
pub enum Facing {
    Left,
    Right,
}

impl From<Facing> for i8 {
    fn from(facing: Facing) -> i8 {
        match facing {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

impl From<i8> for Facing {
    fn from(value: i8) -> Self {
        if value < 0 { Facing::Left } else { Facing::Right }
    }
}

/// Kinematic state of one racer as last reported by its client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RacerState {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub facing: Facing,
    pub grounded: bool,
    pub finished: bool,
    /// Server time at which `finished` last became true.
    pub finished_at: Option<u64>,
    pub last_update_time: u64,
}

impl RacerState {
    fn at_start(role: Role, now: u64) -> Self {
        let (x, y) = START_POSITIONS[role];
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            facing: Facing::Right,
            grounded: true,
            finished: false,
            finished_at: None,
            last_update_time: now,
        }
    }
}

/// A partial racer update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RacerUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub vx: Option<f64>,
    pub vy: Option<f64>,
    pub facing: Option<f64>,
    pub grounded: Option<bool>,
    pub finished: Option<bool>,
}

/// The race result once both racers are across the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceResolution {
    pub winner: Winner,
    pub awards: PerRole<u32>,
}

/// Authoritative duo race sub-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceState {
    pub width: f64,
    pub height: f64,
    pub goal_x: f64,
    pub racers: PerRole<RacerState>,
    pub items: Vec<Collectible>,
    pub collected: PerRole<Vec<String>>,
    pub winner: Option<Winner>,
}

impl RaceState {
    pub fn new(now: u64) -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            goal_x: GOAL_X,
            racers: PerRole::new(
                RacerState::at_start(Role::P1, now),
                RacerState::at_start(Role::P2, now),
            ),
            items: arena::collectibles(),
            collected: PerRole::default(),
            winner: None,
        }
    }

    /// Merge a racer update for `role`, clamping its position to the arena.
    ///
    /// Resolves the race when this update leaves both racers finished.
    pub fn sync_racer(
        &mut self,
        role: Role,
        update: &RacerUpdate,
        now: u64,
    ) -> Option<RaceResolution> {
        let (width, height) = (self.width, self.height);
        let racer = &mut self.racers[role];

        if let Some(x) = update.x.filter(|v| v.is_finite()) {
            racer.x = clamp_axis(x, width);
        }
        if let Some(y) = update.y.filter(|v| v.is_finite()) {
            racer.y = clamp_axis(y, height);
        }
        if let Some(vx) = update.vx.filter(|v| v.is_finite()) {
            racer.vx = vx;
        }
        if let Some(vy) = update.vy.filter(|v| v.is_finite()) {
            racer.vy = vy;
        }
        if let Some(facing) = update.facing.filter(|v| v.is_finite()) {
            racer.facing = if facing < 0.0 {
                Facing::Left
            } else {
                Facing::Right
            };
        }
        if let Some(grounded) = update.grounded {
            racer.grounded = grounded;
        }
        if let Some(finished) = update.finished {
            match (racer.finished, finished) {
                (false, true) => racer.finished_at = Some(now),
                (true, false) => racer.finished_at = None,
                _ => {},
            }
            racer.finished = finished;
        }
        racer.last_update_time = now;

        if self.winner.is_some() {
            return None;
        }
        let finished_at = PerRole::new(
            self.racers.p1.finished_at?,
            self.racers.p2.finished_at?,
        );
        let (winner, awards) = scoring::resolve_finish(finished_at);
        self.winner = Some(winner);
        tracing::debug!(?winner, gap_ms = finished_at.p1.abs_diff(finished_at.p2), "Duo race resolved");
        Some(RaceResolution { winner, awards })
    }

    /// Record that `role` picked up `item_id`.
    ///
    /// Returns false for unknown items, items owned by the other role, and
    /// repeat pickups.
    pub fn collect_item(&mut self, role: Role, item_id: &str) -> bool {
        let owned = self
            .items
            .iter()
            .any(|item| item.id == item_id && item.owner == role);
        if !owned || self.collected[role].iter().any(|id| id == item_id) {
            return false;
        }
        self.collected[role].push(item_id.to_string());
        true
    }
}
