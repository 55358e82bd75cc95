use serde::{Deserialize, Serialize};

use duet_core::role::{PerRole, Role};

pub const ARENA_WIDTH: f64 = 1800.0;
pub const ARENA_HEIGHT: f64 = 580.0;
pub const GOAL_X: f64 = 1700.0;

/// Starting (x, y) for each role.
pub const START_POSITIONS: PerRole<(f64, f64)> = PerRole {
    p1: (70.0, 500.0),
    p2: (130.0, 500.0),
};

/// A collectible that only its owning role may pick up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: String,
    pub owner: Role,
    pub x: f64,
    pub y: f64,
}

const ITEM_LAYOUT: [(&str, Role, f64, f64); 6] = [
    ("p1-item-1", Role::P1, 260.0, 470.0),
    ("p1-item-2", Role::P1, 750.0, 360.0),
    ("p1-item-3", Role::P1, 1380.0, 260.0),
    ("p2-item-1", Role::P2, 340.0, 470.0),
    ("p2-item-2", Role::P2, 860.0, 420.0),
    ("p2-item-3", Role::P2, 1520.0, 300.0),
];

/// The fixed set of collectibles placed on the course.
pub fn collectibles() -> Vec<Collectible> {
    ITEM_LAYOUT
        .iter()
        .map(|&(id, owner, x, y)| Collectible {
            id: id.to_string(),
            owner,
            x,
            y,
        })
        .collect()
}

/// Clamp a coordinate into `[0, max]`.
pub fn clamp_axis(value: f64, max: f64) -> f64 {
    value.clamp(0.0, max)
}
