use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the two fixed seats in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    P1,
    P2,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::P1, Role::P2];

    pub fn opponent(self) -> Role {
        match self {
            Role::P1 => Role::P2,
            Role::P2 => Role::P1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::P1 => write!(f, "P1"),
            Role::P2 => write!(f, "P2"),
        }
    }
}

/// A value held once per role, indexable by [`Role`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerRole<T> {
    pub p1: T,
    pub p2: T,
}

impl<T> PerRole<T> {
    pub fn new(p1: T, p2: T) -> Self {
        Self { p1, p2 }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &T)> {
        [(Role::P1, &self.p1), (Role::P2, &self.p2)].into_iter()
    }
}

impl<T: Clone> PerRole<T> {
    /// Same value for both roles.
    pub fn splat(value: T) -> Self {
        Self {
            p1: value.clone(),
            p2: value,
        }
    }
}

impl<T> Index<Role> for PerRole<T> {
    type Output = T;

    fn index(&self, role: Role) -> &T {
        match role {
            Role::P1 => &self.p1,
            Role::P2 => &self.p2,
        }
    }
}

impl<T> IndexMut<Role> for PerRole<T> {
    fn index_mut(&mut self, role: Role) -> &mut T {
        match role {
            Role::P1 => &mut self.p1,
            Role::P2 => &mut self.p2,
        }
    }
}

/// Outcome of a stage or of the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    P1,
    P2,
    Tie,
}

impl Winner {
    /// Compare two cumulative scores: strictly greater wins, equal is a tie.
    pub fn from_scores(score: &PerRole<u32>) -> Self {
        match score.p1.cmp(&score.p2) {
            std::cmp::Ordering::Greater => Winner::P1,
            std::cmp::Ordering::Less => Winner::P2,
            std::cmp::Ordering::Equal => Winner::Tie,
        }
    }
}

impl From<Role> for Winner {
    fn from(role: Role) -> Self {
        match role {
            Role::P1 => Winner::P1,
            Role::P2 => Winner::P2,
        }
    }
}
