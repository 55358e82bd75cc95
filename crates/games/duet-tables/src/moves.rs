use std::fmt;

use serde::{Deserialize, Serialize};

use duet_core::role::{PerRole, Role};

use crate::board::{self, POINT_COUNT, Points};

/// Wire form of a board reference: a point index or a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointRef {
    Index(u8),
    Keyword(String),
}

fn checked_index(index: u8) -> Result<u8, String> {
    if usize::from(index) < POINT_COUNT {
        Ok(index)
    } else {
        Err(format!("point {index} is outside 0..{POINT_COUNT}"))
    }
}

/// Where a moving checker comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PointRef", into = "PointRef")]
pub enum Source {
    Bar,
    Point(u8),
}

impl TryFrom<PointRef> for Source {
    type Error = String;

    fn try_from(value: PointRef) -> Result<Self, Self::Error> {
        match value {
            PointRef::Index(i) => checked_index(i).map(Source::Point),
            PointRef::Keyword(word) if word == "bar" => Ok(Source::Bar),
            PointRef::Keyword(word) => Err(format!("expected point index or \"bar\", got {word:?}")),
        }
    }
}

impl From<Source> for PointRef {
    fn from(source: Source) -> Self {
        match source {
            Source::Bar => PointRef::Keyword("bar".to_string()),
            Source::Point(i) => PointRef::Index(i),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Bar => write!(f, "bar"),
            Source::Point(i) => write!(f, "{i}"),
        }
    }
}

/// Where a moving checker lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PointRef", into = "PointRef")]
pub enum Destination {
    Point(u8),
    Off,
}

impl TryFrom<PointRef> for Destination {
    type Error = String;

    fn try_from(value: PointRef) -> Result<Self, Self::Error> {
        match value {
            PointRef::Index(i) => checked_index(i).map(Destination::Point),
            PointRef::Keyword(word) if word == "off" => Ok(Destination::Off),
            PointRef::Keyword(word) => Err(format!("expected point index or \"off\", got {word:?}")),
        }
    }
}

impl From<Destination> for PointRef {
    fn from(dest: Destination) -> Self {
        match dest {
            Destination::Point(i) => PointRef::Index(i),
            Destination::Off => PointRef::Keyword("off".to_string()),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Point(i) => write!(f, "{i}"),
            Destination::Off => write!(f, "off"),
        }
    }
}

/// A legal move and the die value it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Source,
    pub to: Destination,
    pub die: u8,
}

/// Board facts the move generator reads.
pub struct Position<'a> {
    pub points: &'a Points,
    pub bar: &'a PerRole<u8>,
    pub dice: &'a [u8],
}

/// Enumerate every legal move for `role` with the remaining dice.
///
/// Each distinct die value is considered once, in pool order. A checker on
/// the bar must re-enter before anything else moves.
pub fn legal_moves(pos: &Position<'_>, role: Role) -> Vec<Move> {
    let mut distinct: Vec<u8> = Vec::with_capacity(pos.dice.len());
    for &die in pos.dice {
        if !distinct.contains(&die) {
            distinct.push(die);
        }
    }

    let bearing_off = board::all_home(pos.points, pos.bar[role], role);
    let mut moves = Vec::new();
    for die in distinct {
        if pos.bar[role] > 0 {
            let to = board::entry_point(role, die);
            if !pos.points[to].blocks(role) {
                moves.push(Move {
                    from: Source::Bar,
                    to: Destination::Point(to as u8),
                    die,
                });
            }
            continue;
        }

        for (from, point) in pos.points.iter().enumerate() {
            if !point.is_held_by(role) {
                continue;
            }
            match board::step(role, from, die) {
                Some(to) => {
                    if !pos.points[to].blocks(role) {
                        moves.push(Move {
                            from: Source::Point(from as u8),
                            to: Destination::Point(to as u8),
                            die,
                        });
                    }
                },
                None => {
                    if !bearing_off {
                        continue;
                    }
                    let exact = board::exact_bear_off(role, from, die);
                    if exact || !board::has_checker_behind(pos.points, role, from) {
                        moves.push(Move {
                            from: Source::Point(from as u8),
                            to: Destination::Off,
                            die,
                        });
                    }
                },
            }
        }
    }
    moves
}

/// Outcome of moving a checker onto its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Plain,
    Hit,
    BorneOff,
}

/// Apply an already-validated move. Does not touch the dice.
pub fn apply(
    points: &mut Points,
    bar: &mut PerRole<u8>,
    off: &mut PerRole<u8>,
    role: Role,
    mv: Move,
) -> Landing {
    match mv.from {
        Source::Bar => bar[role] = bar[role].saturating_sub(1),
        Source::Point(i) => board::remove_checker(&mut points[usize::from(i)]),
    }

    match mv.to {
        Destination::Off => {
            off[role] += 1;
            Landing::BorneOff
        },
        Destination::Point(i) => {
            let target = &mut points[usize::from(i)];
            let hit = target.is_blot_of(role);
            if hit {
                bar[role.opponent()] += 1;
                *target = board::Point::default();
            }
            board::add_checker(target, role);
            if hit { Landing::Hit } else { Landing::Plain }
        },
    }
}
