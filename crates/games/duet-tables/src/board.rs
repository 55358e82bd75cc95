use serde::{Deserialize, Serialize};

use duet_core::role::Role;

pub const POINT_COUNT: usize = 24;
pub const CHECKERS_PER_ROLE: u8 = 15;

/// A single point on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub owner: Option<Role>,
    pub count: u8,
}

impl Point {
    pub fn held_by(owner: Role, count: u8) -> Self {
        Self {
            owner: Some(owner),
            count,
        }
    }

    /// Opponent holds two or more checkers here.
    pub fn blocks(&self, role: Role) -> bool {
        self.owner == Some(role.opponent()) && self.count >= 2
    }

    /// Exactly one opposing checker sits here.
    pub fn is_blot_of(&self, role: Role) -> bool {
        self.owner == Some(role.opponent()) && self.count == 1
    }

    pub fn is_held_by(&self, role: Role) -> bool {
        self.owner == Some(role) && self.count > 0
    }
}

pub type Points = [Point; POINT_COUNT];

/// Opening layout. P1 runs toward 23, P2 toward 0.
pub fn start_layout() -> Points {
    let mut points = [Point::default(); POINT_COUNT];
    points[0] = Point::held_by(Role::P1, 2);
    points[11] = Point::held_by(Role::P1, 5);
    points[16] = Point::held_by(Role::P1, 3);
    points[18] = Point::held_by(Role::P1, 5);

    points[23] = Point::held_by(Role::P2, 2);
    points[12] = Point::held_by(Role::P2, 5);
    points[7] = Point::held_by(Role::P2, 3);
    points[5] = Point::held_by(Role::P2, 5);
    points
}

pub fn is_home(role: Role, index: usize) -> bool {
    match role {
        Role::P1 => (18..=23).contains(&index),
        Role::P2 => index <= 5,
    }
}

/// Point a checker re-enters on from the bar with `die`.
pub fn entry_point(role: Role, die: u8) -> usize {
    match role {
        Role::P1 => usize::from(die) - 1,
        Role::P2 => POINT_COUNT - usize::from(die),
    }
}

/// Destination of a `die` step from `from`, or `None` past the board edge.
pub fn step(role: Role, from: usize, die: u8) -> Option<usize> {
    let die = usize::from(die);
    match role {
        Role::P1 => Some(from + die).filter(|&to| to < POINT_COUNT),
        Role::P2 => from.checked_sub(die),
    }
}

/// The step from `from` with `die` lands exactly one past the last point.
pub fn exact_bear_off(role: Role, from: usize, die: u8) -> bool {
    let die = usize::from(die);
    match role {
        Role::P1 => from + die == POINT_COUNT,
        Role::P2 => die == from + 1,
    }
}

/// Some checker of `role` sits farther from home than `from`.
pub fn has_checker_behind(points: &Points, role: Role, from: usize) -> bool {
    match role {
        Role::P1 => points[..from].iter().any(|p| p.is_held_by(role)),
        Role::P2 => points[from + 1..].iter().any(|p| p.is_held_by(role)),
    }
}

/// Every checker of `role` still in play lies in its home region.
pub fn all_home(points: &Points, bar: u8, role: Role) -> bool {
    bar == 0
        && points
            .iter()
            .enumerate()
            .all(|(i, p)| !p.is_held_by(role) || is_home(role, i))
}

pub fn remove_checker(point: &mut Point) {
    point.count = point.count.saturating_sub(1);
    if point.count == 0 {
        point.owner = None;
    }
}

pub fn add_checker(point: &mut Point, role: Role) {
    if point.count == 0 || point.owner.is_none() {
        *point = Point::held_by(role, 1);
    } else if point.owner == Some(role) {
        point.count += 1;
    }
}

/// Checkers of `role` on the board.
pub fn on_board(points: &Points, role: Role) -> u32 {
    points
        .iter()
        .filter(|p| p.owner == Some(role))
        .map(|p| u32::from(p.count))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_layout_has_fifteen_each() {
        let points = start_layout();
        assert_eq!(on_board(&points, Role::P1), 15);
        assert_eq!(on_board(&points, Role::P2), 15);
        assert_eq!(points[0], Point::held_by(Role::P1, 2));
        assert_eq!(points[11], Point::held_by(Role::P1, 5));
        assert_eq!(points[16], Point::held_by(Role::P1, 3));
        assert_eq!(points[18], Point::held_by(Role::P1, 5));
        assert_eq!(points[23], Point::held_by(Role::P2, 2));
        assert_eq!(points[12], Point::held_by(Role::P2, 5));
        assert_eq!(points[7], Point::held_by(Role::P2, 3));
        assert_eq!(points[5], Point::held_by(Role::P2, 5));
    }

    #[test]
    fn layout_is_mirrored() {
        let points = start_layout();
        for i in 0..POINT_COUNT {
            let mirror = points[POINT_COUNT - 1 - i];
            assert_eq!(points[i].count, mirror.count, "point {i}");
            assert_eq!(points[i].owner, mirror.owner.map(Role::opponent));
        }
    }

    #[test]
    fn home_regions() {
        assert!(is_home(Role::P1, 18) && is_home(Role::P1, 23));
        assert!(!is_home(Role::P1, 17));
        assert!(is_home(Role::P2, 0) && is_home(Role::P2, 5));
        assert!(!is_home(Role::P2, 6));
    }

    #[test]
    fn entry_points() {
        assert_eq!(entry_point(Role::P1, 1), 0);
        assert_eq!(entry_point(Role::P1, 6), 5);
        assert_eq!(entry_point(Role::P2, 1), 23);
        assert_eq!(entry_point(Role::P2, 6), 18);
    }

    #[test]
    fn steps_and_edges() {
        assert_eq!(step(Role::P1, 20, 3), Some(23));
        assert_eq!(step(Role::P1, 21, 3), None);
        assert_eq!(step(Role::P2, 3, 3), Some(0));
        assert_eq!(step(Role::P2, 2, 3), None);
        assert!(exact_bear_off(Role::P1, 21, 3));
        assert!(!exact_bear_off(Role::P1, 21, 4));
        assert!(exact_bear_off(Role::P2, 2, 3));
        assert!(!exact_bear_off(Role::P2, 2, 4));
    }

    #[test]
    fn add_and_remove_keep_owner_consistent() {
        let mut p = Point::default();
        add_checker(&mut p, Role::P2);
        assert_eq!(p, Point::held_by(Role::P2, 1));
        add_checker(&mut p, Role::P2);
        assert_eq!(p.count, 2);
        remove_checker(&mut p);
        remove_checker(&mut p);
        assert_eq!(p, Point::default());
    }
}
