pub mod board;
pub mod dice;
pub mod moves;

use serde::{Deserialize, Serialize};

use duet_core::role::{PerRole, Role};

use board::{CHECKERS_PER_ROLE, Points};
use dice::DiceRoller;
use moves::{Destination, Landing, Move, Position, Source};

/// Points credited for winning the table game.
pub const WIN_POINTS: u32 = 5;

/// Result of a roll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollResult {
    /// Not this role's turn, dice already rolled, or the game is over.
    Ignored,
    Rolled,
    /// The roll produced no legal move and the turn passed.
    NoMoves,
}

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// Out of turn, nothing rolled, or not a legal move.
    Ignored,
    /// Moved; the same role still has dice to play.
    Continue,
    TurnPassed,
    Won(Role),
}

impl MoveResult {
    pub fn is_applied(self) -> bool {
        self != MoveResult::Ignored
    }
}

/// Table game sub-state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableGame {
    pub points: Points,
    pub bar: PerRole<u8>,
    pub off: PerRole<u8>,
    pub turn: Role,
    pub dice: Vec<u8>,
    pub rolled: bool,
    pub winner: Option<Role>,
    pub legal_moves: Vec<Move>,
    pub last_move: String,
}

impl Default for TableGame {
    fn default() -> Self {
        Self::new()
    }
}

impl TableGame {
    pub fn new() -> Self {
        Self {
            points: board::start_layout(),
            bar: PerRole::default(),
            off: PerRole::default(),
            turn: Role::P1,
            dice: Vec::new(),
            rolled: false,
            winner: None,
            legal_moves: Vec::new(),
            last_move: "Roll the dice to start.".to_string(),
        }
    }

    /// Legal moves for `role` given the current board and dice.
    pub fn moves_for(&self, role: Role) -> Vec<Move> {
        if !self.rolled || self.winner.is_some() {
            return Vec::new();
        }
        moves::legal_moves(
            &Position {
                points: &self.points,
                bar: &self.bar,
                dice: &self.dice,
            },
            role,
        )
    }

    fn refresh_moves(&mut self, role: Role) {
        self.legal_moves = self.moves_for(role);
    }

    fn pass_turn(&mut self, from: Role) {
        self.turn = from.opponent();
        self.dice.clear();
        self.rolled = false;
        self.legal_moves.clear();
    }

    /// Roll for `role` if it is their turn and nothing is pending.
    pub fn roll(&mut self, role: Role, roller: &mut dyn DiceRoller) -> RollResult {
        if self.turn != role || self.rolled || self.winner.is_some() {
            return RollResult::Ignored;
        }

        let (d1, d2) = roller.roll();
        self.dice = dice::pool((d1, d2));
        self.rolled = true;
        self.refresh_moves(role);

        if self.legal_moves.is_empty() {
            self.pass_turn(role);
            self.last_move = format!("{role} has no legal moves. Turn passed.");
            tracing::debug!(%role, d1, d2, "No legal moves after roll");
            return RollResult::NoMoves;
        }
        self.last_move = format!("{role} rolled {d1} and {d2}.");
        RollResult::Rolled
    }

    /// Play `from -> to` for `role` if it is one of the legal moves.
    pub fn play(&mut self, role: Role, from: Source, to: Destination) -> MoveResult {
        if self.turn != role || !self.rolled || self.winner.is_some() {
            return MoveResult::Ignored;
        }

        self.refresh_moves(role);
        let Some(mv) = self
            .legal_moves
            .iter()
            .copied()
            .find(|m| m.from == from && m.to == to)
        else {
            return MoveResult::Ignored;
        };

        let landing = moves::apply(&mut self.points, &mut self.bar, &mut self.off, role, mv);
        if let Some(pos) = self.dice.iter().position(|&d| d == mv.die) {
            self.dice.remove(pos);
        }
        if landing == Landing::Hit {
            tracing::debug!(%role, to = %mv.to, "Checker hit");
        }

        if self.off[role] >= CHECKERS_PER_ROLE {
            self.winner = Some(role);
            self.dice.clear();
            self.rolled = false;
            self.legal_moves.clear();
            self.last_move = format!("{role} won the table game.");
            return MoveResult::Won(role);
        }

        self.refresh_moves(role);
        if self.dice.is_empty() || self.legal_moves.is_empty() {
            self.pass_turn(role);
            self.last_move = format!("Turn passed to {}.", self.turn);
            MoveResult::TurnPassed
        } else {
            self.last_move = format!("{role} moved {from} -> {to}.");
            MoveResult::Continue
        }
    }

    /// Total checkers of `role` across board, bar and off.
    pub fn checker_total(&self, role: Role) -> u32 {
        board::on_board(&self.points, role) + u32::from(self.bar[role]) + u32::from(self.off[role])
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::collections::VecDeque;

    use duet_core::role::{PerRole, Role};

    use crate::TableGame;
    use crate::board::{POINT_COUNT, Point, Points};
    use crate::dice::DiceRoller;

    /// Dice that replay a fixed script. Once the script runs out the last
    /// roll repeats.
    #[derive(Debug, Clone)]
    pub struct LoadedDice {
        script: VecDeque<(u8, u8)>,
        last: (u8, u8),
    }

    impl LoadedDice {
        pub fn new(rolls: impl IntoIterator<Item = (u8, u8)>) -> Self {
            let script: VecDeque<_> = rolls.into_iter().collect();
            let last = script.front().copied().unwrap_or((1, 2));
            Self { script, last }
        }

        pub fn always(roll: (u8, u8)) -> Self {
            Self::new([roll])
        }
    }

    impl DiceRoller for LoadedDice {
        fn roll(&mut self) -> (u8, u8) {
            if let Some(next) = self.script.pop_front() {
                self.last = next;
            }
            self.last
        }
    }

    /// Build a board from `(point, owner, count)` stacks.
    pub fn position(stacks: &[(usize, Role, u8)]) -> Points {
        let mut points = [Point::default(); POINT_COUNT];
        for &(index, owner, count) in stacks {
            points[index] = Point::held_by(owner, count);
        }
        points
    }

    /// A game mid-way through with the given board and borne-off counts.
    pub fn game_with(points: Points, off: PerRole<u8>, turn: Role) -> TableGame {
        TableGame {
            points,
            off,
            turn,
            ..TableGame::new()
        }
    }

    /// P1 has one checker left on point 23, P2 is nowhere near home.
    pub fn p1_one_from_victory() -> TableGame {
        game_with(
            position(&[(23, Role::P1, 1), (12, Role::P2, 15)]),
            PerRole::new(14, 0),
            Role::P1,
        )
    }
}
