use rand::Rng;

/// Source of dice for the table game.
pub trait DiceRoller: Send + Sync {
    /// Two independent values in `1..=6`.
    fn roll(&mut self) -> (u8, u8);
}

/// Uniform dice drawn from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDice;

impl DiceRoller for ThreadRngDice {
    fn roll(&mut self) -> (u8, u8) {
        let mut rng = rand::rng();
        (rng.random_range(1..=6), rng.random_range(1..=6))
    }
}

/// Expand a roll into the dice pool: doubles give four moves.
pub fn pool(roll: (u8, u8)) -> Vec<u8> {
    let (d1, d2) = roll;
    if d1 == d2 { vec![d1; 4] } else { vec![d1, d2] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_rng_stays_in_range() {
        let mut dice = ThreadRngDice;
        for _ in 0..500 {
            let (a, b) = dice.roll();
            assert!((1..=6).contains(&a));
            assert!((1..=6).contains(&b));
        }
    }

    #[test]
    fn doubles_expand_to_four() {
        assert_eq!(pool((4, 4)), vec![4, 4, 4, 4]);
        assert_eq!(pool((3, 5)), vec![3, 5]);
    }
}
