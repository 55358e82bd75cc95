use duet_core::role::{PerRole, Winner};

/// Finishes closer together than this are a tie.
pub const TIE_WINDOW_MS: u64 = 700;

/// Points for finishing first outside the tie window.
pub const WIN_POINTS: u32 = 3;

/// Points awarded to each role on a tie.
pub const TIE_POINTS: u32 = 2;

/// Points for each owned collectible picked up.
pub const ITEM_POINTS: u32 = 1;

/// Decide the race from the two finish timestamps.
///
/// Returns the stage winner and the points each role earns from it.
pub fn resolve_finish(finished_at: PerRole<u64>) -> (Winner, PerRole<u32>) {
    let gap = finished_at.p1.abs_diff(finished_at.p2);
    if gap < TIE_WINDOW_MS {
        (Winner::Tie, PerRole::splat(TIE_POINTS))
    } else if finished_at.p1 < finished_at.p2 {
        (Winner::P1, PerRole::new(WIN_POINTS, 0))
    } else {
        (Winner::P2, PerRole::new(0, WIN_POINTS))
    }
}
