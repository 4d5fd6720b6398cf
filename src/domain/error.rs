//! Action validation failures.

use thiserror::Error;

/// Why a plant/nurture/collect request was rejected. These are expected
/// traffic from clients acting on slightly stale local state; the Display
/// string is sent back to the acting player as the `actionFailed` message
/// and nothing is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("The game is not in progress")]
    GameNotActive,
    #[error("That is not a planting slot")]
    InvalidSlot,
    #[error("Something is already growing in that slot")]
    SlotOccupied,
    #[error("You need a petal to plant a flower")]
    NeedsPetal,
    #[error("There is no flower in that slot")]
    NoFlower,
    #[error("That flower is already in full bloom")]
    AlreadyBloomed,
    #[error("You need water to nurture a flower")]
    NeedsWater,
}
