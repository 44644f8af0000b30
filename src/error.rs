//! Domain errors. A rejected drop is not an error; these are invariant violations.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A write was attempted at an origin that does not fit the board.
    #[error("placement at ({gx}, {gy}) is out of bounds or overlaps occupied cells")]
    InvalidPlacement { gx: i32, gy: i32 },

    /// Board occupancy no longer matches what placed pieces account for.
    #[error("grid state corrupted: {occupied} occupied cells, {expected} accounted for by placements")]
    Corruption { occupied: usize, expected: usize },
}
