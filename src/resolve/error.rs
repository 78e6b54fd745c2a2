//! Fatal resolution errors.

use crate::board::TileId;

/// A turn could not be resolved without corrupting the board.
///
/// These never represent a game-rule rejection: they mean the orders or the
/// board are malformed, and the whole turn must be abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("tile {0} does not exist")]
    UnknownTile(TileId),

    #[error("tiles {0} and {1} are not connected")]
    MissingLink(TileId, TileId),

    #[error("garrison of tile {tile} would go negative: {garrison} - {troops}")]
    NegativeGarrison {
        tile: TileId,
        garrison: u32,
        troops: u32,
    },

    #[error("garrison of tile {0} overflowed")]
    GarrisonOverflow(TileId),
}
