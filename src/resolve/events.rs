//! Event records produced by turn resolution.
//!
//! Each event carries the before/after state it caused, so a consumer can
//! replay a turn without re-deriving anything from the board.

use std::cmp::Ordering;

use crate::board::{LinkId, MoveOrder, PlayerId, TileId};

/// A group of troops in transit during a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Army {
    pub player: PlayerId,
    pub troops: u32,
    pub origin: TileId,
    pub destination: TileId,
}

impl Army {
    pub fn from_order(order: &MoveOrder) -> Self {
        Army {
            player: order.player,
            troops: order.troops,
            origin: order.source,
            destination: order.target,
        }
    }

    /// Strongest first; ties broken by player then origin so the order is total.
    pub fn strongest_first(a: &Army, b: &Army) -> Ordering {
        b.troops
            .cmp(&a.troops)
            .then(a.player.cmp(&b.player))
            .then(a.origin.cmp(&b.origin))
            .then(a.destination.cmp(&b.destination))
    }
}

/// Owner and garrison of a tile at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileState {
    pub owner: Option<PlayerId>,
    pub troops: u32,
}

/// Garrison of one tile immediately before and after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GarrisonChange {
    pub before: u32,
    pub after: u32,
}

/// Fresh troops added to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeployEvent {
    pub player: PlayerId,
    pub tile: TileId,
    pub garrison: GarrisonChange,
}

impl DeployEvent {
    pub fn troops(&self) -> u32 {
        self.garrison.after - self.garrison.before
    }
}

/// A relocation between two tiles of the same owner.
///
/// `source` records the departure at muster time; `target` the arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveEvent {
    pub order: MoveOrder,
    pub source: GarrisonChange,
    pub target: GarrisonChange,
}

/// Armies meeting head-on along a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleEvent {
    pub link: LinkId,
    /// Every participating army, strongest first.
    pub armies: Vec<Army>,
    /// What is left of the winning side, still heading for its destination.
    /// `None` when the two strongest sides were even.
    pub survivor: Option<Army>,
}

/// Attacking armies against the garrison of a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiegeEvent {
    pub location: TileId,
    /// Attacking armies, strongest first.
    pub attackers: Vec<Army>,
    /// The tile before the siege.
    pub defender: TileState,
    /// The tile after the siege.
    pub outcome: TileState,
}

impl SiegeEvent {
    /// True if the tile changed hands.
    pub fn captured(&self) -> bool {
        self.outcome.owner != self.defender.owner
    }
}
