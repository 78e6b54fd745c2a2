//! Tiles and links: the nodes and edges of the board graph.
//!
//! Tiles refer to their neighbors by id only; all lookups go through the
//! owning [`Board`](super::Board).

use super::state::PlayerId;

/// Index of a tile on the board.
pub type TileId = usize;

/// Index of a link on the board.
pub type LinkId = usize;

/// A territory on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    /// Controlling player, or `None` while the tile is unowned.
    pub owner: Option<PlayerId>,
    pub garrison: u32,
    pub neighbors: Vec<TileId>,
}

impl Tile {
    /// Creates an unowned, empty tile with no neighbors.
    pub fn new(id: TileId) -> Self {
        Tile {
            id,
            owner: None,
            garrison: 0,
            neighbors: Vec::new(),
        }
    }

    /// Registers a neighboring tile.
    pub fn add_neighbor(&mut self, neighbor: TileId) {
        self.neighbors.push(neighbor);
    }

    /// Returns true if the tile is controlled by `player`.
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }
}

/// An undirected edge between two tiles, stored low-id-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub id: LinkId,
    pub a: TileId,
    pub b: TileId,
}

impl Link {
    /// Orders a tile pair low-id-first.
    pub const fn canonical(x: TileId, y: TileId) -> (TileId, TileId) {
        if x > y {
            (y, x)
        } else {
            (x, y)
        }
    }

    /// Returns the endpoint opposite `from`, or `None` if `from` is not an endpoint.
    pub fn other_endpoint(&self, from: TileId) -> Option<TileId> {
        if from == self.a {
            Some(self.b)
        } else if from == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}
