//! The board graph.
//!
//! A board has a fixed shape once built: tiles are never added or removed and
//! links never change. Only tile contents (owner, garrison) are mutated, and
//! only by turn resolution. Connectivity queries go through a dense adjacency
//! matrix for O(1) lookup.

use std::collections::BTreeMap;

use tracing::debug;

use super::state::PlayerId;
use super::tile::{Link, LinkId, Tile, TileId};

/// Errors that can occur while building a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("link ({0}, {1}) references a tile outside 0..{2}")]
    TileOutOfRange(TileId, TileId, usize),

    #[error("tile {0} cannot be linked to itself")]
    SelfLoop(TileId),

    #[error("duplicate link between tiles {0} and {1}")]
    DuplicateLink(TileId, TileId),
}

/// Tiles, links, and the adjacency matrix that ties them together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub tiles: Vec<Tile>,
    pub links: Vec<Link>,
    /// Row-major `tiles.len() x tiles.len()` matrix, symmetric.
    adjacency: Vec<bool>,
    /// Canonical (low, high) tile pair to link id.
    link_index: BTreeMap<(TileId, TileId), LinkId>,
}

impl Board {
    /// Builds an empty board with `num_tiles` unowned tiles and one link per pair.
    ///
    /// Pairs may be given in any orientation and order; link ids are assigned
    /// in ascending canonical-pair order so that the same set of pairs always
    /// yields the same ids.
    pub fn new(num_tiles: usize, pairs: &[(TileId, TileId)]) -> Result<Board, BoardError> {
        let mut canonical = Vec::with_capacity(pairs.len());
        for &(x, y) in pairs {
            if x >= num_tiles || y >= num_tiles {
                return Err(BoardError::TileOutOfRange(x, y, num_tiles));
            }
            if x == y {
                return Err(BoardError::SelfLoop(x));
            }
            canonical.push(Link::canonical(x, y));
        }
        canonical.sort_unstable();
        if let Some(w) = canonical.windows(2).find(|w| w[0] == w[1]) {
            return Err(BoardError::DuplicateLink(w[0].0, w[0].1));
        }

        let mut board = Board {
            tiles: (0..num_tiles).map(Tile::new).collect(),
            links: Vec::with_capacity(canonical.len()),
            adjacency: vec![false; num_tiles * num_tiles],
            link_index: BTreeMap::new(),
        };

        for (id, (a, b)) in canonical.into_iter().enumerate() {
            board.adjacency[a * num_tiles + b] = true;
            board.adjacency[b * num_tiles + a] = true;
            board.tiles[a].add_neighbor(b);
            board.tiles[b].add_neighbor(a);
            board.links.push(Link { id, a, b });
            board.link_index.insert((a, b), id);
        }

        debug!(
            tiles = num_tiles,
            links = board.links.len(),
            "created empty board"
        );
        Ok(board)
    }

    /// Number of tiles on the board.
    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id)
    }

    /// Returns true if a link joins `x` and `y`. Unknown tiles are never adjacent.
    pub fn is_adjacent(&self, x: TileId, y: TileId) -> bool {
        let n = self.tiles.len();
        x < n && y < n && self.adjacency[x * n + y]
    }

    /// Returns the id of the link joining `x` and `y`, if any.
    pub fn find_link(&self, x: TileId, y: TileId) -> Option<LinkId> {
        self.link_index.get(&Link::canonical(x, y)).copied()
    }

    /// Returns the tile at the far end of `link` as seen from `from`.
    pub fn other_endpoint(&self, link: LinkId, from: TileId) -> Option<TileId> {
        self.links.get(link).and_then(|l| l.other_endpoint(from))
    }

    /// Number of tiles currently controlled by `player`.
    pub fn tiles_owned_by(&self, player: PlayerId) -> usize {
        self.tiles.iter().filter(|t| t.is_owned_by(player)).count()
    }

    /// Sum of all garrisons on the board.
    pub fn total_garrison(&self) -> u64 {
        self.tiles.iter().map(|t| u64::from(t.garrison)).sum()
    }
}
