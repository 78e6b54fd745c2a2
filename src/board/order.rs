//! Order types.
//!
//! Players issue two kinds of orders each turn: deploys add fresh troops to a
//! tile, moves send troops from one tile to a neighbor. Orders are trusted as
//! submitted; the resolver only rejects what would corrupt the board.

use super::state::PlayerId;
use super::tile::TileId;

/// Add `troops` new troops to `tile`.
///
/// Field order defines the canonical sort used during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeployOrder {
    pub player: PlayerId,
    pub tile: TileId,
    pub troops: u32,
}

/// Send `troops` from `source` to the adjacent `target`.
///
/// Field order defines the canonical sort used during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveOrder {
    pub player: PlayerId,
    pub source: TileId,
    pub target: TileId,
    pub troops: u32,
}

/// A single player order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Deploy(DeployOrder),
    Move(MoveOrder),
}

impl From<DeployOrder> for Order {
    fn from(order: DeployOrder) -> Self {
        Order::Deploy(order)
    }
}

impl From<MoveOrder> for Order {
    fn from(order: MoveOrder) -> Self {
        Order::Move(order)
    }
}

/// Orders split by kind, as accumulated for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerOrders {
    pub deploys: Vec<DeployOrder>,
    pub moves: Vec<MoveOrder>,
}

impl PlayerOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, order: Order) {
        match order {
            Order::Deploy(d) => self.deploys.push(d),
            Order::Move(m) => self.moves.push(m),
        }
    }

    /// Appends all orders from `other`.
    pub fn extend(&mut self, other: PlayerOrders) {
        self.deploys.extend(other.deploys);
        self.moves.extend(other.moves);
    }

    pub fn is_empty(&self) -> bool {
        self.deploys.is_empty() && self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deploys.len() + self.moves.len()
    }

    /// Empties both buffers, returning their previous contents.
    pub fn take(&mut self) -> PlayerOrders {
        std::mem::take(self)
    }
}

impl FromIterator<Order> for PlayerOrders {
    fn from_iter<I: IntoIterator<Item = Order>>(iter: I) -> Self {
        let mut orders = PlayerOrders::new();
        for order in iter {
            orders.push(order);
        }
        orders
    }
}
