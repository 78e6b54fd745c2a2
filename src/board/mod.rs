//! Board representation and game-state types.
//!
//! Contains the board graph, tiles and links, orders, players, and the
//! scenario configuration used to seed new games.

pub mod graph;
pub mod order;
pub mod scenario;
pub mod state;
pub mod tile;

pub use graph::{Board, BoardError};
pub use order::{DeployOrder, MoveOrder, Order, PlayerOrders};
pub use scenario::{Rules, Scenario, ScenarioError};
pub use state::{Gamestate, Player, PlayerId};
pub use tile::{Link, LinkId, Tile, TileId};
