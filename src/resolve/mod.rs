//! Turn resolution.
//!
//! Turns a set of simultaneous deploy and move orders into a new board state
//! and a replayable event log: muster and classification, battle and siege
//! combat, and the phase pipeline that ties them together.

pub mod combat;
pub mod error;
pub mod events;
pub mod muster;
pub mod turn;

pub use combat::{resolve_battle, resolve_siege};
pub use error::InvariantViolation;
pub use events::{
    Army, BattleEvent, DeployEvent, GarrisonChange, MoveEvent, SiegeEvent, TileState,
};
pub use muster::{muster_armies, BattleGroup, Muster};
pub use turn::{process_turn, TurnRecord};
