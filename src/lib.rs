//! Conquest engine library.
//!
//! Exposes the board model, turn resolver, session barrier, message handling,
//! and wire protocol for use by integration tests and the binary entry points.

pub mod board;
pub mod engine;
pub mod movegen;
pub mod protocol;
pub mod resolve;
pub mod selfplay;
pub mod session;
