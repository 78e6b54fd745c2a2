//! Game state representation.
//!
//! A `Gamestate` is the complete snapshot of one room's game between turns:
//! the board, the player roster, and the rules the turn processor applies.

use super::graph::Board;
use super::scenario::Rules;

/// Opaque player identifier, as assigned by the lobby.
pub type PlayerId = u32;

/// A participant in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Player {
    pub id: PlayerId,
    /// Troops the player may deploy next turn.
    pub armies_to_deploy: u32,
    /// False once the player controls no tiles.
    pub active: bool,
}

impl Player {
    /// Creates an active player with the given income.
    pub fn new(id: PlayerId, armies_to_deploy: u32) -> Self {
        Player {
            id,
            armies_to_deploy,
            active: true,
        }
    }
}

/// Complete game state at a turn boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gamestate {
    pub board: Board,
    /// Roster in start order. Eliminated players stay, flagged inactive.
    pub players: Vec<Player>,
    pub rules: Rules,
}

impl Gamestate {
    pub fn new(board: Board, players: Vec<Player>, rules: Rules) -> Self {
        Gamestate {
            board,
            players,
            rules,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Players still in the game.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter().filter(|p| p.active)
    }
}
