//! Scenario and rules configuration.
//!
//! A scenario describes the map a game is played on and which tiles each
//! player starts with, keyed by player count. Scenarios are plain data and
//! can be loaded from JSON; the default is the five-tile example map.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::graph::{Board, BoardError};
use super::state::{Gamestate, Player, PlayerId};
use super::tile::TileId;

/// Errors that can occur while loading a scenario or setting up a game from it.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid scenario board: {0}")]
    Board(#[from] BoardError),

    #[error("scenario has no seed tiles for {players} players on {tiles} tiles")]
    TooManyPlayers { players: usize, tiles: usize },

    #[error("seed tile {0} does not exist")]
    SeedOutOfRange(TileId),

    #[error("player {0} listed more than once")]
    DuplicatePlayer(PlayerId),
}

/// Income rules applied at the end of every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rules {
    /// Troops every active player receives regardless of territory.
    pub base_income: u32,
    /// Additional troops per controlled tile.
    pub income_per_tile: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            base_income: 5,
            income_per_tile: 1,
        }
    }
}

impl Rules {
    /// Income for a player controlling `tiles` tiles.
    pub fn income(&self, tiles: usize) -> u32 {
        let tiles = u32::try_from(tiles).unwrap_or(u32::MAX);
        self.base_income
            .saturating_add(self.income_per_tile.saturating_mul(tiles))
    }
}

/// Map layout and starting positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    pub tiles: usize,
    pub links: Vec<(TileId, TileId)>,
    /// Garrison placed on every seeded tile.
    pub starting_garrison: u32,
    /// Seed tiles by player count. Player `i` in start order receives `seeds[n][i]`.
    pub seeds: BTreeMap<usize, Vec<TileId>>,
    pub rules: Rules,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            name: "example".to_string(),
            tiles: 5,
            links: vec![(0, 1), (0, 2), (0, 4), (1, 2), (2, 3), (3, 4)],
            starting_garrison: 0,
            seeds: BTreeMap::from([(1, vec![0]), (2, vec![0, 2])]),
            rules: Rules::default(),
        }
    }
}

impl Scenario {
    /// Parses a scenario from a JSON document. Missing fields take default values.
    pub fn from_json(s: &str) -> Result<Scenario, ScenarioError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads and parses a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        Scenario::from_json(&text)
    }

    /// Builds the empty board for this scenario.
    pub fn build_board(&self) -> Result<Board, BoardError> {
        Board::new(self.tiles, &self.links)
    }

    /// Seed tiles for a game with `players` participants.
    ///
    /// Uses the explicit entry for that player count when present, otherwise
    /// hands out tiles `0..players` in order.
    pub fn seed_tiles(&self, players: usize) -> Result<Vec<TileId>, ScenarioError> {
        let seeds = match self.seeds.get(&players) {
            Some(seeds) if seeds.len() >= players => seeds[..players].to_vec(),
            Some(_) => {
                return Err(ScenarioError::TooManyPlayers {
                    players,
                    tiles: self.tiles,
                })
            }
            None if players <= self.tiles => (0..players).collect(),
            None => {
                return Err(ScenarioError::TooManyPlayers {
                    players,
                    tiles: self.tiles,
                })
            }
        };
        if let Some(&bad) = seeds.iter().find(|&&t| t >= self.tiles) {
            return Err(ScenarioError::SeedOutOfRange(bad));
        }
        Ok(seeds)
    }

    /// Creates the opening game state for the given players, in start order.
    pub fn setup(&self, player_ids: &[PlayerId]) -> Result<Gamestate, ScenarioError> {
        let mut seen = BTreeSet::new();
        if let Some(&dup) = player_ids.iter().find(|&&id| !seen.insert(id)) {
            return Err(ScenarioError::DuplicatePlayer(dup));
        }

        let mut board = self.build_board()?;
        for (&player, tile) in player_ids.iter().zip(self.seed_tiles(player_ids.len())?) {
            let tile = &mut board.tiles[tile];
            tile.owner = Some(player);
            tile.garrison = self.starting_garrison;
        }

        let players = player_ids
            .iter()
            .map(|&id| Player::new(id, self.rules.base_income))
            .collect();
        Ok(Gamestate::new(board, players, self.rules))
    }
}
