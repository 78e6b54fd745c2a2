//! Per-room turn barrier.
//!
//! A `Session` holds one room's game between turns: the current state, the
//! players who still owe orders, and the orders collected so far. It has no
//! internal locking; the owner keeps it behind a single lock and calls
//! [`Session::submit_order`] inside that critical section, so a turn is
//! resolved exactly once and no order can land in the wrong turn.

use std::collections::BTreeSet;

use tracing::{debug, error, warn};

use crate::board::{Gamestate, PlayerId, PlayerOrders, ScenarioError};
use crate::resolve::{process_turn, InvariantViolation, TurnRecord};

/// Errors raised by a room's game session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no game in progress")]
    NotStarted,

    #[error("game already in progress")]
    AlreadyStarted,

    #[error("cannot start a game without players")]
    NoPlayers,

    #[error("cannot set up game: {0}")]
    Setup(#[from] ScenarioError),

    #[error("turn abandoned: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The player was not owed orders this turn; nothing changed.
    Ignored,
    /// Orders accepted; other players still have to submit.
    Waiting { remaining: usize },
    /// Orders accepted and the turn resolved.
    Resolved(Box<TurnRecord>),
}

/// One room's game state and turn barrier.
#[derive(Debug, Clone)]
pub struct Session {
    gamestate: Gamestate,
    waiting: BTreeSet<PlayerId>,
    pending: PlayerOrders,
    turn: u64,
}

impl Session {
    /// Opens a session on a freshly seeded game.
    ///
    /// An empty turn is resolved first so that activity and income reflect
    /// the seeded board; its record is returned for the opening broadcast.
    pub fn start(gamestate: Gamestate) -> Result<(Session, TurnRecord), InvariantViolation> {
        let record = process_turn(&gamestate, &[], &[])?;
        let mut session = Session {
            gamestate: record.end.clone(),
            waiting: BTreeSet::new(),
            pending: PlayerOrders::new(),
            turn: 0,
        };
        session.reset_waiting();
        debug!(
            players = session.gamestate.players.len(),
            tiles = session.gamestate.board.num_tiles(),
            "game started"
        );
        Ok((session, record))
    }

    /// Records `player`'s orders for the current turn, resolving the turn
    /// once every active player has submitted.
    ///
    /// Orders from a player who is not owed orders (already submitted,
    /// eliminated, or unknown) are dropped without touching the session. If
    /// resolution fails, the turn is abandoned: the state stays as it was,
    /// collected orders are discarded, and every active player is owed
    /// orders again.
    pub fn submit_order(
        &mut self,
        player: PlayerId,
        orders: PlayerOrders,
    ) -> Result<Submission, InvariantViolation> {
        if !self.waiting.remove(&player) {
            warn!(player, turn = self.turn, "unexpected orders, ignoring");
            return Ok(Submission::Ignored);
        }
        self.pending.extend(orders);

        if !self.waiting.is_empty() {
            debug!(
                player,
                remaining = self.waiting.len(),
                "still waiting for players"
            );
            return Ok(Submission::Waiting {
                remaining: self.waiting.len(),
            });
        }

        let pending = self.pending.take();
        match process_turn(&self.gamestate, &pending.deploys, &pending.moves) {
            Ok(record) => {
                self.gamestate = record.end.clone();
                self.turn += 1;
                self.reset_waiting();
                debug!(turn = self.turn, "turn complete");
                Ok(Submission::Resolved(Box::new(record)))
            }
            Err(e) => {
                self.reset_waiting();
                error!(turn = self.turn, error = %e, "turn abandoned");
                Err(e)
            }
        }
    }

    /// Current game state.
    pub fn gamestate(&self) -> &Gamestate {
        &self.gamestate
    }

    /// Number of turns resolved so far.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Players who still owe orders this turn.
    pub fn waiting(&self) -> &BTreeSet<PlayerId> {
        &self.waiting
    }

    pub fn is_waiting_on(&self, player: PlayerId) -> bool {
        self.waiting.contains(&player)
    }

    /// Orders collected so far this turn.
    pub fn pending(&self) -> &PlayerOrders {
        &self.pending
    }

    /// True once at most one player remains active.
    pub fn is_over(&self) -> bool {
        self.gamestate.active_players().count() <= 1
    }

    fn reset_waiting(&mut self) {
        self.waiting = self.gamestate.active_players().map(|p| p.id).collect();
    }
}
