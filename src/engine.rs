//! Message handling.
//!
//! The lobby and every room implement [`GameHandler`], the capability set a
//! routed message can exercise. The lobby opens rooms; each room owns one
//! [`Session`] behind a mutex and resolves turns inside that lock. Outgoing
//! messages leave through an [`Outbox`], so the transport stays pluggable.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::board::{PlayerId, Scenario};
use crate::protocol::{
    export, ActionPayload, ClientId, Envelope, Incoming, Outgoing, OutgoingEnvelope,
    ProtocolError, RoomId,
};
use crate::session::{Session, SessionError, Submission};

/// Errors that can occur while handling a message.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("unknown room {0}")]
    UnknownRoom(RoomId),

    #[error("failed to send message: {0}")]
    Io(#[from] io::Error),
}

/// Destination for outgoing messages.
pub trait Outbox: Send + Sync {
    /// Sends `message` on behalf of `room`, or of the lobby when `None`.
    fn send(&self, room: Option<RoomId>, message: &Outgoing) -> io::Result<()>;
}

/// Writes each outgoing message as one JSON line.
pub struct JsonLinesOutbox<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesOutbox<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesOutbox {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Outbox for JsonLinesOutbox<W> {
    fn send(&self, room: Option<RoomId>, message: &Outgoing) -> io::Result<()> {
        let mut out = self.writer.lock();
        serde_json::to_writer(&mut *out, &OutgoingEnvelope { room, message })?;
        writeln!(out)?;
        out.flush()
    }
}

/// The operations a routed game message can trigger.
pub trait GameHandler: Send + Sync {
    /// Room this handler serves, or `None` for the lobby.
    fn room_id(&self) -> Option<RoomId>;

    /// Begins a game with `players` in start order.
    fn start_game(&self, players: &[PlayerId]) -> Result<(), EngineError>;

    /// Opens room `room` at the request of `client`.
    fn create_new_game(&self, client: ClientId, room: RoomId) -> Result<(), EngineError>;

    /// Submits `player`'s raw action payload for the current turn.
    fn handle_action(&self, player: PlayerId, action: &serde_json::Value)
        -> Result<(), EngineError>;
}

/// Routes a game message to `handler`.
///
/// Connection-level messages are not game messages and are ignored here.
pub fn dispatch(handler: &dyn GameHandler, message: Incoming) -> Result<(), EngineError> {
    match message {
        Incoming::Invite { client, room } => handler.create_new_game(client, room),
        Incoming::Start { players } => handler.start_game(&players),
        Incoming::Action { player, action } => handler.handle_action(player, &action),
        Incoming::Connected | Incoming::Register { .. } | Incoming::Error { .. } => {
            debug!(room = ?handler.room_id(), ?message, "not a game message");
            Ok(())
        }
    }
}

/// One game room.
pub struct Room {
    id: RoomId,
    scenario: Arc<Scenario>,
    outbox: Arc<dyn Outbox>,
    session: Mutex<Option<Session>>,
}

impl Room {
    pub fn new(id: RoomId, scenario: Arc<Scenario>, outbox: Arc<dyn Outbox>) -> Self {
        Room {
            id,
            scenario,
            outbox,
            session: Mutex::new(None),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    /// A copy of the current session, if a game is running.
    pub fn session(&self) -> Option<Session> {
        self.session.lock().clone()
    }

    fn broadcast(&self, message: &Outgoing) -> Result<(), EngineError> {
        self.outbox.send(Some(self.id), message)?;
        Ok(())
    }
}

impl GameHandler for Room {
    fn room_id(&self) -> Option<RoomId> {
        Some(self.id)
    }

    fn start_game(&self, players: &[PlayerId]) -> Result<(), EngineError> {
        let mut guard = self.session.lock();
        if guard.is_some() {
            return Err(SessionError::AlreadyStarted.into());
        }
        if players.is_empty() {
            return Err(SessionError::NoPlayers.into());
        }

        let gamestate = self.scenario.setup(players).map_err(SessionError::from)?;
        let (session, record) = Session::start(gamestate).map_err(SessionError::from)?;
        let turn = session.turn();
        *guard = Some(session);
        info!(room = self.id, ?players, "game started");

        self.broadcast(&Outgoing::state(export(&record), turn))
    }

    fn create_new_game(&self, client: ClientId, room: RoomId) -> Result<(), EngineError> {
        warn!(room = self.id, client, invited = room, "rooms cannot open rooms, ignoring");
        Ok(())
    }

    fn handle_action(
        &self,
        player: PlayerId,
        action: &serde_json::Value,
    ) -> Result<(), EngineError> {
        let orders = match ActionPayload::parse(action) {
            Ok(payload) => payload.into_orders(player),
            Err(e) => {
                warn!(room = self.id, player, error = %e, "dropping malformed action");
                return Err(e.into());
            }
        };

        let mut guard = self.session.lock();
        let session = guard.as_mut().ok_or(SessionError::NotStarted)?;
        let submission = session
            .submit_order(player, orders)
            .map_err(SessionError::from)?;

        if let Submission::Resolved(record) = submission {
            let turn = session.turn();
            info!(room = self.id, turn, "turn resolved");
            if session.is_over() {
                let winner = session.gamestate().active_players().next().map(|p| p.id);
                info!(room = self.id, turn, ?winner, "game over");
            }
            self.broadcast(&Outgoing::state(export(&record), turn))?;
        }
        Ok(())
    }
}

/// The lobby: registers the engine and opens rooms on request.
pub struct Lobby {
    name: String,
    scenario: Arc<Scenario>,
    outbox: Arc<dyn Outbox>,
    rooms: RwLock<BTreeMap<RoomId, Arc<Room>>>,
}

impl Lobby {
    pub fn new(name: impl Into<String>, scenario: Scenario, outbox: Arc<dyn Outbox>) -> Self {
        Lobby {
            name: name.into(),
            scenario: Arc::new(scenario),
            outbox,
            rooms: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn room(&self, id: RoomId) -> Option<Arc<Room>> {
        self.rooms.read().get(&id).cloned()
    }

    /// Ids of all open rooms, ascending.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.read().keys().copied().collect()
    }

    /// Announces this engine to the backend.
    pub fn register(&self) -> Result<(), EngineError> {
        self.outbox.send(None, &Outgoing::register(self.name.as_str()))?;
        Ok(())
    }

    /// Handles one decoded line: connection messages here, game messages on
    /// the room they are addressed to.
    pub fn route(&self, envelope: Envelope) -> Result<(), EngineError> {
        match envelope.message {
            Incoming::Connected => {
                info!(name = %self.name, "connected, registering");
                return self.register();
            }
            Incoming::Register { id } => {
                info!(id, "registered");
                return Ok(());
            }
            Incoming::Error { ref message } => {
                warn!(room = ?envelope.room, %message, "error from backend");
                return Ok(());
            }
            _ => {}
        }

        match envelope.room {
            None => dispatch(self, envelope.message),
            Some(id) => {
                let room = self.room(id).ok_or(EngineError::UnknownRoom(id))?;
                dispatch(room.as_ref(), envelope.message)
            }
        }
    }
}

impl GameHandler for Lobby {
    fn room_id(&self) -> Option<RoomId> {
        None
    }

    fn start_game(&self, players: &[PlayerId]) -> Result<(), EngineError> {
        warn!(?players, "start sent to the lobby, ignoring");
        Ok(())
    }

    fn create_new_game(&self, client: ClientId, room: RoomId) -> Result<(), EngineError> {
        let mut rooms = self.rooms.write();
        if rooms.contains_key(&room) {
            warn!(room, client, "room already open");
            return Ok(());
        }
        rooms.insert(
            room,
            Arc::new(Room::new(room, Arc::clone(&self.scenario), Arc::clone(&self.outbox))),
        );
        info!(room, client, "room opened");
        Ok(())
    }

    fn handle_action(
        &self,
        player: PlayerId,
        _action: &serde_json::Value,
    ) -> Result<(), EngineError> {
        warn!(player, "action sent to the lobby, ignoring");
        Ok(())
    }
}
