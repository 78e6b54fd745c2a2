//! JSON wire messages.
//!
//! Every message is a JSON object tagged by its `type` field. Incoming lines
//! may carry an extra `room` field naming the room they are addressed to;
//! lines without one go to the lobby. Outgoing lines mirror that envelope.

use serde::{Deserialize, Serialize};

use crate::board::{DeployOrder, MoveOrder, PlayerId, PlayerOrders, TileId};

use super::export::StateExport;

/// Room identifier, as assigned by the backend.
pub type RoomId = u64;

/// Client identifier, as assigned by the backend.
pub type ClientId = u64;

/// Errors that can occur while decoding a message or an action payload.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty message")]
    Empty,

    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A message received from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Incoming {
    /// The connection is up; the engine should register itself.
    Connected,
    /// Registration acknowledged with the id the backend assigned us.
    Register { id: ClientId },
    /// The lobby is asked to open a room.
    Invite { client: ClientId, room: RoomId },
    /// A room's game begins with these players, in start order.
    Start { players: Vec<PlayerId> },
    /// A player's orders for the current turn. The payload is decoded later
    /// so that a malformed one only costs that player's submission.
    Action {
        player: PlayerId,
        action: serde_json::Value,
    },
    Error { message: String },
}

/// An incoming message together with its routing information.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub room: Option<RoomId>,
    pub message: Incoming,
}

/// Decodes one line of input.
///
/// An `invite` carries the room being opened in its own body and is always
/// addressed to the lobby.
pub fn parse_envelope(line: &str) -> Result<Envelope, ProtocolError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ProtocolError::Empty);
    }
    let value: serde_json::Value = serde_json::from_str(line)?;
    let message = Incoming::deserialize(&value)?;
    let room = match message {
        Incoming::Invite { .. } => None,
        _ => value
            .get("room")
            .map(RoomId::deserialize)
            .transpose()?,
    };
    Ok(Envelope { room, message })
}

/// A message sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outgoing {
    Register {
        #[serde(rename = "clientType")]
        client_type: String,
        name: String,
    },
    State { state: Box<StateExport>, turn: u64 },
}

impl Outgoing {
    /// Registration as an engine client.
    pub fn register(name: impl Into<String>) -> Self {
        Outgoing::Register {
            client_type: "engine".to_string(),
            name: name.into(),
        }
    }

    pub fn state(state: StateExport, turn: u64) -> Self {
        Outgoing::State {
            state: Box::new(state),
            turn,
        }
    }
}

/// An outgoing message with the room it belongs to.
#[derive(Debug, Serialize)]
pub struct OutgoingEnvelope<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomId>,
    #[serde(flatten)]
    pub message: &'a Outgoing,
}

/// A deploy entry in an action payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployEntry {
    pub tile_id: TileId,
    #[serde(alias = "numTroops")]
    pub troops: u32,
}

/// A move entry in an action payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEntry {
    pub source_tile_id: TileId,
    pub target_tile_id: TileId,
    #[serde(alias = "numTroops")]
    pub troops: u32,
}

/// The body of an `action` message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionPayload {
    pub deploys: Vec<DeployEntry>,
    pub moves: Vec<MoveEntry>,
}

impl ActionPayload {
    pub fn parse(value: &serde_json::Value) -> Result<ActionPayload, ProtocolError> {
        Ok(ActionPayload::deserialize(value)?)
    }

    /// Converts the payload into orders issued by `player`.
    ///
    /// The acting player always comes from the envelope; any player field
    /// inside the payload is ignored.
    pub fn into_orders(self, player: PlayerId) -> PlayerOrders {
        PlayerOrders {
            deploys: self
                .deploys
                .into_iter()
                .map(|d| DeployOrder {
                    player,
                    tile: d.tile_id,
                    troops: d.troops,
                })
                .collect(),
            moves: self
                .moves
                .into_iter()
                .map(|m| MoveOrder {
                    player,
                    source: m.source_tile_id,
                    target: m.target_tile_id,
                    troops: m.troops,
                })
                .collect(),
        }
    }
}
