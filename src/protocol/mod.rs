//! Wire protocol.
//!
//! JSON message envelopes exchanged with the backend, the action payload a
//! player submits each turn, and the export view of a resolved turn that is
//! broadcast in `state` messages.

pub mod export;
pub mod message;

pub use export::{export, StateExport};
pub use message::{
    parse_envelope, ActionPayload, ClientId, Envelope, Incoming, Outgoing, OutgoingEnvelope,
    ProtocolError, RoomId,
};
