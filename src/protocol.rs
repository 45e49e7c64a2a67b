use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque offer/answer/candidate blob produced by the peers' media stacks.
/// The server relays it verbatim and never looks inside.
pub type NegotiationPayload = serde_json::Value;

/// Per-connection participant token. Minted when a socket connects and dead
/// once it disconnects; a reconnecting client gets a brand new one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Messages a client may send. Wire shape is `{"type": ..., "payload": ...}`
/// with kebab-case type tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Ring another peer with the caller's offer.
    CallInitiate {
        to: Identity,
        offer: NegotiationPayload,
    },
    /// Answer the ringing call; the responder is implicitly the sender.
    CallAccept { answer: NegotiationPayload },
    /// Hang up or decline; the affected party is implicitly the sender.
    CallEnd {},
}

/// Messages the server pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// The connection's own identity, sent once right after connect.
    IdentityAssigned(Identity),
    /// Everyone else currently online, in connection order.
    RosterUpdate(Vec<Identity>),
    CallIncoming {
        from: Identity,
        offer: NegotiationPayload,
    },
    CallAccepted { answer: NegotiationPayload },
    CallEnded {},
}
