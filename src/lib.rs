//! WebSocket signaling node for one-to-one audio/video calls.
//!
//! Peers connect, receive a server-assigned identity and a roster of other
//! online peers, and negotiate calls by relaying opaque offer/answer blobs
//! through the [`coordinator::Coordinator`]. The coordinator never inspects
//! negotiation payloads; it only tracks who is online and what state each
//! call attempt is in.

pub mod coordinator;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
