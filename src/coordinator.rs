use std::collections::HashMap;
use std::sync::Mutex;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::SignalError;
use crate::protocol::{Identity, NegotiationPayload, ServerMessage};
use crate::registry::Registry;
use crate::session::{CallState, PairKey, Session};

/// Per-connection outbound queue. The channel adapter drains it onto the
/// socket; the coordinator only ever enqueues, so no operation blocks on I/O.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

#[derive(Default)]
struct State {
    registry: Registry,
    sessions: HashMap<PairKey, Session>,
    next_seq: u64,
}

/// Central signaling authority: owns the registry and the active sessions,
/// routes inbound events to the right session, and emits outbound messages.
///
/// All state mutation happens under one mutex, so events for the same pair
/// are applied one at a time in arrival order and a half-applied transition
/// can never be observed. Recoverable failures are logged and the message
/// dropped; the coordinator stays correct for every other session.
#[derive(Default)]
pub struct Coordinator {
    links: DashMap<Identity, Outbound>,
    state: Mutex<State>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new connection arrived. Registers it, tells it its own identity,
    /// then pushes a refreshed roster to everyone including the newcomer.
    pub fn on_connect(&self, identity: Identity, tx: Outbound) -> Result<(), SignalError> {
        let mut state = self.state.lock().unwrap();
        if let Err(err) = state.registry.register(identity) {
            // Fresh UUIDs should never collide; reject rather than clobber
            // the existing connection's entry.
            error!(%identity, "identity collision on connect");
            return Err(err);
        }
        self.links.insert(identity, tx);
        info!(%identity, online = state.registry.len(), "peer connected");

        self.deliver(identity, ServerMessage::IdentityAssigned(identity));
        self.broadcast_roster(&state.registry);
        Ok(())
    }

    /// A connection went away. Tears down every call it was part of,
    /// notifies each still-connected counterpart exactly once, and purges
    /// the peer from the roster immediately. Safe to call twice.
    pub fn on_disconnect(&self, identity: Identity) -> Result<(), SignalError> {
        let mut state = self.state.lock().unwrap();
        if !state.registry.unregister(identity) {
            return Ok(());
        }
        self.links.remove(&identity);

        let affected: Vec<PairKey> = state
            .sessions
            .values()
            .filter(|s| s.involves(identity))
            .map(|s| s.key())
            .collect();
        for key in affected {
            if let Some(mut session) = state.sessions.remove(&key) {
                session.end();
                if let Some(other) = session.counterpart(identity) {
                    self.deliver(other, ServerMessage::CallEnded {});
                }
            }
        }

        info!(%identity, online = state.registry.len(), "peer disconnected");
        self.broadcast_roster(&state.registry);
        Ok(())
    }

    /// `from` wants to ring `to`. At most one outstanding call per pair; a
    /// second initiate while one is in flight is dropped.
    pub fn on_call_initiate(
        &self,
        from: Identity,
        to: Identity,
        offer: NegotiationPayload,
    ) -> Result<(), SignalError> {
        let mut state = self.state.lock().unwrap();
        if !state.registry.contains(to) {
            warn!(%from, %to, "dropping call-initiate to unknown target");
            return Err(SignalError::UnknownTarget);
        }
        if from == to {
            warn!(%from, "dropping self-call");
            return Err(SignalError::InvalidTransition);
        }
        let key = PairKey::new(from, to);
        if state.sessions.contains_key(&key) {
            warn!(%from, %to, "dropping call-initiate, a call is already in flight for this pair");
            return Err(SignalError::InvalidTransition);
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        let session = Session::ring(from, to, offer, seq);
        self.deliver(
            to,
            ServerMessage::CallIncoming {
                from,
                offer: session.pending_offer().clone(),
            },
        );
        state.sessions.insert(key, session);
        info!(%from, %to, "call ringing");
        Ok(())
    }

    /// The sender answers their ringing call; the matching session is the
    /// one where they are the designated responder (oldest first, should
    /// several initiators be ringing them at once).
    pub fn on_call_accept(
        &self,
        responder: Identity,
        answer: NegotiationPayload,
    ) -> Result<(), SignalError> {
        let mut state = self.state.lock().unwrap();
        let key = state
            .sessions
            .values()
            .filter(|s| s.state() == CallState::Ringing && s.responder() == responder)
            .min_by_key(|s| s.seq())
            .map(|s| s.key());
        let Some(key) = key else {
            warn!(%responder, "dropping call-accept with no ringing call");
            return Err(SignalError::NoMatchingSession);
        };
        if let Some(session) = state.sessions.get_mut(&key) {
            session.accept(responder)?;
            let initiator = session.initiator();
            self.deliver(initiator, ServerMessage::CallAccepted { answer });
            info!(%initiator, %responder, "call connected");
        }
        Ok(())
    }

    /// The sender hangs up (or declines, while still ringing). Every call
    /// involving them is torn down and each counterpart notified once.
    pub fn on_call_end(&self, identity: Identity) -> Result<(), SignalError> {
        let mut state = self.state.lock().unwrap();
        let affected: Vec<PairKey> = state
            .sessions
            .values()
            .filter(|s| s.involves(identity))
            .map(|s| s.key())
            .collect();
        if affected.is_empty() {
            warn!(%identity, "dropping call-end with no live call");
            return Err(SignalError::NoMatchingSession);
        }
        for key in affected {
            if let Some(mut session) = state.sessions.remove(&key) {
                if session.end() {
                    if let Some(other) = session.counterpart(identity) {
                        self.deliver(other, ServerMessage::CallEnded {});
                    }
                }
            }
        }
        info!(%identity, "call ended");
        Ok(())
    }

    /// Everyone currently online, in connection order.
    pub fn roster(&self) -> Vec<Identity> {
        self.state.lock().unwrap().registry.iter().collect()
    }

    /// Each peer gets the roster from its own point of view (itself
    /// excluded), matching what `registry.others` hands a late joiner.
    fn broadcast_roster(&self, registry: &Registry) {
        for identity in registry.iter() {
            self.deliver(identity, ServerMessage::RosterUpdate(registry.others(identity)));
        }
    }

    /// Enqueue for one connection. A missing link means the peer is already
    /// gone; the message is dropped silently, same as a failed send.
    fn deliver(&self, to: Identity, msg: ServerMessage) {
        if let Some(link) = self.links.get(&to) {
            let _ = link.send(msg);
        }
    }
}
