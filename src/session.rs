use crate::error::SignalError;
use crate::protocol::{Identity, NegotiationPayload};

/// Unordered identity pair. `{A,B}` and `{B,A}` key the same call slot, so at
/// most one session can exist between two peers at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    lo: Identity,
    hi: Identity,
}

impl PairKey {
    pub fn new(a: Identity, b: Identity) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Ringing,
    Connected,
    Ended,
}

/// One call attempt between exactly two identities.
///
/// A session only exists once someone has initiated, so it is born Ringing;
/// "idle" is simply the absence of a session for the pair. Ended is terminal:
/// the coordinator discards the session instead of reusing it.
#[derive(Debug)]
pub struct Session {
    initiator: Identity,
    responder: Identity,
    state: CallState,
    pending_offer: NegotiationPayload,
    seq: u64,
}

impl Session {
    pub fn ring(
        initiator: Identity,
        responder: Identity,
        offer: NegotiationPayload,
        seq: u64,
    ) -> Self {
        Self {
            initiator,
            responder,
            state: CallState::Ringing,
            pending_offer: offer,
            seq,
        }
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(self.initiator, self.responder)
    }

    /// Only the designated responder may accept, and only while Ringing.
    /// Anything else is rejected without mutating state.
    pub fn accept(&mut self, by: Identity) -> Result<(), SignalError> {
        if self.state != CallState::Ringing || by != self.responder {
            return Err(SignalError::InvalidTransition);
        }
        self.state = CallState::Connected;
        Ok(())
    }

    /// Drives the session to Ended. Returns false if it already was, so a
    /// double-delivered teardown never raises or re-notifies.
    pub fn end(&mut self) -> bool {
        if self.state == CallState::Ended {
            return false;
        }
        self.state = CallState::Ended;
        true
    }

    pub fn involves(&self, identity: Identity) -> bool {
        identity == self.initiator || identity == self.responder
    }

    pub fn counterpart(&self, identity: Identity) -> Option<Identity> {
        if identity == self.initiator {
            Some(self.responder)
        } else if identity == self.responder {
            Some(self.initiator)
        } else {
            None
        }
    }

    pub fn initiator(&self) -> Identity {
        self.initiator
    }

    pub fn responder(&self) -> Identity {
        self.responder
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn pending_offer(&self) -> &NegotiationPayload {
        &self.pending_offer
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}
