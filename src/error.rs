use thiserror::Error;

/// Recoverable signaling failures. None of these are fatal: the coordinator
/// drops the offending message and stays live for every other session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignalError {
    /// The identity generator handed out a token that is already registered.
    /// Should be impossible with fresh per-connection UUIDs; rejected rather
    /// than letting it corrupt the registry.
    #[error("identity is already registered")]
    DuplicateIdentity,

    /// The call target is not in the registry (offline or never existed).
    #[error("target identity is not connected")]
    UnknownTarget,

    /// An accept or end referenced a pair with no live session.
    #[error("no live session matches the sender")]
    NoMatchingSession,

    /// The state machine rejected an out-of-order message, e.g. an accept
    /// from someone other than the designated responder.
    #[error("message is invalid for the current call state")]
    InvalidTransition,
}
