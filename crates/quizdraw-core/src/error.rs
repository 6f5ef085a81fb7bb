//! Error types for the client session layer.

use thiserror::Error;

/// Local validation failures, surfaced to the user as inline form messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your name")]
    MissingName,
    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("Please enter room code")]
    MissingRoomCode,
    #[error("Room code must be at most {max} characters")]
    RoomCodeTooLong { max: usize },
    #[error("Not in a room")]
    NotInRoom,
    #[error("No identity set for this session")]
    MissingIdentity,
}

/// Transport-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Session not initialized")]
    NotInitialized,
    #[error("Already connected")]
    AlreadyConnected,
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
    #[error("Connection failed: {0}")]
    Failed(String),
    #[error("Send failed: {0}")]
    Send(String),
}

/// Wire-format failures (malformed or unexpected payloads).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Malformed event: {0}")]
    Malformed(String),
    #[error("Failed to encode event: {0}")]
    Encode(String),
    #[error("Event {event} does not apply to {mode} rooms")]
    ModeMismatch { event: &'static str, mode: &'static str },
}

/// Top-level error for session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
