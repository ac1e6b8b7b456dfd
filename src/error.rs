//! Typed errors for the game core and the session store.
//!
//! Everything here is local and recoverable: handlers map these to `error`
//! messages over WebSocket or 4xx JSON over HTTP. Note that a non-numeric
//! answer submission is NOT an error; it is recorded as an incorrect
//! submission with an `invalid` verdict (see `engine`).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown operator: '{0}'")]
    InvalidOperation(char),
    #[error("invalid level: {0}. No problem generator registered for this level")]
    InvalidLevel(u8),
    #[error("a game needs at least one player")]
    EmptyRoster,
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    #[error("player is eliminated: {0}")]
    PlayerEliminated(String),
    #[error("player already answered this round: {0}")]
    AlreadyAnswered(String),
    #[error("game is not active")]
    GameNotActive,
    #[error("unknown game session: {0}")]
    SessionNotFound(String),
}
