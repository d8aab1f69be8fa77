use std::time::Duration;

use pivot_protocol::EncodingError;
use thiserror::Error;

/// Failures of the line transport underneath a battle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport closed")]
    Closed,

    #[error("No line received within {0:?}")]
    Timeout(Duration),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Failed to send line: {0}")]
    Send(String),
}

/// Errors raised by [`BattleEnvironment`](crate::BattleEnvironment) calls.
///
/// None of these are retried internally.
#[derive(Error, Debug)]
pub enum EnvError {
    /// The stream ended before the server asked for a decision or ended the battle
    #[error("[{room}] Battle stream ended during {phase} before a decision request or battle end")]
    ProtocolDesync { room: String, phase: &'static str },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Cannot encode action: {0}")]
    Encoding(#[from] EncodingError),

    #[error("History tracking is not enabled; build the environment with EnvironmentConfig::with_history")]
    HistoryDisabled,

    #[error("Environment has not been reset yet")]
    NotInitialized,

    #[error("Battle is already over")]
    BattleOver,
}
