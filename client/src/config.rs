use std::time::Duration;

pub const SHOWDOWN_URL: &str = "wss://sim3.psim.us/showdown/websocket";

pub const LOGIN_URL: &str = "https://play.pokemonshowdown.com/api/login";

/// Settings for one battle environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// Room id prefixed to every outgoing command
    pub battle_room: String,

    /// Keep every snapshot, readable through `get_history`
    pub track_history: bool,

    /// Give up when no line arrives for this long. None waits forever.
    pub receive_timeout: Option<Duration>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            battle_room: "test".to_string(),
            track_history: false,
            receive_timeout: None,
        }
    }
}

impl EnvironmentConfig {
    pub fn new(battle_room: impl Into<String>) -> Self {
        Self {
            battle_room: battle_room.into(),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, track_history: bool) -> Self {
        self.track_history = track_history;
        self
    }

    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = Some(timeout);
        self
    }
}
