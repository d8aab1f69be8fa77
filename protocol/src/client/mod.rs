mod action;

pub use action::{ActionType, BattleAction, EncodingError, encode};

/// Commands that clients can send to server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// /trn USERNAME,0,ASSERTION (or /trn USERNAME,0 on servers without a login server)
    TrustedLogin { username: String, assertion: String },

    /// /join ROOMID
    JoinRoom(String),

    /// /leave ROOMID
    LeaveRoom(String),

    /// /utm TEAM
    UpdateTeam(String),

    /// /search FORMAT
    Search(String),

    /// /choose CHOICE, optionally pinned to a request id as CHOICE|RQID
    Choose { choice: String, rqid: Option<u64> },

    /// /forfeit
    Forfeit,

    /// /timer on|off
    Timer(bool),

    /// Raw command for catch-all
    Raw(String),
}

impl ClientCommand {
    /// Serialize command to protocol format
    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::TrustedLogin {
                username,
                assertion,
            } if assertion.is_empty() => format!("/trn {},0", username),
            Self::TrustedLogin {
                username,
                assertion,
            } => format!("/trn {},0,{}", username, assertion),
            Self::JoinRoom(room) => format!("/join {}", room),
            Self::LeaveRoom(room) => format!("/leave {}", room),
            Self::UpdateTeam(team) => format!("/utm {}", team),
            Self::Search(format) => format!("/search {}", format),
            Self::Choose { choice, rqid } => match rqid {
                Some(rqid) => format!("/choose {}|{}", choice, rqid),
                None => format!("/choose {}", choice),
            },
            Self::Forfeit => "/forfeit".to_string(),
            Self::Timer(on) => format!("/timer {}", if *on { "on" } else { "off" }),
            Self::Raw(command) => command.clone(),
        }
    }
}

/// Client message with optional room context
#[derive(Debug, Clone, PartialEq)]
pub struct ClientMessage {
    pub room_id: Option<String>,
    pub command: ClientCommand,
}

impl ClientMessage {
    /// Serialize to wire format: ROOMID|TEXT or |TEXT
    pub fn to_wire_format(&self) -> String {
        let text = self.command.to_protocol_string();
        match &self.room_id {
            Some(room) => format!("{}|{}", room, text),
            None => format!("|{}", text),
        }
    }
}
