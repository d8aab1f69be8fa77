//! Battle environment for Pokemon Showdown.
//!
//! A [`BattleEnvironment`] runs one battle room over any [`Transport`]:
//! it reads protocol lines until the server asks for a decision, hands back a
//! [`BattleState`] snapshot, and sends the caller's [`BattleAction`] as a
//! `/choose` command.
//!
//! Live play shares one websocket [`Connection`] between many rooms through a
//! [`RoomRouter`], which gives each room its own [`ChannelTransport`].

mod auth;
mod config;
mod connection;
mod environment;
mod error;
mod router;
mod transport;

pub use auth::login;
pub use config::{EnvironmentConfig, LOGIN_URL, SHOWDOWN_URL};
pub use connection::Connection;
pub use environment::{BattleEnvironment, Phase};
pub use error::{EnvError, TransportError};
pub use router::{OutgoingLines, RoomRouter};
pub use transport::{ChannelTransport, Transport};

pub use pivot_battle::{BattleState, BattleStreamStore, StateBuilder, TrackedBattle};
pub use pivot_protocol::{
    ActionType, BattleAction, ClientCommand, ClientMessage, GlobalMessage, Player, RoomType,
    ServerFrame, parse_global_message,
};
