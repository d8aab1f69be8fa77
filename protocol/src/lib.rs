use thiserror::Error;

pub mod client;
mod normalize;
pub mod server;

pub use client::{ActionType, BattleAction, ClientCommand, ClientMessage, EncodingError, encode};
pub use normalize::{normalize_name, to_id};
pub use server::{
    BattleEvent, BattleMessage, BattleRequest, GameType, GlobalMessage, HpStatus, Player, Pokemon,
    PokemonDetails, RoomType, ServerFrame, SidePokemon, Stat, parse_battle_event, parse_global_message,
    parse_server_frame,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty message")]
    EmptyMessage,
}
