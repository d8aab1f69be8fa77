//! Per-pokemon and per-side tracking types

mod pokemon;
mod side;
mod status;

pub use pokemon::PokemonState;
pub use side::{SideState, position_to_slot};
pub use status::Status;
