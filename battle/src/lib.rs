//! Battle snapshots, state building and action history.
//!
//! `pivot-battle` sits between `pivot-protocol` (wire format) and the
//! client's battle environment:
//!
//! ```text
//! pivot-protocol (events, actions)
//!        │
//!        ▼
//! pivot-battle (snapshots + history) ← THIS CRATE
//!        │
//!        └─> pivot-client (battle environment)
//! ```
//!
//! # Main Types
//!
//! - [`BattleState`] - immutable snapshot handed to whoever picks the next action
//! - [`StateBuilder`] - folds events into a running state and produces snapshots
//! - [`TrackedBattle`] - the default builder
//! - [`BattleStreamStore`] - the turn-indexed event log, and the actions each
//!   player actually took per turn
//!
//! # Example Usage
//!
//! ```
//! use pivot_battle::{BattleStreamStore, StateBuilder, TrackedBattle};
//! use pivot_protocol::{Player, parse_battle_event};
//!
//! let lines = [
//!     "|turn|1",
//!     "|move|p1a: Rotom|Volt Switch|p2a: Gyarados",
//!     "|switch|p1a: Landorus|Landorus-Therian, M|100/100|[from] Volt Switch",
//! ];
//!
//! let mut battle = TrackedBattle::new();
//! for line in lines {
//!     battle.apply(&parse_battle_event(line));
//! }
//! assert_eq!(battle.snapshot().turn_number, 1);
//!
//! let store = BattleStreamStore::from_lines(lines);
//! let actions = store.get_past_battle_actions(Player::P1, 0);
//! assert_eq!(actions[&1].len(), 2);
//! ```

mod builder;
pub mod state;
mod store;
pub mod tracking;
pub mod types;

pub use builder::StateBuilder;
pub use state::{BattleState, RosterEntry, SideRoster};
pub use store::BattleStreamStore;
pub use tracking::{TrackedBattle, player_to_index};
pub use types::{PokemonState, SideState, Status};

// Re-export commonly used protocol types
pub use pivot_protocol::{BattleAction, BattleEvent, GameType, Player};
