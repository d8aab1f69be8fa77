//! Immutable battle snapshots handed to decision makers

use std::collections::BTreeMap;

use pivot_protocol::{GameType, Player};

use crate::types::Status;

/// A point-in-time view of a battle.
///
/// Built by a [`StateBuilder`](crate::StateBuilder) after each batch of
/// events. Snapshots never change once built; comparing two of them tells
/// whether anything observable happened in between.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BattleState {
    /// Names of selectable moves for our first active pokemon, in slot order
    pub available_moves: Vec<String>,

    /// Party indices of pokemon we can switch to
    pub available_switches: Vec<usize>,

    pub team_preview: bool,

    pub force_switch: bool,

    pub can_mega: bool,

    pub can_tera: bool,

    pub can_dynamax: bool,

    /// The last request told us to wait for the opponent
    pub waiting: bool,

    pub battle_over: bool,

    /// Winner's username once the battle is over; empty for a tie
    pub winner: Option<String>,

    pub turn_number: u32,

    /// Which side we play, learned from the first request
    pub our_player: Option<Player>,

    pub generation: u8,

    pub tier: String,

    pub game_type: Option<GameType>,

    pub rosters: BTreeMap<Player, SideRoster>,
}

impl Default for BattleState {
    fn default() -> Self {
        Self {
            available_moves: Vec::new(),
            available_switches: Vec::new(),
            team_preview: false,
            force_switch: false,
            can_mega: false,
            can_tera: false,
            can_dynamax: false,
            waiting: false,
            battle_over: false,
            winner: None,
            turn_number: 0,
            our_player: None,
            generation: 9,
            tier: String::new(),
            game_type: None,
            rosters: BTreeMap::new(),
        }
    }
}

impl BattleState {
    pub fn roster(&self, player: Player) -> Option<&SideRoster> {
        self.rosters.get(&player)
    }

    pub fn our_roster(&self) -> Option<&SideRoster> {
        self.our_player.and_then(|p| self.roster(p))
    }

    pub fn opponent_roster(&self) -> Option<&SideRoster> {
        self.our_player.and_then(|p| self.roster(p.opponent()))
    }

    pub fn is_tie(&self) -> bool {
        self.battle_over && self.winner.as_deref() == Some("")
    }
}

/// Everything revealed about one player's team
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SideRoster {
    pub player: Player,
    pub username: String,
    pub pokemon: Vec<RosterEntry>,
}

impl SideRoster {
    pub fn active(&self) -> impl Iterator<Item = &RosterEntry> {
        self.pokemon.iter().filter(|p| p.active)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RosterEntry {
    pub name: String,
    pub species: String,
    pub hp_current: u32,
    pub hp_max: Option<u32>,
    pub status: Option<Status>,
    pub fainted: bool,
    pub active: bool,
    pub known_moves: Vec<String>,
}
