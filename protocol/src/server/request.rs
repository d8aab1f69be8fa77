//! Battle request types
//!
//! These types represent the JSON structure of |request| messages.
//! Every field is optional on the wire, so every field defaults.

use super::battle::Player;
use serde::Deserialize;

/// A battle request asking the player to make a decision
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    /// Request ID for synchronization
    pub rqid: Option<u64>,

    /// Active pokemon and their available moves
    #[serde(default)]
    pub active: Option<Vec<ActivePokemon>>,

    /// Information about the player's side/team
    #[serde(default)]
    pub side: Option<SideInfo>,

    /// Which slots need to switch (for doubles/triples)
    #[serde(default)]
    pub force_switch: Option<Vec<bool>>,

    /// Whether this is team preview
    #[serde(default)]
    pub team_preview: bool,

    /// Whether we're waiting for opponent
    #[serde(default)]
    pub wait: bool,

    #[serde(default)]
    pub no_cancel: bool,
}

impl BattleRequest {
    /// Check if this request requires a decision
    pub fn needs_decision(&self) -> bool {
        !self.wait && (self.team_preview || self.force_switch.is_some() || self.active.is_some())
    }

    /// Check if this is a force switch request
    pub fn is_force_switch(&self) -> bool {
        self.force_switch
            .as_ref()
            .map(|fs| fs.iter().any(|&b| b))
            .unwrap_or(false)
    }

    /// The requesting player, if the side block names one
    pub fn player(&self) -> Option<Player> {
        self.side.as_ref().and_then(SideInfo::player)
    }

    /// First active slot (singles)
    pub fn first_active(&self) -> Option<&ActivePokemon> {
        self.active.as_ref().and_then(|a| a.first())
    }

    /// Names of the moves the first active pokemon can select, in slot order
    pub fn available_moves(&self) -> Vec<String> {
        self.first_active()
            .map(|active| {
                active
                    .usable_moves()
                    .map(|(_, slot)| slot.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Party indices of pokemon that can be switched in
    pub fn available_switches(&self) -> Vec<usize> {
        self.side
            .as_ref()
            .map(|s| {
                s.pokemon
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| !p.active && !p.is_fainted())
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Information about an active pokemon in battle
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePokemon {
    /// Available moves
    #[serde(default)]
    pub moves: Vec<MoveSlot>,

    /// Whether the pokemon is trapped
    #[serde(default)]
    pub trapped: bool,

    /// Whether the pokemon might be trapped
    #[serde(default)]
    pub maybe_trapped: bool,

    /// Whether mega evolution is available
    #[serde(default)]
    pub can_mega_evo: bool,

    /// Whether dynamax is available
    #[serde(default)]
    pub can_dynamax: bool,

    /// Terastallization type (if available)
    #[serde(default)]
    pub can_terastallize: Option<String>,
}

impl ActivePokemon {
    /// Moves that are not disabled, with their slot index
    pub fn usable_moves(&self) -> impl Iterator<Item = (usize, &MoveSlot)> {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.disabled && !m.name.is_empty())
    }

    /// Check if the pokemon can switch out
    pub fn can_switch(&self) -> bool {
        !self.trapped && !self.maybe_trapped
    }

    pub fn can_tera(&self) -> bool {
        self.can_terastallize.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A move slot on an active pokemon
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSlot {
    /// Display name of the move
    #[serde(rename = "move", default)]
    pub name: String,

    /// Move ID (lowercase, no spaces)
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub pp: u32,

    #[serde(rename = "maxpp", default)]
    pub max_pp: u32,

    /// Target type (normal, self, allySide, etc.)
    #[serde(default)]
    pub target: String,

    /// Showdown sends `true`/`false` here, or a source string for some disables
    #[serde(default, deserialize_with = "deserialize_disabled")]
    pub disabled: bool,
}

fn deserialize_disabled<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Null => false,
        _ => true,
    })
}

/// Information about the player's side
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideInfo {
    /// Player's display name
    #[serde(default)]
    pub name: String,

    /// Player ID (p1, p2, etc.)
    #[serde(default)]
    pub id: String,

    /// Pokemon on this side
    #[serde(default)]
    pub pokemon: Vec<SidePokemon>,
}

impl SideInfo {
    /// Get the player enum
    pub fn player(&self) -> Option<Player> {
        Player::parse(&self.id)
    }
}

/// A pokemon on the player's side
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePokemon {
    /// Pokemon identifier (e.g., "p1: Pikachu")
    #[serde(default)]
    pub ident: String,

    /// Details string (species, level, gender, shiny)
    #[serde(default)]
    pub details: String,

    /// Current condition (HP/MaxHP status)
    #[serde(default)]
    pub condition: String,

    /// Whether this pokemon is currently active
    #[serde(default)]
    pub active: bool,

    /// Known moves
    #[serde(default)]
    pub moves: Vec<String>,

    /// Current ability
    #[serde(default)]
    pub ability: String,

    /// Held item
    #[serde(default)]
    pub item: String,

    /// Terastallize type
    #[serde(default)]
    pub teratype: Option<String>,
}

impl SidePokemon {
    /// Check if the pokemon is fainted
    pub fn is_fainted(&self) -> bool {
        self.condition == "0 fnt" || self.condition.ends_with(" fnt")
    }

    /// Get current HP as a fraction (current, max)
    pub fn hp(&self) -> Option<(u32, u32)> {
        let hp_part = self.condition.split_whitespace().next()?;
        let (current, max) = hp_part.split_once('/')?;
        Some((current.parse().ok()?, max.parse().ok()?))
    }

    /// Get the status condition (if any)
    pub fn status(&self) -> Option<&str> {
        self.condition.split_whitespace().nth(1)
    }

    /// Nickname part of the ident ("p1: Pikachu" -> "Pikachu")
    pub fn name(&self) -> &str {
        self.ident.split_once(": ").map_or(&self.ident, |(_, name)| name)
    }

    /// Get the species name from details
    pub fn species(&self) -> &str {
        self.details.split(',').next().unwrap_or(&self.details)
    }
}
