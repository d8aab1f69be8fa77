//! Tracked state of a single pokemon

use pivot_protocol::{HpStatus, PokemonDetails, to_id};

use super::status::Status;
use crate::state::RosterEntry;

/// What we know about one pokemon, from events and (for our side) requests
#[derive(Debug, Clone, PartialEq)]
pub struct PokemonState {
    /// Nickname as shown in event identifiers
    pub name: String,

    pub species: String,

    pub level: u8,

    /// Current HP. A percentage for opponents, an absolute value for our side.
    pub hp_current: u32,

    pub hp_max: Option<u32>,

    pub status: Option<Status>,

    pub fainted: bool,

    pub active: bool,

    /// Moves seen in use, or the full moveset from a request
    pub known_moves: Vec<String>,

    pub tera_type: Option<String>,

    pub terastallized: bool,
}

impl PokemonState {
    /// Create from a details string, defaulting the nickname to the species
    pub fn from_details(details: &PokemonDetails, name: &str) -> Self {
        let name = if name.is_empty() {
            details.species.clone()
        } else {
            name.to_string()
        };

        Self {
            name,
            species: details.species.clone(),
            level: details.level.unwrap_or(100),
            hp_current: 100,
            hp_max: Some(100),
            status: None,
            fainted: false,
            active: false,
            known_moves: Vec::new(),
            tera_type: details.tera_type.clone(),
            terastallized: false,
        }
    }

    /// Update species and level, e.g. after a forme change
    pub fn apply_details(&mut self, details: &PokemonDetails) {
        self.species = details.species.clone();
        self.level = details.level.unwrap_or(self.level);
        if details.tera_type.is_some() {
            self.tera_type = details.tera_type.clone();
        }
    }

    /// Whether an event identifier or request name refers to this pokemon
    pub fn matches(&self, name: &str) -> bool {
        let id = to_id(name);
        to_id(&self.name) == id || to_id(&self.species) == id
    }

    pub fn record_move(&mut self, move_name: &str) {
        if !self.known_moves.iter().any(|m| to_id(m) == to_id(move_name)) {
            self.known_moves.push(move_name.to_string());
        }
    }

    /// Apply HP and status from protocol HpStatus
    pub fn apply_hp_status(&mut self, hp_status: &HpStatus) {
        self.hp_current = hp_status.current;
        if let Some(max) = hp_status.max {
            self.hp_max = Some(max);
        }

        match hp_status.status.as_deref() {
            Some("fnt") => {
                self.fainted = true;
                self.status = None;
            }
            Some(status) => self.status = Status::from_protocol(status),
            // An HP update without a status keeps the current one
            None => {}
        }

        if self.hp_current == 0 {
            self.fainted = true;
        }
    }

    pub fn faint(&mut self) {
        self.fainted = true;
        self.hp_current = 0;
        self.active = false;
        self.status = None;
    }

    pub fn is_alive(&self) -> bool {
        !self.fainted
    }

    pub fn to_entry(&self) -> RosterEntry {
        RosterEntry {
            name: self.name.clone(),
            species: self.species.clone(),
            hp_current: self.hp_current,
            hp_max: self.hp_max,
            status: self.status,
            fainted: self.fainted,
            active: self.active,
            known_moves: self.known_moves.clone(),
        }
    }
}
