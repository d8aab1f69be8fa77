//! Side (player) state

use pivot_protocol::Player;

use super::pokemon::PokemonState;
use crate::state::SideRoster;

/// One player's side of the battle
#[derive(Debug, Clone, PartialEq)]
pub struct SideState {
    pub player: Player,

    pub username: String,

    /// Pokemon on this side, in the order they were revealed
    pub pokemon: Vec<PokemonState>,

    /// Currently active pokemon indices.
    /// For singles: [Some(idx)] or [None]
    /// For doubles: [Some(idx1), Some(idx2)] etc.
    pub active_indices: Vec<Option<usize>>,

    pub team_size: Option<u8>,
}

impl SideState {
    pub fn new(player: Player, username: impl Into<String>) -> Self {
        Self {
            player,
            username: username.into(),
            pokemon: Vec::new(),
            active_indices: vec![None], // Default to singles
            team_size: None,
        }
    }

    /// Set the number of active slots (1 for singles, 2 for doubles, etc.)
    pub fn set_active_slots(&mut self, count: usize) {
        self.active_indices.resize(count, None);
    }

    /// Put a pokemon into a slot, marking whatever was there as benched
    pub fn set_active(&mut self, slot: usize, pokemon_index: usize) {
        if slot >= self.active_indices.len() {
            self.active_indices.resize(slot + 1, None);
        }

        if let Some(Some(previous)) = self.active_indices.get(slot).copied()
            && let Some(poke) = self.pokemon.get_mut(previous)
        {
            poke.active = false;
        }

        self.active_indices[slot] = Some(pokemon_index);
        if let Some(poke) = self.pokemon.get_mut(pokemon_index) {
            poke.active = true;
        }
    }

    pub fn clear_slot(&mut self, slot: usize) {
        if let Some(entry) = self.active_indices.get_mut(slot) {
            *entry = None;
        }
    }

    /// Get the first active pokemon (convenience for singles)
    pub fn active_pokemon(&self) -> Option<&PokemonState> {
        self.active_indices
            .first()
            .copied()
            .flatten()
            .and_then(|idx| self.pokemon.get(idx))
    }

    /// Find a pokemon by nickname or species
    pub fn find_pokemon(&self, name: &str) -> Option<usize> {
        self.pokemon.iter().position(|p| p.matches(name))
    }

    pub fn find_pokemon_mut(&mut self, name: &str) -> Option<&mut PokemonState> {
        self.pokemon.iter_mut().find(|p| p.matches(name))
    }

    pub fn alive_count(&self) -> usize {
        self.pokemon.iter().filter(|p| p.is_alive()).count()
    }

    pub fn to_roster(&self) -> SideRoster {
        SideRoster {
            player: self.player,
            username: self.username.clone(),
            pokemon: self.pokemon.iter().map(PokemonState::to_entry).collect(),
        }
    }
}

/// Convert position character to slot index
pub fn position_to_slot(pos: char) -> usize {
    match pos {
        'a' => 0,
        'b' => 1,
        'c' => 2,
        _ => 0,
    }
}
