//! TrackedBattle - the default battle state builder

use std::collections::BTreeMap;

use pivot_protocol::{BattleRequest, GameType, Player};

use crate::state::BattleState;
use crate::types::SideState;

/// A battle being tracked from protocol events
///
/// Reconstructs battle state from the lines a Showdown server sends to one
/// player. Our side is filled in from requests, the opponent's side from
/// whatever switches and moves reveal.
#[derive(Debug, Clone, Default)]
pub struct TrackedBattle {
    // === Battle metadata ===
    pub game_type: Option<GameType>,

    /// Generation (1-9), None until announced
    pub generation: Option<u8>,

    pub tier: String,

    /// Current turn number (0 = not started)
    pub turn: u32,

    // === State ===
    /// Player sides (indexed by Player enum)
    pub(crate) sides: [Option<SideState>; 4],

    /// The most recent request, which defines what we may choose
    pub(crate) request: Option<BattleRequest>,

    // === Perspective ===
    perspective: Option<Player>,

    // === Outcome ===
    pub ended: bool,

    /// Winner's username, empty after a tie
    pub winner: Option<String>,
}

impl TrackedBattle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the perspective (which player we are)
    pub fn set_perspective(&mut self, player: Player) {
        self.perspective = Some(player);
    }

    pub fn perspective(&self) -> Option<Player> {
        self.perspective
    }

    /// Our side (based on perspective)
    pub fn me(&self) -> Option<&SideState> {
        self.perspective.and_then(|p| self.get_side(p))
    }

    /// Opponent's side (assumes a two-player battle)
    pub fn opponent(&self) -> Option<&SideState> {
        self.perspective.and_then(|p| self.get_side(p.opponent()))
    }

    pub fn get_side(&self, player: Player) -> Option<&SideState> {
        self.sides[player_to_index(player)].as_ref()
    }

    pub fn get_side_mut(&mut self, player: Player) -> Option<&mut SideState> {
        self.sides[player_to_index(player)].as_mut()
    }

    /// Get or create a side for a player, sized for the current game type
    pub fn get_or_create_side(&mut self, player: Player, username: &str) -> &mut SideState {
        let slots = self.game_type.map_or(1, |g| g.active_slots());
        let side = self.sides[player_to_index(player)].get_or_insert_with(|| {
            let mut side = SideState::new(player, username);
            side.set_active_slots(slots);
            side
        });
        if side.username.is_empty() && !username.is_empty() {
            side.username = username.to_string();
        }
        side
    }

    pub fn has_side(&self, player: Player) -> bool {
        self.sides[player_to_index(player)].is_some()
    }

    /// Iterate over all initialized sides
    pub fn sides(&self) -> impl Iterator<Item = &SideState> {
        self.sides.iter().filter_map(|s| s.as_ref())
    }

    pub fn sides_mut(&mut self) -> impl Iterator<Item = &mut SideState> {
        self.sides.iter_mut().filter_map(|s| s.as_mut())
    }

    /// Set game type and update active slots accordingly
    pub fn set_game_type(&mut self, game_type: GameType) {
        self.game_type = Some(game_type);

        let slots = game_type.active_slots();
        for side in self.sides_mut() {
            side.set_active_slots(slots);
        }
    }

    pub fn request(&self) -> Option<&BattleRequest> {
        self.request.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.turn > 0 && !self.ended
    }

    /// Build the immutable snapshot for the current point in the battle
    pub fn to_state(&self) -> BattleState {
        let rosters: BTreeMap<Player, _> = self
            .sides()
            .map(|side| (side.player, side.to_roster()))
            .collect();

        let mut state = BattleState {
            battle_over: self.ended,
            winner: self.winner.clone(),
            turn_number: self.turn,
            our_player: self.perspective,
            generation: self.generation.unwrap_or(9),
            tier: self.tier.clone(),
            game_type: self.game_type,
            rosters,
            ..BattleState::default()
        };

        // A finished battle offers no choices, whatever the last request said
        if let Some(request) = &self.request
            && !self.ended
        {
            state.waiting = request.wait;
            state.team_preview = request.team_preview;
            state.force_switch = request.is_force_switch();

            // During a forced switch the moves listed belong to the fainted pokemon
            if !state.force_switch && !state.team_preview {
                state.available_moves = request.available_moves();
            }
            let trapped = request
                .first_active()
                .is_some_and(|active| !active.can_switch());
            if !trapped && !state.team_preview {
                state.available_switches = request.available_switches();
            }

            if let Some(active) = request.first_active()
                && !state.force_switch
            {
                state.can_mega = active.can_mega_evo;
                state.can_tera = active.can_tera();
                state.can_dynamax = active.can_dynamax;
            }
        }

        state
    }
}

/// Convert Player enum to array index
pub fn player_to_index(player: Player) -> usize {
    match player {
        Player::P1 => 0,
        Player::P2 => 1,
        Player::P3 => 2,
        Player::P4 => 3,
    }
}
