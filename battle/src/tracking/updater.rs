//! Update logic for applying battle messages to tracked state

use pivot_protocol::{BattleMessage, BattleRequest, HpStatus, Pokemon, PokemonDetails};

use super::battle::TrackedBattle;
use crate::types::{PokemonState, Status, position_to_slot};

impl TrackedBattle {
    /// Update battle state from a decoded battle message
    pub fn update(&mut self, msg: &BattleMessage) {
        match msg {
            // === Battle Initialization ===
            BattleMessage::Player {
                player, username, ..
            } => {
                self.get_or_create_side(*player, username);
            }

            BattleMessage::TeamSize { player, size } => {
                self.get_or_create_side(*player, "").team_size = Some(*size);
            }

            BattleMessage::GameType(game_type) => {
                self.set_game_type(*game_type);
            }

            BattleMessage::Gen(generation) => {
                self.generation = Some(*generation);
            }

            BattleMessage::Tier(tier) => {
                self.tier = tier.clone();
            }

            BattleMessage::ClearPoke => {
                for side in self.sides_mut() {
                    side.pokemon.clear();
                    let slots = side.active_indices.len();
                    side.active_indices = vec![None; slots];
                }
            }

            BattleMessage::Poke {
                player, details, ..
            } => {
                let side = self.get_or_create_side(*player, "");
                if side.find_pokemon(&details.species).is_none() {
                    side.pokemon
                        .push(PokemonState::from_details(details, &details.species));
                }
            }

            BattleMessage::Turn(turn) => {
                self.turn = *turn;
            }

            // === Major Actions ===
            BattleMessage::Switch {
                pokemon,
                details,
                hp_status,
                ..
            }
            | BattleMessage::Drag {
                pokemon,
                details,
                hp_status,
            }
            | BattleMessage::Replace {
                pokemon,
                details,
                hp_status,
            } => {
                self.handle_switch(pokemon, details, hp_status.as_ref());
            }

            BattleMessage::DetailsChange {
                pokemon,
                details,
                hp_status,
            }
            | BattleMessage::FormeChange {
                pokemon,
                details,
                hp_status,
            } => {
                if let Some(poke) = self.find_pokemon_mut(pokemon) {
                    poke.apply_details(details);
                    if let Some(hp) = hp_status {
                        poke.apply_hp_status(hp);
                    }
                }
            }

            BattleMessage::Move {
                pokemon, move_name, ..
            } => {
                if let Some(poke) = self.find_pokemon_mut(pokemon) {
                    poke.record_move(move_name);
                }
            }

            BattleMessage::Faint(pokemon) => {
                self.handle_faint(pokemon);
            }

            // === HP Changes ===
            BattleMessage::Damage {
                pokemon, hp_status, ..
            }
            | BattleMessage::Heal {
                pokemon, hp_status, ..
            }
            | BattleMessage::SetHp { pokemon, hp_status } => {
                if let (Some(poke), Some(hp)) = (self.find_pokemon_mut(pokemon), hp_status) {
                    poke.apply_hp_status(hp);
                }
            }

            // === Status ===
            BattleMessage::Status { pokemon, status } => {
                if let Some(poke) = self.find_pokemon_mut(pokemon) {
                    poke.status = Status::from_protocol(status);
                }
            }

            BattleMessage::CureStatus { pokemon, .. } => {
                if let Some(poke) = self.find_pokemon_mut(pokemon) {
                    poke.status = None;
                }
            }

            BattleMessage::Terastallize { pokemon, tera_type } => {
                if let Some(poke) = self.find_pokemon_mut(pokemon) {
                    poke.tera_type = Some(tera_type.clone());
                    poke.terastallized = true;
                }
            }

            // === Progress ===
            BattleMessage::Request(request) => {
                self.update_from_request(request);
            }

            BattleMessage::Win(winner) => {
                self.ended = true;
                self.winner = Some(winner.clone());
            }

            BattleMessage::Tie => {
                self.ended = true;
                self.winner = Some(String::new());
            }

            BattleMessage::Rule(_)
            | BattleMessage::TeamPreview(_)
            | BattleMessage::Start
            | BattleMessage::Cant { .. }
            | BattleMessage::Upkeep
            | BattleMessage::Error(_)
            | BattleMessage::Transform { .. }
            | BattleMessage::Boost { .. }
            | BattleMessage::Unboost { .. }
            | BattleMessage::SetBoost { .. }
            | BattleMessage::ClearBoost(_)
            | BattleMessage::ClearAllBoost
            | BattleMessage::ClearNegativeBoost(_)
            | BattleMessage::Ability { .. }
            | BattleMessage::EndAbility { .. }
            | BattleMessage::Item { .. }
            | BattleMessage::EndItem { .. }
            | BattleMessage::VolatileStart { .. }
            | BattleMessage::VolatileEnd { .. }
            | BattleMessage::SingleTurn { .. }
            | BattleMessage::SingleMove { .. }
            | BattleMessage::Activate { .. }
            | BattleMessage::Prepare { .. }
            | BattleMessage::Weather { .. }
            | BattleMessage::FieldStart(_)
            | BattleMessage::FieldEnd(_)
            | BattleMessage::SideStart { .. }
            | BattleMessage::SideEnd { .. }
            | BattleMessage::Crit(_)
            | BattleMessage::SuperEffective(_)
            | BattleMessage::Resisted(_)
            | BattleMessage::Immune(_)
            | BattleMessage::Miss { .. }
            | BattleMessage::Fail { .. }
            | BattleMessage::HitCount { .. }
            | BattleMessage::Popup(_)
            | BattleMessage::Pm { .. }
            | BattleMessage::Unknown { .. } => {
                // These don't affect tracked state
            }
        }
    }

    /// Update battle state from a request (full information about our side)
    pub fn update_from_request(&mut self, request: &BattleRequest) {
        // An empty request carries nothing; keep the previous one
        if *request == BattleRequest::default() {
            return;
        }

        if let Some(side_info) = &request.side
            && let Some(player) = side_info.player()
        {
            if self.perspective().is_none() {
                tracing::debug!(player = %player, "Learned our side from request");
            }
            self.set_perspective(player);

            let side = self.get_or_create_side(player, &side_info.name);

            // Request order is party order, which is what switch indices refer to
            let mut synced = Vec::with_capacity(side_info.pokemon.len());
            for req_poke in &side_info.pokemon {
                let details = PokemonDetails::parse(&req_poke.details);
                let mut poke = side
                    .find_pokemon(req_poke.name())
                    .and_then(|idx| side.pokemon.get(idx).cloned())
                    .unwrap_or_else(|| PokemonState::from_details(&details, req_poke.name()));

                poke.apply_details(&details);
                poke.known_moves = req_poke.moves.clone();
                poke.active = req_poke.active;
                if let Some((current, max)) = req_poke.hp() {
                    poke.hp_current = current;
                    poke.hp_max = Some(max);
                }
                if req_poke.is_fainted() {
                    poke.faint();
                } else {
                    poke.fainted = false;
                    poke.status = req_poke.status().and_then(Status::from_protocol);
                }

                synced.push(poke);
            }

            side.pokemon = synced;
            let slots = side.active_indices.len();
            side.active_indices = vec![None; slots];
            let active: Vec<usize> = side
                .pokemon
                .iter()
                .enumerate()
                .filter(|(_, p)| p.active)
                .map(|(i, _)| i)
                .collect();
            for (slot, idx) in active.into_iter().enumerate() {
                side.set_active(slot, idx);
            }
        }

        self.request = Some(request.clone());
    }

    /// Handle a switch, drag or replace message
    fn handle_switch(
        &mut self,
        pokemon: &Pokemon,
        details: &PokemonDetails,
        hp_status: Option<&HpStatus>,
    ) {
        let slot = pokemon.position.map(position_to_slot).unwrap_or(0);
        let side = self.get_or_create_side(pokemon.player, "");

        let name = if pokemon.name.is_empty() {
            details.species.as_str()
        } else {
            pokemon.name.as_str()
        };

        let poke_idx = match side.find_pokemon(name) {
            Some(idx) => idx,
            None => {
                side.pokemon.push(PokemonState::from_details(details, name));
                side.pokemon.len() - 1
            }
        };

        if let Some(poke) = side.pokemon.get_mut(poke_idx) {
            poke.apply_details(details);
            if let Some(hp) = hp_status {
                poke.apply_hp_status(hp);
            }
        }

        side.set_active(slot, poke_idx);
    }

    fn handle_faint(&mut self, pokemon: &Pokemon) {
        if let Some(poke) = self.find_pokemon_mut(pokemon) {
            poke.faint();
        }

        if let Some(side) = self.get_side_mut(pokemon.player)
            && let Some(slot) = pokemon.position.map(position_to_slot)
        {
            side.clear_slot(slot);
        }
    }

    /// Find a pokemon by protocol identifier, falling back to the active slot
    fn find_pokemon_mut(&mut self, pokemon: &Pokemon) -> Option<&mut PokemonState> {
        let side = self.get_side_mut(pokemon.player)?;

        let idx = if pokemon.name.is_empty() {
            let slot = pokemon.position.map(position_to_slot)?;
            side.active_indices.get(slot).copied().flatten()?
        } else {
            side.find_pokemon(&pokemon.name)?
        };

        side.pokemon.get_mut(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivot_protocol::{GameType, Player, parse_battle_event};

    fn apply(battle: &mut TrackedBattle, lines: &[&str]) {
        for line in lines {
            battle.update(parse_battle_event(line).message());
        }
    }

    #[test]
    fn test_update_player_and_metadata() {
        let mut battle = TrackedBattle::new();
        apply(
            &mut battle,
            &["|player|p1|Alice|1|", "|gametype|doubles", "|gen|8", "|tier|[Gen 8] OU", "|turn|3"],
        );

        assert_eq!(battle.get_side(Player::P1).unwrap().username, "Alice");
        assert_eq!(battle.game_type, Some(GameType::Doubles));
        assert_eq!(battle.generation, Some(8));
        assert_eq!(battle.tier, "[Gen 8] OU");
        assert_eq!(battle.turn, 3);
    }

    #[test]
    fn test_update_switch_and_damage() {
        let mut battle = TrackedBattle::new();
        apply(
            &mut battle,
            &[
                "|switch|p2a: Gyarados|Gyarados, L80, F|100/100",
                "|-damage|p2a: Gyarados|45/100",
            ],
        );

        let side = battle.get_side(Player::P2).unwrap();
        assert_eq!(side.pokemon.len(), 1);
        assert_eq!(side.pokemon[0].species, "Gyarados");
        assert_eq!(side.pokemon[0].level, 80);
        assert_eq!(side.pokemon[0].hp_current, 45);
        assert!(side.pokemon[0].active);
    }

    #[test]
    fn test_sethp_overrides_hp() {
        let mut battle = TrackedBattle::new();
        apply(
            &mut battle,
            &[
                "|switch|p1a: Slowbro|Slowbro, L84, F|100/100",
                "|-damage|p1a: Slowbro|20/100",
                "|-sethp|p1a: Slowbro|61/100|[from] move: Pain Split",
            ],
        );

        let poke = &battle.get_side(Player::P1).unwrap().pokemon[0];
        assert_eq!(poke.hp_current, 61);
    }

    #[test]
    fn test_formechange_updates_species() {
        let mut battle = TrackedBattle::new();
        apply(
            &mut battle,
            &[
                "|switch|p2a: Mimikyu|Mimikyu, L81, F|100/100",
                "|-formechange|p2a: Mimikyu|Mimikyu-Busted, L81, F|88/100",
                "|-damage|p2a: Mimikyu|70/100",
            ],
        );

        let side = battle.get_side(Player::P2).unwrap();
        assert_eq!(side.pokemon.len(), 1);
        assert_eq!(side.pokemon[0].species, "Mimikyu-Busted");
        assert_eq!(side.pokemon[0].hp_current, 70);
    }

    #[test]
    fn test_switch_out_benches_previous() {
        let mut battle = TrackedBattle::new();
        apply(
            &mut battle,
            &[
                "|switch|p2a: Gyarados|Gyarados|100/100",
                "|switch|p2a: Clefable|Clefable, F|100/100",
            ],
        );

        let side = battle.get_side(Player::P2).unwrap();
        assert!(!side.pokemon[0].active);
        assert!(side.pokemon[1].active);
    }

    #[test]
    fn test_update_status() {
        let mut battle = TrackedBattle::new();
        apply(
            &mut battle,
            &["|switch|p1a: Pikachu|Pikachu|100/100", "|-status|p1a: Pikachu|par"],
        );
        assert_eq!(
            battle.get_side(Player::P1).unwrap().pokemon[0].status,
            Some(Status::Paralysis)
        );

        apply(&mut battle, &["|-curestatus|p1a: Pikachu|par"]);
        assert!(battle.get_side(Player::P1).unwrap().pokemon[0].status.is_none());
    }

    #[test]
    fn test_update_move_records_known_moves() {
        let mut battle = TrackedBattle::new();
        apply(
            &mut battle,
            &[
                "|switch|p2a: Rotom|Rotom-Wash|100/100",
                "|move|p2a: Rotom|Volt Switch|p1a: Pikachu",
                "|move|p2a: Rotom|Hydro Pump|p1a: Pikachu|[miss]",
            ],
        );
        assert_eq!(
            battle.get_side(Player::P2).unwrap().pokemon[0].known_moves,
            vec!["Volt Switch", "Hydro Pump"]
        );
    }

    #[test]
    fn test_update_faint() {
        let mut battle = TrackedBattle::new();
        apply(
            &mut battle,
            &["|switch|p1a: Pikachu|Pikachu|100/100", "|faint|p1a: Pikachu"],
        );

        let side = battle.get_side(Player::P1).unwrap();
        assert!(side.pokemon[0].fainted);
        assert_eq!(side.pokemon[0].hp_current, 0);
        assert_eq!(side.active_indices, vec![None]);
    }

    #[test]
    fn test_update_team_preview_pokes() {
        let mut battle = TrackedBattle::new();
        apply(
            &mut battle,
            &[
                "|clearpoke",
                "|poke|p2|Garchomp, F|",
                "|poke|p2|Iron Crown|item",
                "|teampreview",
            ],
        );
        assert_eq!(battle.get_side(Player::P2).unwrap().pokemon.len(), 2);
    }

    #[test]
    fn test_update_from_request_sets_perspective() {
        let mut battle = TrackedBattle::new();
        apply(
            &mut battle,
            &[r#"|request|{"active":[{"moves":[{"move":"Thunderbolt"}]}],"side":{"name":"Alice","id":"p1","pokemon":[
                {"ident":"p1: Pikachu","details":"Pikachu, L50, M","condition":"90/110","active":true,"moves":["thunderbolt"]},
                {"ident":"p1: Snorlax","details":"Snorlax, L88","condition":"0 fnt","active":false,"moves":["rest"]}
            ]}}"#],
        );

        assert_eq!(battle.perspective(), Some(Player::P1));
        let me = battle.me().unwrap();
        assert_eq!(me.username, "Alice");
        assert_eq!(me.pokemon[0].hp_current, 90);
        assert_eq!(me.pokemon[0].hp_max, Some(110));
        assert!(me.pokemon[0].active);
        assert!(me.pokemon[1].fainted);
        assert_eq!(me.active_indices, vec![Some(0)]);
    }

    #[test]
    fn test_update_win_and_tie() {
        let mut battle = TrackedBattle::new();
        apply(&mut battle, &["|win|Alice"]);
        assert!(battle.ended);
        assert_eq!(battle.winner.as_deref(), Some("Alice"));

        let mut battle = TrackedBattle::new();
        apply(&mut battle, &["|tie"]);
        assert!(battle.ended);
        assert_eq!(battle.winner.as_deref(), Some(""));
    }
}
