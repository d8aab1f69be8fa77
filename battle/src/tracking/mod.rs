//! Battle state tracking from protocol events

mod battle;
mod updater;

pub use battle::{TrackedBattle, player_to_index};

use pivot_protocol::BattleEvent;

use crate::builder::StateBuilder;
use crate::state::BattleState;

impl StateBuilder for TrackedBattle {
    fn apply(&mut self, event: &BattleEvent) {
        self.update(event.message());
    }

    fn snapshot(&self) -> BattleState {
        self.to_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivot_protocol::{Player, parse_battle_event};

    fn build(lines: &[&str]) -> TrackedBattle {
        let mut battle = TrackedBattle::new();
        for line in lines {
            battle.apply(&parse_battle_event(line));
        }
        battle
    }

    #[test]
    fn test_snapshot_after_first_request() {
        let battle = build(&[
            "|switch|p1a: Pikachu|Pikachu,L50,M|100/100",
            r#"|request|{"active":[{"moves":[{"move":"Thunder Shock"}]}],"side":{"name":"Alice","id":"p1","pokemon":[{"ident":"p1: Pikachu","details":"Pikachu, L50, M","condition":"100/100","active":true}]}}"#,
        ]);

        let state = battle.snapshot();
        assert_eq!(state.available_moves, vec!["Thunder Shock".to_string()]);
        assert!(state.available_switches.is_empty());
        assert_eq!(state.our_player, Some(Player::P1));
        assert!(!state.battle_over);
        assert_eq!(state.our_roster().unwrap().pokemon[0].species, "Pikachu");
    }

    #[test]
    fn test_snapshot_force_switch_offers_only_switches() {
        let battle = build(&[
            r#"|request|{"forceSwitch":[true],"side":{"name":"Alice","id":"p1","pokemon":[
                {"ident":"p1: Pikachu","details":"Pikachu","condition":"0 fnt","active":true},
                {"ident":"p1: Snorlax","details":"Snorlax","condition":"200/200","active":false}
            ]}}"#,
        ]);

        let state = battle.snapshot();
        assert!(state.force_switch);
        assert!(state.available_moves.is_empty());
        assert_eq!(state.available_switches, vec![1]);
    }

    #[test]
    fn test_snapshot_team_preview_and_modifiers() {
        let preview = build(&[r#"|request|{"teamPreview":true}"#]).snapshot();
        assert!(preview.team_preview);
        assert!(preview.available_moves.is_empty());

        let battle = build(&[
            r#"|request|{"active":[{"moves":[{"move":"Tera Blast"}],"canMegaEvo":true,"canTerastallize":"Fairy"}]}"#,
        ]);
        let state = battle.snapshot();
        assert!(state.can_mega);
        assert!(state.can_tera);
        assert!(!state.can_dynamax);
    }

    #[test]
    fn test_snapshot_trapped_has_no_switches() {
        let battle = build(&[
            r#"|request|{"active":[{"moves":[{"move":"Splash"}],"trapped":true}],"side":{"name":"Alice","id":"p1","pokemon":[
                {"ident":"p1: Magikarp","details":"Magikarp","condition":"100/100","active":true},
                {"ident":"p1: Snorlax","details":"Snorlax","condition":"200/200","active":false}
            ]}}"#,
        ]);
        assert!(battle.snapshot().available_switches.is_empty());
    }

    #[test]
    fn test_snapshot_after_battle_end() {
        let battle = build(&[
            r#"|request|{"active":[{"moves":[{"move":"Thunder Shock"}]}]}"#,
            "|win|Alice",
        ]);

        let state = battle.snapshot();
        assert!(state.battle_over);
        assert_eq!(state.winner.as_deref(), Some("Alice"));
        assert!(state.available_moves.is_empty());
    }

    #[test]
    fn test_wait_request_marks_waiting() {
        let battle = build(&[r#"|request|{"wait":true,"side":{"name":"Alice","id":"p2","pokemon":[]}}"#]);
        let state = battle.snapshot();
        assert!(state.waiting);
        assert_eq!(state.our_player, Some(Player::P2));
    }

    #[test]
    fn test_clone_is_independent() {
        let battle = build(&["|turn|1"]);
        let mut staged = battle.clone();
        staged.apply(&parse_battle_event("|turn|2"));

        assert_eq!(battle.snapshot().turn_number, 1);
        assert_eq!(staged.snapshot().turn_number, 2);
    }
}
