//! Turn-indexed event log and per-player action history

use std::collections::{BTreeMap, HashSet};

use pivot_protocol::{
    BattleAction, BattleEvent, BattleMessage, Player, normalize_name, parse_battle_event,
};

/// Append-only log of the events seen in one battle.
///
/// Every query walks the log again; nothing is cached, so two identical
/// queries against an unchanged store always agree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattleStreamStore {
    events: Vec<BattleEvent>,
}

impl BattleStreamStore {
    pub fn new(events: Vec<BattleEvent>) -> Self {
        Self { events }
    }

    /// Parse a whole saved log, one protocol line per item
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::new(lines.into_iter().map(parse_battle_event).collect())
    }

    /// Append a batch to the end of the log
    pub fn add_events(&mut self, events: impl IntoIterator<Item = BattleEvent>) {
        self.events.extend(events);
    }

    /// The full log in arrival order
    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Turn numbers in order of first appearance
    pub fn turns(&self) -> Vec<u32> {
        self.turn_index().into_iter().map(|(turn, _)| turn).collect()
    }

    pub fn latest_turn(&self) -> Option<u32> {
        self.events.iter().rev().find_map(BattleEvent::turn_number)
    }

    /// Events grouped by the turn they happened in.
    ///
    /// Events before the first `|turn|` line (team preview, leads) are not
    /// part of any turn and are left out.
    pub fn get_past_events(&self) -> BTreeMap<u32, Vec<BattleEvent>> {
        self.turn_index()
            .into_iter()
            .map(|(turn, events)| (turn, events.into_iter().cloned().collect()))
            .collect()
    }

    /// Reconstruct the actions a player took in each turn.
    ///
    /// `past_turns == 0` covers every turn; otherwise only the most recent
    /// `past_turns` observed turns are returned. Switches forced by a faint
    /// are left out, and a pivot move's follow-up switch counts as a second
    /// action in the same turn.
    pub fn get_past_battle_actions(
        &self,
        player: Player,
        past_turns: usize,
    ) -> BTreeMap<u32, Vec<BattleAction>> {
        let index = self.turn_index();
        let skip = match past_turns {
            0 => 0,
            n => index.len().saturating_sub(n),
        };

        index
            .into_iter()
            .skip(skip)
            .map(|(turn, events)| (turn, extract_player_actions(player, &events)))
            .collect()
    }

    /// Group events by turn, keeping turns in order of first appearance
    fn turn_index(&self) -> Vec<(u32, Vec<&BattleEvent>)> {
        let mut index: Vec<(u32, Vec<&BattleEvent>)> = Vec::new();
        let mut current: Option<usize> = None;

        for event in &self.events {
            if let Some(turn) = event.turn_number() {
                let position = match index.iter().position(|(t, _)| *t == turn) {
                    Some(position) => position,
                    None => {
                        index.push((turn, Vec::new()));
                        index.len() - 1
                    }
                };
                current = Some(position);
            } else if let Some(position) = current {
                index[position].1.push(event);
            }
        }

        index
    }
}

/// Walk one turn's events and keep the choices `player` actually made
fn extract_player_actions(player: Player, events: &[&BattleEvent]) -> Vec<BattleAction> {
    let mut actions = Vec::new();
    let mut fainted_positions: HashSet<Option<char>> = HashSet::new();
    let mut last_move: Option<String> = None;

    for (i, event) in events.iter().enumerate() {
        match event.message() {
            BattleMessage::Faint(pokemon) if pokemon.player == player => {
                fainted_positions.insert(pokemon.position);
            }
            BattleMessage::Move {
                pokemon, move_name, ..
            } if pokemon.player == player => {
                let move_name = normalize_name(move_name);
                actions.push(BattleAction::move_named(move_name.clone()));
                last_move = Some(move_name);
            }
            BattleMessage::Switch {
                pokemon,
                details,
                from,
                ..
            } if pokemon.player == player => {
                // A replacement for a pokemon that fainted this turn is never
                // a choice, even when it carries a pivot move's [from]
                if fainted_positions.contains(&pokemon.position) {
                    continue;
                }

                let pivot = is_pivot_switch(from.as_deref(), last_move.as_deref());
                if !pivot && is_forced_switch(event, events, i) {
                    continue;
                }

                actions.push(BattleAction::switch_to(normalize_name(&details.species)));
                // Whether it was a pivot or a fresh choice, a later switch
                // cannot continue the same move
                last_move = None;
            }
            _ => {}
        }
    }

    actions
}

/// A switch caused by the move its player used just before
fn is_pivot_switch(from: Option<&str>, last_move: Option<&str>) -> bool {
    match (from, last_move) {
        (Some(from), Some(last_move)) => normalize_name(from) == last_move,
        _ => false,
    }
}

/// A non-pivot switch the player did not freely choose this turn
fn is_forced_switch(switch: &BattleEvent, events: &[&BattleEvent], index: usize) -> bool {
    let BattleMessage::Switch { pokemon, from, .. } = switch.message() else {
        return false;
    };

    // Any other effect-caused switch (Eject Button, Red Card replacements)
    if from.is_some() {
        return true;
    }

    // Scan back to this player's previous action; a faint in between forced it
    for earlier in events[..index].iter().rev() {
        match earlier.message() {
            BattleMessage::Faint(fainted) if fainted.player == pokemon.player => return true,
            BattleMessage::Move { pokemon: actor, .. }
            | BattleMessage::Switch { pokemon: actor, .. }
                if actor.player == pokemon.player =>
            {
                break;
            }
            _ => {}
        }
    }

    false
}
