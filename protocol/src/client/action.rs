//! Battle decisions and their `/choose` encoding

use thiserror::Error;

use super::ClientCommand;
use crate::normalize_name;

/// Kind of decision a player made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Move,
    Switch,
    TeamOrder,
    /// The opponent acted but the move was not revealed
    UnknownMove,
    /// The opponent switched but the target was not revealed
    UnknownSwitch,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Move => "MOVE",
            ActionType::Switch => "SWITCH",
            ActionType::TeamOrder => "TEAM_ORDER",
            ActionType::UnknownMove => "UNKNOWN_MOVE",
            ActionType::UnknownSwitch => "UNKNOWN_SWITCH",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("{action} action requires {field}")]
    MissingField {
        action: ActionType,
        field: &'static str,
    },

    #[error("{0} is a placeholder for an unrevealed action and cannot be sent")]
    Unencodable(ActionType),

    #[error("Team order must be a permutation of 1-6, got {0:?}")]
    InvalidTeamOrder(String),

    #[error("Target index must be 0-3, got {0}")]
    InvalidTarget(u8),
}

/// Immutable representation of one battle decision.
///
/// Built with a constructor and `with_*` modifiers, each returning a new value.
///
/// ```
/// use pivot_protocol::BattleAction;
///
/// let action = BattleAction::move_named("Thunderbolt").with_mega(true);
/// assert_eq!(action.to_showdown_command().unwrap(), "/choose move thunderbolt mega");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BattleAction {
    action_type: ActionType,
    move_name: Option<String>,
    switch_pokemon_name: Option<String>,
    team_order: Option<String>,
    target_index: Option<u8>,
    mega: bool,
    tera: bool,
}

impl BattleAction {
    /// A bare action of the given type with no fields set
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            move_name: None,
            switch_pokemon_name: None,
            team_order: None,
            target_index: None,
            mega: false,
            tera: false,
        }
    }

    pub fn move_named(move_name: impl Into<String>) -> Self {
        Self::new(ActionType::Move).with_move_name(move_name)
    }

    pub fn switch_to(pokemon_name: impl Into<String>) -> Self {
        Self::new(ActionType::Switch).with_switch_pokemon_name(pokemon_name)
    }

    pub fn team_order(order: impl Into<String>) -> Self {
        Self::new(ActionType::TeamOrder).with_team_order(order)
    }

    pub fn unknown_move() -> Self {
        Self::new(ActionType::UnknownMove)
    }

    pub fn unknown_switch() -> Self {
        Self::new(ActionType::UnknownSwitch)
    }

    pub fn with_move_name(mut self, move_name: impl Into<String>) -> Self {
        self.move_name = Some(move_name.into());
        self
    }

    pub fn with_switch_pokemon_name(mut self, pokemon_name: impl Into<String>) -> Self {
        self.switch_pokemon_name = Some(pokemon_name.into());
        self
    }

    pub fn with_team_order(mut self, order: impl Into<String>) -> Self {
        self.team_order = Some(order.into());
        self
    }

    /// Doubles target: 0-1 are opponent slots, 2-3 are ally slots
    pub fn with_target(mut self, target_index: u8) -> Self {
        self.target_index = Some(target_index);
        self
    }

    pub fn with_mega(mut self, mega: bool) -> Self {
        self.mega = mega;
        self
    }

    pub fn with_tera(mut self, tera: bool) -> Self {
        self.tera = tera;
        self
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn move_name(&self) -> Option<&str> {
        self.move_name.as_deref()
    }

    pub fn switch_pokemon_name(&self) -> Option<&str> {
        self.switch_pokemon_name.as_deref()
    }

    pub fn team_order_str(&self) -> Option<&str> {
        self.team_order.as_deref()
    }

    pub fn target_index(&self) -> Option<u8> {
        self.target_index
    }

    pub fn mega(&self) -> bool {
        self.mega
    }

    pub fn tera(&self) -> bool {
        self.tera
    }

    /// The choice text after `/choose `, e.g. "move thunderbolt +1 mega"
    pub fn to_choice(&self) -> Result<String, EncodingError> {
        match self.action_type {
            ActionType::Move => {
                let name = required(self.move_name.as_deref(), self.action_type, "move_name")?;
                let mut choice = format!("move {}", name);

                // The protocol is positional: target before modifiers
                if let Some(target) = self.target_index {
                    choice.push(' ');
                    choice.push_str(target_token(target)?);
                }
                if self.mega {
                    choice.push_str(" mega");
                }
                if self.tera {
                    choice.push_str(" terastallize");
                }

                Ok(choice)
            }
            ActionType::Switch => {
                let name = required(
                    self.switch_pokemon_name.as_deref(),
                    self.action_type,
                    "switch_pokemon_name",
                )?;
                Ok(format!("switch {}", name))
            }
            ActionType::TeamOrder => {
                let order = self.team_order.as_deref().ok_or(EncodingError::MissingField {
                    action: self.action_type,
                    field: "team_order",
                })?;
                validate_team_order(order)?;
                Ok(format!("team {}", order))
            }
            ActionType::UnknownMove | ActionType::UnknownSwitch => {
                Err(EncodingError::Unencodable(self.action_type))
            }
        }
    }

    /// Full command text, e.g. "/choose switch ironcrown"
    pub fn to_showdown_command(&self) -> Result<String, EncodingError> {
        let command = ClientCommand::Choose {
            choice: self.to_choice()?,
            rqid: None,
        };
        Ok(command.to_protocol_string())
    }
}

/// Encode an action into its wire command
pub fn encode(action: &BattleAction) -> Result<String, EncodingError> {
    action.to_showdown_command()
}

fn required(
    value: Option<&str>,
    action: ActionType,
    field: &'static str,
) -> Result<String, EncodingError> {
    value
        .map(normalize_name)
        .filter(|name| !name.is_empty())
        .ok_or(EncodingError::MissingField { action, field })
}

fn target_token(target: u8) -> Result<&'static str, EncodingError> {
    match target {
        0 => Ok("+1"),
        1 => Ok("+2"),
        2 => Ok("-1"),
        3 => Ok("-2"),
        other => Err(EncodingError::InvalidTarget(other)),
    }
}

fn validate_team_order(order: &str) -> Result<(), EncodingError> {
    let digits: Vec<char> = order.chars().collect();
    let well_formed = digits.len() == 6
        && digits.iter().all(|d| ('1'..='6').contains(d))
        && digits
            .iter()
            .enumerate()
            .all(|(i, d)| !digits[..i].contains(d));

    if well_formed {
        Ok(())
    } else {
        Err(EncodingError::InvalidTeamOrder(order.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_move() {
        assert_eq!(
            encode(&BattleAction::move_named("Will-O-Wisp")).unwrap(),
            "/choose move willowisp"
        );
        assert_eq!(
            encode(&BattleAction::move_named("Swords Dance")).unwrap(),
            "/choose move swordsdance"
        );
    }

    #[test]
    fn test_move_modifiers() {
        let mega = BattleAction::move_named("Thunderbolt").with_mega(true);
        assert_eq!(encode(&mega).unwrap(), "/choose move thunderbolt mega");

        let tera = BattleAction::move_named("Tera Blast").with_tera(true);
        assert_eq!(encode(&tera).unwrap(), "/choose move terablast terastallize");
    }

    #[test]
    fn test_targets_precede_modifiers() {
        let cases = [(0, "+1"), (1, "+2"), (2, "-1"), (3, "-2")];
        for (index, token) in cases {
            let action = BattleAction::move_named("Heat Wave").with_target(index);
            assert_eq!(
                encode(&action).unwrap(),
                format!("/choose move heatwave {}", token)
            );
        }

        let action = BattleAction::move_named("Thunderbolt")
            .with_target(1)
            .with_mega(true)
            .with_tera(true);
        assert_eq!(
            encode(&action).unwrap(),
            "/choose move thunderbolt +2 mega terastallize"
        );
    }

    #[test]
    fn test_invalid_target() {
        let action = BattleAction::move_named("Thunderbolt").with_target(4);
        assert_eq!(encode(&action), Err(EncodingError::InvalidTarget(4)));
    }

    #[test]
    fn test_switch() {
        assert_eq!(
            encode(&BattleAction::switch_to("Iron Crown")).unwrap(),
            "/choose switch ironcrown"
        );
        assert_eq!(
            encode(&BattleAction::switch_to("Landorus-Therian")).unwrap(),
            "/choose switch landorustherian"
        );
    }

    #[test]
    fn test_team_order() {
        assert_eq!(
            encode(&BattleAction::team_order("231456")).unwrap(),
            "/choose team 231456"
        );
        for bad in ["12345", "1234567", "12a456", "112345", "789012", "123450"] {
            assert_eq!(
                encode(&BattleAction::team_order(bad)),
                Err(EncodingError::InvalidTeamOrder(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_unknown_actions_never_encode() {
        let unknown_move = BattleAction::unknown_move()
            .with_move_name("Thunderbolt")
            .with_mega(true);
        assert_eq!(
            encode(&unknown_move),
            Err(EncodingError::Unencodable(ActionType::UnknownMove))
        );

        let unknown_switch = BattleAction::unknown_switch().with_switch_pokemon_name("Pikachu");
        assert_eq!(
            encode(&unknown_switch),
            Err(EncodingError::Unencodable(ActionType::UnknownSwitch))
        );
    }

    #[test]
    fn test_missing_fields_name_the_field() {
        let err = encode(&BattleAction::new(ActionType::Move)).unwrap_err();
        assert_eq!(err.to_string(), "MOVE action requires move_name");

        let err = encode(&BattleAction::new(ActionType::Switch)).unwrap_err();
        assert_eq!(err.to_string(), "SWITCH action requires switch_pokemon_name");

        let err = encode(&BattleAction::new(ActionType::TeamOrder)).unwrap_err();
        assert_eq!(err.to_string(), "TEAM_ORDER action requires team_order");

        // A name that normalizes to nothing is as good as missing
        assert!(matches!(
            encode(&BattleAction::move_named(" - ")),
            Err(EncodingError::MissingField { .. })
        ));
    }

    #[test]
    fn test_modifiers_return_new_values() {
        let base = BattleAction::move_named("Thunderbolt");
        let mega = base.clone().with_mega(true);
        assert!(!base.mega());
        assert!(mega.mega());
        assert_ne!(base, mega);
    }

    #[test]
    fn test_defaults() {
        let action = BattleAction::new(ActionType::Move);
        assert_eq!(action.move_name(), None);
        assert_eq!(action.switch_pokemon_name(), None);
        assert_eq!(action.team_order_str(), None);
        assert_eq!(action.target_index(), None);
        assert!(!action.mega());
        assert!(!action.tera());
    }
}
