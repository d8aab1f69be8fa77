//! Shared types for battle protocol messages

use serde::Serialize;

/// Player in a battle (p1, p2, p3, p4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    P1,
    P2,
    P3,
    P4,
}

impl Player {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "p1" => Some(Player::P1),
            "p2" => Some(Player::P2),
            "p3" => Some(Player::P3),
            "p4" => Some(Player::P4),
            _ => None,
        }
    }

    /// Parse the player prefix of a compound token like "p1a" or "p2: Name"
    pub fn from_prefix(s: &str) -> Option<Self> {
        s.get(..2).and_then(Self::parse)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::P1 => "p1",
            Player::P2 => "p2",
            Player::P3 => "p3",
            Player::P4 => "p4",
        }
    }

    /// The other player of a two-player battle
    pub fn opponent(&self) -> Self {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
            Player::P3 => Player::P4,
            Player::P4 => Player::P3,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pokemon identifier in the form "POSITION: NAME" (e.g., "p1a: Pikachu")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pokemon {
    /// Player who owns this pokemon
    pub player: Player,
    /// Position letter (a, b, c for active slots, or None if inactive)
    pub position: Option<char>,
    /// Pokemon's name/nickname
    pub name: String,
}

impl Pokemon {
    /// Parse a pokemon ID string like "p1a: Pikachu", "p1: Pikachu" or a bare "p1a"
    pub fn parse(s: &str) -> Option<Self> {
        let (pos_part, name) = s.split_once(": ").unwrap_or((s, ""));
        let player = Player::from_prefix(pos_part)?;
        let position = pos_part.chars().nth(2).filter(|c| c.is_ascii_lowercase());

        Some(Pokemon {
            player,
            position,
            name: name.to_string(),
        })
    }
}

/// Pokemon details string (species, level, gender, shiny, tera)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PokemonDetails {
    pub species: String,
    pub level: Option<u8>,
    pub gender: Option<char>,
    pub shiny: bool,
    pub tera_type: Option<String>,
}

impl PokemonDetails {
    /// Parse a details string like "Pikachu, L50, M, shiny" or "Arceus-*".
    ///
    /// Some servers omit the space after commas ("Pikachu,L50,M"), so parts are trimmed.
    pub fn parse(s: &str) -> Self {
        let mut details = PokemonDetails::default();
        let mut parts = s.split(',').map(str::trim);

        if let Some(species) = parts.next() {
            details.species = species.to_string();
        }

        for part in parts {
            if let Some(level_str) = part.strip_prefix('L') {
                details.level = level_str.parse().ok();
            } else if part == "M" {
                details.gender = Some('M');
            } else if part == "F" {
                details.gender = Some('F');
            } else if part == "shiny" {
                details.shiny = true;
            } else if let Some(tera) = part.strip_prefix("tera:") {
                details.tera_type = Some(tera.to_string());
            }
        }

        details
    }
}

/// HP and status condition (e.g., "100/100", "50/100 slp", "0 fnt")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpStatus {
    /// Current HP (as raw value or percentage depending on context)
    pub current: u32,
    /// Max HP (if known)
    pub max: Option<u32>,
    /// Status condition (slp, par, brn, psn, tox, frz, fnt)
    pub status: Option<String>,
}

impl HpStatus {
    /// Parse an HP status string like "100/100", "50/100 slp", or "0 fnt"
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let hp_part = parts.next()?;
        let status = parts.next().map(|s| s.to_string());

        if let Some((current_str, max_str)) = hp_part.split_once('/') {
            Some(HpStatus {
                current: current_str.parse().ok()?,
                max: Some(max_str.parse().ok()?),
                status,
            })
        } else {
            Some(HpStatus {
                current: hp_part.parse().ok()?,
                max: None,
                status,
            })
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.status.as_deref() == Some("fnt")
    }
}

/// A stat that can be raised or lowered in stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

impl Stat {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "atk" => Stat::Atk,
            "def" => Stat::Def,
            "spa" => Stat::Spa,
            "spd" => Stat::Spd,
            "spe" => Stat::Spe,
            "accuracy" => Stat::Accuracy,
            "evasion" => Stat::Evasion,
            _ => return None,
        })
    }
}

/// Game type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Singles,
    Doubles,
    Triples,
    Multi,
    FreeForAll,
}

impl GameType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "singles" => Some(GameType::Singles),
            "doubles" => Some(GameType::Doubles),
            "triples" => Some(GameType::Triples),
            "multi" => Some(GameType::Multi),
            "freeforall" => Some(GameType::FreeForAll),
            _ => None,
        }
    }

    /// Number of active slots per side
    pub fn active_slots(&self) -> usize {
        match self {
            GameType::Singles | GameType::FreeForAll => 1,
            GameType::Doubles | GameType::Multi => 2,
            GameType::Triples => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pokemon_with_position() {
        let poke = Pokemon::parse("p2b: Iron Crown").unwrap();
        assert_eq!(poke.player, Player::P2);
        assert_eq!(poke.position, Some('b'));
        assert_eq!(poke.name, "Iron Crown");
    }

    #[test]
    fn test_parse_pokemon_without_position() {
        let poke = Pokemon::parse("p1: Pikachu").unwrap();
        assert_eq!(poke.player, Player::P1);
        assert_eq!(poke.position, None);
    }

    #[test]
    fn test_parse_bare_compound_token() {
        let poke = Pokemon::parse("p1a").unwrap();
        assert_eq!(poke.player, Player::P1);
        assert_eq!(poke.position, Some('a'));
        assert!(poke.name.is_empty());
    }

    #[test]
    fn test_parse_pokemon_rejects_garbage() {
        assert!(Pokemon::parse("zz: Pikachu").is_none());
        assert!(Pokemon::parse("").is_none());
    }

    #[test]
    fn test_parse_details() {
        let details = PokemonDetails::parse("Pikachu, L50, M, shiny, tera:Electric");
        assert_eq!(details.species, "Pikachu");
        assert_eq!(details.level, Some(50));
        assert_eq!(details.gender, Some('M'));
        assert!(details.shiny);
        assert_eq!(details.tera_type.as_deref(), Some("Electric"));

        let compact = PokemonDetails::parse("Pikachu,L50,M");
        assert_eq!(compact.level, Some(50));
        assert_eq!(compact.gender, Some('M'));
    }

    #[test]
    fn test_parse_hp_status() {
        let hp = HpStatus::parse("50/100 slp").unwrap();
        assert_eq!(hp.current, 50);
        assert_eq!(hp.max, Some(100));
        assert_eq!(hp.status.as_deref(), Some("slp"));

        let fainted = HpStatus::parse("0 fnt").unwrap();
        assert!(fainted.is_fainted());
        assert_eq!(fainted.max, None);
    }
}
