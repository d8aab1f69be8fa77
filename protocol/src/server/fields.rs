//! Positional access to the pipe-delimited fields of a battle line

use std::str::FromStr;

use super::battle::{GameType, HpStatus, Player, Pokemon, PokemonDetails, Stat};
use crate::ParseError;

/// The fields of one line split on `|`.
///
/// Index 0 is the empty string before the leading pipe and index 1 is the
/// keyword, so arguments start at 2. Trailing `[tag]` fields are looked up
/// by name rather than position.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    parts: &'a [&'a str],
}

impl<'a> Fields<'a> {
    pub fn new(parts: &'a [&'a str]) -> Self {
        Self { parts }
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.parts.get(index).copied()
    }

    /// The field, or "" when the line is shorter
    pub fn text(&self, index: usize) -> String {
        self.get(index).unwrap_or("").to_string()
    }

    /// Every field from `index` on, rejoined. For payloads that may contain pipes.
    pub fn rest(&self, index: usize) -> String {
        self.parts.get(index..).map(|p| p.join("|")).unwrap_or_default()
    }

    pub fn required(&self, index: usize, name: &str) -> Result<&'a str, ParseError> {
        self.get(index)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ParseError::MissingField(name.to_string()))
    }

    pub fn number<T: FromStr>(&self, index: usize, name: &str) -> Result<T, ParseError> {
        let raw = self.required(index, name)?;
        raw.trim()
            .parse()
            .map_err(|_| ParseError::InvalidFormat(format!("{} is not a number: {:?}", name, raw)))
    }

    pub fn player(&self, index: usize) -> Result<Player, ParseError> {
        let raw = self.required(index, "player")?;
        Player::parse(raw).ok_or_else(|| ParseError::InvalidFormat(format!("unknown player: {}", raw)))
    }

    pub fn pokemon(&self, index: usize) -> Result<Pokemon, ParseError> {
        let raw = self.required(index, "pokemon")?;
        Pokemon::parse(raw).ok_or_else(|| ParseError::InvalidFormat(format!("bad pokemon id: {}", raw)))
    }

    /// The owner of a side token such as "p1: Alice"
    pub fn side(&self, index: usize) -> Result<Player, ParseError> {
        let raw = self.required(index, "side")?;
        Player::from_prefix(raw).ok_or_else(|| ParseError::InvalidFormat(format!("unknown side: {}", raw)))
    }

    pub fn stat(&self, index: usize) -> Result<Stat, ParseError> {
        let raw = self.required(index, "stat")?;
        Stat::parse(raw).ok_or_else(|| ParseError::InvalidFormat(format!("unknown stat: {}", raw)))
    }

    /// A pokemon id that may be absent or replaced by a tag
    pub fn optional_pokemon(&self, index: usize) -> Option<Pokemon> {
        self.get(index)
            .filter(|s| !s.starts_with('['))
            .and_then(Pokemon::parse)
    }

    pub fn game_type(&self, index: usize) -> Result<GameType, ParseError> {
        let raw = self.required(index, "game type")?;
        GameType::parse(raw).ok_or_else(|| ParseError::InvalidFormat(format!("unknown game type: {}", raw)))
    }

    pub fn details(&self, index: usize) -> PokemonDetails {
        self.get(index).map(PokemonDetails::parse).unwrap_or_default()
    }

    pub fn hp_status(&self, index: usize) -> Option<HpStatus> {
        self.get(index).and_then(HpStatus::parse)
    }

    fn tags(self, start: usize) -> impl Iterator<Item = &'a str> {
        self.parts.get(start..).unwrap_or_default().iter().copied()
    }

    /// Whether a bare tag such as `[miss]` appears at or after `start`
    pub fn has_tag(&self, start: usize, tag: &str) -> bool {
        self.tags(start).any(|part| part == tag)
    }

    /// Value of a `[name]VALUE` tag at or after `start`
    pub fn tag_value(&self, start: usize, name: &str) -> Option<String> {
        self.tags(start)
            .find_map(|part| part.strip_prefix(name))
            .map(|value| value.trim().to_string())
    }

    /// Effect named by a `[from]` tag.
    ///
    /// Both "[from]U-turn" and "[from] move: U-turn" appear in real logs.
    pub fn from_tag(&self, start: usize) -> Option<String> {
        let effect = self.tag_value(start, "[from]")?;
        Some(effect.strip_prefix("move:").unwrap_or(&effect).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_forms() {
        let parts = ["", "switch", "p1a: Clefable", "Clefable, F", "100/100", "[from]U-turn"];
        assert_eq!(Fields::new(&parts).from_tag(5).as_deref(), Some("U-turn"));

        let parts = ["", "switch", "p1a: Clefable", "Clefable, F", "100/100", "[from] move: Flip Turn"];
        assert_eq!(Fields::new(&parts).from_tag(5).as_deref(), Some("Flip Turn"));

        let parts = ["", "switch", "p1a: Clefable", "Clefable, F", "100/100"];
        assert_eq!(Fields::new(&parts).from_tag(5), None);
    }

    #[test]
    fn test_required_and_number() {
        let parts = ["", "turn", "abc"];
        let fields = Fields::new(&parts);
        assert!(matches!(fields.number::<u32>(2, "turn"), Err(ParseError::InvalidFormat(_))));
        assert!(matches!(fields.required(3, "turn"), Err(ParseError::MissingField(_))));
    }

    #[test]
    fn test_rest_rejoins_pipes() {
        let parts = ["", "error", "[Invalid choice]", "Can't move"];
        assert_eq!(Fields::new(&parts).rest(2), "[Invalid choice]|Can't move");
        assert_eq!(Fields::new(&parts).rest(9), "");
    }

    #[test]
    fn test_optional_pokemon_skips_tags() {
        let parts = ["", "move", "p1a: Pikachu", "Protect", "[still]"];
        assert!(Fields::new(&parts).optional_pokemon(4).is_none());
        assert!(Fields::new(&parts).has_tag(4, "[still]"));
    }
}
