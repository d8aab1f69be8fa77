//! Battle initialization messages, sent once while the battle is set up

use super::BattleMessage;
use super::fields::Fields;
use crate::ParseError;

/// |player|PLAYER|USERNAME|AVATAR|RATING
///
/// Showdown re-sends `|player|PLAYER|` with no name when a player leaves.
pub fn parse_player(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Player {
        player: fields.player(2)?,
        username: fields.text(3),
        avatar: fields.text(4),
        rating: fields.get(5).and_then(|s| s.parse().ok()),
    })
}

/// |teamsize|PLAYER|NUMBER
pub fn parse_teamsize(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::TeamSize {
        player: fields.player(2)?,
        size: fields.number(3, "team size")?,
    })
}

/// |poke|PLAYER|DETAILS|ITEM, one per team member during team preview
pub fn parse_poke(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Poke {
        player: fields.player(2)?,
        details: fields.details(3),
        has_item: fields.get(4) == Some("item"),
    })
}

/// |teampreview or |teampreview|NUMBER
pub fn parse_teampreview(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::TeamPreview(fields.get(2).and_then(|s| s.parse().ok())))
}
