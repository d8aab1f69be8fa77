//! Major actions: the moves, switches and faints a turn is made of

use super::BattleMessage;
use super::fields::Fields;
use crate::ParseError;

/// |move|POKEMON|MOVE|TARGET followed by optional tags
pub fn parse_move(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Move {
        pokemon: fields.pokemon(2)?,
        move_name: fields.required(3, "move name")?.to_string(),
        target: fields.optional_pokemon(4),
        miss: fields.has_tag(4, "[miss]"),
        still: fields.has_tag(4, "[still]"),
        anim: fields.tag_value(4, "[anim]"),
        from: fields.from_tag(4),
    })
}

/// |switch|POKEMON|DETAILS|HP STATUS, plus a `[from]` tag when an effect caused it
pub fn parse_switch(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Switch {
        pokemon: fields.pokemon(2)?,
        details: fields.details(3),
        hp_status: fields.hp_status(4),
        from: fields.from_tag(5),
    })
}

/// |drag|, |replace| and |detailschange| share the switch layout
pub fn parse_appearance(keyword: &str, fields: Fields) -> Result<BattleMessage, ParseError> {
    let pokemon = fields.pokemon(2)?;
    let details = fields.details(3);
    let hp_status = fields.hp_status(4);

    Ok(match keyword {
        "drag" => BattleMessage::Drag {
            pokemon,
            details,
            hp_status,
        },
        "replace" => BattleMessage::Replace {
            pokemon,
            details,
            hp_status,
        },
        _ => BattleMessage::DetailsChange {
            pokemon,
            details,
            hp_status,
        },
    })
}

/// |cant|POKEMON|REASON or |cant|POKEMON|REASON|MOVE
pub fn parse_cant(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Cant {
        pokemon: fields.pokemon(2)?,
        reason: fields.text(3),
        move_name: fields.get(4).map(str::to_string),
    })
}

pub fn parse_faint(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Faint(fields.pokemon(2)?))
}
