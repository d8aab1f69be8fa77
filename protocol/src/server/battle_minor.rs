//! Minor actions: the damage, healing and status changes that follow a major action

use super::BattleMessage;
use super::fields::Fields;
use crate::ParseError;

/// |-damage|POKEMON|HP STATUS and |-heal|POKEMON|HP STATUS
pub fn parse_hp_change(keyword: &str, fields: Fields) -> Result<BattleMessage, ParseError> {
    let pokemon = fields.pokemon(2)?;
    let hp_status = fields.hp_status(3);
    let from = fields.from_tag(4);

    Ok(if keyword == "-heal" {
        BattleMessage::Heal {
            pokemon,
            hp_status,
            from,
        }
    } else {
        BattleMessage::Damage {
            pokemon,
            hp_status,
            from,
        }
    })
}

/// |-status|POKEMON|STATUS and |-curestatus|POKEMON|STATUS
pub fn parse_status_change(keyword: &str, fields: Fields) -> Result<BattleMessage, ParseError> {
    let pokemon = fields.pokemon(2)?;
    let status = fields.text(3);

    Ok(if keyword == "-curestatus" {
        BattleMessage::CureStatus { pokemon, status }
    } else {
        BattleMessage::Status { pokemon, status }
    })
}

/// |-terastallize|POKEMON|TYPE
pub fn parse_terastallize(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Terastallize {
        pokemon: fields.pokemon(2)?,
        tera_type: fields.text(3),
    })
}

/// |-sethp|POKEMON|HP STATUS
pub fn parse_sethp(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::SetHp {
        pokemon: fields.pokemon(2)?,
        hp_status: fields.hp_status(3),
    })
}

/// |-formechange|POKEMON|SPECIES|HP STATUS
pub fn parse_formechange(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::FormeChange {
        pokemon: fields.pokemon(2)?,
        details: fields.details(3),
        hp_status: fields.hp_status(4),
    })
}

/// |-transform|POKEMON|TARGET
pub fn parse_transform(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Transform {
        pokemon: fields.pokemon(2)?,
        target: fields.pokemon(3)?,
    })
}

/// |-boost|, |-unboost| and |-setboost|, all POKEMON|STAT|AMOUNT
pub fn parse_stat_stage(keyword: &str, fields: Fields) -> Result<BattleMessage, ParseError> {
    let pokemon = fields.pokemon(2)?;
    let stat = fields.stat(3)?;
    let amount = fields.number(4, "amount")?;

    Ok(match keyword {
        "-setboost" => BattleMessage::SetBoost {
            pokemon,
            stat,
            stage: amount,
        },
        "-unboost" => BattleMessage::Unboost {
            pokemon,
            stat,
            amount,
        },
        _ => BattleMessage::Boost {
            pokemon,
            stat,
            amount,
        },
    })
}

/// |-ability|, |-endability|, |-item| and |-enditem|, all POKEMON|NAME
pub fn parse_held_effect(keyword: &str, fields: Fields) -> Result<BattleMessage, ParseError> {
    let pokemon = fields.pokemon(2)?;
    let name = fields.text(3);
    let from = fields.from_tag(4);

    Ok(match keyword {
        "-ability" => BattleMessage::Ability {
            pokemon,
            ability: name,
            from,
        },
        "-endability" => BattleMessage::EndAbility {
            pokemon,
            ability: name,
        },
        "-item" => BattleMessage::Item {
            pokemon,
            item: name,
            from,
        },
        _ => BattleMessage::EndItem {
            pokemon,
            item: name,
            from,
        },
    })
}

/// |-start|, |-end|, |-singleturn| and |-singlemove|, all POKEMON|EFFECT
pub fn parse_volatile(keyword: &str, fields: Fields) -> Result<BattleMessage, ParseError> {
    let pokemon = fields.pokemon(2)?;
    let effect = fields.required(3, "effect")?.to_string();
    let silent = fields.has_tag(4, "[silent]");

    Ok(match keyword {
        "-start" => BattleMessage::VolatileStart {
            pokemon,
            effect,
            silent,
        },
        "-end" => BattleMessage::VolatileEnd {
            pokemon,
            effect,
            silent,
        },
        "-singleturn" => BattleMessage::SingleTurn { pokemon, effect },
        _ => BattleMessage::SingleMove { pokemon, effect },
    })
}

/// |-activate|POKEMON|EFFECT. Some field effects leave POKEMON empty.
pub fn parse_activate(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Activate {
        pokemon: fields.optional_pokemon(2),
        effect: fields.required(3, "effect")?.to_string(),
        from: fields.from_tag(4),
    })
}

/// |-prepare|POKEMON|MOVE|TARGET, the charge turn of a two-turn move
pub fn parse_prepare(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Prepare {
        pokemon: fields.pokemon(2)?,
        move_name: fields.required(3, "move name")?.to_string(),
        target: fields.optional_pokemon(4),
    })
}

/// |-weather|WEATHER with `[upkeep]` when it merely continues
pub fn parse_weather(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Weather {
        weather: fields.required(2, "weather")?.to_string(),
        upkeep: fields.has_tag(3, "[upkeep]"),
    })
}

/// |-sidestart|SIDE|CONDITION and |-sideend|SIDE|CONDITION
pub fn parse_side_condition(keyword: &str, fields: Fields) -> Result<BattleMessage, ParseError> {
    let player = fields.side(2)?;
    let condition = fields.required(3, "condition")?.to_string();

    Ok(if keyword == "-sideend" {
        BattleMessage::SideEnd {
            player,
            condition,
            from: fields.from_tag(4),
        }
    } else {
        BattleMessage::SideStart { player, condition }
    })
}
