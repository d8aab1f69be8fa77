mod battle;
mod battle_init;
mod battle_major;
mod battle_minor;
mod battle_progress;
mod fields;
mod global;
mod request;

pub use battle::{GameType, HpStatus, Player, Pokemon, PokemonDetails, Stat};
pub use global::{GlobalMessage, RoomType, parse_global_message};
pub use request::{ActivePokemon, BattleRequest, MoveSlot, SideInfo, SidePokemon};

use crate::ParseError;
use fields::Fields;

/// Decoded fields of one battle protocol line, one variant per recognized keyword
#[derive(Debug, Clone, PartialEq)]
pub enum BattleMessage {
    // === Initialization ===
    Player {
        player: Player,
        username: String,
        avatar: String,
        rating: Option<u32>,
    },
    TeamSize {
        player: Player,
        size: u8,
    },
    GameType(GameType),
    Gen(u8),
    Tier(String),
    Rule(String),
    ClearPoke,
    Poke {
        player: Player,
        details: PokemonDetails,
        has_item: bool,
    },
    TeamPreview(Option<u8>),
    Start,

    // === Major actions ===
    Move {
        pokemon: Pokemon,
        move_name: String,
        target: Option<Pokemon>,
        miss: bool,
        still: bool,
        anim: Option<String>,
        from: Option<String>,
    },
    Switch {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
        /// Effect named by a `[from]` tag, e.g. the pivot move that caused the switch
        from: Option<String>,
    },
    Drag {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Replace {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    DetailsChange {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Cant {
        pokemon: Pokemon,
        reason: String,
        move_name: Option<String>,
    },
    Faint(Pokemon),

    // === Minor actions ===
    Damage {
        pokemon: Pokemon,
        hp_status: Option<HpStatus>,
        from: Option<String>,
    },
    Heal {
        pokemon: Pokemon,
        hp_status: Option<HpStatus>,
        from: Option<String>,
    },
    Status {
        pokemon: Pokemon,
        status: String,
    },
    CureStatus {
        pokemon: Pokemon,
        status: String,
    },
    Terastallize {
        pokemon: Pokemon,
        tera_type: String,
    },
    /// Pain Split and similar effects that set HP outright
    SetHp {
        pokemon: Pokemon,
        hp_status: Option<HpStatus>,
    },
    /// Temporary forme change, e.g. Mimikyu-Busted
    FormeChange {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Transform {
        pokemon: Pokemon,
        target: Pokemon,
    },

    // === Stat stages ===
    Boost {
        pokemon: Pokemon,
        stat: Stat,
        amount: i8,
    },
    Unboost {
        pokemon: Pokemon,
        stat: Stat,
        amount: i8,
    },
    SetBoost {
        pokemon: Pokemon,
        stat: Stat,
        stage: i8,
    },
    ClearBoost(Pokemon),
    ClearAllBoost,
    ClearNegativeBoost(Pokemon),

    // === Abilities, items, volatiles ===
    Ability {
        pokemon: Pokemon,
        ability: String,
        from: Option<String>,
    },
    EndAbility {
        pokemon: Pokemon,
        ability: String,
    },
    Item {
        pokemon: Pokemon,
        item: String,
        from: Option<String>,
    },
    EndItem {
        pokemon: Pokemon,
        item: String,
        from: Option<String>,
    },
    VolatileStart {
        pokemon: Pokemon,
        effect: String,
        silent: bool,
    },
    VolatileEnd {
        pokemon: Pokemon,
        effect: String,
        silent: bool,
    },
    SingleTurn {
        pokemon: Pokemon,
        effect: String,
    },
    SingleMove {
        pokemon: Pokemon,
        effect: String,
    },
    Activate {
        pokemon: Option<Pokemon>,
        effect: String,
        from: Option<String>,
    },
    Prepare {
        pokemon: Pokemon,
        move_name: String,
        target: Option<Pokemon>,
    },

    // === Field and side conditions ===
    Weather {
        weather: String,
        upkeep: bool,
    },
    FieldStart(String),
    FieldEnd(String),
    SideStart {
        player: Player,
        condition: String,
    },
    SideEnd {
        player: Player,
        condition: String,
        from: Option<String>,
    },

    // === Move outcomes ===
    Crit(Pokemon),
    SuperEffective(Pokemon),
    Resisted(Pokemon),
    Immune(Pokemon),
    Miss {
        source: Pokemon,
        target: Option<Pokemon>,
    },
    Fail {
        pokemon: Pokemon,
        action: Option<String>,
    },
    HitCount {
        pokemon: Pokemon,
        count: u8,
    },

    // === Progress ===
    Request(Box<BattleRequest>),
    Upkeep,
    Turn(u32),
    Win(String),
    Tie,
    Error(String),
    Popup(String),
    Pm {
        sender: String,
        recipient: String,
        message: String,
    },

    /// Any keyword this parser does not decode, or a line that failed to decode
    Unknown { keyword: String },
}

/// One parsed protocol line: its decoded fields plus the line verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct BattleEvent {
    raw: String,
    message: BattleMessage,
}

impl BattleEvent {
    pub fn new(raw: impl Into<String>, message: BattleMessage) -> Self {
        Self {
            raw: raw.into(),
            message,
        }
    }

    /// The original protocol line
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn message(&self) -> &BattleMessage {
        &self.message
    }

    /// The second pipe-delimited field of the raw line
    pub fn keyword(&self) -> &str {
        self.raw.split('|').nth(1).unwrap_or("")
    }

    pub fn turn_number(&self) -> Option<u32> {
        match self.message {
            BattleMessage::Turn(turn) => Some(turn),
            _ => None,
        }
    }

    /// A request that asks for a choice (not a `wait` request)
    pub fn is_decision_request(&self) -> bool {
        matches!(&self.message, BattleMessage::Request(request) if request.needs_decision())
    }

    /// `|win|` or `|tie|`
    pub fn is_battle_end(&self) -> bool {
        matches!(self.message, BattleMessage::Win(_) | BattleMessage::Tie)
    }

    /// The player an event is about, for events that concern a single pokemon
    pub fn player(&self) -> Option<Player> {
        match &self.message {
            BattleMessage::Move { pokemon, .. }
            | BattleMessage::Switch { pokemon, .. }
            | BattleMessage::Drag { pokemon, .. }
            | BattleMessage::Replace { pokemon, .. }
            | BattleMessage::DetailsChange { pokemon, .. }
            | BattleMessage::Cant { pokemon, .. }
            | BattleMessage::Damage { pokemon, .. }
            | BattleMessage::Heal { pokemon, .. }
            | BattleMessage::Status { pokemon, .. }
            | BattleMessage::CureStatus { pokemon, .. }
            | BattleMessage::Terastallize { pokemon, .. }
            | BattleMessage::SetHp { pokemon, .. }
            | BattleMessage::FormeChange { pokemon, .. }
            | BattleMessage::Transform { pokemon, .. }
            | BattleMessage::Boost { pokemon, .. }
            | BattleMessage::Unboost { pokemon, .. }
            | BattleMessage::SetBoost { pokemon, .. }
            | BattleMessage::Ability { pokemon, .. }
            | BattleMessage::EndAbility { pokemon, .. }
            | BattleMessage::Item { pokemon, .. }
            | BattleMessage::EndItem { pokemon, .. }
            | BattleMessage::VolatileStart { pokemon, .. }
            | BattleMessage::VolatileEnd { pokemon, .. }
            | BattleMessage::SingleTurn { pokemon, .. }
            | BattleMessage::SingleMove { pokemon, .. }
            | BattleMessage::Prepare { pokemon, .. }
            | BattleMessage::Fail { pokemon, .. }
            | BattleMessage::HitCount { pokemon, .. }
            | BattleMessage::Miss {
                source: pokemon, ..
            } => Some(pokemon.player),
            BattleMessage::Faint(pokemon)
            | BattleMessage::ClearBoost(pokemon)
            | BattleMessage::ClearNegativeBoost(pokemon)
            | BattleMessage::Crit(pokemon)
            | BattleMessage::SuperEffective(pokemon)
            | BattleMessage::Resisted(pokemon)
            | BattleMessage::Immune(pokemon) => Some(pokemon.player),
            BattleMessage::Activate { pokemon, .. } => pokemon.as_ref().map(|p| p.player),
            BattleMessage::Player { player, .. }
            | BattleMessage::TeamSize { player, .. }
            | BattleMessage::Poke { player, .. }
            | BattleMessage::SideStart { player, .. }
            | BattleMessage::SideEnd { player, .. } => Some(*player),
            _ => None,
        }
    }
}

/// Parse a single battle protocol line into a BattleEvent.
///
/// Never fails: unrecognized keywords and lines whose fields do not decode
/// become `BattleMessage::Unknown`, keeping the original text.
pub fn parse_battle_event(line: &str) -> BattleEvent {
    let line = line.trim_end_matches(['\r', '\n']);
    let parts: Vec<&str> = line.split('|').collect();
    let keyword = if parts.len() > 1 && parts[0].is_empty() {
        parts[1]
    } else {
        ""
    };

    match parse_keyword(keyword, &parts) {
        Ok(message) => BattleEvent::new(line, message),
        Err(e) => {
            tracing::warn!(keyword, error = %e, line, "Failed to decode battle message");
            BattleEvent::new(
                line,
                BattleMessage::Unknown {
                    keyword: keyword.to_string(),
                },
            )
        }
    }
}

fn parse_keyword(keyword: &str, parts: &[&str]) -> Result<BattleMessage, ParseError> {
    let fields = Fields::new(parts);
    match keyword {
        "player" => battle_init::parse_player(fields),
        "teamsize" => battle_init::parse_teamsize(fields),
        "gametype" => Ok(BattleMessage::GameType(fields.game_type(2)?)),
        "gen" => Ok(BattleMessage::Gen(fields.number(2, "generation")?)),
        "tier" => Ok(BattleMessage::Tier(fields.text(2))),
        "rule" => Ok(BattleMessage::Rule(fields.text(2))),
        "clearpoke" => Ok(BattleMessage::ClearPoke),
        "poke" => battle_init::parse_poke(fields),
        "teampreview" => battle_init::parse_teampreview(fields),
        "start" => Ok(BattleMessage::Start),

        "move" => battle_major::parse_move(fields),
        "switch" => battle_major::parse_switch(fields),
        "drag" | "replace" | "detailschange" => battle_major::parse_appearance(keyword, fields),
        "cant" => battle_major::parse_cant(fields),
        "faint" => battle_major::parse_faint(fields),

        "-damage" | "-heal" => battle_minor::parse_hp_change(keyword, fields),
        "-status" | "-curestatus" => battle_minor::parse_status_change(keyword, fields),
        "-terastallize" => battle_minor::parse_terastallize(fields),
        "-sethp" => battle_minor::parse_sethp(fields),
        "-formechange" => battle_minor::parse_formechange(fields),
        "-transform" => battle_minor::parse_transform(fields),

        "-boost" | "-unboost" | "-setboost" => battle_minor::parse_stat_stage(keyword, fields),
        "-clearboost" => Ok(BattleMessage::ClearBoost(fields.pokemon(2)?)),
        "-clearallboost" => Ok(BattleMessage::ClearAllBoost),
        "-clearnegativeboost" => Ok(BattleMessage::ClearNegativeBoost(fields.pokemon(2)?)),

        "-ability" | "-endability" | "-item" | "-enditem" => {
            battle_minor::parse_held_effect(keyword, fields)
        }
        "-start" | "-end" | "-singleturn" | "-singlemove" => {
            battle_minor::parse_volatile(keyword, fields)
        }
        "-activate" => battle_minor::parse_activate(fields),
        "-prepare" => battle_minor::parse_prepare(fields),

        "-weather" => battle_minor::parse_weather(fields),
        "-fieldstart" => Ok(BattleMessage::FieldStart(fields.required(2, "condition")?.to_string())),
        "-fieldend" => Ok(BattleMessage::FieldEnd(fields.required(2, "condition")?.to_string())),
        "-sidestart" | "-sideend" => battle_minor::parse_side_condition(keyword, fields),

        "-crit" => Ok(BattleMessage::Crit(fields.pokemon(2)?)),
        "-supereffective" => Ok(BattleMessage::SuperEffective(fields.pokemon(2)?)),
        "-resisted" => Ok(BattleMessage::Resisted(fields.pokemon(2)?)),
        "-immune" => Ok(BattleMessage::Immune(fields.pokemon(2)?)),
        "-miss" => Ok(BattleMessage::Miss {
            source: fields.pokemon(2)?,
            target: fields.optional_pokemon(3),
        }),
        "-fail" => Ok(BattleMessage::Fail {
            pokemon: fields.pokemon(2)?,
            action: fields.get(3).filter(|s| !s.is_empty()).map(str::to_string),
        }),
        "-hitcount" => Ok(BattleMessage::HitCount {
            pokemon: fields.pokemon(2)?,
            count: fields.number(3, "hit count")?,
        }),

        "request" => battle_progress::parse_request(fields),
        "upkeep" => Ok(BattleMessage::Upkeep),
        "turn" => battle_progress::parse_turn(fields),
        "win" => battle_progress::parse_win(fields),
        "tie" => Ok(BattleMessage::Tie),
        "error" => battle_progress::parse_error(fields),
        "popup" => Ok(BattleMessage::Popup(fields.rest(2))),
        "pm" => battle_progress::parse_pm(fields),

        _ => Ok(BattleMessage::Unknown {
            keyword: keyword.to_string(),
        }),
    }
}

/// One websocket frame: an optional `>ROOMID` header followed by protocol lines
#[derive(Debug, Clone, PartialEq)]
pub struct ServerFrame {
    pub room_id: Option<String>,
    pub lines: Vec<String>,
}

/// Split a complete WebSocket frame into its room and non-empty lines
pub fn parse_server_frame(frame: &str) -> ServerFrame {
    let mut lines = frame.lines();
    let mut room_id = None;

    // Check if first line is >ROOMID
    if let Some(first_line) = lines.clone().next()
        && let Some(room) = first_line.strip_prefix('>')
    {
        room_id = Some(room.trim().to_string());
        lines.next();
    }

    let lines = lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect();

    ServerFrame { room_id, lines }
}
