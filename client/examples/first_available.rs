//! First Available Bot Example
//!
//! Logs in, searches for a battle and plays every battle room it is put in
//! with a trivial policy: the first legal move, else the first legal switch.
//! Set PS_POLICY=random to pick uniformly among legal choices instead.
//!
//! PS_USERNAME / PS_PASSWORD   account credentials (required)
//! PS_FORMAT                   format to search (default gen9randombattle)
//! RUST_LOG                    log filter (default info)

use anyhow::{Context, Result};
use pivot_client::{
    BattleAction, BattleEnvironment, BattleState, ChannelTransport, ClientCommand, ClientMessage,
    Connection, EnvironmentConfig, GlobalMessage, RoomRouter, RoomType, SHOWDOWN_URL, login,
    parse_global_message,
};
use rand::seq::SliceRandom;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Policy {
    First,
    Random,
}

impl Policy {
    fn pick<'a, T>(&self, choices: &'a [T]) -> Option<&'a T> {
        match self {
            Policy::First => choices.first(),
            Policy::Random => choices.choose(&mut rand::thread_rng()),
        }
    }

    fn choose_action(&self, state: &BattleState) -> Option<BattleAction> {
        if state.team_preview {
            return Some(BattleAction::team_order("123456"));
        }

        if !state.force_switch
            && let Some(name) = self.pick(&state.available_moves)
        {
            return Some(
                BattleAction::move_named(name)
                    .with_mega(state.can_mega)
                    .with_tera(state.can_tera),
            );
        }

        let roster = state.our_roster()?;
        let index = self.pick(&state.available_switches)?;
        let pokemon = roster.pokemon.get(*index)?;
        Some(BattleAction::switch_to(&pokemon.name))
    }
}

async fn play(transport: ChannelTransport, room: String, policy: Policy) -> Result<String> {
    let config = EnvironmentConfig::new(room.clone());
    let mut env = BattleEnvironment::new(transport, config);

    let mut state = env.reset().await?;
    while !env.is_battle_over() {
        state = match policy.choose_action(&state) {
            Some(action) => {
                println!("[{}] Turn {}: {:?}", room, state.turn_number, action.to_choice()?);
                env.step(&action).await?
            }
            None => env.wait_for_next_state().await?,
        };
    }

    Ok(match state.winner.as_deref() {
        Some("") | None => "tie".to_string(),
        Some(winner) => format!("won by {}", winner),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let username = std::env::var("PS_USERNAME").context("Set PS_USERNAME environment variable")?;
    let password = std::env::var("PS_PASSWORD").context("Set PS_PASSWORD environment variable")?;
    let format = std::env::var("PS_FORMAT").unwrap_or_else(|_| "gen9randombattle".to_string());
    let policy = match std::env::var("PS_POLICY").as_deref() {
        Ok("random") => Policy::Random,
        _ => Policy::First,
    };

    let mut connection = Connection::connect(SHOWDOWN_URL).await?;
    let confirmed = login(&mut connection, &username, &password).await?;
    println!("Logged in as: {}", confirmed);

    connection
        .send(ClientMessage {
            room_id: None,
            command: ClientCommand::Search(format.clone()),
        })
        .await?;
    println!("Searching for a {} battle...", format);

    let (mut router, mut outgoing) = RoomRouter::new();
    let mut battles = JoinSet::new();

    loop {
        tokio::select! {
            frame = connection.next_frame() => {
                let Some(frame) = frame? else {
                    println!("Connection closed");
                    break;
                };
                let Some(frame) = router.route(frame) else {
                    continue;
                };

                let opens_battle = frame.lines.iter().any(|line| {
                    matches!(parse_global_message(line), Ok(GlobalMessage::Init(RoomType::Battle)))
                });
                match frame.room_id.clone() {
                    Some(room) if opens_battle => {
                        println!("Joined battle: {}", room);
                        let transport = router.open_room(&room);
                        battles.spawn(async move {
                            let result = play(transport, room.clone(), policy).await;
                            (room, result)
                        });
                        router.route(frame);
                    }
                    _ => {
                        for line in &frame.lines {
                            if let Ok(GlobalMessage::Popup(message)) = parse_global_message(line) {
                                println!("Popup: {}", message.replace("||", "\n"));
                            }
                        }
                    }
                }
            }
            Some(line) = outgoing.next() => {
                connection.send_raw(&line).await?;
            }
            Some(finished) = battles.join_next() => {
                let (room, result) = finished?;
                router.close_room(&room);
                match result {
                    Ok(outcome) => println!("[{}] Battle over: {}", room, outcome),
                    Err(e) => eprintln!("[{}] Battle failed: {:#}", room, e),
                }
                connection
                    .send(ClientMessage {
                        room_id: None,
                        command: ClientCommand::LeaveRoom(room),
                    })
                    .await?;
                break;
            }
        }
    }

    connection.close().await
}
