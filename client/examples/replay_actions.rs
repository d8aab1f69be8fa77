//! Replay Actions Example
//!
//! Reads a saved battle log (one protocol line per line, as found in a
//! replay's log field) and prints the actions each player chose per turn.
//!
//! Usage: cargo run --example replay_actions -- <log file> [turns]

use anyhow::{Context, Result};
use pivot_client::{BattleStreamStore, Player};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().context("Usage: replay_actions <log file> [turns]")?;
    let contents =
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;

    let store = BattleStreamStore::from_lines(contents.lines());
    let turns = match args.next() {
        Some(n) => n.parse().context("turns must be a number")?,
        None => store.turns().len(),
    };

    println!(
        "{}: {} events across {} turns",
        path,
        store.events().len(),
        store.turns().len()
    );

    for player in [Player::P1, Player::P2] {
        println!("\n=== {:?} ===", player);
        for (turn, actions) in store.get_past_battle_actions(player, turns) {
            let choices: Vec<String> = actions
                .iter()
                .map(|action| {
                    action
                        .to_choice()
                        .unwrap_or_else(|_| action.action_type().to_string())
                })
                .collect();
            println!("Turn {:>3}: {}", turn, choices.join(", "));
        }
    }

    Ok(())
}
