//! The turn loop: read until the server wants a decision, send it, repeat

use pivot_battle::{BattleState, BattleStreamStore, StateBuilder, TrackedBattle};
use pivot_protocol::{BattleAction, BattleEvent, BattleMessage, encode, parse_battle_event};

use crate::config::EnvironmentConfig;
use crate::error::{EnvError, TransportError};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    AwaitingDecision,
    Terminal,
}

/// Drives one battle room.
///
/// Each call reads lines up to the next decision request or the end of the
/// battle, then replaces the current snapshot in one go. A call that fails,
/// or whose future is dropped part way, leaves the previous snapshot, event
/// log and history exactly as they were.
///
/// ```ignore
/// let mut env = BattleEnvironment::new(transport, EnvironmentConfig::new(room));
/// let mut state = env.reset().await?;
/// while !env.is_battle_over() {
///     let action = policy.choose(&state);
///     state = env.step(&action).await?;
/// }
/// ```
pub struct BattleEnvironment<T: Transport, B: StateBuilder = TrackedBattle> {
    transport: T,
    config: EnvironmentConfig,
    builder: B,
    /// The builder as handed in, restored on every reset
    initial_builder: B,
    store: BattleStreamStore,
    state: BattleState,
    history: Vec<BattleState>,
    phase: Phase,
}

impl<T: Transport> BattleEnvironment<T, TrackedBattle> {
    pub fn new(transport: T, config: EnvironmentConfig) -> Self {
        Self::with_builder(transport, TrackedBattle::new(), config)
    }
}

impl<T: Transport, B: StateBuilder> BattleEnvironment<T, B> {
    /// Use a custom state builder
    pub fn with_builder(transport: T, builder: B, config: EnvironmentConfig) -> Self {
        Self {
            transport,
            config,
            initial_builder: builder.clone(),
            builder,
            store: BattleStreamStore::default(),
            state: BattleState::default(),
            history: Vec::new(),
            phase: Phase::Uninitialized,
        }
    }

    /// Read the battle's opening lines up to the first decision request.
    ///
    /// Starts over from the builder the environment was created with: the
    /// event log and history are discarded once the new batch is read.
    pub async fn reset(&mut self) -> Result<BattleState, EnvError> {
        tracing::info!(room = %self.config.battle_room, "Waiting for battle to start");

        let batch = self.read_batch("reset", self.initial_builder.clone()).await?;
        tracing::info!(
            room = %self.config.battle_room,
            events = batch.events.len(),
            "Battle initialized"
        );

        self.history.clear();
        self.store = BattleStreamStore::default();
        Ok(self.commit(batch))
    }

    /// Send an action and read up to the next decision request or battle end.
    ///
    /// Nothing is sent if the action cannot be encoded.
    pub async fn step(&mut self, action: &BattleAction) -> Result<BattleState, EnvError> {
        self.ensure_awaiting_decision()?;

        let command = encode(action)?;
        let line = format!("{}|{}", self.config.battle_room, command);
        tracing::debug!(room = %self.config.battle_room, %command, "Sending action");
        self.transport.send_line(line).await.inspect_err(|e| {
            tracing::error!(room = %self.config.battle_room, error = %e, "Failed to send action");
        })?;

        let batch = self.read_batch("step", self.builder.clone()).await?;
        Ok(self.commit(batch))
    }

    /// Read up to the next decision request without sending anything, for
    /// requests we cannot or need not answer (e.g. the opponent is still
    /// choosing a replacement)
    pub async fn wait_for_next_state(&mut self) -> Result<BattleState, EnvError> {
        self.ensure_awaiting_decision()?;

        let batch = self.read_batch("wait", self.builder.clone()).await?;
        Ok(self.commit(batch))
    }

    pub fn is_battle_over(&self) -> bool {
        self.state.battle_over
    }

    pub fn get_state(&self) -> &BattleState {
        &self.state
    }

    /// Every snapshot since the last reset, oldest first
    pub fn get_history(&self) -> Result<&[BattleState], EnvError> {
        if !self.config.track_history {
            return Err(EnvError::HistoryDisabled);
        }
        Ok(&self.history)
    }

    /// The events received so far, indexed by turn
    pub fn get_battle_stream_store(&self) -> &BattleStreamStore {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn room(&self) -> &str {
        &self.config.battle_room
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give the transport back, e.g. to forfeit over it
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn ensure_awaiting_decision(&self) -> Result<(), EnvError> {
        match self.phase {
            Phase::Uninitialized => Err(EnvError::NotInitialized),
            Phase::Terminal => Err(EnvError::BattleOver),
            Phase::AwaitingDecision => Ok(()),
        }
    }

    /// Read and apply lines to `builder` until a decision point.
    ///
    /// Only the transport is touched before this returns.
    async fn read_batch(&mut self, phase: &'static str, mut builder: B) -> Result<Batch<B>, EnvError> {
        let mut events = Vec::new();

        loop {
            let Some(line) = self.receive_line().await? else {
                tracing::error!(
                    room = %self.config.battle_room,
                    phase,
                    events = events.len(),
                    "Battle stream ended before a decision point"
                );
                return Err(EnvError::ProtocolDesync {
                    room: self.config.battle_room.clone(),
                    phase,
                });
            };

            if line.trim().is_empty() {
                continue;
            }

            let event = parse_battle_event(&line);
            self.log_event(&event);
            builder.apply(&event);

            let decision_point = event.is_decision_request() || event.is_battle_end();
            events.push(event);
            if decision_point {
                return Ok(Batch { builder, events });
            }
        }
    }

    async fn receive_line(&mut self) -> Result<Option<String>, TransportError> {
        let result = match self.config.receive_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.transport.receive_line())
                .await
                .map_err(|_| TransportError::Timeout(timeout))?,
            None => self.transport.receive_line().await,
        };

        result.inspect_err(|e| {
            tracing::error!(room = %self.config.battle_room, error = %e, "Failed to receive");
        })
    }

    fn log_event(&self, event: &BattleEvent) {
        let room = &self.config.battle_room;
        match event.message() {
            BattleMessage::Turn(turn) => tracing::debug!(%room, turn, "Turn started"),
            BattleMessage::Error(message) => tracing::error!(%room, %message, "Server error"),
            BattleMessage::Request(request) if !request.needs_decision() => {
                tracing::debug!(%room, wait = request.wait, "Request needs no decision, reading on");
            }
            BattleMessage::Win(winner) => tracing::info!(%room, %winner, "Battle won"),
            BattleMessage::Tie => tracing::info!(%room, "Battle tied"),
            _ => {}
        }
    }

    /// Make a completed batch visible
    fn commit(&mut self, batch: Batch<B>) -> BattleState {
        let Batch { builder, events } = batch;
        let decided_by_request = events.last().is_some_and(BattleEvent::is_decision_request);

        let snapshot = builder.snapshot();
        self.builder = builder;
        self.store.add_events(events);
        self.state = snapshot.clone();
        if self.config.track_history {
            self.history.push(snapshot.clone());
        }

        self.phase = if snapshot.battle_over || !decided_by_request {
            Phase::Terminal
        } else {
            Phase::AwaitingDecision
        };
        tracing::debug!(
            room = %self.config.battle_room,
            turn = snapshot.turn_number,
            phase = ?self.phase,
            "Snapshot committed"
        );

        snapshot
    }
}

struct Batch<B> {
    builder: B,
    events: Vec<BattleEvent>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::transport::ChannelTransport;
    use pivot_battle::Player;
    use serde_json::json;
    use tokio::sync::mpsc;

    const ROOM: &str = "battle-gen9ou-1";

    fn request_line(moves: &[&str]) -> String {
        let moves: Vec<_> = moves.iter().map(|m| json!({ "move": m })).collect();
        let request = json!({
            "active": [{ "moves": moves }],
            "side": {
                "name": "Alice",
                "id": "p1",
                "pokemon": [
                    { "ident": "p1: Pikachu", "details": "Pikachu, L50, M", "condition": "100/100", "active": true },
                    { "ident": "p1: Snorlax", "details": "Snorlax, L88", "condition": "300/300", "active": false }
                ]
            },
            "rqid": 1
        });
        format!("|request|{}", request)
    }

    fn environment(
        track_history: bool,
    ) -> (
        BattleEnvironment<ChannelTransport>,
        mpsc::UnboundedSender<String>,
        mpsc::UnboundedReceiver<String>,
    ) {
        let (transport, server_tx, server_rx) = ChannelTransport::pair();
        let config = EnvironmentConfig::new(ROOM).with_history(track_history);
        (BattleEnvironment::new(transport, config), server_tx, server_rx)
    }

    fn feed(server: &mpsc::UnboundedSender<String>, lines: &[&str]) {
        for line in lines {
            server.send(line.to_string()).unwrap();
        }
    }

    #[tokio::test]
    async fn test_reset_reads_to_first_request() {
        let (mut env, server, _sent) = environment(false);
        feed(
            &server,
            &[
                "|switch|p1a: Pikachu|Pikachu,L50,M|100/100",
                r#"|request|{"active":[{"moves":[{"move":"Thunder Shock"}]}],"side":{"name":"Alice","id":"p1","pokemon":[]}}"#,
            ],
        );

        let state = env.reset().await.unwrap();
        assert_eq!(state.available_moves, vec!["Thunder Shock".to_string()]);
        assert_eq!(env.get_state(), &state);
        assert_eq!(env.phase(), Phase::AwaitingDecision);
        assert!(!env.is_battle_over());
    }

    #[tokio::test]
    async fn test_reset_fails_when_stream_ends() {
        let (mut env, server, _sent) = environment(false);
        feed(&server, &["|player|p1|Alice|1|", "|gen|9"]);
        drop(server);

        let err = env.reset().await.unwrap_err();
        assert!(matches!(err, EnvError::ProtocolDesync { phase: "reset", .. }));
        assert_eq!(env.get_state(), &BattleState::default());
        assert_eq!(env.phase(), Phase::Uninitialized);
        assert!(env.get_battle_stream_store().events().is_empty());
    }

    #[tokio::test]
    async fn test_step_sends_one_line_and_reads_next_request() {
        let (mut env, server, mut sent) = environment(false);
        feed(&server, &["|switch|p1a: Pikachu|Pikachu, L50, M|100/100", &request_line(&["Thunder Shock"])]);
        let before = env.reset().await.unwrap();

        feed(
            &server,
            &[
                &request_line(&["Thunder Shock", "Quick Attack"]),
                "|move|p1a: Pikachu|Thunder Shock|p2a: Gyarados",
                "|upkeep",
            ],
        );
        let after = env.step(&BattleAction::move_named("Thunder Shock")).await.unwrap();

        assert_eq!(sent.recv().await.as_deref(), Some("battle-gen9ou-1|/choose move thundershock"));
        assert!(sent.try_recv().is_err());
        assert_ne!(after, before);
        assert_eq!(after.available_moves.len(), 2);

        // The trailing lines belong to the next batch
        assert_eq!(env.get_battle_stream_store().events().len(), 3);
    }

    #[tokio::test]
    async fn test_step_desync_keeps_previous_snapshot() {
        let (mut env, server, _sent) = environment(true);
        feed(&server, &[&request_line(&["Thunder Shock"])]);
        let before = env.reset().await.unwrap();

        feed(&server, &["|move|p1a: Pikachu|Thunder Shock|p2a: Gyarados", "|turn|2"]);
        drop(server);

        let err = env.step(&BattleAction::move_named("Thunder Shock")).await.unwrap_err();
        assert!(matches!(err, EnvError::ProtocolDesync { phase: "step", .. }));
        assert_eq!(env.get_state(), &before);
        assert_eq!(env.get_history().unwrap().len(), 1);
        assert_eq!(env.get_battle_stream_store().events().len(), 1);
        assert_eq!(env.phase(), Phase::AwaitingDecision);
    }

    #[tokio::test]
    async fn test_encoding_failure_sends_nothing() {
        let (mut env, server, mut sent) = environment(false);
        feed(&server, &[&request_line(&["Thunder Shock"])]);
        env.reset().await.unwrap();

        let err = env.step(&BattleAction::unknown_move()).await.unwrap_err();
        assert!(matches!(err, EnvError::Encoding(_)));
        assert!(sent.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_battle_end_is_terminal() {
        let (mut env, server, _sent) = environment(true);
        feed(&server, &[&request_line(&["Thunder Shock"])]);
        env.reset().await.unwrap();

        feed(
            &server,
            &["|move|p1a: Pikachu|Thunder Shock|p2a: Gyarados", "|faint|p2a: Gyarados", "|win|Alice"],
        );
        let state = env.step(&BattleAction::move_named("Thunder Shock")).await.unwrap();

        assert!(state.battle_over);
        assert_eq!(state.winner.as_deref(), Some("Alice"));
        assert!(env.is_battle_over());
        assert_eq!(env.phase(), Phase::Terminal);
        assert_eq!(env.get_history().unwrap().len(), 2);

        let err = env.step(&BattleAction::move_named("Thunder Shock")).await.unwrap_err();
        assert!(matches!(err, EnvError::BattleOver));
    }

    #[tokio::test]
    async fn test_tie_has_empty_winner() {
        let (mut env, server, _sent) = environment(false);
        feed(&server, &[&request_line(&["Explosion"])]);
        env.reset().await.unwrap();

        feed(&server, &["|tie"]);
        let state = env.step(&BattleAction::move_named("Explosion")).await.unwrap();
        assert!(state.battle_over);
        assert_eq!(state.winner.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_wait_requests_do_not_end_batch() {
        let (mut env, server, _sent) = environment(false);
        feed(&server, &[&request_line(&["Thunder Shock"])]);
        env.reset().await.unwrap();

        feed(
            &server,
            &[
                r#"|request|{"wait":true,"side":{"name":"Alice","id":"p1","pokemon":[]}}"#,
                "|faint|p2a: Gyarados",
                &request_line(&["Quick Attack"]),
            ],
        );
        let state = env.step(&BattleAction::move_named("Thunder Shock")).await.unwrap();
        assert_eq!(state.available_moves, vec!["Quick Attack".to_string()]);
        assert!(!state.waiting);
    }

    #[tokio::test]
    async fn test_server_error_does_not_end_batch() {
        let (mut env, server, _sent) = environment(false);
        feed(&server, &[&request_line(&["Thunder Shock"])]);
        env.reset().await.unwrap();

        feed(
            &server,
            &["|error|[Invalid choice] Can't move: Pikachu doesn't have a move matching tackle", &request_line(&["Thunder Shock"])],
        );
        let state = env.step(&BattleAction::move_named("Tackle")).await.unwrap();
        assert_eq!(state.available_moves, vec!["Thunder Shock".to_string()]);
    }

    #[tokio::test]
    async fn test_calls_before_reset() {
        let (mut env, _server, _sent) = environment(false);

        assert!(!env.is_battle_over());
        assert!(matches!(
            env.step(&BattleAction::move_named("Thunder Shock")).await,
            Err(EnvError::NotInitialized)
        ));
        assert!(matches!(env.wait_for_next_state().await, Err(EnvError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_history_disabled() {
        let (env, _server, _sent) = environment(false);
        assert!(matches!(env.get_history(), Err(EnvError::HistoryDisabled)));
    }

    #[tokio::test]
    async fn test_wait_for_next_state_sends_nothing() {
        let (mut env, server, mut sent) = environment(true);
        feed(&server, &[&request_line(&["Thunder Shock"])]);
        env.reset().await.unwrap();

        feed(&server, &["|turn|2", &request_line(&["Thunder Shock"])]);
        let state = env.wait_for_next_state().await.unwrap();

        assert_eq!(state.turn_number, 2);
        assert!(sent.try_recv().is_err());
        assert_eq!(env.get_history().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_receive_timeout_is_fatal() {
        let (transport, _server, _sent) = ChannelTransport::pair();
        let config = EnvironmentConfig::new(ROOM).with_receive_timeout(Duration::from_millis(20));
        let mut env = BattleEnvironment::new(transport, config);

        let err = env.reset().await.unwrap_err();
        assert!(matches!(
            err,
            EnvError::Transport(TransportError::Timeout(t)) if t == Duration::from_millis(20)
        ));
        assert_eq!(env.phase(), Phase::Uninitialized);
    }

    #[tokio::test]
    async fn test_cancelled_step_leaves_state_untouched() {
        let (mut env, server, _sent) = environment(false);
        feed(&server, &[&request_line(&["Thunder Shock"])]);
        let before = env.reset().await.unwrap();

        feed(&server, &["|move|p1a: Pikachu|Thunder Shock|p2a: Gyarados"]);
        let action = BattleAction::move_named("Thunder Shock");
        let step = env.step(&action);
        let timed_out = tokio::time::timeout(Duration::from_millis(20), step).await;
        assert!(timed_out.is_err());

        assert_eq!(env.get_state(), &before);
        assert_eq!(env.get_battle_stream_store().events().len(), 1);
    }

    #[tokio::test]
    async fn test_second_reset_starts_from_scratch() {
        let (mut env, server, _sent) = environment(true);
        feed(&server, &["|turn|1", &request_line(&["Thunder Shock"])]);
        env.reset().await.unwrap();
        feed(&server, &["|turn|2", "|win|Alice"]);
        env.step(&BattleAction::move_named("Thunder Shock")).await.unwrap();
        assert_eq!(env.phase(), Phase::Terminal);

        feed(&server, &[&request_line(&["Body Slam"])]);
        let state = env.reset().await.unwrap();

        assert!(!state.battle_over);
        assert_eq!(state.winner, None);
        assert_eq!(state.turn_number, 0);
        assert_eq!(state.available_moves, vec!["Body Slam".to_string()]);
        assert_eq!(env.phase(), Phase::AwaitingDecision);
        assert_eq!(env.get_history().unwrap().len(), 1);
        assert_eq!(env.get_battle_stream_store().events().len(), 1);
    }

    #[tokio::test]
    async fn test_store_tracks_actions_across_steps() {
        let (mut env, server, _sent) = environment(false);
        feed(&server, &["|turn|1", &request_line(&["Volt Switch"])]);
        env.reset().await.unwrap();

        feed(
            &server,
            &[
                "|move|p1a: Pikachu|Volt Switch|p2a: Gyarados",
                "|switch|p1a: Snorlax|Snorlax, L88|300/300|[from] Volt Switch",
                "|turn|2",
                &request_line(&["Body Slam"]),
            ],
        );
        env.step(&BattleAction::move_named("Volt Switch")).await.unwrap();

        let actions = env
            .get_battle_stream_store()
            .get_past_battle_actions(Player::P1, 0);
        assert_eq!(actions[&1].len(), 2);
        assert_eq!(actions[&1][1].switch_pokemon_name(), Some("snorlax"));
    }
}
