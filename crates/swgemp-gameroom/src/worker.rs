//! The worker loop (spec §2, §5): drives [`WorkerState`] forward, folds
//! every polled event through the board projection, and routes decisions
//! through the pipeline before posting a response.
//!
//! Lobby and table selection are treated as an external collaborator (spec
//! §1 Non-goals "matchmaking UI/strategy"): [`Worker::request_table`] is
//! how an outside caller tells the worker which table to join once one has
//! been chosen. Everything from `Joining` onward is this module's own.

use crate::pipeline::resolve_decision;
use crate::snapshot::AdminSnapshot;
use crate::state::WorkerState;
use crate::wedge::WedgeDetector;
use rand::{rngs::SmallRng, SeedableRng};
use std::sync::{mpsc, Arc};
use swgemp_brain::{Brain, BrainContext, DecisionRequest, GameHistory};
use swgemp_cards::CardRegistry;
use swgemp_core::{ChannelNumber, CoreError, StopFlag, WorkerConfig};
use swgemp_gameplay::{apply_event, BoardState, DecisionEvent, DeploymentPlanObserver, Event};
use swgemp_transport::TransportClient;

/// Forwards board-projection notifications to the brain without giving
/// `swgemp-gameplay` a dependency on `swgemp-brain` (spec §4.3 "Deployment-
/// plan coupling" is a worker-level wiring concern, not a processor one).
struct BrainObserver<'a>(&'a mut dyn Brain);

impl<'a> DeploymentPlanObserver for BrainObserver<'a> {
    fn on_my_card_entered_play(&mut self, blueprint_id: &str, card_id: &str) {
        self.0.on_my_card_entered_play(blueprint_id, card_id);
    }
}

/// A decision response ready to post, queued until the fold over the whole
/// batch finishes (spec §5 "event processing ... run to completion without
/// yielding"; posting is its own suspension point).
struct PostedDecision {
    decision_id: String,
    payload: String,
}

pub struct Worker {
    config: WorkerConfig,
    transport: TransportClient,
    registry: &'static CardRegistry,
    brain: Box<dyn Brain>,
    board: BoardState,
    history: GameHistory,
    wedge: WedgeDetector,
    state: WorkerState,
    channel_number: ChannelNumber,
    consecutive_timeouts: u32,
    pending_table: Option<String>,
    stop: Arc<StopFlag>,
    snapshots: mpsc::Sender<AdminSnapshot>,
    rng: SmallRng,
    runtime: tokio::runtime::Runtime,
}

impl Worker {
    pub fn new(
        config: WorkerConfig,
        transport: TransportClient,
        registry: &'static CardRegistry,
        brain: Box<dyn Brain>,
        stop: Arc<StopFlag>,
    ) -> (Self, mpsc::Receiver<AdminSnapshot>) {
        let (tx, rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("build single-threaded runtime for brain calls");
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let worker = Self {
            config,
            transport,
            registry,
            brain,
            board: BoardState::default(),
            history: GameHistory::default(),
            wedge: WedgeDetector::new(),
            state: WorkerState::Stopped,
            channel_number: 0,
            consecutive_timeouts: 0,
            pending_table: None,
            stop,
            snapshots: tx,
            rng: SmallRng::seed_from_u64(seed),
            runtime,
        };
        (worker, rx)
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Tells the worker which table to join once the lobby side has picked
    /// one; has no effect once `WaitingForOpponent` has already begun.
    pub fn request_table(&mut self, table_id: String) {
        self.pending_table = Some(table_id);
    }

    /// Runs the state machine until it reaches `Stopped`, honoring the stop
    /// flag between suspension points (spec §5).
    pub fn run(&mut self) -> Result<(), CoreError> {
        self.state = WorkerState::Connecting;
        loop {
            // Cooperative stop: honored from any state within one poll
            // interval (spec §5), which is why this bypasses the formal
            // transition table `WorkerState::can_transition_to` otherwise
            // enforces — that table models the game's own flow, not the
            // out-of-band stop signal.
            if self.stop.should_stop() {
                self.state = WorkerState::Stopped;
            }
            match self.state {
                WorkerState::Stopped => return Ok(()),
                WorkerState::Connecting => self.tick_connecting(),
                WorkerState::InLobby => self.tick_lobby(),
                WorkerState::WaitingForOpponent => self.tick_waiting(),
                WorkerState::Joining => self.tick_joining(),
                WorkerState::Playing => self.tick_playing(),
                WorkerState::GameEnded => self.tick_game_ended(),
                WorkerState::Reconnecting => self.tick_reconnecting(),
                WorkerState::Error => return Err(CoreError::Fatal("worker entered Error state".to_string())),
            }
        }
    }

    fn tick_connecting(&mut self) {
        match self.transport.login(&self.config.username, &self.config.password) {
            Ok(()) => self.state = WorkerState::InLobby,
            Err(CoreError::Fatal(msg)) => {
                log::error!("[worker] login failed fatally: {msg}");
                self.state = WorkerState::Error;
            }
            Err(e) => {
                log::warn!("[worker] login failed transiently, retrying: {e}");
                std::thread::sleep(self.config.poll_interval);
            }
        }
    }

    fn tick_lobby(&mut self) {
        if let Err(e) = self.transport.hall_list() {
            log::warn!("[worker] hall_list failed while idling: {e}");
        }
        if self.pending_table.is_some() {
            self.state = WorkerState::WaitingForOpponent;
            return;
        }
        std::thread::sleep(self.config.poll_interval);
    }

    fn tick_waiting(&mut self) {
        let Some(table_id) = self.pending_table.clone() else {
            self.state = WorkerState::InLobby;
            return;
        };
        match self.transport.hall_list() {
            Ok(tables) => {
                if let Some(table) = tables.iter().find(|t| t.table_id == table_id) {
                    if table.players.len() >= 2 {
                        self.state = WorkerState::Joining;
                        return;
                    }
                } else {
                    log::warn!("[worker] requested table {table_id} vanished from the hall");
                    self.pending_table = None;
                    self.state = WorkerState::InLobby;
                    return;
                }
            }
            Err(e) => log::warn!("[worker] hall_list failed while waiting for an opponent: {e}"),
        }
        std::thread::sleep(self.config.poll_interval);
    }

    fn tick_joining(&mut self) {
        match self.transport.game_state(0) {
            Ok((channel, events)) => {
                self.channel_number = channel;
                self.consecutive_timeouts = 0;
                let (game_ended, to_post) = self.apply_batch(events);
                self.post_all(to_post);
                self.runtime.block_on(self.brain.on_game_start(&self.board));
                self.state = if game_ended { WorkerState::GameEnded } else { WorkerState::Playing };
            }
            Err(CoreError::Fatal(msg)) => {
                log::error!("[worker] joining failed fatally: {msg}");
                self.state = WorkerState::Error;
            }
            Err(e) => {
                log::warn!("[worker] joining failed transiently, retrying: {e}");
                self.state = WorkerState::InLobby;
                self.pending_table = None;
            }
        }
    }

    fn tick_playing(&mut self) {
        match self.transport.game_state(self.channel_number) {
            Ok((new_channel, events)) => {
                self.consecutive_timeouts = 0;
                let (game_ended, to_post) = self.apply_batch(events);
                self.post_all(to_post);
                self.channel_number = new_channel;
                self.emit_snapshot();
                if game_ended {
                    self.state = WorkerState::GameEnded;
                }
            }
            Err(CoreError::Transient(msg)) => {
                self.consecutive_timeouts += 1;
                log::warn!(
                    "[worker] game_state timeout {}/{}: {msg}",
                    self.consecutive_timeouts,
                    self.config.max_consecutive_timeouts
                );
                if self.consecutive_timeouts >= self.config.max_consecutive_timeouts {
                    self.state = WorkerState::Reconnecting;
                }
            }
            Err(CoreError::Fatal(msg)) => {
                log::error!("[worker] game_state failed fatally: {msg}");
                self.state = WorkerState::Error;
            }
            Err(e) => log::warn!("[worker] game_state error: {e}"),
        }
    }

    fn tick_reconnecting(&mut self) {
        match self.transport.login(&self.config.username, &self.config.password) {
            Ok(()) => {
                log::info!("[worker] reconnected, resuming from channel {}", self.channel_number);
                self.consecutive_timeouts = 0;
                self.state = WorkerState::Playing;
            }
            Err(CoreError::Fatal(msg)) => {
                log::error!("[worker] reconnect login failed fatally: {msg}");
                self.state = WorkerState::Error;
            }
            Err(e) => {
                log::warn!("[worker] reconnect login failed transiently, retrying: {e}");
                std::thread::sleep(self.config.poll_interval);
            }
        }
    }

    fn tick_game_ended(&mut self) {
        let won = self.board.power_advantage() > 0;
        self.runtime.block_on(self.brain.on_game_end(won, &self.board));
        self.board = BoardState::default();
        self.history = GameHistory::default();
        self.wedge.reset();
        self.pending_table = None;
        self.channel_number = 0;
        self.state = WorkerState::InLobby;
    }

    /// Folds every event in order, never yielding mid-batch; decisions are
    /// resolved (not posted) here, and game-end is reported by returning
    /// `true` rather than transitioning state directly — the caller decides
    /// when it's safe to leave `Playing`/`Joining`.
    fn apply_batch(&mut self, events: Vec<Event>) -> (bool, Vec<PostedDecision>) {
        let mut game_ended = false;
        let mut to_post = Vec::new();
        for event in &events {
            let mut observer = BrainObserver(self.brain.as_mut());
            apply_event(&mut self.board, event, self.registry, &mut observer);
            match event {
                Event::Decision(decision) => {
                    let outcome = self.handle_decision(decision);
                    if outcome.abandon {
                        log::warn!("[worker] abandoning decision {} ({})", decision.decision_id, decision.prompt);
                    } else {
                        to_post.push(PostedDecision { decision_id: decision.decision_id.clone(), payload: outcome.option_id });
                    }
                }
                Event::GameEnd => game_ended = true,
                _ => {}
            }
        }
        (game_ended, to_post)
    }

    fn handle_decision(&mut self, decision: &DecisionEvent) -> crate::pipeline::DecisionOutcome {
        self.history.record_decision(&decision.raw_decision_type);
        let request = DecisionRequest::from_event(decision);
        let ctx = BrainContext { board: &self.board, history: &self.history, request: &request };
        let brain_decision = self.runtime.block_on(self.brain.make_decision(&ctx));
        resolve_decision(&request, brain_decision, None, &mut self.wedge, &mut self.rng)
    }

    fn post_all(&self, posted: Vec<PostedDecision>) {
        for p in posted {
            if let Err(e) = self.transport.respond(&p.decision_id, &p.payload) {
                log::warn!("[worker] failed to post decision {}: {e}", p.decision_id);
            }
        }
    }

    fn emit_snapshot(&self) {
        let snapshot = AdminSnapshot::capture(self.channel_number, self.state, &self.board);
        let _ = self.snapshots.send(snapshot);
    }
}
