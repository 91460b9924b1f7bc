//! Match loop over turns
//!
//! `RUNNING` until the rules engine reports a terminal position (decided),
//! the turn ceiling is reached (stopped) or an abort is requested (aborted).
//! Every exit seals a [`MatchRecord`]; a consistency fault seals a partial
//! one and returns it inside the error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arena_core::{
    board_with_coords, ArenaError, GameInfo, MatchRecord, MatchStatus, ObservationFormatter,
    PromptTemplate, RulesEngine, Side, StepRecord, DEFAULT_HISTORY_WINDOW,
};
use chrono::{DateTime, Utc};
use rand::RngCore;
use tracing::{error, info, warn, Level};
use uuid::Uuid;

use crate::agent::Agent;
use crate::error::{MatchError, TurnError};
use crate::resolver::{ActionResolver, DEFAULT_RETRIES};
use crate::retry::RetryStrategy;
use crate::sink::MatchSink;
use crate::turn::TurnExecutor;

/// Turn ceiling used when none is configured
pub const DEFAULT_STOP_AFTER: usize = 100;

/// Configuration for a match
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub match_id: Uuid,
    pub game_label: String,
    /// Maximum turns before the match is stopped (None = play to the end)
    pub stop_after: Option<usize>,
    /// Half-moves of history shown to the agent
    pub history_window: usize,
    /// Agent attempts per turn before the random fallback
    pub retries: u32,
    pub retry_strategy: RetryStrategy,
    /// Seat (0 or 1) that acts on the first turn
    pub first_mover: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_id: Uuid::new_v4(),
            game_label: "game".to_string(),
            stop_after: Some(DEFAULT_STOP_AFTER),
            history_window: DEFAULT_HISTORY_WINDOW,
            retries: DEFAULT_RETRIES,
            retry_strategy: RetryStrategy::Resend,
            first_mover: 0,
        }
    }
}

/// One participant: an agent and the per-turn prompt for its side.
pub struct Seat {
    pub agent: Box<dyn Agent>,
    pub template: PromptTemplate,
}

impl Seat {
    pub fn new(agent: Box<dyn Agent>, template: PromptTemplate) -> Self {
        Self { agent, template }
    }
}

/// Cloneable abort flag, checked between turns.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Runs one match between two seats
pub struct MatchOrchestrator {
    config: MatchConfig,
    executor: TurnExecutor,
    abort: AbortHandle,
}

/// Seat names ordered by player id (White first), given which seat moves
/// first and which side is to move in the starting position.
pub fn seat_players(names: [&str; 2], first_mover: usize, first_side: Side) -> [String; 2] {
    let first = first_mover % 2;
    let mut players = [String::new(), String::new()];
    players[first_side.idx()] = names[first].to_string();
    players[first_side.other().idx()] = names[1 - first].to_string();
    players
}

impl MatchOrchestrator {
    pub fn new(config: MatchConfig) -> Self {
        let executor = TurnExecutor::new(
            ObservationFormatter::new(config.history_window),
            ActionResolver::new(config.retries, config.retry_strategy.clone()),
        );
        Self {
            config,
            executor,
            abort: AbortHandle::new(),
        }
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Play the match to completion.
    pub async fn run(
        &self,
        engine: &mut dyn RulesEngine,
        seats: &mut [Seat; 2],
        rng: &mut (dyn RngCore + Send),
        sink: &mut dyn MatchSink,
    ) -> Result<MatchRecord, MatchError> {
        engine.reset();
        let first = self.config.first_mover % 2;
        let first_side = engine.first_side();
        let players = seat_players(
            [seats[0].agent.name(), seats[1].agent.name()],
            first,
            first_side,
        );

        let started_at = Utc::now();
        emit(
            sink,
            Level::INFO,
            &format!(
                "Starting match {} ({}) with White Player: {} and Black Player: {}",
                self.config.match_id, self.config.game_label, players[0], players[1]
            ),
        );

        if !engine.is_terminal() && engine.legal_moves().is_empty() {
            return Err(MatchError::Setup(ArenaError::NoLegalMoves(
                first_side.to_string(),
            )));
        }

        let mut steps: Vec<StepRecord> = Vec::new();
        let status = loop {
            if self.abort.is_aborted() {
                warn!(turns = steps.len(), "abort requested, sealing match");
                break MatchStatus::Aborted;
            }
            if engine.is_terminal() {
                break MatchStatus::Decided;
            }
            if self
                .config
                .stop_after
                .is_some_and(|limit| steps.len() >= limit)
            {
                break MatchStatus::Stopped;
            }

            let turn = steps.len();
            let seat = &mut seats[(first + turn) % 2];
            let result = self
                .executor
                .execute(turn, engine, seat.agent.as_mut(), &seat.template, rng)
                .await;

            match result {
                Ok(result) => {
                    narrate_step(sink, &result.step, &board_with_coords(&engine.board()));
                    if let Err(e) = sink.record_step(&result.step) {
                        warn!(error = %e, turn, "match sink rejected step record");
                    }
                    let terminal = result.outcome.is_terminal;
                    steps.push(result.step);
                    if terminal {
                        break MatchStatus::Decided;
                    }
                }
                Err(TurnError::Setup(e)) if steps.is_empty() => {
                    error!(error = %e, "match setup failed");
                    emit(sink, Level::ERROR, &e.to_string());
                    return Err(MatchError::Setup(e));
                }
                Err(source) => {
                    error!(error = %source, turn, "match aborted on fatal fault");
                    emit(sink, Level::ERROR, &source.to_string());
                    let partial = self.seal(
                        engine,
                        players,
                        steps,
                        MatchStatus::Faulted,
                        started_at,
                        Some(source.to_string()),
                    );
                    if let Err(e) = sink.record_match(&partial) {
                        warn!(error = %e, "match sink rejected partial record");
                    }
                    return Err(MatchError::Fault {
                        partial: Box::new(partial),
                        source,
                    });
                }
            }
        };

        let record = self.seal(engine, players, steps, status, started_at, None);
        info!(
            match_id = %record.match_id,
            status = %record.status,
            turns = record.steps.len(),
            fallbacks = record.fallback_count(),
            reason = %record.game_info.reason,
            "match finished"
        );
        emit(
            sink,
            Level::INFO,
            &format!(
                "Match {} finished: {} after {} turns ({})",
                record.match_id,
                record.status,
                record.steps.len(),
                record.game_info.reason
            ),
        );
        if let Err(e) = sink.record_match(&record) {
            warn!(error = %e, "match sink rejected match record");
        }
        Ok(record)
    }

    fn seal(
        &self,
        engine: &mut dyn RulesEngine,
        players: [String; 2],
        steps: Vec<StepRecord>,
        status: MatchStatus,
        started_at: DateTime<Utc>,
        fault: Option<String>,
    ) -> MatchRecord {
        let closing = engine.close();
        let turns = steps.len();
        let reason = match status {
            MatchStatus::Decided => closing.reason,
            MatchStatus::Stopped => format!("stopped after {turns} turns (turn limit reached)"),
            MatchStatus::Aborted => format!("aborted on request after {turns} turns"),
            MatchStatus::Faulted => fault.unwrap_or(closing.reason),
        };

        MatchRecord {
            match_id: self.config.match_id,
            game_label: self.config.game_label.clone(),
            players,
            started_at,
            finished_at: Utc::now(),
            total_agent_time_secs: steps.iter().map(|s| s.latency_secs).sum(),
            steps,
            status,
            rewards: closing.rewards,
            game_info: GameInfo {
                reason,
                turn_count: turns,
            },
        }
    }
}

fn emit(sink: &mut dyn MatchSink, level: Level, message: &str) {
    if let Err(e) = sink.log(level, message) {
        warn!(error = %e, "match sink rejected log entry");
    }
}

/// Human-readable account of one turn for the run log.
fn narrate_step(sink: &mut dyn MatchSink, step: &StepRecord, board_after: &str) {
    let rule = "=".repeat(100);
    let attempt = &step.attempt_info;
    let role = Side::from_idx(step.player_id);

    emit(sink, Level::INFO, &rule);
    emit(
        sink,
        Level::INFO,
        &format!(
            "STEP {} | Player: {role} (ID: {}) | Agent: {}",
            step.turn, step.player_id, step.agent
        ),
    );
    emit(sink, Level::INFO, &rule);
    emit(sink, Level::INFO, &format!("BOARD STATE BEFORE MOVE:{}", step.observation));
    emit(sink, Level::INFO, &format!("PROMPT INPUT:\n{}", attempt.prompt_input));
    emit(sink, Level::INFO, &format!("LLM RAW OUTPUT:\n{}", attempt.llm_raw_output));
    emit(
        sink,
        Level::INFO,
        &format!(
            "CLEANED ACTION: {}",
            attempt
                .cleaned_action
                .as_ref()
                .map(|m| m.as_str())
                .unwrap_or("None")
        ),
    );
    if attempt.is_random_fallback {
        if let Some(reason) = &attempt.failure_reason {
            emit(sink, Level::WARN, &format!("NOTE: {reason}"));
        }
        emit(
            sink,
            Level::WARN,
            &format!("Random fallback move selected: {}", step.applied_move),
        );
    }
    emit(
        sink,
        Level::INFO,
        &format!(
            "TOKENS - Input: {}, Output: {}, Total: {}",
            step.input_tokens, step.output_tokens, step.total_tokens
        ),
    );
    emit(sink, Level::INFO, &format!("FINAL MOVE: {}", step.applied_move));
    emit(sink, Level::INFO, &format!("TIME TAKEN: {:.3}s", step.latency_secs));
    emit(sink, Level::INFO, &format!("BOARD STATE AFTER MOVE:\n{board_after}"));
    emit(sink, Level::INFO, &"-".repeat(100));
}
