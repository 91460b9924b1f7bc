//! One turn end to end: observe, prompt, resolve, apply, record

use std::time::Instant;

use arena_core::{
    ApplyOutcome, ArenaError, ObservationFormatter, PromptTemplate, RulesEngine, StepRecord,
    TurnContext,
};
use rand::RngCore;
use tracing::info;

use crate::agent::Agent;
use crate::error::TurnError;
use crate::resolver::ActionResolver;

/// A completed turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub step: StepRecord,
    pub outcome: ApplyOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct TurnExecutor {
    formatter: ObservationFormatter,
    resolver: ActionResolver,
}

impl TurnExecutor {
    pub fn new(formatter: ObservationFormatter, resolver: ActionResolver) -> Self {
        Self {
            formatter,
            resolver,
        }
    }

    /// Play turn `turn` for `agent`, advancing `engine` by exactly one move.
    pub async fn execute(
        &self,
        turn: usize,
        engine: &mut dyn RulesEngine,
        agent: &mut dyn Agent,
        template: &PromptTemplate,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<TurnResult, TurnError> {
        let start = Instant::now();

        let (side, transcript) = engine.current_observation();
        let legal = engine.legal_moves();
        if legal.is_empty() {
            return Err(ArenaError::NoLegalMoves(side.to_string()).into());
        }
        let board = engine.board();

        let formatted = self.formatter.format(
            template,
            &TurnContext {
                side,
                first_side: engine.first_side(),
                board: &board,
                legal_moves: &legal,
                transcript: &transcript,
            },
        )?;

        let resolution = self
            .resolver
            .resolve(agent, &formatted.prompt, side, &legal, rng)
            .await?;

        let latency = start.elapsed();

        let outcome = engine
            .apply_move(&resolution.action)
            .map_err(|source| TurnError::Consistency {
                token: resolution.action.clone(),
                source,
            })?;

        let attempt = resolution.attempt;
        let usage = attempt.usage();

        info!(
            turn,
            player = side.label(),
            agent = agent.name(),
            mv = %resolution.action,
            fallback = attempt.is_random_fallback,
            attempts = attempt.attempts_used,
            tokens = usage.total,
            latency_ms = latency.as_millis() as u64,
            "turn complete"
        );

        Ok(TurnResult {
            step: StepRecord {
                turn,
                player_id: side.idx(),
                agent: agent.name().to_string(),
                observation: format!("\n{}\n", formatted.board_text),
                applied_move: resolution.action,
                latency_secs: latency.as_secs_f64(),
                input_tokens: usage.input,
                output_tokens: usage.output,
                total_tokens: usage.total,
                attempt_info: attempt,
            },
            outcome,
        })
    }
}
