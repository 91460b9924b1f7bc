//! Retry and fallback policy turning agent output into a legal move.
//!
//! Per turn the resolver moves through `Attempting(1..=R)` and ends in
//! exactly one of two terminal states:
//! - accepted: the parsed move is in the legal set (`is_random_fallback = false`)
//! - fallback: every attempt was rejected and a uniformly random legal move is
//!   played instead (`is_random_fallback = true`)
//!
//! Only the final attempt's prompt, text and usage are kept.

use arena_core::{parse_action, ArenaError, AttemptInfo, LegalMoves, MoveToken, Side};
use rand::seq::SliceRandom;
use rand::RngCore;
use tracing::{debug, warn};

use crate::agent::{Agent, AgentReply};
use crate::retry::RetryStrategy;

/// Attempts per turn. One means a rejected answer falls back immediately.
pub const DEFAULT_RETRIES: u32 = 1;

/// Move chosen for a turn together with the attempt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: MoveToken,
    pub attempt: AttemptInfo,
}

impl Resolution {
    pub fn used_fallback(&self) -> bool {
        self.attempt.is_random_fallback
    }
}

#[derive(Debug, Clone)]
pub struct ActionResolver {
    retries: u32,
    strategy: RetryStrategy,
}

impl Default for ActionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES, RetryStrategy::Resend)
    }
}

impl ActionResolver {
    /// `retries` below one is treated as one.
    pub fn new(retries: u32, strategy: RetryStrategy) -> Self {
        Self {
            retries: retries.max(1),
            strategy,
        }
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Resolve one turn's move.
    ///
    /// Fails only when `legal` is empty; agent faults and bad answers end in
    /// the fallback instead.
    pub async fn resolve(
        &self,
        agent: &mut dyn Agent,
        prompt: &str,
        side: Side,
        legal: &LegalMoves,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<Resolution, ArenaError> {
        if legal.is_empty() {
            return Err(ArenaError::NoLegalMoves(side.to_string()));
        }

        let mut prompt = prompt.to_string();
        let mut last_text = String::new();
        let mut last_cleaned = None;
        let mut last_fault = None;

        for attempt in 1..=self.retries {
            let reply = match agent.invoke(&prompt).await {
                Ok(reply) => {
                    last_fault = None;
                    reply
                }
                Err(e) => {
                    warn!(agent = agent.name(), attempt, error = %e, "agent call failed, treating as empty output");
                    last_fault = Some(e.to_string());
                    AgentReply::default()
                }
            };

            let cleaned = parse_action(&reply.text);
            if let Some(action) = cleaned.as_ref().filter(|mv| legal.contains(mv)) {
                return Ok(Resolution {
                    action: action.clone(),
                    attempt: AttemptInfo::accepted(
                        prompt,
                        reply.text,
                        action.clone(),
                        reply.usage,
                        attempt,
                    ),
                });
            }

            debug!(
                agent = agent.name(),
                attempt,
                candidate = cleaned.as_ref().map(MoveToken::as_str).unwrap_or("none"),
                "agent answer rejected"
            );
            last_text = reply.text;
            last_cleaned = cleaned;

            if attempt < self.retries {
                prompt = self.strategy.next_prompt(&prompt, attempt, side);
            }
        }

        let action = legal
            .as_slice()
            .choose(rng)
            .cloned()
            .ok_or_else(|| ArenaError::NoLegalMoves(side.to_string()))?;

        let mut reason = format!(
            "All {} attempts failed. The action '{}' was not a valid move in the valid moves list [{}]. Raw output: {:?}",
            self.retries,
            last_cleaned.as_ref().map(MoveToken::as_str).unwrap_or("None"),
            legal,
            last_text,
        );
        if let Some(fault) = last_fault {
            reason.push_str(&format!(" Last agent error: {fault}"));
        }

        warn!(agent = agent.name(), fallback = %action, "no valid move from agent, playing random fallback");

        Ok(Resolution {
            action,
            attempt: AttemptInfo::fallback(prompt, last_text, last_cleaned, reason, self.retries),
        })
    }
}
