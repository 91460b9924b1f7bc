//! Per-turn and per-match records
//!
//! Field names are stable across turns so stored runs can be compared later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::types::MoveToken;

/// Token counters reported by an agent for one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl TokenUsage {
    pub fn new(input: u64, output: u64, total: u64) -> Self {
        Self {
            input,
            output,
            total,
        }
    }
}

impl std::ops::Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage {
            input: self.input + rhs.input,
            output: self.output + rhs.output,
            total: self.total + rhs.total,
        }
    }
}

/// The single attempt kept for a turn: the accepted one, or the last failed
/// one when the move came from the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptInfo {
    pub prompt_input: String,
    pub llm_raw_output: String,
    /// Move parsed out of the raw output, legal or not
    pub cleaned_action: Option<MoveToken>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub is_random_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Agent invocations spent on this turn
    pub attempts_used: u32,
}

impl AttemptInfo {
    pub fn accepted(
        prompt_input: String,
        llm_raw_output: String,
        action: MoveToken,
        usage: TokenUsage,
        attempts_used: u32,
    ) -> Self {
        Self {
            prompt_input,
            llm_raw_output,
            cleaned_action: Some(action),
            input_tokens: usage.input,
            output_tokens: usage.output,
            total_tokens: usage.total,
            is_random_fallback: false,
            failure_reason: None,
            attempts_used,
        }
    }

    /// Failed resolution. Token counters are reported as zero: usage of the
    /// rejected attempt is not attributed to the fallback move.
    pub fn fallback(
        prompt_input: String,
        llm_raw_output: String,
        cleaned_action: Option<MoveToken>,
        failure_reason: String,
        attempts_used: u32,
    ) -> Self {
        Self {
            prompt_input,
            llm_raw_output,
            cleaned_action,
            input_tokens: 0,
            output_tokens: 0,
            total_tokens: 0,
            is_random_fallback: true,
            failure_reason: Some(failure_reason),
            attempts_used,
        }
    }

    pub fn usage(&self) -> TokenUsage {
        TokenUsage::new(self.input_tokens, self.output_tokens, self.total_tokens)
    }
}

/// One turn of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub turn: usize,
    pub player_id: usize,
    pub agent: String,
    /// Board the agent saw, before the move was applied
    pub observation: String,
    pub applied_move: MoveToken,
    pub latency_secs: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub attempt_info: AttemptInfo,
}

impl StepRecord {
    pub fn usage(&self) -> TokenUsage {
        TokenUsage::new(self.input_tokens, self.output_tokens, self.total_tokens)
    }
}

/// Rewards keyed by player id.
pub type Rewards = BTreeMap<usize, i32>;

/// How a match reached its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// The rules engine reported a terminal position
    Decided,
    /// The turn ceiling was reached first
    Stopped,
    /// An external abort request was honoured between turns
    Aborted,
    /// A rules-engine consistency fault ended the match early
    Faulted,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchStatus::Decided => "decided",
            MatchStatus::Stopped => "stopped",
            MatchStatus::Aborted => "aborted",
            MatchStatus::Faulted => "faulted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub reason: String,
    pub turn_count: usize,
}

/// A finished match, sealed once and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: Uuid,
    pub game_label: String,
    /// Agent names by player id
    pub players: [String; 2],
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
    pub status: MatchStatus,
    pub rewards: Rewards,
    pub game_info: GameInfo,
    pub total_agent_time_secs: f64,
}

impl MatchRecord {
    pub fn fallback_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.attempt_info.is_random_fallback)
            .count()
    }

    pub fn total_usage(&self) -> TokenUsage {
        self.steps
            .iter()
            .fold(TokenUsage::default(), |acc, s| acc + s.usage())
    }

    /// Steps keyed by turn index, the layout of `stepsinfo.json`.
    pub fn steps_info(&self) -> BTreeMap<usize, &StepRecord> {
        self.steps.iter().map(|s| (s.turn, s)).collect()
    }
}
