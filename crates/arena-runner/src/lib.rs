//! Turn resolution engine for LLM chess matches
//!
//! Each turn the engine formats a bounded-context prompt from game state,
//! invokes the acting agent, validates its answer against the legal moves,
//! retries or falls back to a random legal move, applies the move and emits a
//! replayable [`StepRecord`](arena_core::StepRecord). The
//! [`MatchOrchestrator`] repeats this until the game ends, the turn ceiling is
//! hit or an abort is requested.

mod agent;
mod error;
mod orchestrator;
mod resolver;
mod retry;
mod scripted;
mod sink;
mod turn;

#[cfg(test)]
mod resolver_tests;

pub use agent::*;
pub use error::*;
pub use orchestrator::*;
pub use resolver::*;
pub use retry::*;
pub use scripted::*;
pub use sink::*;
pub use turn::*;
