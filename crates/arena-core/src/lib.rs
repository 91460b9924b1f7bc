//! Core model for LLM chess matches
//!
//! This crate provides:
//! - The game-facing data model (sides, move tokens, board snapshots)
//! - Observation formatting: board rendering, piece listing, history windowing
//!   and exact-placeholder prompt templates
//! - Extraction of a move token from free-form agent output
//! - The rules-engine boundary and a standard chess implementation of it
//! - Per-turn and per-match records, serializable as stable JSON

mod chess_env;
mod error;
mod history;
mod observation;
mod parser;
mod record;
mod render;
mod rules;
mod template;
mod types;

#[cfg(test)]
mod chess_env_tests;
#[cfg(test)]
mod parser_tests;

pub use chess_env::*;
pub use error::*;
pub use history::*;
pub use observation::*;
pub use parser::*;
pub use record::*;
pub use render::*;
pub use rules::*;
pub use template::*;
pub use types::*;
