//! Runner for LLM-vs-LLM chess matches
//!
//! This crate provides:
//! - TOML configuration for the game and both agents
//! - Result directories holding step, reward and outcome JSON plus a run log
//! - A comparison report ranking stored runs
//!
//! # Usage
//!
//! ```bash
//! # Play one match described by arena.toml
//! cargo run -p arena-cli -- run --config arena.toml
//!
//! # Rank every stored run
//! cargo run -p arena-cli -- report Results
//! ```

mod config;
mod report;
mod storage;

#[cfg(test)]
mod report_tests;

pub use config::*;
pub use report::*;
pub use storage::*;
