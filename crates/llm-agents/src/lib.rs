//! Model provider adapters implementing [`arena_runner::Agent`]
//!
//! Every adapter is stateless: each call sends the seat's system prompt and
//! the turn prompt, and reports the provider's token counters.

mod chat;
mod gemini;
mod http;
mod provider;

#[cfg(test)]
mod gemini_tests;
#[cfg(test)]
mod provider_tests;

pub use chat::*;
pub use gemini::*;
pub use provider::*;
