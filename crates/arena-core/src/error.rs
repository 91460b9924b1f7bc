//! Error types shared by the arena crates.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// The template names a placeholder nobody can fill.
    #[error("Template error: unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    /// The template never references a placeholder it is required to carry.
    #[error("Template error: missing required placeholder {{{0}}}")]
    MissingPlaceholder(String),

    #[error("Template error: {0}")]
    MalformedTemplate(String),

    /// A value for a template placeholder was not supplied at render time.
    #[error("Template error: no value supplied for {{{0}}}")]
    UnresolvedPlaceholder(String),

    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    #[error("Illegal move {token} (legal moves: {legal})")]
    IllegalMove { token: String, legal: String },

    #[error("Game is already over")]
    GameOver,

    /// A move was required but the rules engine offered none.
    #[error("No legal moves available for {0} while the game is still running")]
    NoLegalMoves(String),
}
