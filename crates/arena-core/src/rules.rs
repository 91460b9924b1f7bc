//! Boundary to the rules engine that owns game state and legality

use crate::error::ArenaError;
use crate::record::Rewards;
use crate::types::{BoardSnapshot, LegalMoves, MoveToken, Side};

/// Result of applying one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub is_terminal: bool,
    pub info: String,
}

/// Final rewards and outcome metadata, requested once the match is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseOutcome {
    pub rewards: Rewards,
    pub reason: String,
}

/// Owns the game state. The match loop only reads it and advances it through
/// [`RulesEngine::apply_move`].
pub trait RulesEngine: Send {
    /// Start a fresh game and return the initial transcript.
    fn reset(&mut self) -> String;

    /// Side to move in the starting position.
    fn first_side(&self) -> Side;

    /// Acting side and the cumulative transcript.
    fn current_observation(&self) -> (Side, String);

    fn board(&self) -> BoardSnapshot;

    fn legal_moves(&self) -> LegalMoves;

    fn is_terminal(&self) -> bool;

    /// Apply `mv` for the side to move. Fails if the move is not legal.
    fn apply_move(&mut self, mv: &MoveToken) -> Result<ApplyOutcome, ArenaError>;

    fn close(&mut self) -> CloseOutcome;
}
