use arena_core::{ArenaError, MatchRecord, MoveToken};
use thiserror::Error;

/// Failure of a single turn.
#[derive(Error, Debug)]
pub enum TurnError {
    /// Prompt could not be built or no move was available.
    #[error(transparent)]
    Setup(#[from] ArenaError),

    /// The rules engine refused a move the resolver had validated.
    #[error("rules engine rejected validated move {token}: {source}")]
    Consistency {
        token: MoveToken,
        #[source]
        source: ArenaError,
    },
}

/// Failure of a whole match.
#[derive(Error, Debug)]
pub enum MatchError {
    /// Nothing was played; no record exists.
    #[error("match setup failed: {0}")]
    Setup(#[source] ArenaError),

    /// The match stopped on a fatal fault after some turns were sealed.
    /// `partial` holds every completed step for diagnosis.
    #[error("match aborted after {} turns: {source}", .partial.steps.len())]
    Fault {
        partial: Box<MatchRecord>,
        #[source]
        source: TurnError,
    },
}

impl MatchError {
    /// The partial record, if any turns were sealed before the failure.
    pub fn partial(&self) -> Option<&MatchRecord> {
        match self {
            MatchError::Setup(_) => None,
            MatchError::Fault { partial, .. } => Some(partial),
        }
    }
}
