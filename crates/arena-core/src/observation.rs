//! Builds the exact text an agent sees for one turn

use crate::error::ArenaError;
use crate::history::{HistoryWindow, DEFAULT_HISTORY_WINDOW};
use crate::render::{board_with_coords, piece_positions};
use crate::template::{
    PromptTemplate, PH_BOARD, PH_HISTORY, PH_OBSERVATION, PH_PIECE_POSITIONS, PH_ROLE,
    PH_VALID_MOVES,
};
use crate::types::{BoardSnapshot, LegalMoves, Side};

/// Everything the formatter reads for one turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub side: Side,
    /// Side that made the first move of the game
    pub first_side: Side,
    pub board: &'a BoardSnapshot,
    pub legal_moves: &'a LegalMoves,
    /// Full game transcript so far
    pub transcript: &'a str,
}

/// Output of [`ObservationFormatter::format`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedObservation {
    /// Prompt text to send to the agent
    pub prompt: String,
    /// Board rendering embedded in the prompt (pre-move snapshot)
    pub board_text: String,
    pub history: HistoryWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationFormatter {
    history_window: usize,
}

impl Default for ObservationFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl ObservationFormatter {
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    /// Render `template` for the acting side. Pure: no state is read or kept.
    pub fn format(
        &self,
        template: &PromptTemplate,
        ctx: &TurnContext<'_>,
    ) -> Result<FormattedObservation, ArenaError> {
        let board_text = board_with_coords(ctx.board);
        let pieces = piece_positions(ctx.board);
        let valid_moves = ctx.legal_moves.to_string();
        let history = HistoryWindow::extract(ctx.transcript, self.history_window, ctx.first_side);
        let history_text = history.render();

        let prompt = template.render(&[
            (PH_ROLE, ctx.side.label()),
            (PH_BOARD, &board_text),
            (PH_PIECE_POSITIONS, &pieces),
            (PH_VALID_MOVES, &valid_moves),
            (PH_OBSERVATION, &history.observation),
            (PH_HISTORY, &history_text),
        ])?;

        Ok(FormattedObservation {
            prompt,
            board_text,
            history,
        })
    }
}
