//! Bounded move-history view over the cumulative game transcript.

use crate::types::Side;

/// Transcript lines containing this marker record one completed half-move;
/// the move token is the last word on the line.
pub const MOVE_LINE_MARKER: &str = "made the following move:";

/// Number of half-moves shown to an agent by default.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Rendered in place of the move list before any move has been played.
pub const EMPTY_HISTORY: &str = "[]";

/// One half-move inside the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Absolute 0-based half-move index in the whole game
    pub ply: usize,
    /// Side that played it, derived from `ply` and the side that moved first
    pub side: Side,
    pub token: String,
}

/// The last N half-moves of a transcript plus the matching transcript excerpt.
///
/// Recomputed every turn and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWindow {
    /// Header line followed by every line from the first windowed move onward,
    /// or the untouched transcript when no move has been played.
    pub observation: String,
    pub entries: Vec<HistoryEntry>,
}

impl HistoryWindow {
    /// Extract the last `window` moves from `transcript`.
    ///
    /// Side labels come from each move's absolute position in the game, never
    /// from its position inside the window. Ply 0 belongs to `first_side`.
    pub fn extract(transcript: &str, window: usize, first_side: Side) -> Self {
        let lines: Vec<&str> = transcript.split('\n').collect();

        let moves: Vec<(usize, &str)> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(MOVE_LINE_MARKER))
            .filter_map(|(i, line)| line.split_whitespace().last().map(|token| (i, token)))
            .collect();

        let keep = window.min(moves.len());
        if keep == 0 {
            return Self {
                observation: transcript.to_string(),
                entries: Vec::new(),
            };
        }

        let first_ply = moves.len() - keep;
        let start_line = moves[first_ply].0;

        // Keep the header line unless it is itself the first windowed move
        let header = if start_line == 0 { &lines[..0] } else { &lines[..1] };
        let observation = header
            .iter()
            .chain(lines[start_line..].iter())
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        let entries = moves[first_ply..]
            .iter()
            .enumerate()
            .map(|(offset, (_, token))| {
                let ply = first_ply + offset;
                HistoryEntry {
                    ply,
                    side: first_side.after_plies(ply),
                    token: token.to_string(),
                }
            })
            .collect();

        Self {
            observation,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `White: [e2e4]` / `Black: [e7e5]` lines, or the empty-history marker.
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return EMPTY_HISTORY.to_string();
        }
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.side, e.token))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
