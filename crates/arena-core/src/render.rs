//! Text rendering of a board snapshot for agent prompts and run logs.

use crate::types::{sq_to_coord, BoardSnapshot, Side};

const FILES: &str = "a b c d e f g h";

/// Render the board with rank labels on the left and file labels underneath.
///
/// ```text
///    +-----------------+
///  8 | r n b q k b n r |
///  ...
///  1 | R N B Q K B N R |
///    +-----------------+
///     a b c d e f g h
/// ```
pub fn board_with_coords(board: &BoardSnapshot) -> String {
    let inner_width = FILES.len();
    let border = format!("   +{}+", "-".repeat(inner_width + 2));

    let mut lines = Vec::with_capacity(11);
    lines.push(border.clone());
    for rank in (0..8u8).rev() {
        let row: Vec<String> = (0..8u8)
            .map(|file| {
                board
                    .piece_at(rank * 8 + file)
                    .map(|p| p.symbol())
                    .unwrap_or('.')
                    .to_string()
            })
            .collect();
        lines.push(format!(" {} | {} |", rank + 1, row.join(" ")));
    }
    lines.push(border);
    lines.push(format!("    {FILES}"));
    lines.join("\n")
}

/// List every piece with its square, grouped by side.
///
/// Within a side pieces are ordered king, queen, rook, bishop, knight, pawn;
/// ties keep square order (a1, b1, ..., h8).
pub fn piece_positions(board: &BoardSnapshot) -> String {
    [Side::White, Side::Black]
        .iter()
        .map(|&side| {
            let mut pieces: Vec<(u8, String)> = (0..64u8)
                .filter_map(|sq| {
                    let piece = board.piece_at(sq)?;
                    (piece.side == side)
                        .then(|| (piece.kind.rank(), format!("{}-{}", piece.symbol(), sq_to_coord(sq))))
                })
                .collect();
            // Stable sort keeps scan order among equal kinds
            pieces.sort_by_key(|(rank, _)| *rank);

            if pieces.is_empty() {
                format!("{side} pieces: none")
            } else {
                let listed: Vec<String> = pieces.into_iter().map(|(_, s)| s).collect();
                format!("{side} pieces: {}", listed.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
