use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ArenaError;

/// Delimiters wrapped around every move token shown to or read from an agent.
pub const MOVE_OPEN: char = '[';
pub const MOVE_CLOSE: char = ']';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Player id used in transcripts and rewards (White = 0).
    pub fn idx(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    pub fn from_idx(idx: usize) -> Side {
        Self::of_ply(idx)
    }

    /// Side that made the half-move at `ply` (0-based) of a game started by White.
    pub fn of_ply(ply: usize) -> Side {
        Side::White.after_plies(ply)
    }

    /// Side to move `plies` half-moves after `self` moved first.
    pub fn after_plies(self, plies: usize) -> Side {
        if plies % 2 == 0 {
            self
        } else {
            self.other()
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Listing order: king first, pawn last.
    pub fn rank(self) -> u8 {
        match self {
            PieceKind::King => 0,
            PieceKind::Queen => 1,
            PieceKind::Rook => 2,
            PieceKind::Bishop => 3,
            PieceKind::Knight => 4,
            PieceKind::Pawn => 5,
        }
    }

    fn letter(self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        }
    }

    fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'k' => Some(PieceKind::King),
            'q' => Some(PieceKind::Queen),
            'r' => Some(PieceKind::Rook),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            'p' => Some(PieceKind::Pawn),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub side: Side,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(side: Side, kind: PieceKind) -> Self {
        Self { side, kind }
    }

    /// Uppercase for White, lowercase for Black.
    pub fn symbol(self) -> char {
        match self.side {
            Side::White => self.kind.letter().to_ascii_uppercase(),
            Side::Black => self.kind.letter(),
        }
    }

    pub fn from_symbol(c: char) -> Option<Piece> {
        let kind = PieceKind::from_letter(c)?;
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        Some(Piece { side, kind })
    }
}

// Square helpers: index = rank * 8 + file, a1 = 0, h8 = 63.
pub fn file_of(sq: u8) -> u8 {
    sq % 8
}
pub fn rank_of(sq: u8) -> u8 {
    sq / 8
}

pub fn sq_to_coord(sq: u8) -> String {
    let f = (b'a' + file_of(sq)) as char;
    let r = (b'1' + rank_of(sq)) as char;
    format!("{f}{r}")
}

/// Read-only copy of piece placement, taken from the rules engine each turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSnapshot {
    squares: [Option<Piece>; 64],
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoardSnapshot {
    pub fn empty() -> Self {
        Self {
            squares: [None; 64],
        }
    }

    pub fn startpos() -> Self {
        Self::from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR")
            .unwrap_or_else(|_| Self::empty())
    }

    /// Build from the piece-placement field of a FEN string.
    pub fn from_placement(placement: &str) -> Result<Self, ArenaError> {
        let field = placement.split_whitespace().next().unwrap_or("");
        let rows: Vec<&str> = field.split('/').collect();
        if rows.len() != 8 {
            return Err(ArenaError::InvalidFen(placement.to_string()));
        }

        let mut board = Self::empty();
        for (i, row) in rows.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file = file
                        .checked_add(skip as u8)
                        .filter(|f| *f <= 8)
                        .ok_or_else(|| ArenaError::InvalidFen(placement.to_string()))?;
                    continue;
                }
                let piece =
                    Piece::from_symbol(c).ok_or_else(|| ArenaError::InvalidFen(placement.to_string()))?;
                if file >= 8 {
                    return Err(ArenaError::InvalidFen(placement.to_string()));
                }
                board.set(rank * 8 + file, Some(piece));
                file += 1;
            }
            if file != 8 {
                return Err(ArenaError::InvalidFen(placement.to_string()));
            }
        }
        Ok(board)
    }

    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.squares.get(sq as usize).copied().flatten()
    }

    pub fn set(&mut self, sq: u8, piece: Option<Piece>) {
        if let Some(slot) = self.squares.get_mut(sq as usize) {
            *slot = piece;
        }
    }
}

/// A move in coordinate notation, always held in its delimited form (`[e2e4]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveToken(String);

impl MoveToken {
    /// Wrap a coordinate move. Surrounding whitespace and delimiters are dropped first.
    pub fn from_uci(uci: &str) -> Self {
        let bare = uci
            .trim()
            .trim_start_matches(MOVE_OPEN)
            .trim_end_matches(MOVE_CLOSE)
            .trim();
        Self(format!("{MOVE_OPEN}{bare}{MOVE_CLOSE}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The coordinate move without delimiters.
    pub fn uci(&self) -> &str {
        self.0
            .strip_prefix(MOVE_OPEN)
            .and_then(|rest| rest.strip_suffix(MOVE_CLOSE))
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for MoveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Moves permitted from the current position, in rules-engine order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegalMoves(Vec<MoveToken>);

impl LegalMoves {
    pub fn new(moves: Vec<MoveToken>) -> Self {
        Self(moves)
    }

    pub fn from_uci<'a>(moves: impl IntoIterator<Item = &'a str>) -> Self {
        Self(moves.into_iter().map(MoveToken::from_uci).collect())
    }

    pub fn contains(&self, mv: &MoveToken) -> bool {
        self.0.iter().any(|m| m == mv)
    }

    pub fn as_slice(&self) -> &[MoveToken] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LegalMoves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(MoveToken::as_str).collect();
        write!(f, "{}", joined.join(", "))
    }
}
