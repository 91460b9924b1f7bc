//! Standard chess rules engine backed by `cozy-chess`.
//!
//! Moves are exposed in UCI coordinate notation. Castling is reported with
//! the king's destination square (`e1g1`), not cozy-chess's internal
//! king-takes-rook encoding.

use cozy_chess::{Board, Color, File, Move, Piece as CozyPiece, Square};

use crate::error::ArenaError;
use crate::record::Rewards;
use crate::rules::{ApplyOutcome, CloseOutcome, RulesEngine};
use crate::types::{BoardSnapshot, LegalMoves, MoveToken, Piece, PieceKind, Side};
use crate::history::MOVE_LINE_MARKER;

const TRANSCRIPT_HEADER: &str = "[GAME] Standard chess. Player 0 plays White, Player 1 plays Black. \
Moves are given in UCI notation inside square brackets, for example [e2e4].";

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEnd {
    /// None for a draw
    pub winner: Option<Side>,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ChessEnv {
    start: Board,
    board: Board,
    /// Position hash after every half-move, for repetition detection
    history: Vec<u64>,
    transcript: Vec<String>,
    result: Option<GameEnd>,
}

impl Default for ChessEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessEnv {
    pub fn new() -> Self {
        Self::with_board(Board::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, ArenaError> {
        let board = Board::from_fen(fen, false)
            .map_err(|e| ArenaError::InvalidFen(format!("{fen}: {e:?}")))?;
        Ok(Self::with_board(board))
    }

    fn with_board(board: Board) -> Self {
        let mut env = Self {
            start: board.clone(),
            board: board.clone(),
            history: Vec::new(),
            transcript: Vec::new(),
            result: None,
        };
        env.reset();
        env
    }

    pub fn result(&self) -> Option<&GameEnd> {
        self.result.as_ref()
    }

    pub fn side_to_move(&self) -> Side {
        side_of(self.board.side_to_move())
    }

    /// Legal moves paired with their UCI text.
    fn legal_pairs(&self) -> Vec<(String, Move)> {
        let mut out = Vec::with_capacity(64);
        self.board.generate_moves(|moves| {
            for mv in moves {
                out.push((self.uci(mv), mv));
            }
            false
        });
        out
    }

    fn uci(&self, mv: Move) -> String {
        let mut to = mv.to;
        let is_castle = self.board.piece_on(mv.from) == Some(CozyPiece::King)
            && self.board.color_on(mv.to) == Some(self.board.side_to_move());
        if is_castle {
            let file = if (mv.to.file() as u8) > (mv.from.file() as u8) {
                File::G
            } else {
                File::C
            };
            to = Square::new(file, mv.from.rank());
        }

        let mut s = format!("{}{}", square_name(mv.from), square_name(to));
        if let Some(promo) = mv.promotion {
            s.push(promotion_letter(promo));
        }
        s
    }

    fn is_threefold_repetition(&self) -> bool {
        let current = self.board.hash();
        self.history.iter().filter(|&&h| h == current).count() >= 3
    }

    fn is_insufficient_material(&self) -> bool {
        let occupied = self.board.occupied().len();
        let minors =
            (self.board.pieces(CozyPiece::Knight) | self.board.pieces(CozyPiece::Bishop)).len();
        occupied == 2 || (occupied == 3 && minors == 1)
    }

    fn check_game_end(&mut self) {
        let to_move = self.side_to_move();

        if self.legal_pairs().is_empty() {
            self.result = Some(if self.board.checkers().is_empty() {
                GameEnd {
                    winner: None,
                    reason: "stalemate".to_string(),
                }
            } else {
                GameEnd {
                    winner: Some(to_move.other()),
                    reason: format!("checkmate, {} wins", to_move.other()),
                }
            });
            return;
        }

        let draw = if self.board.halfmove_clock() >= 100 {
            Some("fifty-move rule")
        } else if self.is_threefold_repetition() {
            Some("threefold repetition")
        } else if self.is_insufficient_material() {
            Some("insufficient material")
        } else {
            None
        };

        if let Some(reason) = draw {
            self.result = Some(GameEnd {
                winner: None,
                reason: format!("draw by {reason}"),
            });
        }
    }
}

impl RulesEngine for ChessEnv {
    fn reset(&mut self) -> String {
        self.board = self.start.clone();
        self.history = vec![self.board.hash()];
        self.transcript = vec![TRANSCRIPT_HEADER.to_string()];
        self.result = None;
        self.check_game_end();
        self.transcript.join("\n")
    }

    fn first_side(&self) -> Side {
        side_of(self.start.side_to_move())
    }

    fn current_observation(&self) -> (Side, String) {
        (self.side_to_move(), self.transcript.join("\n"))
    }

    fn board(&self) -> BoardSnapshot {
        let mut snapshot = BoardSnapshot::empty();
        for idx in 0..64u8 {
            let sq = Square::index(idx as usize);
            if let (Some(piece), Some(color)) = (self.board.piece_on(sq), self.board.color_on(sq)) {
                snapshot.set(idx, Some(Piece::new(side_of(color), kind_of(piece))));
            }
        }
        snapshot
    }

    fn legal_moves(&self) -> LegalMoves {
        if self.result.is_some() {
            return LegalMoves::default();
        }
        LegalMoves::new(
            self.legal_pairs()
                .into_iter()
                .map(|(uci, _)| MoveToken::from_uci(&uci))
                .collect(),
        )
    }

    fn is_terminal(&self) -> bool {
        self.result.is_some()
    }

    fn apply_move(&mut self, mv: &MoveToken) -> Result<ApplyOutcome, ArenaError> {
        if self.result.is_some() {
            return Err(ArenaError::GameOver);
        }

        let side = self.side_to_move();
        let pairs = self.legal_pairs();
        let chosen = pairs
            .iter()
            .find(|(uci, _)| uci == mv.uci())
            .map(|(_, m)| *m)
            .ok_or_else(|| ArenaError::IllegalMove {
                token: mv.to_string(),
                legal: pairs
                    .iter()
                    .map(|(uci, _)| uci.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        self.board.play_unchecked(chosen);
        self.history.push(self.board.hash());
        self.transcript.push(format!(
            "[Player {}] ({side}) {MOVE_LINE_MARKER} {mv}",
            side.idx()
        ));
        self.check_game_end();

        let info = match &self.result {
            Some(end) => end.reason.clone(),
            None => format!("{side} played {mv}"),
        };
        Ok(ApplyOutcome {
            is_terminal: self.result.is_some(),
            info,
        })
    }

    fn close(&mut self) -> CloseOutcome {
        let mut rewards = Rewards::new();
        let reason = match &self.result {
            Some(GameEnd {
                winner: Some(winner),
                reason,
            }) => {
                rewards.insert(winner.idx(), 1);
                rewards.insert(winner.other().idx(), -1);
                reason.clone()
            }
            Some(GameEnd {
                winner: None,
                reason,
            }) => {
                rewards.insert(0, 0);
                rewards.insert(1, 0);
                reason.clone()
            }
            None => {
                rewards.insert(0, 0);
                rewards.insert(1, 0);
                "game ended before a result was reached".to_string()
            }
        };
        CloseOutcome { rewards, reason }
    }
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn kind_of(piece: CozyPiece) -> PieceKind {
    match piece {
        CozyPiece::Pawn => PieceKind::Pawn,
        CozyPiece::Knight => PieceKind::Knight,
        CozyPiece::Bishop => PieceKind::Bishop,
        CozyPiece::Rook => PieceKind::Rook,
        CozyPiece::Queen => PieceKind::Queen,
        CozyPiece::King => PieceKind::King,
    }
}

fn promotion_letter(piece: CozyPiece) -> char {
    match piece {
        CozyPiece::Queen => 'q',
        CozyPiece::Rook => 'r',
        CozyPiece::Bishop => 'b',
        CozyPiece::Knight => 'n',
        _ => 'q',
    }
}

fn square_name(sq: Square) -> String {
    crate::types::sq_to_coord(sq as u8)
}
