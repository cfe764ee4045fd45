//! Position adapter over the cozy-chess rules engine.
//!
//! The search core only ever talks to [`Position`]: it never generates moves,
//! detects mate or parses FEN itself. Positions have value semantics; applying
//! a move returns a fresh position and leaves the original untouched.

use std::fmt;
use std::str::FromStr;

use cozy_chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves, Board,
    File,
};
use thiserror::Error;

use crate::types::*;

/// Errors raised when untrusted input (FEN strings, UCI moves) is turned into
/// positions or moves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    #[error("malformed UCI move '{0}'")]
    MalformedMove(String),

    #[error("malformed position command: {0}")]
    MalformedCommand(String),
}

/// Piece placement only (no side to move, castling, en passant or clocks).
/// Two positions with the same key look identical on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlacementKey {
    colors: [u64; 2],
    pieces: [u64; 6],
}

#[derive(Clone, Debug)]
pub struct Position {
    board: Board,
}

impl Position {
    pub fn startpos() -> Self {
        Self {
            board: Board::default(),
        }
    }

    /// Parses a FEN string. Positions the rules engine considers impossible
    /// (missing kings, side not to move in check, ...) are rejected.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Board::from_fen(fen.trim(), false)
            .map(|board| Self { board })
            .map_err(|e| PositionError::InvalidFen {
                fen: fen.to_string(),
                reason: format!("{e:?}"),
            })
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    /// The wrapped rules-engine board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    // ------------------------------------------------------------------
    // Moves
    // ------------------------------------------------------------------

    /// All legal moves, in the rules engine's (deterministic) generation order.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.board.generate_moves(|piece_moves| {
            moves.extend(piece_moves);
            false
        });
        moves
    }

    pub fn has_legal_moves(&self) -> bool {
        self.board.generate_moves(|piece_moves| !piece_moves.is_empty())
    }

    /// Returns the position after `mv`. The move must come from
    /// [`legal_moves`](Self::legal_moves); use [`try_apply`](Self::try_apply)
    /// for moves of unknown provenance.
    pub fn apply(&self, mv: Move) -> Position {
        let mut board = self.board.clone();
        board.play_unchecked(mv);
        Position { board }
    }

    /// Like [`apply`](Self::apply) but validates the move first.
    pub fn try_apply(&self, mv: Move) -> Result<Position, PositionError> {
        if self.legal_moves().contains(&mv) {
            Ok(self.apply(mv))
        } else {
            Err(PositionError::IllegalMove {
                mv: mv.to_string(),
                fen: self.fen(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Game state
    // ------------------------------------------------------------------

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.board.halfmove_clock() as u32
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_check() && !self.has_legal_moves()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && !self.has_legal_moves()
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock() >= 100
    }

    /// Neither side can ever deliver mate: bare kings, a single minor piece,
    /// or only bishops that all stand on squares of one colour.
    pub fn is_insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = b.pieces(PieceKind::Pawn) | b.pieces(PieceKind::Rook) | b.pieces(PieceKind::Queen);
        if !heavy.is_empty() {
            return false;
        }

        let knights = b.pieces(PieceKind::Knight);
        let bishops = b.pieces(PieceKind::Bishop);
        if knights.len() + bishops.len() <= 1 {
            return true;
        }
        if !knights.is_empty() {
            return false;
        }

        let mut shades = bishops.into_iter().map(|sq| (file_of(sq) + rank_of(sq)) % 2);
        match shades.next() {
            Some(first) => shades.all(|s| s == first),
            None => true,
        }
    }

    /// Checkmate, stalemate, insufficient material or fifty-move exhaustion.
    /// Repetition is deliberately not terminal.
    pub fn is_terminal(&self) -> bool {
        !self.has_legal_moves() || self.is_insufficient_material() || self.is_fifty_move_draw()
    }

    // ------------------------------------------------------------------
    // Board queries
    // ------------------------------------------------------------------

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        let kind = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some(Piece { color, kind })
    }

    #[inline]
    pub fn king(&self, color: Color) -> Square {
        self.board.king(color)
    }

    /// Squares holding pieces of `color` that attack `sq`.
    pub fn attackers(&self, color: Color, sq: Square) -> BitBoard {
        let b = &self.board;
        let occupied = b.occupied();
        let queens = b.pieces(PieceKind::Queen);
        let straight = b.pieces(PieceKind::Rook) | queens;
        let diagonal = b.pieces(PieceKind::Bishop) | queens;

        let all = (get_knight_moves(sq) & b.pieces(PieceKind::Knight))
            | (get_king_moves(sq) & b.pieces(PieceKind::King))
            | (get_rook_moves(sq, occupied) & straight)
            | (get_bishop_moves(sq, occupied) & diagonal)
            // A pawn of `color` attacks sq iff a pawn of the other colour on sq would attack it.
            | (get_pawn_attacks(sq, !color) & b.pieces(PieceKind::Pawn));
        all & b.colors(color)
    }

    /// Total material of one side in pawn units.
    pub fn material(&self, color: Color) -> i32 {
        const KINDS: [PieceKind; 5] = [
            PieceKind::Pawn,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
        ];
        KINDS
            .iter()
            .map(|&kind| self.board.colored_pieces(color, kind).len() as i32 * piece_value(kind))
            .sum()
    }

    pub fn moving_piece(&self, mv: Move) -> Option<Piece> {
        self.piece_at(mv.from)
    }

    /// The piece `mv` would capture, including en passant. Castling (encoded
    /// by the rules engine as king-takes-own-rook) captures nothing.
    pub fn captured_piece(&self, mv: Move) -> Option<Piece> {
        let mover = self.moving_piece(mv)?;
        match self.piece_at(mv.to) {
            Some(target) if target.color != mover.color => Some(target),
            Some(_) => None,
            None if mover.kind == PieceKind::Pawn && mv.from.file() != mv.to.file() => {
                Some(Piece::new(!mover.color, PieceKind::Pawn))
            }
            None => None,
        }
    }

    #[inline]
    pub fn is_promotion(&self, mv: Move) -> bool {
        mv.promotion.is_some()
    }

    pub fn is_castle(&self, mv: Move) -> bool {
        matches!(self.moving_piece(mv), Some(p) if p.kind == PieceKind::King)
            && self.board.color_on(mv.to) == Some(self.side_to_move())
    }

    pub fn placement_key(&self) -> PlacementKey {
        let b = &self.board;
        PlacementKey {
            colors: [b.colors(Color::White).0, b.colors(Color::Black).0],
            pieces: [
                b.pieces(PieceKind::Pawn).0,
                b.pieces(PieceKind::Knight).0,
                b.pieces(PieceKind::Bishop).0,
                b.pieces(PieceKind::Rook).0,
                b.pieces(PieceKind::Queen).0,
                b.pieces(PieceKind::King).0,
            ],
        }
    }

    // ------------------------------------------------------------------
    // UCI move notation
    // ------------------------------------------------------------------

    /// Standard UCI text for `mv`; castling is written as the king's
    /// two-square step rather than the rules engine's king-takes-rook form.
    pub fn move_to_uci(&self, mv: Move) -> String {
        if self.is_castle(mv) {
            let file = if file_of(mv.to) > file_of(mv.from) {
                File::G
            } else {
                File::C
            };
            let to = Square::new(file, mv.from.rank());
            return format!("{}{}", mv.from, to);
        }
        mv.to_string()
    }

    /// Parses a UCI move and matches it against the legal moves, so the
    /// result always carries the rules engine's own encoding.
    pub fn parse_uci_move(&self, text: &str) -> Result<Move, PositionError> {
        let text = text.trim().to_ascii_lowercase();
        if !(4..=5).contains(&text.len()) {
            return Err(PositionError::MalformedMove(text));
        }
        self.legal_moves()
            .into_iter()
            .find(|&mv| self.move_to_uci(mv) == text || mv.to_string() == text)
            .ok_or_else(|| PositionError::IllegalMove {
                mv: text.clone(),
                fen: self.fen(),
            })
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.board.hash() == other.board.hash() && self.fen() == other.fen()
    }
}

impl Eq for Position {}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod position_tests;
