pub use cozy_chess::{BitBoard, Color, Move, Piece as PieceKind, Square};

/// A piece standing on a square: who owns it and what it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Material value in pawn units (see [`piece_value`]).
    #[inline]
    pub fn value(self) -> i32 {
        piece_value(self.kind)
    }
}

/// Material values in pawn units. The king is worth nothing: it can never
/// be traded, so it must not count towards material balance.
#[inline]
pub fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 1,
        PieceKind::Knight => 3,
        PieceKind::Bishop => 3,
        PieceKind::Rook => 5,
        PieceKind::Queen => 9,
        PieceKind::King => 0,
    }
}

// Helpers
#[inline]
pub fn file_of(sq: Square) -> i32 {
    sq.file() as i32
}

#[inline]
pub fn rank_of(sq: Square) -> i32 {
    sq.rank() as i32
}

/// King-step (Chebyshev) distance between two squares, 0..=7.
#[inline]
pub fn square_distance(a: Square, b: Square) -> i32 {
    let df = (file_of(a) - file_of(b)).abs();
    let dr = (rank_of(a) - rank_of(b)).abs();
    df.max(dr)
}

/// Distance from a square to the nearest board edge: 0 on the rim, 3 in the centre.
#[inline]
pub fn edge_distance(sq: Square) -> i32 {
    let f = file_of(sq);
    let r = rank_of(sq);
    f.min(7 - f).min(r).min(7 - r)
}
