//! Piece universe definitions.
//!
//! The puzzle has a fixed set of eighteen pieces: eight white (top) and eight
//! yellow (bottom) wedges that travel between the two outer rings, and two
//! middle half-bands that never leave the slice. Pieces are identified by a
//! small index into const tables, so they are `Copy` and cheap to hash.

use std::fmt;

/// Number of 30° step-units around a full ring.
pub const RING_UNITS: u8 = 12;

/// Number of step-units in half a ring (one flippable half-band).
pub const HALF_RING_UNITS: u8 = 6;

/// Number of pieces that move between the top and bottom rings.
pub const NUM_OUTER_PIECES: usize = 16;

/// Number of pieces of one colour, i.e. the length of a solved ring.
pub const PIECES_PER_COLOR: u8 = 8;

/// Shape of a piece, which fixes how many step-units it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// Edge wedge, 1 step-unit wide.
    Small,
    /// Corner wedge, 2 step-units wide.
    Big,
    /// Half of the middle slice, 6 step-units wide.
    Middle,
}

impl PieceKind {
    /// Number of step-units a piece of this kind occupies on its ring.
    pub const fn size(self) -> u8 {
        match self {
            PieceKind::Small => 1,
            PieceKind::Big => 2,
            PieceKind::Middle => HALF_RING_UNITS,
        }
    }
}

/// Name and shape of every piece, indexed by [`Piece::id`].
///
/// Ids 0..8 are the white pieces in solved top-ring order, ids 8..16 the
/// yellow pieces in solved bottom-ring order, and 16..18 the middle halves.
const PIECE_TABLE: [(&str, PieceKind); 18] = [
    // white (top) ring, starting at the reference angle
    ("WRB", PieceKind::Big),
    ("WB", PieceKind::Small),
    ("WBO", PieceKind::Big),
    ("WO", PieceKind::Small),
    ("WOG", PieceKind::Big),
    ("WG", PieceKind::Small),
    ("WGR", PieceKind::Big),
    ("WR", PieceKind::Small),
    // yellow (bottom) ring
    ("YO", PieceKind::Small),
    ("YOB", PieceKind::Big),
    ("YB", PieceKind::Small),
    ("YBR", PieceKind::Big),
    ("YR", PieceKind::Small),
    ("YRG", PieceKind::Big),
    ("YG", PieceKind::Small),
    ("YGO", PieceKind::Big),
    // middle slice
    ("MF", PieceKind::Middle),
    ("MB", PieceKind::Middle),
];

/// A single named piece of the puzzle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Piece(u8);

impl Piece {
    /// Front half of the middle slice; the one that swings during a flip.
    pub const MIDDLE_FRONT: Piece = Piece(16);
    /// Back half of the middle slice; it never moves.
    pub const MIDDLE_BACK: Piece = Piece(17);

    /// Both middle pieces, front first.
    pub const MIDDLE: [Piece; 2] = [Piece::MIDDLE_FRONT, Piece::MIDDLE_BACK];

    /// Returns the outer piece with the given id, if `id` is in `0..16`.
    pub fn outer(id: u8) -> Option<Piece> {
        (id < NUM_OUTER_PIECES as u8).then_some(Piece(id))
    }

    /// Iterates over the sixteen outer pieces in id order.
    pub fn all_outer() -> impl Iterator<Item = Piece> {
        (0..NUM_OUTER_PIECES as u8).map(Piece)
    }

    /// Looks up an outer piece by its colour name, e.g. `"WRB"`.
    ///
    /// Middle pieces are not part of the ring universe and are never returned.
    pub fn from_name(name: &str) -> Option<Piece> {
        PIECE_TABLE[..NUM_OUTER_PIECES]
            .iter()
            .position(|&(candidate, _)| candidate == name)
            .map(|id| Piece(id as u8))
    }

    #[inline]
    pub fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn name(self) -> &'static str {
        PIECE_TABLE[self.0 as usize].0
    }

    #[inline]
    pub fn kind(self) -> PieceKind {
        PIECE_TABLE[self.0 as usize].1
    }

    /// Number of step-units this piece occupies.
    #[inline]
    pub fn size(self) -> u8 {
        self.kind().size()
    }

    pub fn is_middle(self) -> bool {
        self.kind() == PieceKind::Middle
    }

    /// White pieces start on the top ring; yellow ones on the bottom ring.
    pub fn is_white(self) -> bool {
        self.0 < PIECES_PER_COLOR
    }

    /// Returns true if `other` directly follows this piece in its solved ring.
    ///
    /// The relation is cyclic: the last piece of a colour is followed by the
    /// first. Middle pieces follow nothing.
    pub fn is_followed_by(self, other: Piece) -> bool {
        if self.is_middle() || other.is_middle() || self.is_white() != other.is_white() {
            return false;
        }
        let sequence = self.0 % PIECES_PER_COLOR;
        (sequence + 1) % PIECES_PER_COLOR == other.0 % PIECES_PER_COLOR
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece({})", self.name())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_color_fills_exactly_one_ring() {
        let white: u8 = Piece::all_outer()
            .filter(|p| p.is_white())
            .map(Piece::size)
            .sum();
        let yellow: u8 = Piece::all_outer()
            .filter(|p| !p.is_white())
            .map(Piece::size)
            .sum();
        assert_eq!(white, RING_UNITS);
        assert_eq!(yellow, RING_UNITS);
    }

    #[test]
    fn test_four_small_and_four_big_per_color() {
        for white in [true, false] {
            let (small, big): (Vec<Piece>, Vec<Piece>) = Piece::all_outer()
                .filter(|p| p.is_white() == white)
                .partition(|p| p.kind() == PieceKind::Small);
            assert_eq!(small.len(), 4);
            assert_eq!(big.len(), 4);
        }
    }

    #[test]
    fn test_names_are_unique_and_resolve() {
        for piece in Piece::all_outer() {
            assert_eq!(Piece::from_name(piece.name()), Some(piece));
        }
        assert_eq!(Piece::from_name("MF"), None);
        assert_eq!(Piece::from_name("XYZ"), None);
    }

    #[test]
    fn test_successor_wraps_within_color() {
        let wr = Piece::from_name("WR").unwrap();
        let wrb = Piece::from_name("WRB").unwrap();
        let yo = Piece::from_name("YO").unwrap();
        assert!(wr.is_followed_by(wrb));
        assert!(!wr.is_followed_by(yo));
        assert!(!Piece::MIDDLE_FRONT.is_followed_by(Piece::MIDDLE_BACK));
    }
}
