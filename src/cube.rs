//! Cube-shape positions packed into integers.
//!
//! Once both rings alternate corner and edge wedges, each ring holds exactly
//! eight pieces and every layer turn moves a whole number of them. A
//! [`CubeState`] keeps each ring as eight 4-bit piece ids in one `u32`, the
//! first piece in the high nibble, so a turn is a bit rotation and a flip
//! swaps the high halves of the two words.
//!
//! Key points:
//! - Only flips that keep both rings alternating are generated, so every
//!   reachable state stays in cube shape
//! - [`PruningTable`] stores exact distances for a projection of the state
//!   (corners only or edges only), which is a lower bound for the full state

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::pieces::{Piece, PieceKind, PIECES_PER_COLOR};
use crate::position::{Move, Position};
use crate::ring::Ring;

const BITS_PER_PIECE: u32 = 4;
const PIECE_MASK: u32 = 0xF;

/// The first four pieces of a cube-shape ring, which always span half a ring.
const FRONT_MASK: u32 = 0xFFFF_0000;

/// Stands in for every edge when only corners are tracked (`WB`).
const EDGE_PLACEHOLDER: u32 = 1;
/// Stands in for every corner when only edges are tracked (`WRB`).
const CORNER_PLACEHOLDER: u32 = 0;

/// A move between cube-shape states, counted in pieces rather than step-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeMove {
    Top(u32),
    Bottom(u32),
    Flip,
}

impl CubeMove {
    /// Every move in generation order: top turns, bottom turns, then the flip.
    pub const ALL: [CubeMove; 15] = [
        CubeMove::Top(1),
        CubeMove::Top(2),
        CubeMove::Top(3),
        CubeMove::Top(4),
        CubeMove::Top(5),
        CubeMove::Top(6),
        CubeMove::Top(7),
        CubeMove::Bottom(1),
        CubeMove::Bottom(2),
        CubeMove::Bottom(3),
        CubeMove::Bottom(4),
        CubeMove::Bottom(5),
        CubeMove::Bottom(6),
        CubeMove::Bottom(7),
        CubeMove::Flip,
    ];

    /// True when `self` may directly follow `previous` in a search.
    ///
    /// Two turns of one layer merge into one, two flips cancel, and top and
    /// bottom turns commute, so only the bottom-then-top order is skipped.
    pub fn may_follow(self, previous: Option<CubeMove>) -> bool {
        !matches!(
            (previous, self),
            (Some(CubeMove::Top(_)), CubeMove::Top(_))
                | (Some(CubeMove::Bottom(_)), CubeMove::Bottom(_))
                | (Some(CubeMove::Bottom(_)), CubeMove::Top(_))
                | (Some(CubeMove::Flip), CubeMove::Flip)
        )
    }
}

/// Both rings of a cube-shape position and the middle orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeState {
    top: u32,
    bottom: u32,
    middle_solved: bool,
}

impl CubeState {
    /// The solved position: ids 0..8 on top and 8..16 below, in order.
    pub const SOLVED: CubeState = CubeState {
        top: 0x0123_4567,
        bottom: 0x89AB_CDEF,
        middle_solved: true,
    };

    /// Packs `position`, or returns `None` when it is not in cube shape.
    pub fn from_position(position: &Position) -> Option<Self> {
        Some(Self {
            top: pack(position.top())?,
            bottom: pack(position.bottom())?,
            middle_solved: position.middle_solved(),
        })
    }

    pub fn is_solved(self) -> bool {
        self == Self::SOLVED
    }

    /// Applies `mv`, or returns `None` for a flip that would break the shape.
    pub fn apply(self, mv: CubeMove) -> Option<Self> {
        match mv {
            CubeMove::Top(count) => Some(Self {
                top: self.top.rotate_left(count * BITS_PER_PIECE),
                ..self
            }),
            CubeMove::Bottom(count) => Some(Self {
                bottom: self.bottom.rotate_left(count * BITS_PER_PIECE),
                ..self
            }),
            CubeMove::Flip => self.can_flip().then(|| Self {
                top: (self.bottom & FRONT_MASK) | (self.top & !FRONT_MASK),
                bottom: (self.top & FRONT_MASK) | (self.bottom & !FRONT_MASK),
                middle_solved: !self.middle_solved,
            }),
        }
    }

    /// A flip keeps both rings alternating only if their front halves start
    /// with the same kind of piece.
    pub fn can_flip(self) -> bool {
        kind(nibble(self.top, 0)) == kind(nibble(self.bottom, 0))
    }

    /// Translates `mv`, applied to this state, into step-unit notation.
    pub fn to_move(self, mv: CubeMove) -> Move {
        match mv {
            CubeMove::Top(count) => Move::RotateTop(leading_units(self.top, count)),
            CubeMove::Bottom(count) => Move::RotateBottom(leading_units(self.bottom, count)),
            CubeMove::Flip => Move::Flip,
        }
    }

    /// Forgets which piece of the other kind sits where, keeping only `keep`.
    pub fn projected(self, keep: PieceKind) -> Self {
        let placeholder = match keep {
            PieceKind::Big => EDGE_PLACEHOLDER,
            _ => CORNER_PLACEHOLDER,
        };
        let project = |word: u32| {
            (0..PIECES_PER_COLOR as u32).fold(0, |out, index| {
                let id = nibble(word, index);
                let id = if kind(id) == Some(keep) { id } else { placeholder };
                (out << BITS_PER_PIECE) | id
            })
        };
        Self {
            top: project(self.top),
            bottom: project(self.bottom),
            middle_solved: self.middle_solved,
        }
    }
}

/// Packs an alternating eight-piece ring, first piece in the high nibble.
fn pack(ring: &Ring) -> Option<u32> {
    let pieces = ring.pieces();
    if pieces.len() != PIECES_PER_COLOR as usize {
        return None;
    }
    let alternating = pieces
        .iter()
        .zip(pieces.iter().cycle().skip(1))
        .all(|(a, b)| a.kind() != b.kind());
    alternating.then(|| {
        pieces
            .iter()
            .fold(0, |word, piece| (word << BITS_PER_PIECE) | piece.id() as u32)
    })
}

#[inline]
fn nibble(word: u32, index: u32) -> u32 {
    (word >> ((PIECES_PER_COLOR as u32 - 1 - index) * BITS_PER_PIECE)) & PIECE_MASK
}

#[inline]
fn kind(id: u32) -> Option<PieceKind> {
    Piece::outer(id as u8).map(Piece::kind)
}

/// Step-units covered by the first `count` pieces of a ring.
fn leading_units(word: u32, count: u32) -> i32 {
    (0..count)
        .filter_map(|index| Piece::outer(nibble(word, index) as u8))
        .map(|piece| piece.size() as i32)
        .sum()
}

/// Distances from the solved state for one projection of cube-shape states.
pub struct PruningTable {
    keep: PieceKind,
    distances: FxHashMap<CubeState, u8>,
}

impl PruningTable {
    /// Walks every projected state breadth-first from the projected goal.
    pub fn build(keep: PieceKind) -> Self {
        let goal = CubeState::SOLVED.projected(keep);
        let mut distances = FxHashMap::default();
        distances.insert(goal, 0u8);
        let mut queue = VecDeque::from([goal]);

        while let Some(state) = queue.pop_front() {
            let next = distances[&state] + 1;
            for child in CubeMove::ALL.iter().filter_map(|&mv| state.apply(mv)) {
                distances.entry(child).or_insert_with(|| {
                    queue.push_back(child);
                    next
                });
            }
        }

        log::debug!(
            "{:?} pruning table: {} states, deepest {}",
            keep,
            distances.len(),
            distances.values().max().copied().unwrap_or(0)
        );
        Self { keep, distances }
    }

    /// Fewest moves that could solve `state`. Unknown states count as far away.
    pub fn distance(&self, state: CubeState) -> u8 {
        self.distances
            .get(&state.projected(self.keep))
            .copied()
            .unwrap_or(u8::MAX)
    }

}
