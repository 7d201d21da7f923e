//! Layer rings and the clean-cut operations on them.
//!
//! A ring is the ordered list of wedges on the top or bottom layer, starting
//! at the reference angle. Piece sizes always sum to [`RING_UNITS`]. Position
//! in the list fixes angular placement, so rotating a layer is a pure
//! re-indexing of the list.

use std::fmt;

use crate::error::PuzzleError;
use crate::pieces::{Piece, HALF_RING_UNITS, RING_UNITS};

/// One of the two outer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Top,
    Bottom,
}

impl Layer {
    pub const fn name(self) -> &'static str {
        match self {
            Layer::Top => "top",
            Layer::Bottom => "bottom",
        }
    }

    /// Angular sense of a positive rotation seen from a shared viewpoint.
    ///
    /// The two layers face opposite ways, so the same "clockwise" turn spins
    /// them in opposite directions about the common normal axis.
    pub const fn direction(self) -> i32 {
        match self {
            Layer::Top => -1,
            Layer::Bottom => 1,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Ordered wedges of one layer, summing to exactly 12 step-units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ring {
    pieces: Vec<Piece>,
}

impl Ring {
    /// Builds a ring, checking that it only holds outer pieces filling 12 units.
    pub fn new(pieces: Vec<Piece>) -> Result<Self, PuzzleError> {
        if let Some(middle) = pieces.iter().find(|p| p.is_middle()) {
            return Err(PuzzleError::UnknownPiece(middle.name().to_string()));
        }
        let units: u32 = pieces.iter().map(|p| p.size() as u32).sum();
        if units != RING_UNITS as u32 {
            return Err(PuzzleError::Malformed(format!(
                "ring pieces span {} step-units, expected {}",
                units, RING_UNITS
            )));
        }
        Ok(Self { pieces })
    }

    /// The solved ring of one colour: its eight pieces in id order.
    pub(crate) fn solved(layer: Layer) -> Self {
        let white = layer == Layer::Top;
        Self {
            pieces: Piece::all_outer().filter(|p| p.is_white() == white).collect(),
        }
    }

    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Returns how many leading pieces add up to exactly `units`.
    ///
    /// `None` means the offset lands inside a big piece.
    pub fn cut_len(&self, units: u8) -> Option<usize> {
        let mut cut = 0;
        for (index, piece) in self.pieces.iter().enumerate() {
            cut += piece.size();
            if cut == units {
                return Some(index + 1);
            }
            if cut > units {
                return None;
            }
        }
        None
    }

    /// Returns the ring turned by `steps` units: the prefix of pieces covering
    /// exactly `steps` units moves to the end.
    pub fn rotated(&self, layer: Layer, steps: i32) -> Result<Self, PuzzleError> {
        if !(1..RING_UNITS as i32).contains(&steps) {
            return Err(PuzzleError::InvalidArgument(format!(
                "rotation must be between 1 and {} steps, got {}",
                RING_UNITS - 1,
                steps
            )));
        }
        let prefix = self.cut_len(steps as u8).ok_or(PuzzleError::InvalidCut {
            layer: layer.name(),
            steps,
        })?;

        let mut pieces = self.pieces.clone();
        pieces.rotate_left(prefix);
        Ok(Self { pieces })
    }

    /// Splits the ring into its flippable front half and its fixed back half.
    pub fn halves(&self) -> Option<(&[Piece], &[Piece])> {
        self.cut_len(HALF_RING_UNITS)
            .map(|prefix| self.pieces.split_at(prefix))
    }

    /// True when a piece boundary sits on the slice, so a flip can pass.
    pub fn is_flippable(&self) -> bool {
        self.cut_len(HALF_RING_UNITS).is_some()
    }

    /// Builds a ring from a new front half and the back half of another ring.
    pub(crate) fn joined(front: &[Piece], back: &[Piece]) -> Self {
        let mut pieces = Vec::with_capacity(front.len() + back.len());
        pieces.extend_from_slice(front);
        pieces.extend_from_slice(back);
        Self { pieces }
    }

    pub fn slots(&self) -> impl Iterator<Item = (Piece, u8)> + '_ {
        slots(&self.pieces)
    }

    /// Counts cyclically adjacent pairs that are also neighbours when solved.
    pub fn solved_score(&self) -> u8 {
        let len = self.pieces.len();
        (0..len)
            .filter(|&i| self.pieces[i].is_followed_by(self.pieces[(i + 1) % len]))
            .count() as u8
    }
}

/// Iterates over `(piece, slot)` pairs, `slot` being the step-unit offset of
/// the piece's leading edge from the reference angle.
pub fn slots(pieces: &[Piece]) -> impl Iterator<Item = (Piece, u8)> + '_ {
    pieces.iter().scan(0u8, |offset, &piece| {
        let slot = *offset;
        *offset += piece.size();
        Some((piece, slot))
    })
}

impl fmt::Display for Ring {
    /// Writes comma-separated names with `|` on the half-ring boundary.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut units = 0;
        for (index, piece) in self.pieces.iter().enumerate() {
            if index > 0 {
                f.write_str(if units == HALF_RING_UNITS { "|" } else { "," })?;
            }
            f.write_str(piece.name())?;
            units += piece.size();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(names: &[&str]) -> Ring {
        Ring::new(
            names
                .iter()
                .map(|name| Piece::from_name(name).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn sizes(ring: &Ring) -> Vec<u8> {
        ring.pieces().iter().map(|p| p.size()).collect()
    }

    #[test]
    fn test_clean_cut_on_mixed_ring() {
        // sizes [2, 2, 1, 2, 1, 2, 1, 1]
        let r = ring(&["WRB", "WBO", "WB", "WOG", "WO", "WGR", "WG", "WR"]);
        assert_eq!(sizes(&r), vec![2, 2, 1, 2, 1, 2, 1, 1]);

        assert!(matches!(
            r.rotated(Layer::Top, 3),
            Err(PuzzleError::InvalidCut { steps: 3, .. })
        ));

        let turned = r.rotated(Layer::Top, 4).unwrap();
        assert_eq!(turned.to_string(), "WB,WOG,WO,WGR|WG,WR,WRB,WBO");
    }

    #[test]
    fn test_rotation_range_is_checked_first() {
        let r = Ring::solved(Layer::Top);
        for steps in [0, 12, -1, 13] {
            assert!(matches!(
                r.rotated(Layer::Top, steps),
                Err(PuzzleError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_every_clean_cut_keeps_ring_size() {
        let r = Ring::solved(Layer::Bottom);
        for steps in 1..12 {
            if let Ok(turned) = r.rotated(Layer::Bottom, steps) {
                let units: u8 = turned.pieces().iter().map(|p| p.size()).sum();
                assert_eq!(units, RING_UNITS, "rotation by {steps} changed ring size");
                assert_eq!(turned.len(), r.len());
            }
        }
    }

    #[test]
    fn test_halves_and_flippability() {
        let r = Ring::solved(Layer::Top);
        let (front, back) = r.halves().unwrap();
        assert_eq!(front.len(), 4);
        assert_eq!(back.len(), 4);

        // sizes [2, 1, 2, 2, 1, 2, 1, 1]: no boundary at 6
        let blocked = ring(&["WRB", "WB", "WBO", "WOG", "WO", "WGR", "WG", "WR"]);
        assert!(!blocked.is_flippable());
        assert!(blocked.halves().is_none());
        assert_eq!(blocked.to_string(), "WRB,WB,WBO,WOG,WO,WGR,WG,WR");
    }

    #[test]
    fn test_ring_size_is_validated() {
        let short = Ring::new(vec![Piece::from_name("WRB").unwrap()]);
        assert!(matches!(short, Err(PuzzleError::Malformed(_))));

        let mut pieces: Vec<Piece> = Ring::solved(Layer::Top).pieces().to_vec();
        pieces[1] = Piece::MIDDLE_FRONT;
        assert!(matches!(
            Ring::new(pieces),
            Err(PuzzleError::UnknownPiece(_))
        ));
    }

    #[test]
    fn test_slots_accumulate_sizes() {
        let r = Ring::solved(Layer::Top);
        let slots: Vec<u8> = r.slots().map(|(_, slot)| slot).collect();
        assert_eq!(slots, vec![0, 2, 3, 5, 6, 8, 9, 11]);
    }

    #[test]
    fn test_solved_score_is_rotation_invariant() {
        let r = Ring::solved(Layer::Top);
        assert_eq!(r.solved_score(), 8);
        assert_eq!(r.rotated(Layer::Top, 5).unwrap().solved_score(), 8);
    }
}
