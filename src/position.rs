//! Pure puzzle positions and the moves between them.
//!
//! A [`Position`] is a plain value: two rings and the middle orientation.
//! Every operation returns a new position, which keeps the solver free of
//! locking and lets [`crate::state::PuzzleState`] validate a move completely
//! before committing it.
//!
//! Text format (one line, three space-separated fields):
//!
//! ```text
//! WRB,WB,WBO,WO|WOG,WG,WGR,WR true YO,YOB,YB,YBR|YR,YRG,YG,YGO
//! ```
//!
//! Ring fields list piece names from the reference angle, separated by `,`;
//! the separator after the piece that completes the first half-ring is `|`.

use std::fmt;
use std::str::FromStr;

use crate::error::PuzzleError;
use crate::pieces::{Piece, NUM_OUTER_PIECES, RING_UNITS};
use crate::ring::{Layer, Ring};

/// Number of bits used per piece id in a [`PositionKey`].
const BITS_PER_PIECE: u32 = 4;

/// Complete combinatorial state of the puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    top: Ring,
    middle_solved: bool,
    bottom: Ring,
}

/// Compact hashable identity of a position.
///
/// The sixteen outer pieces are packed 4 bits each in ring order (top, then
/// bottom), which fills the `u64` exactly. Ring membership needs no extra
/// bits because the top ring always ends where its sizes reach 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey {
    pieces: u64,
    middle_solved: bool,
}

/// A single move in `t<n>` / `b<n>` / `/` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    RotateTop(i32),
    RotateBottom(i32),
    Flip,
}

/// Set of move kinds allowed as the next move of a sequence.
///
/// Bit 2 = rotate top, bit 1 = flip, bit 0 = rotate bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSet(u8);

/// A position reachable in one move, with the move that reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbour {
    pub mv: Move,
    pub position: Position,
    /// Move kinds worth trying after `mv`.
    pub next: MoveSet,
}

impl Position {
    /// The canonical solved arrangement.
    pub fn solved() -> Self {
        Self {
            top: Ring::solved(Layer::Top),
            middle_solved: true,
            bottom: Ring::solved(Layer::Bottom),
        }
    }

    pub fn is_solved(&self) -> bool {
        *self == Self::solved()
    }

    #[inline]
    pub fn top(&self) -> &Ring {
        &self.top
    }

    #[inline]
    pub fn bottom(&self) -> &Ring {
        &self.bottom
    }

    #[inline]
    pub fn ring(&self, layer: Layer) -> &Ring {
        match layer {
            Layer::Top => &self.top,
            Layer::Bottom => &self.bottom,
        }
    }

    #[inline]
    pub fn middle_solved(&self) -> bool {
        self.middle_solved
    }

    /// Returns this position with one layer turned by `steps` units.
    pub fn rotated(&self, layer: Layer, steps: i32) -> Result<Self, PuzzleError> {
        let ring = self.ring(layer).rotated(layer, steps)?;
        let mut position = self.clone();
        match layer {
            Layer::Top => position.top = ring,
            Layer::Bottom => position.bottom = ring,
        }
        Ok(position)
    }

    pub fn rotated_top(&self, steps: i32) -> Result<Self, PuzzleError> {
        self.rotated(Layer::Top, steps)
    }

    pub fn rotated_bottom(&self, steps: i32) -> Result<Self, PuzzleError> {
        self.rotated(Layer::Bottom, steps)
    }

    /// Returns this position with the front half-band turned over.
    ///
    /// The front half of the top ring trades places with the front half of
    /// the bottom ring and the middle orientation toggles.
    pub fn flipped(&self) -> Result<Self, PuzzleError> {
        let (top_front, top_back) = self.top.halves().ok_or_else(|| no_half(Layer::Top))?;
        let (bottom_front, bottom_back) = self
            .bottom
            .halves()
            .ok_or_else(|| no_half(Layer::Bottom))?;

        Ok(Self {
            top: Ring::joined(bottom_front, top_back),
            middle_solved: !self.middle_solved,
            bottom: Ring::joined(top_front, bottom_back),
        })
    }

    pub fn apply(&self, mv: Move) -> Result<Self, PuzzleError> {
        match mv {
            Move::RotateTop(steps) => self.rotated_top(steps),
            Move::RotateBottom(steps) => self.rotated_bottom(steps),
            Move::Flip => self.flipped(),
        }
    }

    /// Applies a sequence of moves, stopping at the first invalid one.
    pub fn apply_all(&self, moves: &[Move]) -> Result<Self, PuzzleError> {
        moves
            .iter()
            .try_fold(self.clone(), |position, &mv| position.apply(mv))
    }

    /// Returns how many pieces sit next to their solved neighbour.
    ///
    /// Counts adjacent pairs in both rings (cyclically) plus one for a solved
    /// middle. A solved position scores 17; layer rotations never change it.
    pub fn solved_score(&self) -> u8 {
        self.top.solved_score() + self.middle_solved as u8 + self.bottom.solved_score()
    }

    pub fn key(&self) -> PositionKey {
        let pieces = self
            .top
            .pieces()
            .iter()
            .chain(self.bottom.pieces())
            .fold(0u64, |key, piece| {
                (key << BITS_PER_PIECE) | piece.id() as u64
            });
        PositionKey {
            pieces,
            middle_solved: self.middle_solved,
        }
    }

    /// Lists every position one move away, restricted to `allowed` kinds.
    ///
    /// Only rotations that leave the layer flippable are generated; any other
    /// rotation would have to be undone before the next flip anyway.
    pub fn neighbours(&self, allowed: MoveSet) -> Vec<Neighbour> {
        let mut neighbours = Vec::new();

        if allowed.rotate_top() {
            self.push_rotations(Layer::Top, allowed, &mut neighbours);
        }

        if allowed.flip() {
            if let Ok(position) = self.flipped() {
                neighbours.push(Neighbour {
                    mv: Move::Flip,
                    position,
                    next: MoveSet::new(true, false, true),
                });
            }
        }

        if allowed.rotate_bottom() {
            self.push_rotations(Layer::Bottom, allowed, &mut neighbours);
        }

        neighbours
    }

    fn push_rotations(&self, layer: Layer, allowed: MoveSet, out: &mut Vec<Neighbour>) {
        let next = match layer {
            Layer::Top => MoveSet::new(false, true, allowed.rotate_bottom()),
            Layer::Bottom => MoveSet::new(allowed.rotate_top(), true, false),
        };

        for steps in 1..RING_UNITS as i32 {
            let Ok(ring) = self.ring(layer).rotated(layer, steps) else {
                continue;
            };
            if !ring.is_flippable() {
                continue;
            }

            let mut position = self.clone();
            let mv = match layer {
                Layer::Top => {
                    position.top = ring;
                    Move::RotateTop(steps)
                }
                Layer::Bottom => {
                    position.bottom = ring;
                    Move::RotateBottom(steps)
                }
            };
            out.push(Neighbour { mv, position, next });
        }
    }
}

fn no_half(layer: Layer) -> PuzzleError {
    PuzzleError::InvariantViolation(format!(
        "the {} ring has no piece boundary at the half-ring",
        layer
    ))
}

impl Default for Position {
    fn default() -> Self {
        Self::solved()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.top, self.middle_solved, self.bottom)
    }
}

impl FromStr for Position {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [top, middle, bottom] = fields.as_slice() else {
            return Err(PuzzleError::Malformed(format!(
                "expected 3 space-separated fields, found {}",
                fields.len()
            )));
        };

        let middle_solved = match *middle {
            "true" => true,
            "false" => false,
            other => {
                return Err(PuzzleError::Malformed(format!(
                    "middle orientation must be \"true\" or \"false\", got {:?}",
                    other
                )))
            }
        };

        let top = parse_ring_pieces(top)?;
        let bottom = parse_ring_pieces(bottom)?;

        // a duplicated piece is reported as such, not as a ring size mismatch
        check_assignment(&top, &bottom)?;

        Ok(Self {
            top: Ring::new(top)?,
            middle_solved,
            bottom: Ring::new(bottom)?,
        })
    }
}

/// Checks that every outer piece appears exactly once across both rings.
fn check_assignment(top: &[Piece], bottom: &[Piece]) -> Result<(), PuzzleError> {
    let mut placed = [false; NUM_OUTER_PIECES];
    for piece in top.iter().chain(bottom) {
        let slot = &mut placed[piece.id() as usize];
        if *slot {
            return Err(PuzzleError::IncompleteAssignment(format!(
                "piece {} is placed more than once",
                piece
            )));
        }
        *slot = true;
    }
    match Piece::all_outer().find(|p| !placed[p.id() as usize]) {
        Some(missing) => Err(PuzzleError::IncompleteAssignment(format!(
            "piece {} is not placed",
            missing
        ))),
        None => Ok(()),
    }
}

/// Splits a ring field on `,` and `|` and resolves every name.
fn parse_ring_pieces(field: &str) -> Result<Vec<Piece>, PuzzleError> {
    field
        .split([',', '|'])
        .map(|name| {
            if name.is_empty() {
                return Err(PuzzleError::Malformed(format!(
                    "empty piece name in ring {:?}",
                    field
                )));
            }
            Piece::from_name(name).ok_or_else(|| PuzzleError::UnknownPiece(name.to_string()))
        })
        .collect()
}

impl Move {
    /// The move that undoes this one.
    pub fn inverse(self) -> Self {
        let units = RING_UNITS as i32;
        match self {
            Move::RotateTop(steps) => Move::RotateTop(units - steps),
            Move::RotateBottom(steps) => Move::RotateBottom(units - steps),
            Move::Flip => Move::Flip,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::RotateTop(steps) => write!(f, "t{}", steps),
            Move::RotateBottom(steps) => write!(f, "b{}", steps),
            Move::Flip => f.write_str("/"),
        }
    }
}

impl FromStr for Move {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "/" {
            return Ok(Move::Flip);
        }

        let mut chars = s.chars();
        let layer = chars.next().map(|c| c.to_ascii_lowercase());
        let steps = chars.as_str();
        let parse_steps = || {
            steps.parse::<i32>().map_err(|_| {
                PuzzleError::InvalidArgument(format!(
                    "{:?} is not a whole number of steps",
                    steps
                ))
            })
        };

        match layer {
            Some('t') => Ok(Move::RotateTop(parse_steps()?)),
            Some('b') => Ok(Move::RotateBottom(parse_steps()?)),
            _ => Err(PuzzleError::InvalidArgument(format!(
                "unknown move {:?}, expected t<n>, b<n> or /",
                s
            ))),
        }
    }
}

impl MoveSet {
    pub const ALL: MoveSet = MoveSet::new(true, true, true);

    pub const fn new(rotate_top: bool, flip: bool, rotate_bottom: bool) -> Self {
        MoveSet((rotate_top as u8) << 2 | (flip as u8) << 1 | rotate_bottom as u8)
    }

    pub fn rotate_top(self) -> bool {
        self.0 & 0b100 != 0
    }

    pub fn flip(self) -> bool {
        self.0 & 0b10 != 0
    }

    pub fn rotate_bottom(self) -> bool {
        self.0 & 0b1 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    const SOLVED: &str = "WRB,WB,WBO,WO|WOG,WG,WGR,WR true YO,YOB,YB,YBR|YR,YRG,YG,YGO";

    fn moves(text: &str) -> Vec<Move> {
        text.split_whitespace().map(|m| m.parse().unwrap()).collect()
    }

    #[test]
    fn test_solved_text_matches_canonical_string() {
        assert_eq!(Position::solved().to_string(), SOLVED);
        assert_eq!(SOLVED.parse::<Position>().unwrap(), Position::solved());
    }

    #[test]
    fn test_round_trip_after_mixed_moves() {
        let scrambled = Position::solved()
            .apply_all(&moves("t2 b3 / t3 b1 / b6 /"))
            .unwrap();
        let text = scrambled.to_string();
        assert_eq!(text.parse::<Position>().unwrap(), scrambled);
    }

    /// Every position within `depth` clean rotations or flips of solved.
    fn reachable(depth: usize) -> Vec<Position> {
        let mut seen: FxHashSet<PositionKey> = FxHashSet::default();
        seen.insert(Position::solved().key());
        let mut all = vec![Position::solved()];
        let mut frontier = all.clone();

        for _ in 0..depth {
            let mut next = Vec::new();
            for position in &frontier {
                let turns = (1..RING_UNITS as i32)
                    .flat_map(|steps| [Move::RotateTop(steps), Move::RotateBottom(steps)]);
                for mv in turns.chain([Move::Flip]) {
                    if let Ok(moved) = position.apply(mv) {
                        if seen.insert(moved.key()) {
                            next.push(moved);
                        }
                    }
                }
            }
            all.extend_from_slice(&next);
            frontier = next;
        }
        all
    }

    #[test]
    fn test_reachable_positions_keep_their_invariants() {
        let positions = reachable(6);
        assert_eq!(positions.len(), 29_040);

        let universe: Vec<Piece> = Piece::all_outer().collect();
        for position in &positions {
            for ring in [position.top(), position.bottom()] {
                let units: u8 = ring.pieces().iter().map(|p| p.size()).sum();
                assert_eq!(units, RING_UNITS, "{position}");
            }

            let mut pieces: Vec<Piece> = position
                .top()
                .pieces()
                .iter()
                .chain(position.bottom().pieces())
                .copied()
                .collect();
            pieces.sort();
            assert_eq!(pieces, universe, "{position}");

            let text = position.to_string();
            assert_eq!(&text.parse::<Position>().unwrap(), position, "{text}");
        }
    }

    #[test]
    fn test_flip_twice_restores_position() {
        let start = Position::solved().apply_all(&moves("t2 b4")).unwrap();
        let once = start.flipped().unwrap();
        assert!(!once.middle_solved());
        assert_ne!(once, start);
        assert_eq!(once.flipped().unwrap(), start);
    }

    #[test]
    fn test_flip_swaps_front_halves() {
        let flipped = Position::solved().flipped().unwrap();
        assert_eq!(
            flipped.to_string(),
            "YO,YOB,YB,YBR|WOG,WG,WGR,WR false WRB,WB,WBO,WO|YR,YRG,YG,YGO"
        );
    }

    #[test]
    fn test_flip_without_half_boundary_is_rejected() {
        // top ring sizes [2, 1, 2, 2, 1, 2, 1, 1] have no boundary at 6 units
        let blocked = "YOB,YB,YBR,WOG,WG,WGR,WR,YO false WRB,WB,WBO,WO|YR,YRG,YG,YGO"
            .parse::<Position>()
            .unwrap();
        assert!(!blocked.top().is_flippable());
        assert!(matches!(
            blocked.flipped(),
            Err(PuzzleError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_flips_can_change_ring_piece_counts() {
        let position = Position::solved()
            .apply_all(&moves("/ t3 / b1 / t4 /"))
            .unwrap();
        assert_eq!(
            position.to_string(),
            "WRB,WB,WBO,WO|YOB,YBR,WOG true WG,YR,WGR,WR,YO|YRG,YG,YGO,YB"
        );
        assert_eq!(position.top().len(), 7);
        assert_eq!(position.bottom().len(), 9);
        assert_eq!(position.to_string().parse::<Position>().unwrap(), position);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "WRB,WB true".parse::<Position>(),
            Err(PuzzleError::Malformed(_))
        ));
        assert!(matches!(
            SOLVED.replace("true", "yes").parse::<Position>(),
            Err(PuzzleError::Malformed(_))
        ));
        assert!(matches!(
            SOLVED.replace("WGR", "WXR").parse::<Position>(),
            Err(PuzzleError::UnknownPiece(name)) if name == "WXR"
        ));
        assert!(matches!(
            SOLVED.replace("YGO", "WGR").parse::<Position>(),
            Err(PuzzleError::IncompleteAssignment(_))
        ));
        assert!(matches!(
            "WRB,WB,WBO,WO|WOG,WG,WGR true WR,YO,YOB,YB,YBR|YR,YRG,YG,YGO".parse::<Position>(),
            Err(PuzzleError::Malformed(_))
        ));
    }

    #[test]
    fn test_score() {
        assert_eq!(Position::solved().solved_score(), 17);
        assert_eq!(Position::solved().flipped().unwrap().solved_score(), 12);
        assert_eq!(
            Position::solved()
                .apply_all(&moves("t2 b3"))
                .unwrap()
                .solved_score(),
            17
        );
    }

    #[test]
    fn test_key_distinguishes_positions() {
        let solved = Position::solved();
        let turned = solved.apply(Move::RotateTop(2)).unwrap();
        let flipped = solved.flipped().unwrap();
        assert_ne!(solved.key(), turned.key());
        assert_ne!(solved.key(), flipped.key());
        assert_eq!(solved.key(), Position::solved().key());
    }

    #[test]
    fn test_move_notation() {
        assert_eq!("t2".parse::<Move>().unwrap(), Move::RotateTop(2));
        assert_eq!("B10".parse::<Move>().unwrap(), Move::RotateBottom(10));
        assert_eq!("/".parse::<Move>().unwrap(), Move::Flip);
        assert!(matches!(
            "t1.5".parse::<Move>(),
            Err(PuzzleError::InvalidArgument(_))
        ));
        assert!(matches!(
            "x3".parse::<Move>(),
            Err(PuzzleError::InvalidArgument(_))
        ));
        assert_eq!(Move::RotateBottom(3).to_string(), "b3");
        assert_eq!(Move::RotateTop(2).inverse(), Move::RotateTop(10));
    }

    #[test]
    fn test_inverse_undoes_move() {
        let start = Position::solved().apply_all(&moves("t2 b3 /")).unwrap();
        for mv in moves("t3 b1 /") {
            let there = start.apply(mv).unwrap();
            assert_eq!(there.apply(mv.inverse()).unwrap(), start);
        }
    }

    #[test]
    fn test_neighbours_respect_move_set() {
        let solved = Position::solved();
        let all = solved.neighbours(MoveSet::ALL);
        // 7 clean turns per solved layer plus the flip
        assert_eq!(all.len(), 15);

        let after_top = solved.neighbours(MoveSet::new(false, true, true));
        assert!(after_top
            .iter()
            .all(|n| !matches!(n.mv, Move::RotateTop(_))));

        for neighbour in &all {
            assert_eq!(solved.apply(neighbour.mv).unwrap(), neighbour.position);
            assert!(neighbour.position.top().is_flippable());
            assert!(neighbour.position.bottom().is_flippable());
        }
    }
}
