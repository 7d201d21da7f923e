//! Two-phase search for a move sequence that solves a position.
//!
//! Key points:
//! - Phase one walks best-first to cube shape (both rings alternating corners
//!   and edges) with the parity the solved position has, guided by an exact
//!   table of shape distances
//! - Phase two deepens iteratively over packed cube-shape states, pruned by
//!   the corner and edge distance tables
//! - All tables are built once and shared by every search in the process
//! - Phase one keeps visits in one flat Vec with parent indices; phase two
//!   keeps an explicit stack of frames instead of recursing

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::OnceLock;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::cube::{CubeMove, CubeState, PruningTable};
use crate::pieces::{PieceKind, RING_UNITS};
use crate::position::{Move, MoveSet, Position, PositionKey};
use crate::ring::Ring;

/// How often the search reports progress.
const PROGRESS_INTERVAL: usize = 1_000_000;

/// Default cap on search iterations, summed over both phases.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000_000;

/// Default cap on solution length.
pub const DEFAULT_MAX_DEPTH: u32 = 40;

/// Bounds on one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverLimits {
    /// Candidates expanded before the search gives up.
    pub max_iterations: usize,
    /// Longest move sequence the search may return.
    pub max_depth: u32,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Where the slot boundaries of both rings lie, plus the parity of the piece
/// order read top ring first.
///
/// Within cube shape the parity, taken together with whether each ring
/// starts on a corner, never changes, so only some cube-shape keys can lead
/// to the solved position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ShapeKey {
    top: u16,
    bottom: u16,
    odd: bool,
}

impl ShapeKey {
    fn of(position: &Position) -> Self {
        let ids: Vec<u8> = position
            .top()
            .pieces()
            .iter()
            .chain(position.bottom().pieces())
            .map(|piece| piece.id())
            .collect();
        let inversions: usize = ids
            .iter()
            .enumerate()
            .map(|(i, &a)| ids[i + 1..].iter().filter(|&&b| a > b).count())
            .sum();

        Self {
            top: slot_mask(position.top()),
            bottom: slot_mask(position.bottom()),
            odd: inversions % 2 == 1,
        }
    }
}

fn slot_mask(ring: &Ring) -> u16 {
    ring.slots().fold(0, |mask, (_, slot)| mask | 1 << slot)
}

/// A reached position and how it was reached.
struct Visit {
    position: Position,
    /// Move from the parent, `None` for the start.
    mv: Option<Move>,
    parent: Option<usize>,
    next: MoveSet,
}

/// A queued visit. Ordered so the max-heap pops the nearest shape, then the
/// shallowest depth, then the oldest visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Enqueued {
    distance: u8,
    depth: u32,
    index: usize,
}

impl Ord for Enqueued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then(self.depth.cmp(&other.depth).reverse())
            .then(self.index.cmp(&other.index).reverse())
    }
}

impl PartialOrd for Enqueued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One level of the cube-shape search.
struct Frame {
    state: CubeState,
    /// Move into this frame, `None` at the root.
    mv: Option<CubeMove>,
    /// Index of the next candidate in [`CubeMove::ALL`].
    next: usize,
}

/// Iterations left to one search, shared by both phases.
struct Budget {
    used: usize,
    limit: usize,
}

impl Budget {
    fn new(limit: usize) -> Self {
        Self { used: 0, limit }
    }

    /// Counts one iteration; `None` once the limit is reached.
    fn spend(&mut self) -> Option<()> {
        self.used += 1;
        if self.used % PROGRESS_INTERVAL == 0 {
            log::info!("{} iterations", self.used);
        }
        if self.used >= self.limit {
            log::info!("gave up after {} iterations", self.used);
            return None;
        }
        Some(())
    }
}

/// Distance tables for both phases.
pub struct Solver {
    shapes: FxHashMap<ShapeKey, u8>,
    corners: PruningTable,
    edges: PruningTable,
}

impl Solver {
    /// Builds every table. This walks a few hundred thousand states, so
    /// prefer [`solve`], which builds them once per process.
    pub fn new() -> Self {
        let shapes = build_shape_table();
        log::debug!("shape table: {} keys", shapes.len());
        Self {
            shapes,
            corners: PruningTable::build(PieceKind::Big),
            edges: PruningTable::build(PieceKind::Small),
        }
    }

    /// Searches for moves that take `start` to the solved position.
    ///
    /// Returns `None` when the limits are exhausted first. A solved `start`
    /// yields an empty list.
    pub fn solve(&self, start: &Position, limits: SolverLimits) -> Option<Vec<Move>> {
        let mut budget = Budget::new(limits.max_iterations);

        let (mut moves, shaped) = self.reach_cube_shape(start, limits.max_depth, &mut budget)?;
        let Some(cube) = CubeState::from_position(&shaped) else {
            log::warn!("{} has a solved shape key but is not in cube shape", shaped);
            return None;
        };
        log::debug!("cube shape after {} moves: {}", moves.len(), shaped);

        let remaining = limits.max_depth.saturating_sub(moves.len() as u32);
        let mut state = cube;
        for mv in self.search_cube(cube, remaining, &mut budget)? {
            moves.push(state.to_move(mv));
            state = state.apply(mv)?;
        }

        let moves = merge_turns(moves);
        log::info!(
            "solved in {} moves after {} iterations",
            moves.len(),
            budget.used
        );
        Some(moves)
    }

    fn shape_distance(&self, position: &Position) -> u8 {
        self.shapes
            .get(&ShapeKey::of(position))
            .copied()
            .unwrap_or(u8::MAX)
    }

    /// Best-first search for the nearest cube-shape position that can still
    /// be solved. Returns the moves and the position they reach.
    fn reach_cube_shape(
        &self,
        start: &Position,
        max_depth: u32,
        budget: &mut Budget,
    ) -> Option<(Vec<Move>, Position)> {
        let mut visits = vec![Visit {
            position: start.clone(),
            mv: None,
            parent: None,
            next: MoveSet::ALL,
        }];
        let mut seen: FxHashSet<PositionKey> = FxHashSet::default();
        seen.insert(start.key());

        let mut queue = BinaryHeap::new();
        queue.push(Enqueued {
            distance: self.shape_distance(start),
            depth: 0,
            index: 0,
        });

        while let Some(current) = queue.pop() {
            let visit = &visits[current.index];
            if current.distance == 0 {
                let moves = trace_moves(&visits, current.index);
                return Some((moves, visit.position.clone()));
            }

            budget.spend()?;
            if current.depth >= max_depth {
                continue;
            }

            for neighbour in visit.position.neighbours(visit.next) {
                if !seen.insert(neighbour.position.key()) {
                    continue;
                }
                queue.push(Enqueued {
                    distance: self.shape_distance(&neighbour.position),
                    depth: current.depth + 1,
                    index: visits.len(),
                });
                visits.push(Visit {
                    position: neighbour.position,
                    mv: Some(neighbour.mv),
                    parent: Some(current.index),
                    next: neighbour.next,
                });
            }
        }

        log::info!("no cube shape within {} moves", max_depth);
        None
    }

    /// Lower bound on the moves left to solve a cube-shape state.
    fn estimate(&self, state: CubeState) -> u32 {
        self.corners.distance(state).max(self.edges.distance(state)) as u32
    }

    /// Iterative deepening over cube-shape states. Each pass explores every
    /// sequence whose length plus estimate fits the bound, then raises the
    /// bound to the smallest value that did not fit.
    fn search_cube(
        &self,
        start: CubeState,
        max_depth: u32,
        budget: &mut Budget,
    ) -> Option<Vec<CubeMove>> {
        if start.is_solved() {
            return Some(Vec::new());
        }

        let mut bound = self.estimate(start);
        while bound <= max_depth {
            log::debug!("cube search bound {}", bound);
            let mut next_bound = u32::MAX;
            let mut stack = vec![Frame {
                state: start,
                mv: None,
                next: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                let Some(&mv) = CubeMove::ALL.get(frame.next) else {
                    stack.pop();
                    continue;
                };
                frame.next += 1;
                if !mv.may_follow(frame.mv) {
                    continue;
                }
                let Some(child) = frame.state.apply(mv) else {
                    continue;
                };

                budget.spend()?;
                let estimate = stack.len() as u32 + self.estimate(child);
                if estimate > bound {
                    next_bound = next_bound.min(estimate);
                    continue;
                }
                if child.is_solved() {
                    let mut moves: Vec<CubeMove> = stack.iter().filter_map(|f| f.mv).collect();
                    moves.push(mv);
                    return Some(moves);
                }
                stack.push(Frame {
                    state: child,
                    mv: Some(mv),
                    next: 0,
                });
            }

            bound = next_bound;
        }

        log::info!("no cube-shape solution within {} moves", max_depth);
        None
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

/// Searches for moves that take `start` to the solved position, using
/// tables built on first use.
pub fn solve(start: &Position, limits: SolverLimits) -> Option<Vec<Move>> {
    shared().solve(start, limits)
}

fn shared() -> &'static Solver {
    static SOLVER: OnceLock<Solver> = OnceLock::new();
    SOLVER.get_or_init(Solver::new)
}

/// Breadth-first distances to the cube shapes the cube-shape search can
/// finish from: the solved position with either ring turned by one piece.
fn build_shape_table() -> FxHashMap<ShapeKey, u8> {
    let solved = Position::solved();
    let sources = [
        vec![],
        vec![Move::RotateTop(2)],
        vec![Move::RotateBottom(1)],
        vec![Move::RotateTop(2), Move::RotateBottom(1)],
    ];

    let mut distances = FxHashMap::default();
    let mut queue = VecDeque::new();
    for source in sources.iter().filter_map(|moves| solved.apply_all(moves).ok()) {
        if distances.insert(ShapeKey::of(&source), 0u8).is_none() {
            queue.push_back(source);
        }
    }

    while let Some(position) = queue.pop_front() {
        let next = distances[&ShapeKey::of(&position)] + 1;
        for neighbour in position.neighbours(MoveSet::ALL) {
            distances
                .entry(ShapeKey::of(&neighbour.position))
                .or_insert_with(|| {
                    queue.push_back(neighbour.position);
                    next
                });
        }
    }

    distances
}

/// Walks parent links back to the start and returns the moves in order.
fn trace_moves(visits: &[Visit], mut index: usize) -> Vec<Move> {
    let mut moves = Vec::new();
    while let Visit {
        mv: Some(mv),
        parent: Some(parent),
        ..
    } = visits[index]
    {
        moves.push(mv);
        index = parent;
    }
    moves.reverse();
    moves
}

/// Joins consecutive turns of one layer and drops moves that cancel out.
fn merge_turns(moves: Vec<Move>) -> Vec<Move> {
    let mut merged: Vec<Move> = Vec::with_capacity(moves.len());
    for mv in moves {
        let steps = match (merged.last(), mv) {
            (Some(Move::Flip), Move::Flip) => Some(0),
            (Some(Move::RotateTop(a)), Move::RotateTop(b))
            | (Some(Move::RotateBottom(a)), Move::RotateBottom(b)) => {
                Some((a + b) % RING_UNITS as i32)
            }
            _ => None,
        };
        match steps {
            None => merged.push(mv),
            Some(0) => {
                merged.pop();
            }
            Some(steps) => {
                if let Some(Move::RotateTop(last) | Move::RotateBottom(last)) = merged.last_mut() {
                    *last = steps;
                }
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(text: &str) -> Vec<Move> {
        text.split_whitespace()
            .map(|m| m.parse().unwrap())
            .collect()
    }

    fn scrambled(text: &str) -> Position {
        Position::solved().apply_all(&moves(text)).unwrap()
    }

    fn notation(moves: &[Move]) -> String {
        moves
            .iter()
            .map(Move::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_solved_position_needs_no_moves() {
        let moves = solve(&Position::solved(), SolverLimits::default()).unwrap();
        assert!(moves.is_empty());
    }

    #[test]
    fn test_single_flip_is_undone() {
        let start = Position::solved().flipped().unwrap();
        let moves = solve(&start, SolverLimits::default()).unwrap();
        assert_eq!(moves, vec![Move::Flip]);
    }

    #[test]
    fn test_layer_turns_are_undone() {
        let start = scrambled("t2 b3");
        let moves = solve(&start, SolverLimits::default()).unwrap();
        assert_eq!(notation(&moves), "t10 b9");
        assert!(start.apply_all(&moves).unwrap().is_solved());
    }

    #[test]
    fn test_solution_applies_to_solved() {
        let start = scrambled("t2 b3 / t3 b1 / b6 /");
        let moves = solve(&start, SolverLimits::default()).unwrap();
        assert!(start.apply_all(&moves).unwrap().is_solved());
        insta::assert_snapshot!(notation(&moves), @"t6 / t5 b3 / b6 / t4 b9");
    }

    #[test]
    fn test_deep_scramble_is_solved_within_default_limits() {
        let start: Position = "YO,WG,WBO,WGR,YBR,WO,YGO,YG true WR,WRB,WB,WOG,YR,YRG,YOB,YB"
            .parse()
            .unwrap();
        let limits = SolverLimits::default();

        let moves = solve(&start, limits).unwrap();
        assert!(moves.len() <= limits.max_depth as usize);
        assert!(start.apply_all(&moves).unwrap().is_solved());

        let inverse: Vec<Move> = moves.iter().rev().map(|mv| mv.inverse()).collect();
        assert_eq!(Position::solved().apply_all(&inverse).unwrap(), start);
    }

    #[test]
    fn test_limits_stop_the_search() {
        let start = scrambled("t2 b3 / t3 b1 / b6 /");

        let few_iterations = SolverLimits {
            max_iterations: 5,
            ..SolverLimits::default()
        };
        assert_eq!(solve(&start, few_iterations), None);

        let shallow = SolverLimits {
            max_depth: 2,
            ..SolverLimits::default()
        };
        assert_eq!(solve(&start, shallow), None);
    }

    #[test]
    fn test_shape_distances() {
        let solver = shared();
        assert_eq!(solver.shapes.len(), 7356);
        assert_eq!(solver.shapes.values().max(), Some(&18));

        assert_eq!(solver.shape_distance(&Position::solved()), 0);
        assert_eq!(solver.shape_distance(&scrambled("t2 b1")), 0);
        assert_eq!(solver.shape_distance(&scrambled("/")), 1);
        assert_eq!(solver.shape_distance(&scrambled("t2 b3 / t3 b1")), 0);
        assert_eq!(solver.shape_distance(&scrambled("t2 b3 / t3 b1 / b6 /")), 2);
    }

    #[test]
    fn test_merge_turns() {
        assert_eq!(notation(&merge_turns(moves("t3 t4 / b1"))), "t7 / b1");
        assert_eq!(notation(&merge_turns(moves("b1 / t3 t9 / b2"))), "b3");
        assert_eq!(notation(&merge_turns(moves("t6 b6 b6 t6"))), "");
    }

    #[test]
    fn test_queue_order() {
        let a = Enqueued {
            distance: 2,
            depth: 3,
            index: 7,
        };
        let b = Enqueued {
            distance: 3,
            depth: 1,
            index: 1,
        };
        let c = Enqueued {
            distance: 2,
            depth: 2,
            index: 9,
        };
        let d = Enqueued {
            distance: 2,
            depth: 2,
            index: 8,
        };
        let mut heap: BinaryHeap<Enqueued> = [a, b, c, d].into_iter().collect();
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.index)).collect();
        assert_eq!(order, vec![8, 9, 7, 1]);
    }
}
