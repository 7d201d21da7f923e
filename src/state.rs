//! The live puzzle owned by the application.
//!
//! [`PuzzleState`] wraps a [`Position`] with the single `is_moving` lock that
//! serialises visual moves. A rotate or flip commits its data change at once,
//! takes the lock and hands back a [`TransformDescriptor`]; the lock is
//! released by [`PuzzleState::finish_move`] when the renderer reports that
//! the animation is over. Until then every other mutation is refused.

use std::fmt;

use crate::error::PuzzleError;
use crate::geometry::{Geometry, Placement, TransformDescriptor};
use crate::pieces::Piece;
use crate::position::{Move, Position};
use crate::ring::{self, Layer};

/// Mutable puzzle state plus the in-flight move lock.
#[derive(Debug, Clone)]
pub struct PuzzleState {
    position: Position,
    geometry: Geometry,
    is_moving: bool,
}

/// Read-only snapshot handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub top: &'a [Piece],
    pub middle: &'a [Piece; 2],
    pub bottom: &'a [Piece],
    pub middle_solved: bool,
    geometry: &'a Geometry,
}

impl PuzzleState {
    /// Creates a solved puzzle with the default geometry.
    pub fn new() -> Self {
        Self::with_geometry(Geometry::default())
    }

    pub fn with_geometry(geometry: Geometry) -> Self {
        Self {
            position: Position::solved(),
            geometry,
            is_moving: false,
        }
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// Turns one layer by `steps` units (1..=11) along piece boundaries.
    ///
    /// The whole ring is reported as affected, since every piece of it spins.
    pub fn rotate_layer(
        &mut self,
        layer: Layer,
        steps: i32,
    ) -> Result<TransformDescriptor, PuzzleError> {
        self.ensure_idle()?;

        let rotated = self.position.rotated(layer, steps).map_err(|err| {
            log::debug!("rejected {} rotation by {}: {}", layer, steps, err);
            err
        })?;
        let descriptor = self
            .geometry
            .rotation(layer, self.position.ring(layer).pieces(), steps);

        self.commit(rotated);
        log::debug!("rotated {} by {}: {}", layer, steps, self.position);
        Ok(descriptor)
    }

    pub fn rotate_top(&mut self, steps: i32) -> Result<TransformDescriptor, PuzzleError> {
        self.rotate_layer(Layer::Top, steps)
    }

    pub fn rotate_bottom(&mut self, steps: i32) -> Result<TransformDescriptor, PuzzleError> {
        self.rotate_layer(Layer::Bottom, steps)
    }

    /// Turns the front half-band (both front half-rings and the front middle
    /// piece) over by 180°.
    pub fn flip(&mut self) -> Result<TransformDescriptor, PuzzleError> {
        self.ensure_idle()?;

        let flipped = self.position.flipped().map_err(|err| {
            log::debug!("rejected flip: {}", err);
            err
        })?;

        let mut affected = Vec::new();
        for layer in [Layer::Top, Layer::Bottom] {
            if let Some((front, _)) = self.position.ring(layer).halves() {
                affected.extend_from_slice(front);
            }
        }
        affected.push(Piece::MIDDLE_FRONT);
        let descriptor = self.geometry.flip(affected);

        self.commit(flipped);
        log::debug!("flipped: {}", self.position);
        Ok(descriptor)
    }

    /// Dispatches a move in `t<n>` / `b<n>` / `/` form.
    pub fn apply(&mut self, mv: Move) -> Result<TransformDescriptor, PuzzleError> {
        match mv {
            Move::RotateTop(steps) => self.rotate_top(steps),
            Move::RotateBottom(steps) => self.rotate_bottom(steps),
            Move::Flip => self.flip(),
        }
    }

    /// Releases the move lock once the renderer has finished animating.
    ///
    /// Returns false if no move was in flight.
    pub fn finish_move(&mut self) -> bool {
        if !self.is_moving {
            log::warn!("move completion signalled with no move in flight");
            return false;
        }
        self.is_moving = false;
        true
    }

    /// Replaces the whole state from its text form.
    ///
    /// Refused while a move is in flight, so an animation never finishes on
    /// top of a state it did not start from. On success the renderer should
    /// snap every piece to [`View::placements`] without animating.
    pub fn set_from_string(&mut self, s: &str) -> Result<(), PuzzleError> {
        self.ensure_idle()?;
        self.set_position(s.parse()?)
    }

    /// Replaces the whole state with an already validated position.
    pub fn set_position(&mut self, position: Position) -> Result<(), PuzzleError> {
        self.ensure_idle()?;
        self.position = position;
        log::debug!("state set to {}", self.position);
        Ok(())
    }

    /// Puts the puzzle back in the solved position.
    pub fn reset(&mut self) -> Result<(), PuzzleError> {
        self.ensure_idle()?;
        self.position = Position::solved();
        Ok(())
    }

    pub fn view(&self) -> View<'_> {
        View {
            top: self.position.top().pieces(),
            middle: &Piece::MIDDLE,
            bottom: self.position.bottom().pieces(),
            middle_solved: self.position.middle_solved(),
            geometry: &self.geometry,
        }
    }

    fn ensure_idle(&self) -> Result<(), PuzzleError> {
        if self.is_moving {
            log::debug!("rejected mutation: a move is in progress");
            return Err(PuzzleError::OperationInProgress);
        }
        Ok(())
    }

    fn commit(&mut self, position: Position) {
        self.position = position;
        self.is_moving = true;
    }
}

impl Default for PuzzleState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.position, f)
    }
}

impl View<'_> {
    /// Resting place of every outer piece, top ring first.
    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        [(Layer::Top, self.top), (Layer::Bottom, self.bottom)]
            .into_iter()
            .flat_map(move |(layer, pieces)| {
                ring::slots(pieces).map(move |(piece, slot)| Placement {
                    piece,
                    layer,
                    slot,
                    angle: self.geometry.slot_angle(layer, slot),
                })
            })
    }

    /// Orientation of the middle band about the flip axis.
    pub fn middle_angle(&self) -> f64 {
        self.geometry.middle_angle(self.middle_solved)
    }
}
