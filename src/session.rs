//! Driving a puzzle through an animating renderer.
//!
//! The renderer is an external collaborator: it receives a
//! [`TransformDescriptor`] per move and returns a future that resolves when
//! the animation is over. [`Session`] owns the puzzle state and the renderer,
//! and releases the move lock exactly once per move, after that future
//! resolves.

use std::future::Future;

use crate::error::PuzzleError;
use crate::geometry::TransformDescriptor;
use crate::position::{Move, Position};
use crate::state::{PuzzleState, View};

/// Visual side of the puzzle.
pub trait Renderer {
    /// Plays the transition for one move. The returned future resolving is
    /// the completion signal for that move.
    fn animate(&mut self, descriptor: &TransformDescriptor) -> impl Future<Output = ()>;

    /// Snaps every piece to its resting place with no animation.
    fn reset(&mut self, view: View<'_>);
}

/// A puzzle state paired with the renderer that shows it.
pub struct Session<R> {
    state: PuzzleState,
    renderer: R,
}

impl<R: Renderer> Session<R> {
    /// Pairs a state with a renderer and syncs the renderer to it.
    pub fn new(state: PuzzleState, mut renderer: R) -> Self {
        renderer.reset(state.view());
        Self { state, renderer }
    }

    pub fn state(&self) -> &PuzzleState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub async fn rotate_top(&mut self, steps: i32) -> Result<TransformDescriptor, PuzzleError> {
        self.apply(Move::RotateTop(steps)).await
    }

    pub async fn rotate_bottom(
        &mut self,
        steps: i32,
    ) -> Result<TransformDescriptor, PuzzleError> {
        self.apply(Move::RotateBottom(steps)).await
    }

    pub async fn flip(&mut self) -> Result<TransformDescriptor, PuzzleError> {
        self.apply(Move::Flip).await
    }

    /// Performs one move and waits for its animation to finish.
    pub async fn apply(&mut self, mv: Move) -> Result<TransformDescriptor, PuzzleError> {
        let descriptor = self.state.apply(mv)?;
        self.renderer.animate(&descriptor).await;
        self.state.finish_move();
        Ok(descriptor)
    }

    /// Performs moves one after another, stopping at the first rejected one.
    pub async fn apply_all(
        &mut self,
        moves: &[Move],
    ) -> Result<Vec<TransformDescriptor>, PuzzleError> {
        let mut descriptors = Vec::with_capacity(moves.len());
        for &mv in moves {
            descriptors.push(self.apply(mv).await?);
        }
        Ok(descriptors)
    }

    /// Replaces the state from text and snaps the renderer to it.
    pub fn set_from_string(&mut self, s: &str) -> Result<(), PuzzleError> {
        self.state.set_from_string(s)?;
        self.renderer.reset(self.state.view());
        Ok(())
    }

    /// Replaces the state with `position` and snaps the renderer to it.
    pub fn set_position(&mut self, position: Position) -> Result<(), PuzzleError> {
        self.state.set_position(position)?;
        self.renderer.reset(self.state.view());
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), PuzzleError> {
        self.state.reset()?;
        self.renderer.reset(self.state.view());
        Ok(())
    }
}
