//! Square-1 Puzzle Library
//!
//! Models the Square-1 twisty puzzle: two rings of wedge pieces separated by
//! a two-piece middle band. Provides clean-cut layer rotations, the
//! half-band flip, the canonical text format, renderer-facing transform
//! descriptors and a two-phase solver.

pub mod config;
pub mod cube;
pub mod error;
pub mod geometry;
pub mod persistence;
pub mod pieces;
pub mod position;
pub mod ring;
pub mod session;
pub mod solver;
pub mod state;

pub use error::PuzzleError;
pub use geometry::{Geometry, TransformDescriptor};
pub use pieces::Piece;
pub use position::{Move, Position};
pub use ring::{Layer, Ring};
pub use session::{Renderer, Session};
pub use state::{PuzzleState, View};
