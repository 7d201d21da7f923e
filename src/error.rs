//! Error type for puzzle operations
//!
//! Every error is detected before any state is touched, so a failed call
//! always leaves the puzzle exactly as it was.

use std::fmt;
use std::io;

/// Error type for puzzle operations
#[derive(Debug)]
pub enum PuzzleError {
    /// A rotation amount outside `1..=11`, or a step that is not an integer
    InvalidArgument(String),
    /// No piece boundary at the requested offset into a ring
    InvalidCut {
        /// Ring name (`top` or `bottom`)
        layer: &'static str,
        /// Requested offset in step-units
        steps: i32,
    },
    /// Another rotate or flip is still waiting for its animation to finish
    OperationInProgress,
    /// A state string names a piece outside the 16-piece universe
    UnknownPiece(String),
    /// A state string leaves a piece unplaced (or places one twice)
    IncompleteAssignment(String),
    /// A state string is structurally broken (field count, token, ring size)
    Malformed(String),
    /// An internal consistency check failed
    InvariantViolation(String),
    /// IO error while reading or writing a saved state
    Io(io::Error),
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            PuzzleError::InvalidCut { layer, steps } => write!(
                f,
                "Invalid cut: no piece boundary {} steps into the {} ring",
                steps, layer
            ),
            PuzzleError::OperationInProgress => {
                write!(f, "Another move is still in progress")
            }
            PuzzleError::UnknownPiece(name) => write!(f, "Unknown piece: {:?}", name),
            PuzzleError::IncompleteAssignment(msg) => {
                write!(f, "Incomplete piece assignment: {}", msg)
            }
            PuzzleError::Malformed(msg) => write!(f, "Malformed state: {}", msg),
            PuzzleError::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
            PuzzleError::Io(err) => write!(f, "State IO error: {}", err),
        }
    }
}

impl std::error::Error for PuzzleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PuzzleError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PuzzleError {
    fn from(err: io::Error) -> Self {
        PuzzleError::Io(err)
    }
}
