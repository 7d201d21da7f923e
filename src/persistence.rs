//! File I/O for saving and loading the puzzle state.
//!
//! The state file holds one line: the canonical state string followed by a
//! newline, e.g.
//!
//! ```text
//! WRB,WB,WBO,WO|WOG,WG,WGR,WR true YO,YOB,YB,YBR|YR,YRG,YG,YGO
//! ```

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::error::PuzzleError;
use crate::position::Position;

/// Writes `position` to `path`, replacing any previous content.
pub fn save(path: &Path, position: &Position) -> io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{}", position)?;
    log::debug!("saved {} to {}", position, path.display());
    Ok(())
}

/// Reads and validates the position stored at `path`.
pub fn load(path: &Path) -> Result<Position, PuzzleError> {
    let text = fs::read_to_string(path)?;
    let position = text.trim().parse()?;
    log::debug!("loaded {} from {}", position, path.display());
    Ok(position)
}

/// Like [`load`], but a missing file means a solved puzzle.
pub fn load_or_solved(path: &Path) -> Result<Position, PuzzleError> {
    match load(path) {
        Err(PuzzleError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("no state at {}, starting solved", path.display());
            Ok(Position::solved())
        }
        result => result,
    }
}
