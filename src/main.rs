//! Square-1 Puzzle
//!
//! Command-line front end: keeps one puzzle in a state file, applies moves
//! to it through an animation session, and solves it back to the start.

use std::future::{self, Future};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use squareone::config::SquareOneConfig;
use squareone::solver::{self, SolverLimits};
use squareone::{persistence, Geometry, Move, Position, PuzzleError, PuzzleState};
use squareone::{Renderer, Session, TransformDescriptor, View};

/// Plays with a Square-1 puzzle stored between runs.
#[derive(Parser)]
#[command(name = "squareone")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current state and where every piece sits.
    Show,
    /// Apply moves such as `t3`, `b9` or `/` and save the result.
    Apply {
        #[arg(required = true)]
        moves: Vec<Move>,
    },
    /// Replace the current state with a state string.
    Set {
        /// The three fields, quoted as one argument or given separately.
        #[arg(required = true)]
        state: Vec<String>,
    },
    /// Return to the solved state.
    Reset,
    /// Search for moves that solve the current state.
    Solve,
}

/// Renderer for a terminal: there is nothing to animate, so every move
/// completes as soon as it has been logged.
struct TextRenderer;

impl Renderer for TextRenderer {
    fn animate(&mut self, descriptor: &TransformDescriptor) -> impl Future<Output = ()> {
        log::info!("{}", descriptor);
        future::ready(())
    }

    fn reset(&mut self, view: View<'_>) {
        log::debug!("placements:\n{}", format_placements(&view));
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = SquareOneConfig::load().unwrap_or_else(|e| {
        log::warn!("{}, using defaults", e);
        SquareOneConfig::default()
    });

    match run(cli.command.unwrap_or(Command::Show), &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &SquareOneConfig) -> Result<ExitCode, PuzzleError> {
    let path = config.storage.state_file.as_path();

    match command {
        Command::Show => {
            let mut state = PuzzleState::with_geometry(Geometry::from(&config.geometry));
            state.set_position(persistence::load_or_solved(path)?)?;
            println!("{}", state);
            println!("{}", format_placements(&state.view()));
        }
        Command::Apply { moves } => {
            let state = PuzzleState::with_geometry(Geometry::from(&config.geometry));
            let mut session = Session::new(state, TextRenderer);
            session.set_position(persistence::load_or_solved(path)?)?;

            pollster::block_on(session.apply_all(&moves))?;

            let position = session.state().position();
            persistence::save(path, position)?;
            println!("{}", position);
        }
        Command::Set { state } => {
            let position: Position = state.join(" ").parse()?;
            persistence::save(path, &position)?;
            println!("{}", position);
        }
        Command::Reset => {
            let position = Position::solved();
            persistence::save(path, &position)?;
            println!("{}", position);
        }
        Command::Solve => {
            let position = persistence::load_or_solved(path)?;
            match solver::solve(&position, SolverLimits::from(&config.solver)) {
                Some(moves) => println!("{}", format_moves(&moves)),
                None => {
                    eprintln!(
                        "No solution found within {} iterations and {} moves.",
                        config.solver.max_iterations, config.solver.max_depth
                    );
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// One line per outer piece, then the middle band orientation.
fn format_placements(view: &View<'_>) -> String {
    let mut lines: Vec<String> = view
        .placements()
        .map(|p| {
            format!(
                "{:<6} {:>2} {:<3} {:>7.1}",
                p.layer,
                p.slot,
                p.piece,
                p.angle.to_degrees()
            )
        })
        .collect();
    lines.push(format!(
        "middle    {} {:>7.1}",
        if view.middle_solved { "ok " } else { "flp" },
        view.middle_angle().to_degrees()
    ));
    lines.join("\n")
}

fn format_moves(moves: &[Move]) -> String {
    if moves.is_empty() {
        return "(already solved)".to_string();
    }
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
