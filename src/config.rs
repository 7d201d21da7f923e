//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. Built-in defaults
//! 2. `squareone.toml` in the working directory (optional)
//! 3. Environment variables (`SQ1_SECTION__KEY`)

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geometry::{Geometry, DEFAULT_FLIP_TILT_DEGREES, DEFAULT_STEP_DEGREES};
use crate::solver::{SolverLimits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ITERATIONS};

/// Config file looked up by [`SquareOneConfig::load`].
pub const CONFIG_FILE: &str = "squareone.toml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "SQ1_";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquareOneConfig {
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl SquareOneConfig {
    /// Load configuration from `squareone.toml` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific file, which may be absent
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut figment = Figment::new();

        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }

        // SQ1_SOLVER__MAX_DEPTH=20 -> solver.max_depth = 20
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Angles handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Angle of one step-unit in degrees
    pub step_degrees: f64,
    /// Tilt of the flip axis away from +X in degrees
    pub flip_axis_tilt_degrees: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            step_degrees: DEFAULT_STEP_DEGREES,
            flip_axis_tilt_degrees: DEFAULT_FLIP_TILT_DEGREES,
        }
    }
}

impl From<&GeometryConfig> for Geometry {
    fn from(config: &GeometryConfig) -> Self {
        Geometry::new(config.step_degrees, config.flip_axis_tilt_degrees)
    }
}

/// Search bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: usize,
    pub max_depth: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl From<&SolverConfig> for SolverLimits {
    fn from(config: &SolverConfig) -> Self {
        SolverLimits {
            max_iterations: config.max_iterations,
            max_depth: config.max_depth,
        }
    }
}

/// Where the CLI keeps the puzzle between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub state_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("puzzle.state"),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
