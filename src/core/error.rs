use thiserror::Error;

use crate::core::types::MapId;
use crate::spatial::geometry::CircleKind;

/// Invalid input rejected before any placement or simulation work
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Grid {axis} must be positive, got {value}")]
    NonPositiveDimension { axis: &'static str, value: i32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i32 },

    #[error("{count} circles cannot fit on a grid of {area} cells")]
    TooManyCircles { count: i64, area: i64 },

    #[error("Speeds must contain at least one entry")]
    EmptySpeeds,

    #[error("Speed {index} must lie within [0, 100], got {value}")]
    SpeedOutOfRange { index: usize, value: f64 },

    #[error("Probabilities must contain at least one entry")]
    EmptyProbabilities,

    #[error("Probability {index} must be a finite non-negative weight, got {value}")]
    InvalidProbability { index: usize, value: f64 },

    #[error("Could not parse weight {0:?}")]
    UnparsableWeight(String),

    #[error("{0} must be greater than zero")]
    ZeroSetting(&'static str),
}

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not place {kind} {} after {attempts} attempts", slot + 1)]
    PlacementExhausted {
        kind: CircleKind,
        slot: u32,
        attempts: u32,
    },

    #[error("Circle {index} sits {gap:.2} cells from its nearest neighbour (max_gap {max_gap})")]
    GapViolation { index: usize, gap: f64, max_gap: i32 },

    #[error("Map not found: {0}")]
    MapNotFound(MapId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DiagramError>;
