//! Circle Diagram - zone placement and token diffusion on a discrete grid

pub mod core;
pub mod epoch;
pub mod output;
pub mod placement;
pub mod simulation;
pub mod spatial;

pub use crate::core::{CenterPolicy, ConfigError, DiagramError, EngineConfig, GridConfig, Result};
pub use crate::core::config::validate_speeds;
pub use epoch::{advance_epoch, generate_map, seed_distribution, EpochController, EpochOutcome};
