pub mod config;
pub mod error;
pub mod types;

pub use config::{CenterPolicy, EngineConfig, GridConfig, MapRequest};
pub use error::{ConfigError, DiagramError, Result};
