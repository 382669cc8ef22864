//! Map lifecycle: creation, seeding and epoch advances over a storage port

pub mod controller;
pub mod map;
pub mod repository;

pub use controller::{advance_epoch, generate_map, seed_distribution, EpochController, EpochOutcome};
pub use map::{Map, NewMap};
pub use repository::{InMemoryRepository, MapRepository};
