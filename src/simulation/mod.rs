pub mod cells;
pub mod diffusion;
pub mod distribution;

pub use cells::{Cell, CellMap};
pub use diffusion::{advance, speed_for, DiffusionOutcome, DiffusionStats};
pub use distribution::{distribute, WeightedSelector};
