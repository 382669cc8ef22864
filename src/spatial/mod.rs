//! Grid geometry: circles, cell classification and neighbourhoods

pub mod classify;
pub mod geometry;
pub mod grid;

pub use classify::{classify, CellKind, KindGrid};
pub use geometry::{can_place, nearest_gap, Circle, CircleKind};
pub use grid::Grid;
