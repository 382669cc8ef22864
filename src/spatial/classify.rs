//! Cell classification against a circle layout

use serde::{Deserialize, Serialize};

use crate::core::config::GridConfig;
use crate::spatial::geometry::Circle;
use crate::spatial::grid::Grid;

/// Semantic kind of a grid cell, derived from the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellKind {
    /// Exact integer center of some circle
    Center,
    /// Inside some circle's radius but not its center
    Interior,
    /// Covered by no circle
    #[default]
    Empty,
}

impl CellKind {
    /// Most tokens a diffusion move may bring the cell up to
    pub fn capacity(&self) -> usize {
        match self {
            Self::Center => 0,
            Self::Interior => 1,
            Self::Empty => 2,
        }
    }
}

/// Classify a single point
///
/// Circles are scanned in list order and the first match wins, so overlapping
/// circles resolve by order rather than proximity.
pub fn classify(x: i32, y: i32, circles: &[Circle]) -> CellKind {
    for circle in circles {
        if circle.x == x && circle.y == y {
            return CellKind::Center;
        }
        if circle.covers(x, y) {
            return CellKind::Interior;
        }
    }
    CellKind::Empty
}

/// Classification of every cell, computed once per layout
#[derive(Debug, Clone, PartialEq)]
pub struct KindGrid {
    grid: Grid<CellKind>,
}

impl KindGrid {
    pub fn build(config: &GridConfig, circles: &[Circle]) -> Self {
        let mut grid = Grid::new(config.width.max(0) as usize, config.height.max(0) as usize);
        for (x, y) in grid.coords().collect::<Vec<_>>() {
            grid.set(x, y, classify(x, y, circles));
        }
        Self { grid }
    }

    /// Kind at a coordinate, `None` off the grid
    #[inline]
    pub fn kind(&self, x: i32, y: i32) -> Option<CellKind> {
        self.grid.get(x, y).copied()
    }

    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    pub fn coords(&self) -> impl Iterator<Item = (i32, i32)> {
        self.grid.coords()
    }

    pub fn moore_neighbors(&self, x: i32, y: i32) -> Vec<(i32, i32)> {
        self.grid.moore_neighbors(x, y)
    }

    /// Number of cells of the given kind
    pub fn count(&self, kind: CellKind) -> usize {
        self.coords().filter(|&(x, y)| self.kind(x, y) == Some(kind)).count()
    }
}
