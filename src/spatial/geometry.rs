//! Circles and the pure geometry tests placement relies on

use serde::{Deserialize, Serialize};

use crate::core::config::GridConfig;
use crate::core::types::GridPos;

/// Zone class of a circle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircleKind {
    Spawn,
    Bedroom,
}

impl std::fmt::Display for CircleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn => f.write_str("spawn"),
            Self::Bedroom => f.write_str("bedroom"),
        }
    }
}

/// A placed zone: integer center, integer radius, class tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    #[serde(rename = "type")]
    pub kind: CircleKind,
}

impl Circle {
    pub fn new(x: i32, y: i32, radius: i32, kind: CircleKind) -> Self {
        Self { x, y, radius, kind }
    }

    pub fn center(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }

    /// Distance between the two centers
    pub fn distance(&self, other: &Circle) -> f64 {
        self.center().distance(&other.center())
    }

    /// Sum of both radii
    fn reach(&self, other: &Circle) -> f64 {
        f64::from(self.radius) + f64::from(other.radius)
    }

    /// Space between the two rims; negative when they overlap
    pub fn edge_gap(&self, other: &Circle) -> f64 {
        self.distance(other) - self.reach(other)
    }

    /// Strict overlap: touching rims do not count
    pub fn overlaps(&self, other: &Circle) -> bool {
        self.distance(other) < self.reach(other)
    }

    /// Whether the whole disc lies on the grid
    pub fn in_bounds(&self, config: &GridConfig) -> bool {
        let (x, y, r) = (i64::from(self.x), i64::from(self.y), i64::from(self.radius));
        x - r >= 0
            && x + r < i64::from(config.width)
            && y - r >= 0
            && y + r < i64::from(config.height)
    }

    /// Whether a disc of this radius fits on the grid at all
    pub fn fits(radius: i32, config: &GridConfig) -> bool {
        2 * i64::from(radius) + 1 <= i64::from(config.width.min(config.height))
    }

    /// Whether a grid point falls inside the disc (rim included)
    #[inline]
    pub fn covers(&self, x: i32, y: i32) -> bool {
        let radius = i64::from(self.radius);
        GridPos::new(x, y).distance_sq(&self.center()) <= radius * radius
    }
}

/// Whether a candidate fits on the grid without overlapping any placed circle
pub fn can_place(candidate: &Circle, placed: &[Circle], config: &GridConfig) -> bool {
    candidate.in_bounds(config) && !placed.iter().any(|existing| candidate.overlaps(existing))
}

/// Edge gap to the closest other circle, `None` for a lone circle
pub fn nearest_gap(index: usize, circles: &[Circle]) -> Option<f64> {
    let circle = circles.get(index)?;
    circles
        .iter()
        .enumerate()
        .filter(|(other, _)| *other != index)
        .map(|(_, other)| circle.edge_gap(other))
        .min_by(|a, b| a.total_cmp(b))
}
