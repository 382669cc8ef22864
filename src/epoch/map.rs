//! Map - the stored aggregate an epoch controller works on

use serde::{Deserialize, Serialize};

use crate::core::config::GridConfig;
use crate::core::types::{Epoch, MapId};
use crate::spatial::classify::KindGrid;
use crate::spatial::geometry::{Circle, CircleKind};

/// A generated map and its simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub id: MapId,
    pub name: String,
    pub config: GridConfig,
    /// Spawns first, then bedrooms; never mutated after placement
    pub circles: Vec<Circle>,
    /// Advances only through the epoch controller
    #[serde(default)]
    pub epoch: Epoch,
    /// Movement probability per token bucket, empty until set
    #[serde(default)]
    pub speeds: Vec<f64>,
    /// Unix seconds
    pub created_at: u64,
}

impl Map {
    /// Cell classification for this map's layout
    pub fn kinds(&self) -> KindGrid {
        KindGrid::build(&self.config, &self.circles)
    }

    pub fn count(&self, kind: CircleKind) -> usize {
        self.circles.iter().filter(|c| c.kind == kind).count()
    }
}

/// Everything a repository needs to store a freshly generated map
#[derive(Debug, Clone, PartialEq)]
pub struct NewMap {
    pub name: String,
    pub config: GridConfig,
    pub circles: Vec<Circle>,
    pub created_at: u64,
}
