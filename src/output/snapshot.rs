//! Map snapshot output and serialization

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::epoch::map::Map;
use crate::simulation::cells::Cell;
use crate::simulation::diffusion::DiffusionStats;
use crate::spatial::geometry::CircleKind;

/// Serializable view of a map and its current cells
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub map: Map,
    /// Occupied cells, row-major
    pub cells: Vec<Cell>,
    /// Counters of the last epoch advance, if any ran
    #[serde(default)]
    pub last_step: Option<DiffusionStats>,
}

impl MapSnapshot {
    pub fn new(map: Map, cells: Vec<Cell>, last_step: Option<DiffusionStats>) -> Self {
        Self {
            map,
            cells,
            last_step,
        }
    }

    pub fn total_tokens(&self) -> usize {
        self.cells.iter().map(|c| c.indices.len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn summary(&self) -> String {
        let mut text = format!(
            "Map {} \"{}\" ({}x{}) at epoch {}\n{} spawns, {} bedrooms, {} tokens in {} cells",
            self.map.id,
            self.map.name,
            self.map.config.width,
            self.map.config.height,
            self.map.epoch,
            self.map.count(CircleKind::Spawn),
            self.map.count(CircleKind::Bedroom),
            self.total_tokens(),
            self.cells.len(),
        );
        if let Some(stats) = &self.last_step {
            text.push_str(&format!(
                "\nLast step: {} moved, {} stayed, {} blocked",
                stats.moved, stats.stayed, stats.blocked
            ));
        }
        text
    }
}
