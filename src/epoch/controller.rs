//! Epoch sequencing: distribute, diffuse, persist
//!
//! The free functions are the storage-free core operations. The
//! [`EpochController`] wires them to a [`MapRepository`] and owns the
//! deterministic random source.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{validate_speeds, EngineConfig, GridConfig};
use crate::core::error::Result;
use crate::core::types::{Epoch, MapId};
use crate::epoch::map::{Map, NewMap};
use crate::epoch::repository::MapRepository;
use crate::placement::{self, Layout};
use crate::simulation::cells::CellMap;
use crate::simulation::diffusion::{self, DiffusionStats};
use crate::simulation::distribution;
use crate::spatial::classify::KindGrid;
use crate::spatial::geometry::Circle;

/// Result of one epoch advance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochOutcome {
    /// Epoch number after the advance
    pub epoch: Epoch,
    pub cells: CellMap,
    pub stats: DiffusionStats,
    /// Cells were missing and had to be seeded first
    pub seeded: bool,
}

/// Place the circles of a new map
pub fn generate_map<R: Rng + ?Sized>(
    config: &GridConfig,
    engine: &EngineConfig,
    rng: &mut R,
) -> Result<Layout> {
    placement::place(config, engine, rng)
}

/// Initial token fill for a layout
pub fn seed_distribution<R: Rng + ?Sized>(
    config: &GridConfig,
    circles: &[Circle],
    probabilities: &[f64],
    engine: &EngineConfig,
    rng: &mut R,
) -> Result<CellMap> {
    config.validate()?;
    let kinds = KindGrid::build(config, circles);
    distribution::distribute(&kinds, probabilities, engine, rng)
}

/// Advance one epoch without touching storage
///
/// Missing cells are seeded with the engine's default probabilities. Empty
/// speeds leave the cells as they are; the epoch still increments.
pub fn advance_epoch<R: Rng + ?Sized>(
    epoch: Epoch,
    config: &GridConfig,
    circles: &[Circle],
    cells: Option<&CellMap>,
    speeds: &[f64],
    engine: &EngineConfig,
    rng: &mut R,
) -> Result<EpochOutcome> {
    config.validate()?;
    if !speeds.is_empty() {
        validate_speeds(speeds)?;
    }

    let kinds = KindGrid::build(config, circles);
    let (current, seeded) = match cells {
        Some(cells) => (cells.clone(), false),
        None => {
            tracing::debug!("No cells yet, seeding with default probabilities");
            let seeded = distribution::distribute(&kinds, &engine.default_probabilities, engine, rng)?;
            (seeded, true)
        }
    };

    let next_epoch = epoch + 1;
    if speeds.is_empty() {
        tracing::warn!(epoch = next_epoch, "No speeds set, nothing moved");
        let stats = DiffusionStats {
            stayed: current.total_tokens(),
            ..DiffusionStats::default()
        };
        return Ok(EpochOutcome {
            epoch: next_epoch,
            cells: current,
            stats,
            seeded,
        });
    }

    let outcome = diffusion::advance(&kinds, &current, speeds, rng);
    tracing::debug!(
        epoch = next_epoch,
        moved = outcome.stats.moved,
        stayed = outcome.stats.stayed,
        blocked = outcome.stats.blocked,
        "Diffusion step complete"
    );

    Ok(EpochOutcome {
        epoch: next_epoch,
        cells: outcome.cells,
        stats: outcome.stats,
        seeded,
    })
}

/// Drives maps stored in a repository through their lifecycle
pub struct EpochController<R: MapRepository> {
    repository: R,
    engine: EngineConfig,
    rng: ChaCha8Rng,
}

impl<R: MapRepository> EpochController<R> {
    pub fn new(repository: R, engine: EngineConfig, seed: u64) -> Self {
        Self::with_rng(repository, engine, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn with_rng(repository: R, engine: EngineConfig, rng: ChaCha8Rng) -> Self {
        Self {
            repository,
            engine,
            rng,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Generate and store a new map; an empty name becomes `map_<unix secs>`
    pub fn create_map(&mut self, name: &str, config: GridConfig) -> Result<Map> {
        let layout = generate_map(&config, &self.engine, &mut self.rng)?;
        let created_at = unix_now();
        let name = if name.trim().is_empty() {
            format!("map_{}", created_at)
        } else {
            name.to_string()
        };

        let map = self.repository.insert_map(NewMap {
            name,
            config,
            circles: layout.circles,
            created_at,
        })?;
        tracing::info!(id = %map.id, name = %map.name, circles = map.circles.len(), "Created map");
        Ok(map)
    }

    /// Seed (or reseed) a map's cells from a probability vector
    pub fn seed_distribution(&mut self, id: MapId, probabilities: &[f64]) -> Result<CellMap> {
        let map = self.repository.load_map(id)?;
        let cells = seed_distribution(
            &map.config,
            &map.circles,
            probabilities,
            &self.engine,
            &mut self.rng,
        )?;
        self.repository.save_cells(id, &cells)?;
        tracing::info!(id = %id, cells = cells.len(), tokens = cells.total_tokens(), "Seeded distribution");
        Ok(cells)
    }

    /// Replace a map's speeds; they take effect on the next advance
    pub fn set_speeds(&mut self, id: MapId, speeds: &[f64]) -> Result<()> {
        validate_speeds(speeds)?;
        self.repository.load_map(id)?;
        self.repository.save_speeds(id, speeds)
    }

    pub fn advance_epoch(&mut self, id: MapId) -> Result<EpochOutcome> {
        let map = self.repository.load_map(id)?;
        let cells = self.repository.load_cells(id)?;

        let outcome = advance_epoch(
            map.epoch,
            &map.config,
            &map.circles,
            cells.as_ref(),
            &map.speeds,
            &self.engine,
            &mut self.rng,
        )?;

        self.repository.save_cells(id, &outcome.cells)?;
        self.repository.update_epoch(id, outcome.epoch)?;
        tracing::info!(
            id = %id,
            epoch = outcome.epoch,
            moved = outcome.stats.moved,
            "Advanced epoch"
        );
        Ok(outcome)
    }

    pub fn map(&self, id: MapId) -> Result<Map> {
        self.repository.load_map(id)
    }

    pub fn cells(&self, id: MapId) -> Result<Option<CellMap>> {
        self.repository.load_cells(id)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
