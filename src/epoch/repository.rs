//! Storage port for maps and their cell state

use ahash::AHashMap;

use crate::core::error::{DiagramError, Result};
use crate::core::types::{Epoch, MapId};
use crate::epoch::map::{Map, NewMap};
use crate::simulation::cells::CellMap;

/// Persistence collaborator the epoch controller talks to
///
/// Implementations own id assignment and are responsible for keeping
/// concurrent read-modify-write cycles on one map consistent.
pub trait MapRepository {
    /// Store a new map at epoch 0 and return it with its assigned id
    fn insert_map(&mut self, map: NewMap) -> Result<Map>;

    fn load_map(&self, id: MapId) -> Result<Map>;

    /// Current cell state, `None` before the first distribution
    fn load_cells(&self, id: MapId) -> Result<Option<CellMap>>;

    fn save_cells(&mut self, id: MapId, cells: &CellMap) -> Result<()>;

    fn update_epoch(&mut self, id: MapId, epoch: Epoch) -> Result<()>;

    fn save_speeds(&mut self, id: MapId, speeds: &[f64]) -> Result<()>;
}

/// Process-local repository
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    maps: AHashMap<MapId, Map>,
    cells: AHashMap<MapId, CellMap>,
    next_map_id: u64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a new unique MapId
    fn next_map_id(&mut self) -> MapId {
        self.next_map_id += 1;
        MapId(self.next_map_id)
    }

    /// All stored maps ordered by id
    pub fn maps(&self) -> Vec<&Map> {
        let mut maps: Vec<_> = self.maps.values().collect();
        maps.sort_by_key(|m| m.id);
        maps
    }

    fn map_mut(&mut self, id: MapId) -> Result<&mut Map> {
        self.maps.get_mut(&id).ok_or(DiagramError::MapNotFound(id))
    }
}

impl MapRepository for InMemoryRepository {
    fn insert_map(&mut self, map: NewMap) -> Result<Map> {
        let id = self.next_map_id();
        let stored = Map {
            id,
            name: map.name,
            config: map.config,
            circles: map.circles,
            epoch: 0,
            speeds: Vec::new(),
            created_at: map.created_at,
        };
        self.maps.insert(id, stored.clone());
        Ok(stored)
    }

    fn load_map(&self, id: MapId) -> Result<Map> {
        self.maps.get(&id).cloned().ok_or(DiagramError::MapNotFound(id))
    }

    fn load_cells(&self, id: MapId) -> Result<Option<CellMap>> {
        if !self.maps.contains_key(&id) {
            return Err(DiagramError::MapNotFound(id));
        }
        Ok(self.cells.get(&id).cloned())
    }

    fn save_cells(&mut self, id: MapId, cells: &CellMap) -> Result<()> {
        self.map_mut(id)?;
        self.cells.insert(id, cells.clone());
        Ok(())
    }

    fn update_epoch(&mut self, id: MapId, epoch: Epoch) -> Result<()> {
        self.map_mut(id)?.epoch = epoch;
        Ok(())
    }

    fn save_speeds(&mut self, id: MapId, speeds: &[f64]) -> Result<()> {
        self.map_mut(id)?.speeds = speeds.to_vec();
        Ok(())
    }
}
