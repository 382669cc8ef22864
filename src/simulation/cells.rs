//! Sparse per-cell token storage

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{GridPos, TokenIndex};

/// Wire form of an occupied cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub indices: Vec<TokenIndex>,
}

impl Cell {
    pub fn new(x: i32, y: i32, indices: Vec<TokenIndex>) -> Self {
        Self { x, y, indices }
    }

    pub fn pos(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }
}

/// Tokens per cell; cells without tokens are not stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct CellMap {
    cells: AHashMap<GridPos, Vec<TokenIndex>>,
}

impl CellMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens at a coordinate, empty when the cell is not stored
    pub fn tokens(&self, x: i32, y: i32) -> &[TokenIndex] {
        self.cells
            .get(&GridPos::new(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of tokens at a coordinate
    #[inline]
    pub fn count(&self, x: i32, y: i32) -> usize {
        self.tokens(x, y).len()
    }

    /// Append one token to a cell
    pub fn push(&mut self, x: i32, y: i32, token: TokenIndex) {
        self.cells.entry(GridPos::new(x, y)).or_default().push(token);
    }

    /// Append several tokens to a cell, keeping their order
    pub fn extend(&mut self, x: i32, y: i32, tokens: &[TokenIndex]) {
        if tokens.is_empty() {
            return;
        }
        self.cells
            .entry(GridPos::new(x, y))
            .or_default()
            .extend_from_slice(tokens);
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Tokens across the whole grid
    pub fn total_tokens(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    /// Occupied cells, y outer and x inner
    pub fn row_major(&self) -> Vec<(GridPos, &[TokenIndex])> {
        let mut cells: Vec<_> = self
            .cells
            .iter()
            .map(|(pos, tokens)| (*pos, tokens.as_slice()))
            .collect();
        cells.sort_by_key(|(pos, _)| (pos.y, pos.x));
        cells
    }

    /// Wire form, row-major
    pub fn to_cells(&self) -> Vec<Cell> {
        self.row_major()
            .into_iter()
            .map(|(pos, tokens)| Cell::new(pos.x, pos.y, tokens.to_vec()))
            .collect()
    }
}

impl From<Vec<Cell>> for CellMap {
    fn from(cells: Vec<Cell>) -> Self {
        let mut map = CellMap::new();
        for cell in cells {
            map.extend(cell.x, cell.y, &cell.indices);
        }
        map
    }
}

impl From<CellMap> for Vec<Cell> {
    fn from(map: CellMap) -> Self {
        map.to_cells()
    }
}
