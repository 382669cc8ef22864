//! One synchronous step of capacity-constrained token diffusion
//!
//! Conflict resolution is greedy first-fit: source cells are processed
//! row-major (y outer, x inner), tokens in stored order, and each moving token
//! takes the first legal cell of its shuffled Moore neighbourhood. A
//! neighbour's occupancy counts tokens already committed to it for the next
//! epoch plus its own tokens that have not been processed yet, since those
//! may still stay put.

use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{GridPos, TokenIndex};
use crate::simulation::cells::CellMap;
use crate::spatial::classify::{CellKind, KindGrid};

/// Per-step counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffusionStats {
    /// Tokens that moved to a neighbour
    pub moved: usize,
    /// Tokens whose roll did not trigger a move
    pub stayed: usize,
    /// Tokens that tried to move but found every neighbour full or Center
    pub blocked: usize,
    /// Center sentinels and off-grid tokens, carried over untouched
    pub pinned: usize,
}

impl DiffusionStats {
    pub fn total(&self) -> usize {
        self.moved + self.stayed + self.blocked + self.pinned
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionOutcome {
    pub cells: CellMap,
    pub stats: DiffusionStats,
}

/// Movement probability of a token; out-of-range indices use bucket 0
#[inline]
pub fn speed_for(token: TokenIndex, speeds: &[f64]) -> f64 {
    speeds
        .get(token as usize)
        .or_else(|| speeds.first())
        .copied()
        .unwrap_or(0.0)
}

/// Compute the next epoch's cells
///
/// Empty `speeds` is the identity transform.
pub fn advance<R: Rng + ?Sized>(
    kinds: &KindGrid,
    current: &CellMap,
    speeds: &[f64],
    rng: &mut R,
) -> DiffusionOutcome {
    if speeds.is_empty() {
        return DiffusionOutcome {
            cells: current.clone(),
            stats: DiffusionStats {
                stayed: current.total_tokens(),
                ..DiffusionStats::default()
            },
        };
    }

    let sources = current.row_major();
    let mut waiting: AHashMap<GridPos, usize> = sources
        .iter()
        .map(|(pos, tokens)| (*pos, tokens.len()))
        .collect();
    let mut next = CellMap::new();
    let mut stats = DiffusionStats::default();

    for (pos, tokens) in sources {
        match kinds.kind(pos.x, pos.y) {
            Some(CellKind::Center) | None => {
                next.extend(pos.x, pos.y, tokens);
                waiting.remove(&pos);
                stats.pinned += tokens.len();
                continue;
            }
            Some(_) => {}
        }

        for &token in tokens {
            if let Some(left) = waiting.get_mut(&pos) {
                *left = left.saturating_sub(1);
            }

            let roll = rng.gen_range(0.0..100.0);
            if roll >= speed_for(token, speeds) {
                next.push(pos.x, pos.y, token);
                stats.stayed += 1;
                continue;
            }

            let mut neighbors = kinds.moore_neighbors(pos.x, pos.y);
            neighbors.shuffle(rng);

            let target = neighbors.into_iter().find(|&(nx, ny)| {
                let capacity = kinds.kind(nx, ny).map_or(0, |kind| kind.capacity());
                let pending = waiting.get(&GridPos::new(nx, ny)).copied().unwrap_or(0);
                next.count(nx, ny) + pending < capacity
            });

            match target {
                Some((nx, ny)) => {
                    next.push(nx, ny, token);
                    stats.moved += 1;
                }
                None => {
                    next.push(pos.x, pos.y, token);
                    stats.blocked += 1;
                }
            }
        }
    }

    DiffusionOutcome { cells: next, stats }
}
