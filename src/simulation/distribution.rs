//! Initial token fill from a probability vector

use rand::Rng;

use crate::core::config::{validate_probabilities, CenterPolicy, EngineConfig};
use crate::core::error::Result;
use crate::core::types::TokenIndex;
use crate::simulation::cells::CellMap;
use crate::spatial::classify::{CellKind, KindGrid};

/// Weighted draw over probability buckets
///
/// Bucket `i` stands for `round(p[i] × scale)` entries of an implicit
/// multiset. Only the running totals are stored, so a draw is one uniform
/// integer plus a binary search regardless of the scale. Totals saturate at
/// `u64::MAX`; buckets past the saturation point get no entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedSelector {
    cumulative: Vec<u64>,
}

impl WeightedSelector {
    pub fn new(probabilities: &[f64], scale: u32) -> Self {
        let mut running = 0u64;
        let cumulative = probabilities
            .iter()
            .map(|&p| {
                let entries = (p * f64::from(scale)).round().max(0.0) as u64;
                running = running.saturating_add(entries);
                running
            })
            .collect();
        Self { cumulative }
    }

    /// Size of the implicit multiset
    pub fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Every weight rounded to zero; draws always yield bucket 0
    pub fn is_degenerate(&self) -> bool {
        self.total() == 0
    }

    /// Entries held by one bucket
    pub fn weight(&self, bucket: usize) -> u64 {
        let upper = self.cumulative.get(bucket).copied().unwrap_or(0);
        let lower = match bucket {
            0 => 0,
            _ => self.cumulative.get(bucket - 1).copied().unwrap_or(upper),
        };
        upper.saturating_sub(lower)
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> TokenIndex {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let roll = rng.gen_range(0..total);
        self.cumulative.partition_point(|&c| c <= roll) as TokenIndex
    }
}

/// Fill every cell of the grid according to its kind
///
/// Cells are visited row-major. Interior cells get one drawn token, Empty
/// cells one or two, Center cells follow the engine's [`CenterPolicy`].
pub fn distribute<R: Rng + ?Sized>(
    kinds: &KindGrid,
    probabilities: &[f64],
    engine: &EngineConfig,
    rng: &mut R,
) -> Result<CellMap> {
    validate_probabilities(probabilities)?;

    let selector = WeightedSelector::new(probabilities, engine.selector_scale);
    if selector.is_degenerate() {
        tracing::warn!("Every probability rounds to zero, filling with bucket 0");
    }

    let mut cells = CellMap::new();
    for (x, y) in kinds.coords() {
        match kinds.kind(x, y) {
            Some(CellKind::Center) => {
                if engine.center_policy == CenterPolicy::Sentinel {
                    cells.push(x, y, 0);
                }
            }
            Some(CellKind::Interior) => cells.push(x, y, selector.draw(rng)),
            Some(CellKind::Empty) => {
                let count = rng.gen_range(1..=2);
                for _ in 0..count {
                    cells.push(x, y, selector.draw(rng));
                }
            }
            None => {}
        }
    }

    tracing::debug!(
        occupied = cells.len(),
        tokens = cells.total_tokens(),
        buckets = probabilities.len(),
        "Distributed tokens"
    );

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GridConfig;
    use crate::core::error::{ConfigError, DiagramError};
    use crate::spatial::geometry::{Circle, CircleKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid(width: i32, height: i32) -> GridConfig {
        GridConfig {
            width,
            height,
            ..GridConfig::default()
        }
    }

    #[test]
    fn test_selector_weights_round() {
        let selector = WeightedSelector::new(&[90.0, 10.0, 0.001], 50);
        assert_eq!(selector.weight(0), 4500);
        assert_eq!(selector.weight(1), 500);
        assert_eq!(selector.weight(2), 0);
        assert_eq!(selector.total(), 5000);
    }

    #[test]
    fn test_selector_never_draws_empty_bucket() {
        let selector = WeightedSelector::new(&[0.0, 1.0, 0.0, 1.0], 10);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..500 {
            let bucket = selector.draw(&mut rng);
            assert!(bucket == 1 || bucket == 3, "drew {}", bucket);
        }
    }

    #[test]
    fn test_degenerate_selector_yields_zero() {
        let selector = WeightedSelector::new(&[0.0, 0.001], 50);
        assert!(selector.is_degenerate());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(selector.draw(&mut rng), 0);
    }

    #[test]
    fn test_selector_roughly_follows_weights() {
        let selector = WeightedSelector::new(&[90.0, 10.0], 50);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let ones = (0..10_000).filter(|_| selector.draw(&mut rng) == 1).count();
        assert!((700..1300).contains(&ones), "bucket 1 drawn {} times", ones);
    }

    #[test]
    fn test_huge_weights_saturate() {
        let selector = WeightedSelector::new(&[1e300, 1e300], 50);
        assert_eq!(selector.total(), u64::MAX);
        assert_eq!(selector.weight(1), 0);

        let kinds = KindGrid::build(&grid(4, 4), &[]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let cells = distribute(&kinds, &[1e300, 1e300], &EngineConfig::default(), &mut rng).unwrap();
        assert_eq!(cells.len(), 16);
        for (_, tokens) in cells.row_major() {
            assert!(tokens.iter().all(|&t| t < 2));
        }
    }

    #[test]
    fn test_single_bucket_fills_with_zero() {
        let kinds = KindGrid::build(&grid(3, 3), &[]);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let cells = distribute(&kinds, &[100.0], &EngineConfig::default(), &mut rng).unwrap();

        assert_eq!(cells.len(), 9);
        for (_, tokens) in cells.row_major() {
            assert!((1..=2).contains(&tokens.len()));
            assert!(tokens.iter().all(|&t| t == 0));
        }
    }

    #[test]
    fn test_capacity_per_kind() {
        let config = grid(9, 9);
        let circles = vec![Circle::new(4, 4, 2, CircleKind::Spawn)];
        let kinds = KindGrid::build(&config, &circles);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let cells = distribute(&kinds, &[60.0, 30.0, 10.0], &EngineConfig::default(), &mut rng).unwrap();

        for (x, y) in kinds.coords() {
            let tokens = cells.tokens(x, y);
            match kinds.kind(x, y).unwrap() {
                CellKind::Center => assert_eq!(tokens, &[0]),
                CellKind::Interior => assert_eq!(tokens.len(), 1),
                CellKind::Empty => assert!((1..=2).contains(&tokens.len())),
            }
            assert!(tokens.iter().all(|&t| t < 3));
        }
    }

    #[test]
    fn test_vacant_center_policy() {
        let config = grid(5, 5);
        let circles = vec![Circle::new(2, 2, 1, CircleKind::Spawn)];
        let kinds = KindGrid::build(&config, &circles);
        let engine = EngineConfig {
            center_policy: CenterPolicy::Vacant,
            ..EngineConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let cells = distribute(&kinds, &[1.0], &engine, &mut rng).unwrap();
        assert_eq!(cells.count(2, 2), 0);
        assert_eq!(cells.len(), 24);
    }

    #[test]
    fn test_empty_probabilities_rejected() {
        let kinds = KindGrid::build(&grid(2, 2), &[]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = distribute(&kinds, &[], &EngineConfig::default(), &mut rng).unwrap_err();
        assert!(matches!(err, DiagramError::Config(ConfigError::EmptyProbabilities)));
    }
}
