//! Rejection-sampled circle packing
//!
//! Spawns are placed first (the first one at the grid center when it fits),
//! then bedrooms. Every new circle after the first is sampled in a ring around
//! a randomly chosen existing circle so the layout stays connected within
//! `max_gap`. There is no backtracking: a slot that cannot be filled within
//! the attempt budget fails the whole layout.

use std::f64::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{EngineConfig, GridConfig};
use crate::core::error::{DiagramError, Result};
use crate::spatial::geometry::{can_place, nearest_gap, Circle, CircleKind};

/// A circle whose nearest neighbour sits farther than `max_gap`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapViolation {
    /// Position in the layout's circle list
    pub index: usize,
    /// Edge gap to the nearest other circle
    pub gap: f64,
}

/// Result of a successful placement run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Spawns first, then bedrooms, each in placement order
    pub circles: Vec<Circle>,
    /// Non-fatal gap violations (always empty under `strict_gap`)
    pub gap_violations: Vec<GapViolation>,
}

impl Layout {
    pub fn spawns(&self) -> impl Iterator<Item = &Circle> {
        self.circles.iter().filter(|c| c.kind == CircleKind::Spawn)
    }

    pub fn bedrooms(&self) -> impl Iterator<Item = &Circle> {
        self.circles.iter().filter(|c| c.kind == CircleKind::Bedroom)
    }
}

/// Place every spawn and bedroom circle the config asks for
pub fn place<R: Rng + ?Sized>(
    config: &GridConfig,
    engine: &EngineConfig,
    rng: &mut R,
) -> Result<Layout> {
    config.validate()?;
    engine.validate()?;

    let classes = [
        (CircleKind::Spawn, config.spawn_count, config.spawn_radius),
        (CircleKind::Bedroom, config.bedroom_count, config.bedroom_radius),
    ];
    for (kind, count, radius) in classes {
        if count > 0 && !Circle::fits(radius, config) {
            tracing::debug!(%kind, radius, "Radius wider than the grid");
            return Err(DiagramError::PlacementExhausted {
                kind,
                slot: 0,
                attempts: 0,
            });
        }
    }

    let mut circles = Vec::new();

    if config.spawn_count > 0 {
        let center = Circle::new(
            config.width / 2,
            config.height / 2,
            config.spawn_radius,
            CircleKind::Spawn,
        );
        if can_place(&center, &circles, config) {
            circles.push(center);
        } else {
            tracing::debug!("Center spawn does not fit, sampling all spawns");
        }
    }

    let seeded = circles.len() as i32;
    for slot in seeded..config.spawn_count {
        place_slot(
            CircleKind::Spawn,
            config.spawn_radius,
            slot as u32,
            &mut circles,
            config,
            engine,
            rng,
        )?;
    }

    for slot in 0..config.bedroom_count {
        place_slot(
            CircleKind::Bedroom,
            config.bedroom_radius,
            slot as u32,
            &mut circles,
            config,
            engine,
            rng,
        )?;
    }

    let gap_violations = enforce_gaps(&circles, config.max_gap, engine.strict_gap)?;

    tracing::info!(
        spawns = config.spawn_count,
        bedrooms = config.bedroom_count,
        width = config.width,
        height = config.height,
        "Placed {} circles",
        circles.len()
    );

    Ok(Layout {
        circles,
        gap_violations,
    })
}

/// Every circle whose nearest neighbour edge gap exceeds `max_gap`
pub fn check_gaps(circles: &[Circle], max_gap: i32) -> Vec<GapViolation> {
    (0..circles.len())
        .filter_map(|index| {
            nearest_gap(index, circles)
                .filter(|&gap| gap > f64::from(max_gap))
                .map(|gap| GapViolation { index, gap })
        })
        .collect()
}

/// Gap post-check: the first violation is an error when `strict`, otherwise
/// every violation is logged and returned
fn enforce_gaps(circles: &[Circle], max_gap: i32, strict: bool) -> Result<Vec<GapViolation>> {
    let violations = check_gaps(circles, max_gap);
    if strict {
        if let Some(violation) = violations.first() {
            return Err(DiagramError::GapViolation {
                index: violation.index,
                gap: violation.gap,
                max_gap,
            });
        }
    }
    for violation in &violations {
        tracing::warn!(
            index = violation.index,
            gap = violation.gap,
            max_gap,
            "Circle is farther than max_gap from every neighbour"
        );
    }
    Ok(violations)
}

fn place_slot<R: Rng + ?Sized>(
    kind: CircleKind,
    radius: i32,
    slot: u32,
    circles: &mut Vec<Circle>,
    config: &GridConfig,
    engine: &EngineConfig,
    rng: &mut R,
) -> Result<()> {
    for attempt in 0..engine.max_placement_attempts {
        let Some((x, y)) = sample_candidate(radius, circles, config, engine, rng) else {
            continue;
        };

        let candidate = Circle::new(x, y, radius, kind);
        if can_place(&candidate, circles, config) {
            tracing::debug!(%kind, slot, attempt, x, y, "Placed circle");
            circles.push(candidate);
            return Ok(());
        }
    }

    Err(DiagramError::PlacementExhausted {
        kind,
        slot,
        attempts: engine.max_placement_attempts,
    })
}

fn sample_candidate<R: Rng + ?Sized>(
    radius: i32,
    circles: &[Circle],
    config: &GridConfig,
    engine: &EngineConfig,
    rng: &mut R,
) -> Option<(i32, i32)> {
    match circles.choose(rng) {
        Some(base) => sample_nearby(base, radius, config, engine, rng),
        None => sample_uniform(radius, config, rng),
    }
}

/// Uniform position inside the inset bounds `[radius, dim - radius)`
fn sample_uniform<R: Rng + ?Sized>(
    radius: i32,
    config: &GridConfig,
    rng: &mut R,
) -> Option<(i32, i32)> {
    let radius = i64::from(radius);
    let span_x = i64::from(config.width) - 2 * radius;
    let span_y = i64::from(config.height) - 2 * radius;
    if span_x <= 0 || span_y <= 0 {
        return None;
    }
    let x = i32::try_from(radius + rng.gen_range(0..span_x)).ok()?;
    let y = i32::try_from(radius + rng.gen_range(0..span_y)).ok()?;
    Some((x, y))
}

/// Position in the ring `[rBase + r, rBase + r + max_gap]` around `base`
fn sample_nearby<R: Rng + ?Sized>(
    base: &Circle,
    radius: i32,
    config: &GridConfig,
    engine: &EngineConfig,
    rng: &mut R,
) -> Option<(i32, i32)> {
    let min_distance = f64::from(base.radius) + f64::from(radius);
    let max_distance = min_distance + f64::from(config.max_gap);

    for _ in 0..engine.nearby_attempts {
        let angle = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(min_distance..=max_distance);

        // `as` truncates toward zero
        let x = (f64::from(base.x) + distance * angle.cos()) as i32;
        let y = (f64::from(base.y) + distance * angle.sin()) as i32;

        if Circle::new(x, y, radius, base.kind).in_bounds(config) {
            return Some((x, y));
        }
    }

    sample_uniform(radius, config, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ConfigError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config(width: i32, height: i32, spawns: i32, bedrooms: i32) -> GridConfig {
        GridConfig {
            width,
            height,
            spawn_count: spawns,
            bedroom_count: bedrooms,
            spawn_radius: 2,
            bedroom_radius: 1,
            max_gap: 3,
        }
    }

    fn assert_valid_layout(layout: &Layout, config: &GridConfig) {
        for (i, a) in layout.circles.iter().enumerate() {
            assert!(a.in_bounds(config), "circle {} out of bounds: {:?}", i, a);
            for b in &layout.circles[i + 1..] {
                assert!(
                    a.distance(b) >= f64::from(a.radius + b.radius),
                    "{:?} overlaps {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_single_spawn_lands_on_center() {
        let config = GridConfig {
            width: 5,
            height: 5,
            spawn_count: 1,
            bedroom_count: 0,
            spawn_radius: 1,
            bedroom_radius: 1,
            max_gap: 3,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let layout = place(&config, &EngineConfig::default(), &mut rng).unwrap();
        assert_eq!(
            layout.circles,
            vec![Circle::new(2, 2, 1, CircleKind::Spawn)]
        );
        assert!(layout.gap_violations.is_empty());
    }

    #[test]
    fn test_counts_and_order() {
        let config = config(40, 30, 3, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let layout = place(&config, &EngineConfig::default(), &mut rng).unwrap();

        assert_eq!(layout.spawns().count(), 3);
        assert_eq!(layout.bedrooms().count(), 5);
        assert!(layout.circles[..3].iter().all(|c| c.kind == CircleKind::Spawn));
        assert_eq!(layout.circles[0].center(), crate::core::types::GridPos::new(20, 15));
        assert_valid_layout(&layout, &config);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = config(30, 30, 2, 4);
        let engine = EngineConfig::default();
        let a = place(&config, &engine, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = place(&config, &engine, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_many_seeds_hold_invariants() {
        let config = config(50, 50, 4, 8);
        let engine = EngineConfig::default();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let layout = place(&config, &engine, &mut rng).unwrap();
            assert_valid_layout(&layout, &config);
        }
    }

    #[test]
    fn test_spawn_too_large_exhausts_first_slot() {
        let config = GridConfig {
            width: 5,
            height: 5,
            spawn_count: 1,
            bedroom_count: 0,
            spawn_radius: 3,
            bedroom_radius: 1,
            max_gap: 1,
        };
        let engine = EngineConfig {
            max_placement_attempts: 50,
            ..EngineConfig::default()
        };
        let err = place(&config, &engine, &mut ChaCha8Rng::seed_from_u64(3)).unwrap_err();
        assert!(matches!(
            err,
            DiagramError::PlacementExhausted {
                kind: CircleKind::Spawn,
                slot: 0,
                attempts: 0
            }
        ));
    }

    #[test]
    fn test_extreme_radius_fails_without_sampling() {
        let config = GridConfig {
            width: 5,
            height: 5,
            spawn_count: 1,
            bedroom_count: 1,
            spawn_radius: 1,
            bedroom_radius: i32::MAX,
            max_gap: 1,
        };
        let err = place(&config, &EngineConfig::default(), &mut ChaCha8Rng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            DiagramError::PlacementExhausted {
                kind: CircleKind::Bedroom,
                slot: 0,
                attempts: 0
            }
        ));

        let config = GridConfig {
            spawn_radius: i32::MAX,
            bedroom_count: 0,
            ..config
        };
        let err = place(&config, &EngineConfig::default(), &mut ChaCha8Rng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            DiagramError::PlacementExhausted {
                kind: CircleKind::Spawn,
                ..
            }
        ));
    }

    #[test]
    fn test_huge_count_rejected_as_config() {
        let config = GridConfig {
            width: 5,
            height: 5,
            spawn_count: i32::MAX,
            bedroom_count: 1,
            spawn_radius: 1,
            bedroom_radius: 1,
            max_gap: 1,
        };
        let err = place(&config, &EngineConfig::default(), &mut ChaCha8Rng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            DiagramError::Config(ConfigError::TooManyCircles { area: 25, .. })
        ));
    }

    #[test]
    fn test_bedroom_with_no_room_exhausts() {
        // Any bedroom center within the inset bounds overlaps the center spawn.
        let config = GridConfig {
            width: 7,
            height: 7,
            spawn_count: 1,
            bedroom_count: 2,
            spawn_radius: 1,
            bedroom_radius: 2,
            max_gap: 2,
        };
        let engine = EngineConfig {
            max_placement_attempts: 200,
            ..EngineConfig::default()
        };
        let err = place(&config, &engine, &mut ChaCha8Rng::seed_from_u64(11)).unwrap_err();
        assert!(matches!(
            err,
            DiagramError::PlacementExhausted {
                kind: CircleKind::Bedroom,
                slot: 0,
                attempts: 200
            }
        ));
    }

    #[test]
    fn test_empty_request_yields_empty_layout() {
        let config = config(10, 10, 0, 0);
        let layout = place(&config, &EngineConfig::default(), &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
        assert!(layout.circles.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected_before_sampling() {
        let config = config(0, 10, 1, 0);
        let err = place(&config, &EngineConfig::default(), &mut ChaCha8Rng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            DiagramError::Config(ConfigError::NonPositiveDimension { axis: "width", .. })
        ));
    }

    #[test]
    fn test_check_gaps_reports_isolated_circle() {
        let circles = vec![
            Circle::new(2, 2, 1, CircleKind::Spawn),
            Circle::new(5, 2, 1, CircleKind::Spawn),
            Circle::new(30, 30, 1, CircleKind::Bedroom),
        ];
        let violations = check_gaps(&circles, 3);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].index, 2);
        assert!(check_gaps(&circles[..2], 3).is_empty());
    }

    #[test]
    fn test_strict_gap_fails_on_isolated_circle() {
        let circles = vec![
            Circle::new(2, 2, 1, CircleKind::Spawn),
            Circle::new(5, 2, 1, CircleKind::Spawn),
            Circle::new(30, 30, 1, CircleKind::Bedroom),
        ];
        let err = enforce_gaps(&circles, 3, true).unwrap_err();
        match err {
            DiagramError::GapViolation { index, gap, max_gap } => {
                assert_eq!(index, 2);
                assert_eq!(max_gap, 3);
                assert!(gap > 3.0);
            }
            other => panic!("unexpected error {}", other),
        }

        let lenient = enforce_gaps(&circles, 3, false).unwrap();
        assert_eq!(lenient.len(), 1);
        assert!(enforce_gaps(&circles[..2], 3, true).unwrap().is_empty());
    }

    #[test]
    fn test_strict_gap_through_placement() {
        // With no nearby re-draws every circle after the first is sampled
        // uniformly, so some seed scatters a circle beyond max_gap.
        let config = GridConfig {
            width: 60,
            height: 60,
            spawn_count: 1,
            bedroom_count: 3,
            spawn_radius: 1,
            bedroom_radius: 1,
            max_gap: 0,
        };
        let scattered = EngineConfig {
            nearby_attempts: 0,
            ..EngineConfig::default()
        };
        let strict = EngineConfig {
            strict_gap: true,
            ..scattered.clone()
        };

        let seed = (0..50u64)
            .find(|&seed| {
                let layout = place(&config, &scattered, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
                !layout.gap_violations.is_empty()
            })
            .expect("some seed scatters a circle");

        let lenient = place(&config, &scattered, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        let first = lenient.gap_violations[0];
        let err = place(&config, &strict, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap_err();
        match err {
            DiagramError::GapViolation { index, gap, max_gap } => {
                assert_eq!(index, first.index);
                assert_eq!(gap, first.gap);
                assert_eq!(max_gap, 0);
            }
            other => panic!("unexpected error {}", other),
        }
    }
}
