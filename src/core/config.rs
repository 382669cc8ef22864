//! Grid and engine configuration with documented defaults
//!
//! All tunables of the placement, distribution and diffusion passes are
//! collected here so a map request can be described in a single TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, Result};

/// Shape of a map: grid size plus the two circle classes
///
/// Signed integers so that negative wire values surface as
/// [`ConfigError`]s rather than parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Grid width in cells
    pub width: i32,
    /// Grid height in cells
    pub height: i32,
    /// Number of spawn circles
    pub spawn_count: i32,
    /// Number of bedroom circles
    pub bedroom_count: i32,
    /// Spawn circle radius in cells
    pub spawn_radius: i32,
    /// Bedroom circle radius in cells
    pub bedroom_radius: i32,
    /// Largest allowed edge gap between a circle and its nearest neighbour
    pub max_gap: i32,
}

impl GridConfig {
    /// Validate dimensions and counts
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.width <= 0 {
            return Err(ConfigError::NonPositiveDimension {
                axis: "width",
                value: self.width,
            });
        }
        if self.height <= 0 {
            return Err(ConfigError::NonPositiveDimension {
                axis: "height",
                value: self.height,
            });
        }

        let non_negative = [
            ("spawn_count", self.spawn_count),
            ("bedroom_count", self.bedroom_count),
            ("spawn_radius", self.spawn_radius),
            ("bedroom_radius", self.bedroom_radius),
            ("max_gap", self.max_gap),
        ];
        for (field, value) in non_negative {
            if value < 0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        let count = i64::from(self.spawn_count) + i64::from(self.bedroom_count);
        let area = i64::from(self.width) * i64::from(self.height);
        if count > area {
            return Err(ConfigError::TooManyCircles { count, area });
        }

        Ok(())
    }

    /// Number of grid cells
    pub fn area(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    /// Whether a coordinate lies on the grid
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 30,
            spawn_count: 3,
            bedroom_count: 6,
            spawn_radius: 3,
            bedroom_radius: 2,
            max_gap: 4,
        }
    }
}

/// What a Center cell holds after distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterPolicy {
    /// One bookkeeping token fixed at index 0
    #[default]
    Sentinel,
    /// No token at all
    Vacant,
}

/// Tunables for placement, distribution and diffusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tries per circle slot before placement gives up
    ///
    /// Each try costs one overlap scan over the circles placed so far, so
    /// the budget bounds generation time at roughly
    /// `attempts × circles²` distance checks.
    pub max_placement_attempts: u32,

    /// Re-draws of a nearby candidate before falling back to a uniform sample
    ///
    /// A nearby candidate that leaves the inset bounds is re-drawn around the
    /// same base circle. When all re-draws miss, the candidate is sampled
    /// uniformly and the gap post-check judges the result.
    pub nearby_attempts: u32,

    /// Fail generation when a circle is farther than `max_gap` from every other
    ///
    /// When false, violations are logged and reported on the layout only.
    pub strict_gap: bool,

    /// Entries per unit of probability weight in the weighted selector
    ///
    /// A weight `p` contributes `round(p × scale)` entries. At 50, a weight
    /// of 0.01 still rounds to one entry; smaller weights vanish.
    pub selector_scale: u32,

    /// Token assignment for Center cells
    pub center_policy: CenterPolicy,

    /// Probabilities used when an epoch advance finds no cells yet
    pub default_probabilities: Vec<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_placement_attempts: 3000,
            nearby_attempts: 30,
            strict_gap: false,
            selector_scale: 50,
            center_policy: CenterPolicy::Sentinel,
            default_probabilities: vec![90.0, 10.0],
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_placement_attempts == 0 {
            return Err(ConfigError::ZeroSetting("max_placement_attempts"));
        }
        if self.selector_scale == 0 {
            return Err(ConfigError::ZeroSetting("selector_scale"));
        }
        validate_probabilities(&self.default_probabilities)
    }
}

/// Check a probability vector: non-empty, every weight finite and non-negative
pub fn validate_probabilities(probabilities: &[f64]) -> std::result::Result<(), ConfigError> {
    if probabilities.is_empty() {
        return Err(ConfigError::EmptyProbabilities);
    }
    for (index, &value) in probabilities.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidProbability { index, value });
        }
    }
    Ok(())
}

/// Check a speeds vector: non-empty, every entry within [0, 100]
pub fn validate_speeds(speeds: &[f64]) -> std::result::Result<(), ConfigError> {
    if speeds.is_empty() {
        return Err(ConfigError::EmptySpeeds);
    }
    for (index, &value) in speeds.iter().enumerate() {
        // NaN fails both comparisons
        if !(0.0..=100.0).contains(&value) {
            return Err(ConfigError::SpeedOutOfRange { index, value });
        }
    }
    Ok(())
}

/// Parse a comma-separated weight list such as `"90,10"`
pub fn parse_weights(input: &str) -> std::result::Result<Vec<f64>, ConfigError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| ConfigError::UnparsableWeight(part.to_string()))
        })
        .collect()
}

/// A complete map request as read from TOML
///
/// ```toml
/// name = "arena"
/// seed = 42
/// probabilities = [90.0, 10.0]
/// speeds = [50.0, 20.0]
///
/// [grid]
/// width = 40
/// height = 30
/// spawn_count = 3
/// bedroom_count = 6
/// spawn_radius = 3
/// bedroom_radius = 2
/// max_gap = 4
///
/// [engine]
/// strict_gap = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    pub grid: GridConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub probabilities: Option<Vec<f64>>,
    #[serde(default)]
    pub speeds: Option<Vec<f64>>,
}

impl MapRequest {
    /// Load a request from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a request from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let request: MapRequest = toml::from_str(content)?;
        request.validate()?;
        Ok(request)
    }

    /// Validate every section of the request
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.grid.validate()?;
        self.engine.validate()?;
        if let Some(probabilities) = &self.probabilities {
            validate_probabilities(probabilities)?;
        }
        if let Some(speeds) = &self.speeds {
            validate_speeds(speeds)?;
        }
        Ok(())
    }
}
