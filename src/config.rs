//! Engine tunables.
//!
//! The defaults are the engine's canonical constants; cached synthesis
//! results depend on them, so changing any value changes which molecules
//! the engine produces or where it draws them.
//!
//! ```
//! use molsynth::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{"layout": {"spacing": 6}}"#).unwrap();
//! assert_eq!(config.layout.spacing, 6);
//! assert_eq!(config.rebond.max_rounds, 100);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rebond: RebondConfig,
    pub layout: LayoutConfig,
    pub generator: GeneratorConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.rebond.max_rounds == 0 {
            return Err(ConfigError::Invalid("rebond.max_rounds must be positive"));
        }
        if self.layout.spacing <= 0 {
            return Err(ConfigError::Invalid("layout.spacing must be positive"));
        }
        if self.layout.cycle_radius.is_nan() || self.layout.cycle_radius <= 0.0 {
            return Err(ConfigError::Invalid("layout.cycle_radius must be positive"));
        }
        if !(0.0..=1.0).contains(&self.layout.damping) {
            return Err(ConfigError::Invalid("layout.damping must be within 0..=1"));
        }
        if self.generator.max_multiplicity == 0 {
            return Err(ConfigError::Invalid(
                "generator.max_multiplicity must be positive",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebondConfig {
    /// Rounds before the repair gives up; each round adds one bond unit.
    pub max_rounds: usize,
}

impl Default for RebondConfig {
    fn default() -> Self {
        Self { max_rounds: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Radius of the polygon a detected cycle is drawn on.
    pub cycle_radius: f64,
    /// Offset between a particle and its BFS children.
    pub spacing: i32,
    /// Placement tries per child before falling back to a shifted offset.
    pub max_attempts: usize,
    pub relax_iterations: usize,
    pub damping: f64,
    /// Relaxation never moves a particle closer than this to another.
    pub min_distance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cycle_radius: 3.0,
            spacing: 4,
            max_attempts: 20,
            relax_iterations: 5,
            damping: 0.15,
            min_distance: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Largest particle count a generation request may ask for.
    pub max_mass: usize,
    /// Cap on the multiplicity of a candidate bond, on top of capacities.
    pub max_multiplicity: u8,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_mass: 6,
            max_multiplicity: 3,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid engine configuration: {0}")]
    Invalid(&'static str),
}
