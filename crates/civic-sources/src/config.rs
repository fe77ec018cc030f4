//! Source configuration.
//!
//! Each struct deserializes from its section of the city configuration
//! file; every field has a default so a section may be partial or absent.

use crate::error::SourceConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Minimum siting distances, in grid steps (`goals.distances`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceGoals {
    /// Nuclear plant to nearest residential cell.
    #[serde(rename = "nuclearPowerPlant-distance-residentials")]
    pub nuclear_residentials: u32,
    /// Required nuclear plant to nearest water distance.
    #[serde(rename = "nuclearPowerPlant-distance-water")]
    pub nuclear_water: u32,
    /// Wind turbine to nearest residential cell.
    #[serde(rename = "windTurbine-distance-residentials")]
    pub turbine_residentials: u32,
    /// Wind turbine to nearest road or water cell.
    #[serde(rename = "windTurbine-distance-roads-water")]
    pub turbine_roads_water: u32,
    /// Wind turbine to nearest other turbine.
    #[serde(rename = "windTurbine-distance-windTurbines")]
    pub turbine_spacing: u32,
}

impl Default for DistanceGoals {
    fn default() -> Self {
        Self {
            nuclear_residentials: 10,
            nuclear_water: 1,
            turbine_residentials: 3,
            turbine_roads_water: 2,
            turbine_spacing: 2,
        }
    }
}

/// Green-space coverage targets (`goals.green-spaces`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GreenSpacesConfig {
    /// Maximum steps from a residential cell to green space.
    pub proximity_threshold: u32,
    /// Share of residential cells that must be near green space, in percent.
    pub proximity_required_percentage: f64,
    /// Minimum cell count for a park to count as a large area.
    pub large_space_size: usize,
    /// Number of large parks required.
    pub large_space_count: usize,
}

impl Default for GreenSpacesConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: 3,
            proximity_required_percentage: 75.0,
            large_space_size: 4,
            large_space_count: 1,
        }
    }
}

/// Target zoning mix (`goals.zone-balance`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneBalanceConfig {
    /// Target share of each zone type, keyed by tile machine name.
    pub targets: IndexMap<String, f64>,
    /// Allowed deviation from each target share.
    pub tolerance: f64,
}

impl Default for ZoneBalanceConfig {
    fn default() -> Self {
        let targets = [("residential", 0.5), ("park", 0.25), ("road", 0.25)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self {
            targets,
            tolerance: 0.1,
        }
    }
}

impl ZoneBalanceConfig {
    /// Reject negative shares and tolerances.
    pub fn validate(&self) -> Result<(), SourceConfigError> {
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(SourceConfigError::InvalidValue {
                key: "zone-balance.tolerance".into(),
                reason: format!("must be non-negative, got {}", self.tolerance),
            });
        }
        if let Some((kind, share)) = self.targets.iter().find(|(_, &v)| v.is_nan() || v < 0.0) {
            return Err(SourceConfigError::InvalidValue {
                key: format!("zone-balance.targets.{kind}"),
                reason: format!("must be non-negative, got {share}"),
            });
        }
        Ok(())
    }
}

/// Physical model of one turbine subtype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TurbineModel {
    /// Rotor radius in grid cells.
    pub rotor_radius: f64,
    /// Speed (m/s) below which the turbine produces nothing.
    pub cut_in: f64,
    /// Speed (m/s) at which output reaches `rated_output`.
    pub rated_speed: f64,
    /// Speed (m/s) at or above which the turbine shuts down.
    pub cut_out: f64,
    /// Output at rated speed, in kW.
    pub rated_output: f64,
}

impl TurbineModel {
    fn validate(&self, key: &str) -> Result<(), SourceConfigError> {
        let ordered =
            0.0 <= self.cut_in && self.cut_in < self.rated_speed && self.rated_speed <= self.cut_out;
        if !ordered {
            return Err(SourceConfigError::InvalidValue {
                key: key.to_string(),
                reason: "requires 0 <= cut-in < rated-speed <= cut-out".into(),
            });
        }
        if self.rotor_radius.is_nan()
            || self.rotor_radius <= 0.0
            || self.rated_output.is_nan()
            || self.rated_output < 0.0
        {
            return Err(SourceConfigError::InvalidValue {
                key: key.to_string(),
                reason: "rotor-radius must be positive and rated-output non-negative".into(),
            });
        }
        Ok(())
    }
}

/// The two turbine subtypes (`turbines`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurbineModels {
    /// `windTurbineSmall` tiles.
    pub small: TurbineModel,
    /// `windTurbineBig` tiles.
    pub big: TurbineModel,
}

impl Default for TurbineModels {
    fn default() -> Self {
        Self {
            small: TurbineModel {
                rotor_radius: 0.5,
                cut_in: 3.0,
                rated_speed: 12.0,
                cut_out: 25.0,
                rated_output: 2_000.0,
            },
            big: TurbineModel {
                rotor_radius: 1.0,
                cut_in: 3.5,
                rated_speed: 13.0,
                cut_out: 25.0,
                rated_output: 5_000.0,
            },
        }
    }
}

impl TurbineModels {
    /// Check both curves are well formed.
    pub fn validate(&self) -> Result<(), SourceConfigError> {
        self.small.validate("turbines.small")?;
        self.big.validate("turbines.big")
    }
}

/// Wake model parameters (`goals.slipstream`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SlipstreamConfig {
    /// How many cells upwind to search for wake-casting turbines.
    pub wake_length: u32,
    /// Wake expansion rate per cell of distance.
    pub wake_decay: f64,
    /// Thrust coefficient at or below rated speed.
    pub thrust_coefficient: f64,
    /// Largest per-turbine loss the slipstream goal accepts.
    pub max_acceptable_loss: f64,
}

impl Default for SlipstreamConfig {
    fn default() -> Self {
        Self {
            wake_length: 8,
            wake_decay: 0.075,
            thrust_coefficient: 0.8,
            max_acceptable_loss: 0.3,
        }
    }
}

impl SlipstreamConfig {
    /// Reject coefficients outside their physical range.
    pub fn validate(&self) -> Result<(), SourceConfigError> {
        if !(0.0..=1.0).contains(&self.thrust_coefficient) {
            return Err(SourceConfigError::InvalidValue {
                key: "slipstream.thrust-coefficient".into(),
                reason: format!("must be within [0, 1], got {}", self.thrust_coefficient),
            });
        }
        if self.wake_decay.is_nan() || self.wake_decay <= 0.0 {
            return Err(SourceConfigError::InvalidValue {
                key: "slipstream.wake-decay".into(),
                reason: format!("must be positive, got {}", self.wake_decay),
            });
        }
        Ok(())
    }
}

/// Energy balance parameters (`goals.energy`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EnergyConfig {
    /// Flat output per nuclear plant, in kW.
    pub nuclear_output: f64,
    /// City demand the energy goal compares against, in kW.
    pub demand: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            nuclear_output: 1_400_000.0,
            demand: 1_500_000.0,
        }
    }
}

/// The `goals` section of the city configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GoalsConfig {
    /// Siting minimums.
    pub distances: DistanceGoals,
    /// Green-space targets.
    pub green_spaces: GreenSpacesConfig,
    /// Zoning mix targets.
    pub zone_balance: ZoneBalanceConfig,
    /// Wake model.
    pub slipstream: SlipstreamConfig,
    /// Energy balance.
    pub energy: EnergyConfig,
}
