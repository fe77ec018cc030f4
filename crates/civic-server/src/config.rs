//! City configuration file.
//!
//! The server reads one JSON document describing the grid, the tile
//! catalog, every source's goal parameters, the initial wind, and the
//! dashboard mapping. A builtin default is embedded in the binary; a file
//! given with `--config` replaces it wholesale.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use civic_core::{TileCatalog, TileTypeId, WindVector};
use civic_engine::{ConfigError, ManagerConfig};
use civic_sources::{GoalsConfig, TurbineModels};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const BUILTIN_CITY_CONFIG: &str = include_str!("../data/city_config.json");

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to parse city configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read city configuration from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid city configuration at `{key}`: {reason}")]
    Invalid { key: String, reason: String },
    #[error("invalid city configuration at `dataManager.throttleTime`: {0}")]
    Throttle(#[from] ConfigError),
}

/// The whole configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityConfig {
    pub city_width: u32,
    pub city_height: u32,
    #[serde(default)]
    pub default_tile: TileTypeId,
    pub tile_types: TileCatalog,
    #[serde(default)]
    pub goals: GoalsConfig,
    #[serde(default)]
    pub turbines: TurbineModels,
    #[serde(default)]
    pub wind: WindConfig,
    #[serde(default)]
    pub data_manager: DataManagerConfig,
    /// Display key to variable name, in dashboard order.
    #[serde(default = "default_dashboard")]
    pub dashboard_variables: IndexMap<String, String>,
    #[serde(skip)]
    raw: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    pub winddirection: WindDirectionConfig,
    pub windspeed: WindSpeedConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WindDirectionConfig {
    #[serde(deserialize_with = "lenient_f64")]
    pub default: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindSpeedConfig {
    /// Initial knob position; may be written as a string.
    #[serde(deserialize_with = "lenient_f64")]
    pub default: f64,
    /// Speed in km/h that a full knob turn represents.
    #[serde(deserialize_with = "lenient_f64")]
    pub max_speed: f64,
}

impl Default for WindSpeedConfig {
    fn default() -> Self {
        Self {
            default: 0.0,
            max_speed: 72.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataManagerConfig {
    /// Minimum spacing between throttled passes, in milliseconds.
    pub throttle_time: f64,
}

impl Default for DataManagerConfig {
    fn default() -> Self {
        Self {
            throttle_time: 1000.0,
        }
    }
}

fn default_dashboard() -> IndexMap<String, String> {
    [
        ("green-spaces", "green-spaces-index"),
        ("wind-turbines", "wind-turbines-index"),
        ("distances", "distances-index"),
        ("energy-losses", "energy-losses"),
        ("life-span", "life-span-index"),
        ("zone-balance", "zone-balance-index"),
        ("energy-gain", "energy-gain"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl CityConfig {
    pub fn builtin() -> Result<Self, ConfigFileError> {
        Self::from_json_str(BUILTIN_CITY_CONFIG)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigFileError> {
        let raw: serde_json::Value = serde_json::from_str(json)?;
        let mut config: CityConfig = serde_json::from_value(raw.clone())?;
        config.raw = raw;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// The document as loaded, for `GET /config`.
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    pub fn manager_config(&self) -> Result<ManagerConfig, ConfigError> {
        ManagerConfig::from_millis(self.data_manager.throttle_time)
    }

    pub fn initial_wind(&self) -> WindVector {
        WindVector::new(self.wind.winddirection.default, self.wind.windspeed.default)
    }

    fn validate(&self) -> Result<(), ConfigFileError> {
        if self.city_width == 0 || self.city_height == 0 {
            return Err(ConfigFileError::Invalid {
                key: "cityWidth/cityHeight".into(),
                reason: format!(
                    "grid must have at least one cell, got {}x{}",
                    self.city_width, self.city_height
                ),
            });
        }
        if !self.tile_types.contains(self.default_tile) {
            return Err(ConfigFileError::Invalid {
                key: "defaultTile".into(),
                reason: format!("tile type {} is not in tileTypes", self.default_tile),
            });
        }
        let max_speed = self.wind.windspeed.max_speed;
        if !max_speed.is_finite() || max_speed < 0.0 {
            return Err(ConfigFileError::Invalid {
                key: "wind.windspeed.max_speed".into(),
                reason: format!("must be a non-negative number, got {max_speed}"),
            });
        }
        self.manager_config()?;
        Ok(())
    }
}
