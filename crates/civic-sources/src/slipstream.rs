//! Turbine wake losses.

use crate::config::{SlipstreamConfig, TurbineModel, TurbineModels};
use crate::curve::thrust_coefficient;
use crate::error::SourceConfigError;
use crate::names::{ENERGY_LOSSES, WIND_DIRECTION, WIND_SPEED};
use civic_core::{CalculateError, Goal, TileCatalog, TileTypeId, Value, WindVector};
use civic_grid::{CellMap, Grid};
use civic_source::{CalculateContext, DataSource};

const MAP: &str = "slipstream-map";
const LIFE_SPAN: &str = "life-span-index";

/// `sin(22.5°)`: a direction component above this snaps to a full step.
const SNAP: f64 = 0.382_683_432_365_089_8;

/// Wake losses between turbines, from a Jensen top-hat wake model.
///
/// The wind direction is snapped to one of the eight grid neighbours.
/// For each turbine the source walks upwind for up to `wake-length`
/// cells; every turbine met at step `k` casts a velocity deficit of
///
/// ```text
/// (1 - sqrt(1 - Ct)) / (1 + k_w * k / r)^2
/// ```
///
/// where `Ct` is the upstream turbine's thrust coefficient at the current
/// wind speed, `k_w` the wake decay and `r` its rotor radius. Deficits
/// from several upstream turbines combine as a root sum of squares and
/// the result is clamped to `[0, 1]`.
///
/// Publishes `energy-losses` (`[loss, tileTypeId]` per turbine, row-major),
/// `slipstream-map` and `life-span-index`.
#[derive(Debug)]
pub struct SlipstreamData {
    config: SlipstreamConfig,
    models: TurbineModels,
    small: TileTypeId,
    big: TileTypeId,
    losses: Vec<(f64, TileTypeId)>,
    map: CellMap<f64>,
    max_loss: f64,
    index: u8,
}

impl SlipstreamData {
    /// Validate the wake parameters and resolve the turbine tile types.
    pub fn new(
        catalog: &TileCatalog,
        models: TurbineModels,
        config: SlipstreamConfig,
    ) -> Result<Self, SourceConfigError> {
        models.validate()?;
        config.validate()?;
        Ok(Self {
            small: catalog.id_of("windTurbineSmall")?,
            big: catalog.id_of("windTurbineBig")?,
            config,
            models,
            losses: Vec::new(),
            map: CellMap::new(0, 0, 0.0),
            max_loss: 0.0,
            index: 0,
        })
    }

    fn model(&self, tile: TileTypeId) -> Option<&TurbineModel> {
        if tile == self.small {
            Some(&self.models.small)
        } else if tile == self.big {
            Some(&self.models.big)
        } else {
            None
        }
    }

    /// Loss at the turbine at `(x, y)`, walking `step` cells at a time.
    fn loss_at(&self, grid: &Grid, x: u32, y: u32, step: (i64, i64), speed: f64) -> f64 {
        if step == (0, 0) {
            return 0.0;
        }
        let mut squared = 0.0;
        for k in 1..=i64::from(self.config.wake_length) {
            let ux = i64::from(x) + step.0 * k;
            let uy = i64::from(y) + step.1 * k;
            let (Ok(ux), Ok(uy)) = (u32::try_from(ux), u32::try_from(uy)) else {
                break;
            };
            let Some(tile) = grid.get(ux, uy) else {
                break;
            };
            let Some(model) = self.model(tile) else {
                continue;
            };
            let ct = thrust_coefficient(model, speed, self.config.thrust_coefficient);
            let spread = 1.0 + self.config.wake_decay * k as f64 / model.rotor_radius;
            let deficit = (1.0 - (1.0 - ct).sqrt()) / (spread * spread);
            squared += deficit * deficit;
        }
        squared.sqrt().clamp(0.0, 1.0)
    }
}

/// Unit grid step pointing upwind.
fn upwind_step(direction: f64) -> (i64, i64) {
    let (dx, dy) = WindVector::new(direction, 0.0).downwind();
    let snap = |c: f64| {
        if -c > SNAP {
            1
        } else if -c < -SNAP {
            -1
        } else {
            0
        }
    };
    (snap(dx), snap(dy))
}

/// Map a worst-case loss to a turbine life-span rating.
fn life_span_index(max_loss: f64) -> u8 {
    match max_loss {
        l if l < 0.05 => 5,
        l if l < 0.15 => 4,
        l if l < 0.3 => 3,
        l if l < 0.5 => 2,
        _ => 1,
    }
}

impl DataSource for SlipstreamData {
    fn name(&self) -> &str {
        "slipstream"
    }

    fn variable_names(&self) -> Vec<String> {
        [ENERGY_LOSSES, MAP, LIFE_SPAN].map(String::from).to_vec()
    }

    fn reads(&self) -> Vec<String> {
        [WIND_DIRECTION, WIND_SPEED].map(String::from).to_vec()
    }

    fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        let direction = ctx.published().require_number(WIND_DIRECTION)?;
        let speed = ctx.published().require_number(WIND_SPEED)?;
        let step = upwind_step(direction);
        let grid = ctx.grid();

        let mut map = CellMap::new(grid.width(), grid.height(), 0.0);
        let mut losses = Vec::new();
        for (x, y, tile) in grid.all_cells() {
            if self.model(tile).is_none() {
                continue;
            }
            let loss = self.loss_at(grid, x, y, step, speed);
            map.set(x, y, loss);
            losses.push((loss, tile));
        }

        self.max_loss = losses.iter().map(|&(l, _)| l).fold(0.0, f64::max);
        self.index = life_span_index(self.max_loss);
        self.losses = losses;
        self.map = map;
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        match name {
            ENERGY_LOSSES => Some(Value::List(
                self.losses
                    .iter()
                    .map(|&(loss, tile)| {
                        Value::List(vec![Value::Number(loss), Value::from(u32::from(tile.0))])
                    })
                    .collect(),
            )),
            MAP => Some(Value::Grid(self.map.to_rows(|&v| v))),
            LIFE_SPAN => Some(Value::from(u32::from(self.index))),
            _ => None,
        }
    }

    fn goals(&self) -> Vec<Goal> {
        let limit = self.config.max_acceptable_loss;
        let met = self.max_loss <= limit;
        let progress = if met { 1.0 } else { limit / self.max_loss };
        vec![Goal::new(
            "wind-turbine-slipstream-high",
            "slipstream",
            2,
            met,
            progress,
        )]
    }
}
