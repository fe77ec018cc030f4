//! City energy balance.

use crate::config::{EnergyConfig, TurbineModels};
use crate::curve::power_output;
use crate::error::SourceConfigError;
use crate::names::{zone_count, ENERGY_LOSSES, WIND_SPEED};
use civic_core::{goal_progress, CalculateError, Goal, TileCatalog, TileTypeId, Value};
use civic_source::{CalculateContext, DataSource};

const GAIN: &str = "energy-gain";
const GAIN_WIND: &str = "energy-gain-wind";
const GAIN_NUCLEAR: &str = "energy-gain-nuclear";

/// Total generation from turbines and nuclear plants, in kW.
///
/// Each turbine listed in `energy-losses` sees the wind speed reduced by
/// its wake loss and produces along its subtype's power curve. Every
/// nuclear plant adds a flat `nuclear-output`. `energy-gain` is the
/// rounded sum; the `energy-supply-low` goal compares it with `demand`.
#[derive(Debug)]
pub struct EnergyData {
    models: TurbineModels,
    config: EnergyConfig,
    small: TileTypeId,
    big: TileTypeId,
    nuclear_count: String,
    wind: f64,
    nuclear: f64,
}

impl EnergyData {
    /// Resolve turbine and plant tile types from `catalog`.
    pub fn new(
        catalog: &TileCatalog,
        models: TurbineModels,
        config: EnergyConfig,
    ) -> Result<Self, SourceConfigError> {
        models.validate()?;
        if config.nuclear_output.is_nan() || config.nuclear_output < 0.0 {
            return Err(SourceConfigError::InvalidValue {
                key: "energy.nuclear-output".into(),
                reason: format!("must be non-negative, got {}", config.nuclear_output),
            });
        }
        catalog.id_of("nuclearPowerPlant")?;
        Ok(Self {
            small: catalog.id_of("windTurbineSmall")?,
            big: catalog.id_of("windTurbineBig")?,
            nuclear_count: zone_count("nuclearPowerPlant"),
            models,
            config,
            wind: 0.0,
            nuclear: 0.0,
        })
    }

    fn total(&self) -> f64 {
        (self.wind + self.nuclear).round()
    }

    /// Parse one `[loss, tileTypeId]` pair.
    fn turbine(item: &Value) -> Option<(f64, TileTypeId)> {
        match item.as_list()? {
            [loss, tile] => {
                let loss = loss.as_number()?;
                let tile = tile.as_number()?;
                if !(0.0..=f64::from(u8::MAX)).contains(&tile) || tile.fract() != 0.0 {
                    return None;
                }
                Some((loss, TileTypeId(tile as u8)))
            }
            _ => None,
        }
    }
}

impl DataSource for EnergyData {
    fn name(&self) -> &str {
        "energy"
    }

    fn variable_names(&self) -> Vec<String> {
        [GAIN, GAIN_WIND, GAIN_NUCLEAR].map(String::from).to_vec()
    }

    fn reads(&self) -> Vec<String> {
        vec![
            ENERGY_LOSSES.to_string(),
            WIND_SPEED.to_string(),
            self.nuclear_count.clone(),
        ]
    }

    fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        let published = ctx.published();
        let speed = published.require_number(WIND_SPEED)?;
        let plants = published.require_number(&self.nuclear_count)?;
        let losses = published
            .require(ENERGY_LOSSES)?
            .as_list()
            .ok_or_else(|| CalculateError::InvalidInput {
                variable: ENERGY_LOSSES.into(),
                expected: "a list",
            })?;

        let mut wind = 0.0;
        for item in losses {
            let (loss, tile) = Self::turbine(item).ok_or_else(|| CalculateError::InvalidInput {
                variable: ENERGY_LOSSES.into(),
                expected: "a list of [loss, tileTypeId] pairs",
            })?;
            let model = if tile == self.small {
                &self.models.small
            } else if tile == self.big {
                &self.models.big
            } else {
                return Err(CalculateError::InvalidInput {
                    variable: ENERGY_LOSSES.into(),
                    expected: "turbine tile types only",
                });
            };
            wind += power_output(model, speed * (1.0 - loss.clamp(0.0, 1.0)));
        }

        self.wind = wind;
        self.nuclear = plants * self.config.nuclear_output;
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        match name {
            GAIN => Some(Value::Number(self.total())),
            GAIN_WIND => Some(Value::Number(self.wind)),
            GAIN_NUCLEAR => Some(Value::Number(self.nuclear)),
            _ => None,
        }
    }

    fn goals(&self) -> Vec<Goal> {
        let total = self.total();
        vec![Goal::new(
            "energy-supply-low",
            "energy",
            1,
            total >= self.config.demand,
            goal_progress(total, self.config.demand),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::calculate;
    use civic_test_utils::{empty_grid, standard_catalog};
    use indexmap::IndexMap;

    fn inputs(speed: f64, plants: f64, losses: &[(f64, u8)]) -> IndexMap<String, Value> {
        let list = losses
            .iter()
            .map(|&(l, t)| Value::List(vec![Value::Number(l), Value::from(u32::from(t))]))
            .collect();
        let mut vars = IndexMap::new();
        vars.insert(ENERGY_LOSSES.to_string(), Value::List(list));
        vars.insert(WIND_SPEED.to_string(), Value::Number(speed));
        vars.insert(
            "zones-nuclearPowerPlant-count".to_string(),
            Value::Number(plants),
        );
        vars
    }

    fn run(vars: &IndexMap<String, Value>) -> Result<EnergyData, CalculateError> {
        let mut source = EnergyData::new(
            &standard_catalog(),
            TurbineModels::default(),
            EnergyConfig::default(),
        )
        .unwrap();
        calculate(&mut source, &empty_grid(4, 4), vars)?;
        Ok(source)
    }

    #[test]
    fn nuclear_plants_add_flat_output() {
        let e = run(&inputs(0.0, 2.0, &[])).unwrap();
        assert_eq!(e.variable(GAIN_NUCLEAR), Some(Value::Number(2_800_000.0)));
        assert_eq!(e.variable(GAIN), Some(Value::Number(2_800_000.0)));
        assert!(e.goals()[0].condition);
    }

    #[test]
    fn turbines_follow_their_curves() {
        // 20 m/s is past both rated speeds.
        let e = run(&inputs(20.0, 0.0, &[(0.0, 5), (0.0, 6)])).unwrap();
        assert_eq!(e.variable(GAIN_WIND), Some(Value::Number(7_000.0)));
        let goal = &e.goals()[0];
        assert!(!goal.condition);
        assert!(goal.progress > 0.0 && goal.progress < 0.01);
    }

    #[test]
    fn wake_loss_reduces_output() {
        let clean = run(&inputs(10.0, 0.0, &[(0.0, 6)])).unwrap();
        let waked = run(&inputs(10.0, 0.0, &[(0.3, 6)])).unwrap();
        let clean = clean.variable(GAIN_WIND).unwrap().as_number().unwrap();
        let waked = waked.variable(GAIN_WIND).unwrap().as_number().unwrap();
        assert!(waked < clean);
    }

    #[test]
    fn gain_is_rounded() {
        let e = run(&inputs(8.0, 0.0, &[(0.0, 5)])).unwrap();
        let gain = e.variable(GAIN).unwrap().as_number().unwrap();
        assert_eq!(gain, gain.round());
    }

    #[test]
    fn non_turbine_entry_rejected() {
        let err = run(&inputs(10.0, 0.0, &[(0.0, 1)])).unwrap_err();
        assert!(matches!(err, CalculateError::InvalidInput { .. }));
    }

    #[test]
    fn fractional_tile_id_rejected() {
        // 5.5 must not be read as the small turbine.
        let mut vars = inputs(10.0, 0.0, &[]);
        vars.insert(
            ENERGY_LOSSES.to_string(),
            Value::List(vec![Value::List(vec![
                Value::Number(0.0),
                Value::Number(5.5),
            ])]),
        );
        let err = run(&vars).unwrap_err();
        assert_eq!(
            err,
            CalculateError::InvalidInput {
                variable: ENERGY_LOSSES.into(),
                expected: "a list of [loss, tileTypeId] pairs",
            }
        );
    }

    #[test]
    fn malformed_losses_rejected() {
        let mut vars = inputs(10.0, 0.0, &[]);
        vars.insert(ENERGY_LOSSES.to_string(), Value::Number(1.0));
        let err = run(&vars).unwrap_err();
        assert_eq!(
            err,
            CalculateError::InvalidInput {
                variable: ENERGY_LOSSES.into(),
                expected: "a list",
            }
        );
    }
}
