//! Wind turbine siting and the pass's view of the wind.

use crate::config::DistanceGoals;
use crate::error::SourceConfigError;
use crate::names::{WIND_DIRECTION, WIND_SPEED};
use crate::siting::{classify, Reading, SitingTally};
use civic_core::{
    goal_progress, CalculateError, Goal, SharedWind, TileCatalog, TileTypeId, Value, WindVector,
};
use civic_grid::{distances_from, distances_to, UNREACHABLE};
use civic_source::{CalculateContext, DataSource};

const INDEX: &str = "wind-turbines-index";
const MAP: &str = "wind-turbines-map";

/// Siting rules for wind turbines, plus the wind every later source sees.
///
/// This is the one source holding the [`SharedWind`] handle. Each pass
/// snapshots the wind and publishes it as `wind-direction` (degrees) and
/// `wind-speed` (m/s), so wind-dependent sources registered later read a
/// single consistent value.
///
/// For every small or big turbine:
/// - residential distance is classified with the shared siting rules;
/// - a road or water cell closer than the minimum is a hard violation;
/// - another turbine closer than the spacing minimum is a goodwill
///   violation.
#[derive(Debug)]
pub struct WindTurbinesData {
    wind: SharedWind,
    max_speed_kmh: f64,
    limits: DistanceGoals,
    residential: TileTypeId,
    road: TileTypeId,
    water: TileTypeId,
    turbines: [TileTypeId; 2],
    seen: WindVector,
    tally: SitingTally,
    residential_hard: u32,
    road_water: u32,
    spacing: u32,
    index: u8,
}

impl WindTurbinesData {
    /// Build with the composition root's wind handle.
    ///
    /// `max_speed_kmh` is the speed a full knob turn represents.
    pub fn new(
        catalog: &TileCatalog,
        limits: DistanceGoals,
        wind: SharedWind,
        max_speed_kmh: f64,
    ) -> Result<Self, SourceConfigError> {
        if max_speed_kmh.is_nan() || max_speed_kmh < 0.0 {
            return Err(SourceConfigError::InvalidValue {
                key: "wind.windspeed.max_speed".into(),
                reason: format!("must be non-negative, got {max_speed_kmh}"),
            });
        }
        Ok(Self {
            wind,
            max_speed_kmh,
            limits,
            residential: catalog.id_of("residential")?,
            road: catalog.id_of("road")?,
            water: catalog.id_of("water")?,
            turbines: [
                catalog.id_of("windTurbineSmall")?,
                catalog.id_of("windTurbineBig")?,
            ],
            seen: WindVector::default(),
            tally: SitingTally::new(0, 0),
            residential_hard: 0,
            road_water: 0,
            spacing: 0,
            index: 0,
        })
    }
}

impl DataSource for WindTurbinesData {
    fn name(&self) -> &str {
        "wind-turbines"
    }

    fn variable_names(&self) -> Vec<String> {
        [WIND_DIRECTION, WIND_SPEED, INDEX, MAP]
            .map(String::from)
            .to_vec()
    }

    fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        self.seen = self.wind.get();

        let grid = ctx.grid();
        let (w, h) = (grid.width(), grid.height());
        let to_residential = distances_to(grid, &[self.residential]);
        let to_road_water = distances_to(grid, &[self.road, self.water]);
        let sites: Vec<(u32, u32)> = grid
            .all_cells()
            .filter(|(_, _, t)| self.turbines.contains(t))
            .map(|(x, y, _)| (x, y))
            .collect();

        self.tally = SitingTally::new(w, h);
        self.residential_hard = 0;
        self.road_water = 0;
        self.spacing = 0;

        for (i, &(x, y)) in sites.iter().enumerate() {
            let residential = to_residential.get(x, y).copied().unwrap_or(UNREACHABLE);
            let reading = classify(residential, self.limits.turbine_residentials);
            if reading == Reading::Hard {
                self.residential_hard += 1;
            }
            self.tally.record(x, y, reading);

            let road_water = to_road_water.get(x, y).copied().unwrap_or(UNREACHABLE);
            if road_water < self.limits.turbine_roads_water {
                self.road_water += 1;
                self.tally.record(x, y, Reading::Hard);
            }

            if sites.len() > 1 {
                let others = sites
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &cell)| cell);
                let nearest = distances_from(w, h, others)
                    .get(x, y)
                    .copied()
                    .unwrap_or(UNREACHABLE);
                if nearest < self.limits.turbine_spacing {
                    self.spacing += 1;
                    self.tally.record(x, y, Reading::Goodwill);
                }
            }
        }

        self.index = self.tally.index();
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        match name {
            WIND_DIRECTION => Some(Value::Number(self.seen.bearing())),
            WIND_SPEED => Some(Value::Number(self.seen.speed_m_s(self.max_speed_kmh))),
            INDEX => Some(Value::from(u32::from(self.index))),
            MAP => Some(Value::Grid(self.tally.map_rows())),
            _ => None,
        }
    }

    fn goals(&self) -> Vec<Goal> {
        let goal = |id: &str, violations: u32| {
            Goal::new(
                id,
                "distance",
                1,
                violations == 0,
                goal_progress(f64::from(violations), 0.0),
            )
        };
        vec![
            goal("wind-turbine-distance-residential-low", self.residential_hard),
            goal("wind-turbine-distance-road-water-low", self.road_water),
            goal("wind-turbine-distance-wind-turbines-low", self.spacing),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::calculate;
    use civic_test_utils::grid_from_rows;
    use indexmap::IndexMap;

    fn run(rows: &[&str], wind: WindVector) -> WindTurbinesData {
        let grid = grid_from_rows(rows);
        let mut source = WindTurbinesData::new(
            grid.catalog(),
            DistanceGoals::default(),
            SharedWind::new(wind),
            72.0,
        )
        .unwrap();
        calculate(&mut source, &grid, &IndexMap::new()).unwrap();
        source
    }

    #[test]
    fn publishes_wind_snapshot() {
        let s = run(&["...."], WindVector::new(450.0, 0.5));
        assert_eq!(s.variable(WIND_DIRECTION), Some(Value::Number(90.0)));
        assert_eq!(s.variable(WIND_SPEED), Some(Value::Number(10.0)));
    }

    #[test]
    fn well_sited_turbines_score_five() {
        let s = run(
            &["t.....", "......", "....T.", "......"],
            WindVector::new(0.0, 0.5),
        );
        assert_eq!(s.variable(INDEX), Some(Value::Number(5.0)));
        assert!(s.goals().iter().all(|g| g.condition));
    }

    #[test]
    fn turbine_next_to_homes_and_road_is_hard() {
        let s = run(&["Rt#.", "....", "...."], WindVector::default());
        assert_eq!(s.residential_hard, 1);
        assert_eq!(s.road_water, 1);
        assert_eq!(s.variable(INDEX), Some(Value::Number(1.0)));
        let map = s.variable(MAP).unwrap();
        assert_eq!(map.as_grid().unwrap()[0][1], 1.0);
        let goals = s.goals();
        assert!(!goals[0].condition);
        assert!(!goals[1].condition);
        assert!(goals[2].condition);
    }

    #[test]
    fn adjacent_turbines_break_spacing() {
        let s = run(&["tt....", "......"], WindVector::default());
        assert_eq!(s.spacing, 2);
        assert_eq!(s.variable(INDEX), Some(Value::Number(3.0)));
        assert!(!s.goals()[2].condition);
    }

    #[test]
    fn goodwill_at_exact_residential_minimum() {
        // Minimum is 3: a turbine exactly 3 steps from homes costs one point.
        let s = run(&["R..t", "....", "...."], WindVector::default());
        assert_eq!(s.residential_hard, 0);
        assert_eq!(s.variable(INDEX), Some(Value::Number(4.0)));
    }
}
