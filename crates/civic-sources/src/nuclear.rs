//! Nuclear plant siting.

use crate::config::DistanceGoals;
use crate::error::SourceConfigError;
use crate::siting::{classify, SitingTally};
use civic_core::{goal_progress, CalculateError, Goal, TileCatalog, TileTypeId, Value};
use civic_grid::{distances_to, UNREACHABLE};
use civic_source::{CalculateContext, DataSource};

const INDEX: &str = "distances-index";
const MAP: &str = "distances-map";
const HARD: &str = "nuclear-residential-violations";
const GOODWILL: &str = "nuclear-residential-goodwill";

/// Checks every nuclear plant's distance to homes and to water.
///
/// Residential readings use the shared siting rules against
/// `nuclearPowerPlant-distance-residentials`; hard violations are flagged
/// on `distances-map`.
///
/// Water compliance holds when at least one plant sits exactly
/// `nuclearPowerPlant-distance-water` steps from water. With no plant
/// placed it also holds: an empty city is not penalised for plants it
/// does not have.
#[derive(Debug)]
pub struct NuclearPowerData {
    residential_min: u32,
    water_min: u32,
    residential: TileTypeId,
    water: TileTypeId,
    plant: TileTypeId,
    tally: SitingTally,
    plants: usize,
    water_close: bool,
    index: u8,
}

impl NuclearPowerData {
    /// Resolve the tile types this source needs from `catalog`.
    pub fn new(catalog: &TileCatalog, limits: &DistanceGoals) -> Result<Self, SourceConfigError> {
        Ok(Self {
            residential_min: limits.nuclear_residentials,
            water_min: limits.nuclear_water,
            residential: catalog.id_of("residential")?,
            water: catalog.id_of("water")?,
            plant: catalog.id_of("nuclearPowerPlant")?,
            tally: SitingTally::new(0, 0),
            plants: 0,
            water_close: false,
            index: 0,
        })
    }

    /// Whether the water siting rule is currently satisfied.
    pub fn water_compliant(&self) -> bool {
        self.water_close
    }

    /// `(hard, goodwill)` residential violation counts.
    pub fn violations(&self) -> (u32, u32) {
        (self.tally.hard, self.tally.goodwill)
    }
}

impl DataSource for NuclearPowerData {
    fn name(&self) -> &str {
        "nuclear-power"
    }

    fn variable_names(&self) -> Vec<String> {
        [INDEX, MAP, HARD, GOODWILL].map(String::from).to_vec()
    }

    fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        let grid = ctx.grid();
        let to_water = distances_to(grid, &[self.water]);
        let to_residential = distances_to(grid, &[self.residential]);

        self.tally = SitingTally::new(grid.width(), grid.height());
        self.plants = 0;
        self.water_close = false;

        for (x, y, tile) in grid.all_cells() {
            if tile != self.plant {
                continue;
            }
            self.plants += 1;
            if to_water.get(x, y) == Some(&self.water_min) {
                self.water_close = true;
            }
            let reading = to_residential.get(x, y).copied().unwrap_or(UNREACHABLE);
            self.tally
                .record(x, y, classify(reading, self.residential_min));
        }
        if self.plants == 0 {
            self.water_close = true;
        }

        self.index = self.tally.index();
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        match name {
            INDEX => Some(Value::from(u32::from(self.index))),
            MAP => Some(Value::Grid(self.tally.map_rows())),
            HARD => Some(Value::from(self.tally.hard)),
            GOODWILL => Some(Value::from(self.tally.goodwill)),
            _ => None,
        }
    }

    fn goals(&self) -> Vec<Goal> {
        let water = if self.water_close { 1.0 } else { 0.0 };
        vec![
            Goal::new(
                "plant-no-water",
                "distance",
                1,
                self.water_close,
                goal_progress(water, 1.0),
            ),
            Goal::new(
                "plant-distance-residential-low",
                "distance",
                1,
                self.tally.hard == 0,
                goal_progress(f64::from(self.tally.hard), 0.0),
            ),
        ]
    }
}
