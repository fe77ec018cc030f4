//! Green-space coverage.

use crate::config::GreenSpacesConfig;
use crate::error::SourceConfigError;
use civic_core::{goal_progress, CalculateError, Goal, TileCatalog, TileTypeId, Value};
use civic_grid::{distances_to, region_areas, CellMap};
use civic_source::{CalculateContext, DataSource};

const INDEX: &str = "green-spaces-index";
const PROXIMITY: &str = "green-spaces-proximity";
const LARGE_AREAS: &str = "green-spaces-large-areas";
const MAP: &str = "green-spaces-map";

/// Measures how well residents are served by parks and water.
///
/// A residential cell is served when a park or water cell lies within
/// `proximity-threshold` steps. Proximity is the served share of
/// residential cells (1.0 when there are none). Large areas are
/// connected park regions of at least `large-space-size` cells.
///
/// The index blends both scores into 1..=5; it is 5 only when both goals
/// are met.
#[derive(Debug)]
pub struct GreenSpacesData {
    config: GreenSpacesConfig,
    residential: TileTypeId,
    park: TileTypeId,
    water: TileTypeId,
    proximity: f64,
    large_areas: usize,
    unserved: CellMap<u8>,
    index: u8,
}

impl GreenSpacesData {
    /// Resolve the tile types this source needs from `catalog`.
    pub fn new(
        catalog: &TileCatalog,
        config: GreenSpacesConfig,
    ) -> Result<Self, SourceConfigError> {
        Ok(Self {
            residential: catalog.id_of("residential")?,
            park: catalog.id_of("park")?,
            water: catalog.id_of("water")?,
            config,
            proximity: 0.0,
            large_areas: 0,
            unserved: CellMap::new(0, 0, 0),
            index: 0,
        })
    }

    fn required_share(&self) -> f64 {
        self.config.proximity_required_percentage / 100.0
    }

    fn proximity_met(&self) -> bool {
        self.proximity >= self.required_share()
    }

    fn areas_met(&self) -> bool {
        self.large_areas >= self.config.large_space_count
    }

    fn areas_progress(&self) -> f64 {
        goal_progress(
            self.large_areas as f64,
            self.config.large_space_count as f64,
        )
    }

    fn proximity_progress(&self) -> f64 {
        if self.required_share() <= 0.0 {
            1.0
        } else {
            goal_progress(self.proximity, self.required_share())
        }
    }
}

impl DataSource for GreenSpacesData {
    fn name(&self) -> &str {
        "green-spaces"
    }

    fn variable_names(&self) -> Vec<String> {
        [INDEX, PROXIMITY, LARGE_AREAS, MAP]
            .map(String::from)
            .to_vec()
    }

    fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        let grid = ctx.grid();
        let distances = distances_to(grid, &[self.park, self.water]);
        let mut unserved = CellMap::new(grid.width(), grid.height(), 0u8);
        let mut residents = 0usize;
        let mut served = 0usize;
        for (x, y, tile) in grid.all_cells() {
            if tile != self.residential {
                continue;
            }
            residents += 1;
            match distances.get(x, y) {
                Some(&d) if d <= self.config.proximity_threshold => served += 1,
                _ => {
                    unserved.set(x, y, 1);
                }
            }
        }
        self.proximity = if residents == 0 {
            1.0
        } else {
            served as f64 / residents as f64
        };
        self.large_areas = region_areas(grid, &[self.park])
            .into_iter()
            .filter(|&area| area >= self.config.large_space_size)
            .count();
        self.unserved = unserved;

        let score = 0.5 * self.proximity_progress() + 0.5 * self.areas_progress();
        self.index = if self.proximity_met() && self.areas_met() {
            5
        } else {
            (1.0 + (3.0 * score).floor()).clamp(1.0, 4.0) as u8
        };
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        match name {
            INDEX => Some(Value::from(u32::from(self.index))),
            PROXIMITY => Some(Value::Number(self.proximity)),
            LARGE_AREAS => Some(Value::from(self.large_areas)),
            MAP => Some(Value::Grid(self.unserved.to_rows(|&v| f64::from(v)))),
            _ => None,
        }
    }

    fn goals(&self) -> Vec<Goal> {
        vec![
            Goal::new(
                "green-space-proximity-low",
                "green-spaces",
                1,
                self.proximity_met(),
                self.proximity_progress(),
            ),
            Goal::new(
                "green-space-areas-low",
                "green-spaces",
                2,
                self.areas_met(),
                self.areas_progress(),
            ),
        ]
    }
}
