//! Benchmark profiles for the civic metrics engine.
//!
//! - [`reference_city`]: a deterministic mixed-use layout at any size
//! - [`reference_manager`]: that city behind a [`DataManager`] with every
//!   standard source registered

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use civic_core::{SharedWind, TileCatalog, TileTypeId, WindVector};
use civic_engine::{DataManager, ManagerConfig};
use civic_grid::{CellUpdate, Grid, SharedGrid};
use civic_sources::{standard_sources, GoalsConfig, TurbineModels};

/// Build a `width x height` city on the standard catalog.
///
/// Roads every eighth row and column; residential blocks between them
/// with a park in each block's corner; a lake in the north-west; a row
/// of big turbines along the east edge and one nuclear plant beside the
/// lake.
pub fn reference_city(width: u32, height: u32) -> Grid {
    let catalog = Arc::new(TileCatalog::standard());
    let id = |kind: &str| catalog.id_of(kind).unwrap_or(TileTypeId(0));
    let (residential, park, water, road, big, nuclear) = (
        id("residential"),
        id("park"),
        id("water"),
        id("road"),
        id("windTurbineBig"),
        id("nuclearPowerPlant"),
    );

    let mut updates = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let tile = if x < width / 6 && y < height / 6 {
                water
            } else if x + 2 >= width && y % 3 == 0 {
                big
            } else if x % 8 == 0 || y % 8 == 0 {
                road
            } else if x % 8 == 1 && y % 8 == 1 {
                park
            } else {
                residential
            };
            updates.push(CellUpdate::new(x, y, tile));
        }
    }
    let lake_edge = (width / 6).max(1);
    updates.push(CellUpdate::new(lake_edge.min(width - 1), 1u32.min(height - 1), nuclear));

    let mut grid = Grid::new(width, height, TileTypeId(0), Arc::clone(&catalog))
        .expect("benchmark grid dimensions are non-zero");
    grid.replace(&updates)
        .expect("benchmark layout stays inside the grid");
    grid
}

/// [`reference_city`] with every standard source registered, unthrottled.
pub fn reference_manager(width: u32, height: u32) -> DataManager {
    let grid = reference_city(width, height);
    let catalog = Arc::clone(grid.catalog());
    let mut manager = DataManager::new(
        SharedGrid::new(grid),
        ManagerConfig {
            throttle: std::time::Duration::ZERO,
        },
    );
    let sources = standard_sources(
        &catalog,
        &GoalsConfig::default(),
        &TurbineModels::default(),
        SharedWind::new(WindVector::new(270.0, 0.5)),
        72.0,
    )
    .expect("default source configuration is valid");
    for source in sources {
        manager
            .register_source(source)
            .expect("standard sources form a valid registry");
    }
    manager
}
