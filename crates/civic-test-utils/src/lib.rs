//! Test utilities and mock types for civic development.
//!
//! Provides ASCII grid builders over the standard tile catalog and the
//! mock data sources in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{ConstSource, CountingSource, EchoSource, FailingSource};

use std::sync::Arc;

use civic_core::{TileCatalog, TileTypeId};
use civic_grid::{CellUpdate, Grid, SharedGrid};

pub const EMPTY: TileTypeId = TileTypeId(0);
pub const RESIDENTIAL: TileTypeId = TileTypeId(1);
pub const PARK: TileTypeId = TileTypeId(2);
pub const WATER: TileTypeId = TileTypeId(3);
pub const ROAD: TileTypeId = TileTypeId(4);
pub const TURBINE_SMALL: TileTypeId = TileTypeId(5);
pub const TURBINE_BIG: TileTypeId = TileTypeId(6);
pub const NUCLEAR: TileTypeId = TileTypeId(7);

/// The standard catalog, shared.
pub fn standard_catalog() -> Arc<TileCatalog> {
    Arc::new(TileCatalog::standard())
}

/// Tile for one character of an ASCII grid.
///
/// `.` empty, `R` residential, `P` park, `W` water, `#` road,
/// `t` small turbine, `T` big turbine, `N` nuclear plant.
pub fn tile_for(c: char) -> TileTypeId {
    match c {
        '.' => EMPTY,
        'R' => RESIDENTIAL,
        'P' => PARK,
        'W' => WATER,
        '#' => ROAD,
        't' => TURBINE_SMALL,
        'T' => TURBINE_BIG,
        'N' => NUCLEAR,
        other => panic!("no tile for {other:?}"),
    }
}

/// An empty grid of the given size over the standard catalog.
pub fn empty_grid(width: u32, height: u32) -> Grid {
    Grid::new(width, height, EMPTY, standard_catalog()).expect("non-empty grid")
}

/// Build a grid from equal-length ASCII rows, top row first.
pub fn grid_from_rows(rows: &[&str]) -> Grid {
    let height = rows.len() as u32;
    let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
    let mut grid = empty_grid(width, height);
    grid.replace(&updates_from_rows(rows))
        .expect("rows fit the grid");
    grid
}

/// [`grid_from_rows`] wrapped in a [`SharedGrid`].
pub fn shared_grid_from_rows(rows: &[&str]) -> SharedGrid {
    SharedGrid::new(grid_from_rows(rows))
}

/// Cell updates for every non-empty character of `rows`.
pub fn updates_from_rows(rows: &[&str]) -> Vec<CellUpdate> {
    rows.iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.chars()
                .enumerate()
                .filter(|&(_, c)| c != '.')
                .map(move |(x, c)| CellUpdate::new(x as u32, y as u32, tile_for(c)))
        })
        .collect()
}

/// Place single tiles on an otherwise empty grid.
pub fn grid_with(width: u32, height: u32, cells: &[(u32, u32, TileTypeId)]) -> Grid {
    let mut grid = empty_grid(width, height);
    let updates: Vec<CellUpdate> = cells.iter().map(|&c| CellUpdate::from(c)).collect();
    grid.replace(&updates).expect("cells fit the grid");
    grid
}
