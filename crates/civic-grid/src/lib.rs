//! The city grid and the spatial queries data sources run over it.
//!
//! - [`Grid`]: fixed-size, row-major tile array with atomic batch replace
//! - [`SharedGrid`]: the grid behind a lock, plus its "changed" observers
//! - [`CellMap`]: dense per-cell maps (distance fields, violation maps)
//! - [`distances_to`]: multi-source BFS distance field on the 4-connected
//!   grid graph
//! - [`region_areas`]: sizes of connected regions under the same adjacency

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell_map;
pub mod distance;
pub mod error;
pub mod grid;
pub mod region;
pub mod shared;

pub use cell_map::CellMap;
pub use distance::{distances_from, distances_to, neighbours, UNREACHABLE};
pub use error::GridError;
pub use grid::{CellUpdate, Cells, Grid};
pub use region::region_areas;
pub use shared::{GridChanged, SharedGrid};
