//! Error types for grid construction and mutation.

use civic_core::TileTypeId;
use std::fmt;

/// Errors arising from grid construction or a rejected replace request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// Attempted to construct a grid with zero cells.
    EmptyGrid,
    /// A cell update names a coordinate outside the grid.
    OutOfBounds {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// A cell update names a tile type missing from the catalog.
    UnknownTileType {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// The unknown id.
        tile: TileTypeId,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid must have at least one cell"),
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "cell ({x}, {y}) outside {width}x{height} grid"),
            Self::UnknownTileType { x, y, tile } => {
                write!(f, "cell ({x}, {y}) has unknown tile type {tile}")
            }
        }
    }
}

impl std::error::Error for GridError {}
