//! The city grid.

use crate::error::GridError;
use civic_core::{TileCatalog, TileTypeId};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::sync::Arc;

/// One requested cell change, exchanged as an `[x, y, tile]` triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32, TileTypeId)", into = "(u32, u32, TileTypeId)")]
pub struct CellUpdate {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// New tile type.
    pub tile: TileTypeId,
}

impl CellUpdate {
    /// Construct a cell update.
    pub fn new(x: u32, y: u32, tile: TileTypeId) -> Self {
        Self { x, y, tile }
    }
}

impl From<(u32, u32, TileTypeId)> for CellUpdate {
    fn from((x, y, tile): (u32, u32, TileTypeId)) -> Self {
        Self { x, y, tile }
    }
}

impl From<CellUpdate> for (u32, u32, TileTypeId) {
    fn from(u: CellUpdate) -> Self {
        (u.x, u.y, u.tile)
    }
}

/// A `width x height` rectangle of tile types.
///
/// Dimensions are fixed at construction. Every coordinate holds exactly
/// one tile type from the catalog the grid was built with.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<TileTypeId>,
    catalog: Arc<TileCatalog>,
    generation: u64,
}

impl Grid {
    /// A grid with every cell set to `fill`.
    pub fn new(
        width: u32,
        height: u32,
        fill: TileTypeId,
        catalog: Arc<TileCatalog>,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid);
        }
        if !catalog.contains(fill) {
            return Err(GridError::UnknownTileType {
                x: 0,
                y: 0,
                tile: fill,
            });
        }
        Ok(Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
            catalog,
            generation: 0,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of successful replace calls so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The catalog tile types are validated against.
    pub fn catalog(&self) -> &Arc<TileCatalog> {
        &self.catalog
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Tile type at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<TileTypeId> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Lazy row-major iterator over `(x, y, tile)` for every cell.
    ///
    /// Each call starts a fresh traversal.
    pub fn all_cells(&self) -> Cells<'_> {
        Cells {
            grid: self,
            next: 0,
        }
    }

    /// Number of cells holding `tile`.
    pub fn count(&self, tile: TileTypeId) -> usize {
        self.cells.iter().filter(|&&t| t == tile).count()
    }

    /// Full snapshot as `[y][x]` rows.
    pub fn rows(&self) -> Vec<Vec<TileTypeId>> {
        self.cells
            .chunks(self.width as usize)
            .map(<[TileTypeId]>::to_vec)
            .collect()
    }

    /// Apply a batch of cell updates atomically.
    ///
    /// Every update is validated before any is applied; one bad update
    /// rejects the whole batch and leaves the grid untouched. Later
    /// updates to the same cell win. Returns the number of updates
    /// applied.
    pub fn replace(&mut self, updates: &[CellUpdate]) -> Result<usize, GridError> {
        let mut indices = Vec::with_capacity(updates.len());
        for u in updates {
            let i = self.index(u.x, u.y).ok_or(GridError::OutOfBounds {
                x: u.x,
                y: u.y,
                width: self.width,
                height: self.height,
            })?;
            if !self.catalog.contains(u.tile) {
                return Err(GridError::UnknownTileType {
                    x: u.x,
                    y: u.y,
                    tile: u.tile,
                });
            }
            indices.push(i);
        }
        for (i, u) in indices.into_iter().zip(updates) {
            self.cells[i] = u.tile;
        }
        self.generation += 1;
        Ok(updates.len())
    }
}

/// Row-major cell iterator returned by [`Grid::all_cells`].
#[derive(Clone, Debug)]
pub struct Cells<'a> {
    grid: &'a Grid,
    next: usize,
}

impl Iterator for Cells<'_> {
    type Item = (u32, u32, TileTypeId);

    fn next(&mut self) -> Option<Self::Item> {
        let tile = *self.grid.cells.get(self.next)?;
        let w = self.grid.width as usize;
        let item = ((self.next % w) as u32, (self.next / w) as u32, tile);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.grid.cells.len().saturating_sub(self.next);
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Cells<'_> {}
impl FusedIterator for Cells<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid(w: u32, h: u32) -> Grid {
        Grid::new(w, h, TileTypeId(0), Arc::new(TileCatalog::standard())).unwrap()
    }

    #[test]
    fn zero_sized_grid_rejected() {
        let catalog = Arc::new(TileCatalog::standard());
        assert_eq!(
            Grid::new(0, 4, TileTypeId(0), catalog).unwrap_err(),
            GridError::EmptyGrid
        );
    }

    #[test]
    fn all_cells_is_row_major_and_restartable() {
        let mut g = grid(3, 2);
        g.replace(&[CellUpdate::new(1, 1, TileTypeId(3))]).unwrap();
        let first: Vec<_> = g.all_cells().collect();
        assert_eq!(first.len(), 6);
        assert_eq!(first[0], (0, 0, TileTypeId(0)));
        assert_eq!(first[2], (2, 0, TileTypeId(0)));
        assert_eq!(first[4], (1, 1, TileTypeId(3)));
        let second: Vec<_> = g.all_cells().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn bad_triple_rejects_whole_batch() {
        let mut g = grid(4, 4);
        let before = g.rows();
        let err = g
            .replace(&[
                CellUpdate::new(0, 0, TileTypeId(1)),
                CellUpdate::new(4, 0, TileTypeId(1)),
            ])
            .unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds { x: 4, .. }));
        let err = g
            .replace(&[
                CellUpdate::new(0, 0, TileTypeId(1)),
                CellUpdate::new(1, 1, TileTypeId(200)),
            ])
            .unwrap_err();
        assert!(matches!(err, GridError::UnknownTileType { .. }));
        assert_eq!(g.rows(), before);
        assert_eq!(g.generation(), 0);
    }

    #[test]
    fn later_update_to_same_cell_wins() {
        let mut g = grid(2, 2);
        g.replace(&[
            CellUpdate::new(1, 0, TileTypeId(1)),
            CellUpdate::new(1, 0, TileTypeId(2)),
        ])
        .unwrap();
        assert_eq!(g.get(1, 0), Some(TileTypeId(2)));
        assert_eq!(g.count(TileTypeId(2)), 1);
        assert_eq!(g.generation(), 1);
    }

    #[test]
    fn cell_update_wire_shape_is_triple() {
        let u: CellUpdate = serde_json::from_str("[3,4,7]").unwrap();
        assert_eq!(u, CellUpdate::new(3, 4, TileTypeId(7)));
        assert_eq!(serde_json::to_string(&u).unwrap(), "[3,4,7]");
        assert!(serde_json::from_str::<CellUpdate>("[3,4]").is_err());
    }

    proptest! {
        #[test]
        fn all_cells_visits_every_cell_once(w in 1u32..20, h in 1u32..20) {
            let g = grid(w, h);
            let cells: Vec<_> = g.all_cells().collect();
            prop_assert_eq!(cells.len(), (w * h) as usize);
            prop_assert_eq!(g.all_cells().len(), (w * h) as usize);
            for (i, (x, y, _)) in cells.into_iter().enumerate() {
                prop_assert_eq!((y * w + x) as usize, i);
            }
        }
    }
}
