//! Connected regions of like tiles.

use crate::cell_map::CellMap;
use crate::distance::neighbours;
use crate::grid::Grid;
use civic_core::TileTypeId;

/// Sizes of the 4-connected regions formed by cells whose tile is in
/// `targets`, in row-major order of each region's first cell.
pub fn region_areas(grid: &Grid, targets: &[TileTypeId]) -> Vec<usize> {
    let (w, h) = (grid.width(), grid.height());
    let mut visited = CellMap::new(w, h, false);
    let mut areas = Vec::new();
    let mut stack = Vec::new();

    for (x, y, tile) in grid.all_cells() {
        if !targets.contains(&tile) || visited.get(x, y) == Some(&true) {
            continue;
        }
        visited.set(x, y, true);
        stack.push((x, y));
        let mut area = 0;
        while let Some((cx, cy)) = stack.pop() {
            area += 1;
            for (nx, ny) in neighbours(cx, cy, w, h) {
                let is_target = grid.get(nx, ny).is_some_and(|t| targets.contains(&t));
                if is_target && visited.get(nx, ny) == Some(&false) {
                    visited.set(nx, ny, true);
                    stack.push((nx, ny));
                }
            }
        }
        areas.push(area);
    }

    areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellUpdate;
    use civic_core::TileCatalog;
    use std::sync::Arc;

    const PARK: TileTypeId = TileTypeId(2);

    #[test]
    fn diagonal_cells_are_separate_regions() {
        let mut g = Grid::new(4, 3, TileTypeId(0), Arc::new(TileCatalog::standard())).unwrap();
        g.replace(&[
            CellUpdate::new(0, 0, PARK),
            CellUpdate::new(1, 0, PARK),
            CellUpdate::new(0, 1, PARK),
            CellUpdate::new(1, 1, PARK),
            CellUpdate::new(2, 2, PARK),
            CellUpdate::new(3, 0, PARK),
        ])
        .unwrap();
        assert_eq!(region_areas(&g, &[PARK]), vec![4, 1, 1]);
    }

    #[test]
    fn no_targets_no_regions() {
        let g = Grid::new(3, 3, TileTypeId(0), Arc::new(TileCatalog::standard())).unwrap();
        assert!(region_areas(&g, &[PARK]).is_empty());
    }
}
