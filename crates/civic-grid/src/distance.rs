//! Distance fields over the 4-connected grid graph.
//!
//! A distance field holds, for every cell, the number of orthogonal steps
//! to the nearest seed cell. It is computed with one multi-source
//! breadth-first search, so the cost is `O(width * height)` regardless of
//! how many seeds there are. Tile types never block movement: the graph
//! is the full grid lattice, and distance is the unobstructed Manhattan
//! distance to the nearest seed.

use crate::cell_map::CellMap;
use crate::grid::Grid;
use civic_core::TileTypeId;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Distance value for cells no seed can reach (there were no seeds).
pub const UNREACHABLE: u32 = u32::MAX;

const OFFSETS_4: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// In-bounds orthogonal neighbours of `(x, y)`.
///
/// This is the single adjacency rule shared by distance fields and
/// region labelling.
pub fn neighbours(x: u32, y: u32, width: u32, height: u32) -> SmallVec<[(u32, u32); 4]> {
    let mut result = SmallVec::new();
    for (dx, dy) in OFFSETS_4 {
        let nx = i64::from(x) + dx;
        let ny = i64::from(y) + dy;
        if (0..i64::from(width)).contains(&nx) && (0..i64::from(height)).contains(&ny) {
            result.push((nx as u32, ny as u32));
        }
    }
    result
}

/// Distance field seeded from explicit cells.
///
/// Seeds outside the grid are ignored. With no seeds every cell is
/// [`UNREACHABLE`].
pub fn distances_from(
    width: u32,
    height: u32,
    seeds: impl IntoIterator<Item = (u32, u32)>,
) -> CellMap<u32> {
    let mut field = CellMap::new(width, height, UNREACHABLE);
    let mut queue = VecDeque::new();

    for (x, y) in seeds {
        if field.get(x, y) == Some(&UNREACHABLE) {
            field.set(x, y, 0);
            queue.push_back((x, y, 0u32));
        }
    }

    while let Some((x, y, dist)) = queue.pop_front() {
        for (nx, ny) in neighbours(x, y, width, height) {
            if field.get(nx, ny) == Some(&UNREACHABLE) {
                field.set(nx, ny, dist + 1);
                queue.push_back((nx, ny, dist + 1));
            }
        }
    }

    field
}

/// Distance from every cell to the nearest cell whose tile is in `targets`.
///
/// Target cells themselves read 0. If no cell matches, every cell is
/// [`UNREACHABLE`].
pub fn distances_to(grid: &Grid, targets: &[TileTypeId]) -> CellMap<u32> {
    let seeds = grid
        .all_cells()
        .filter(|(_, _, tile)| targets.contains(tile))
        .map(|(x, y, _)| (x, y));
    distances_from(grid.width(), grid.height(), seeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellUpdate;
    use civic_core::TileCatalog;
    use proptest::prelude::*;
    use std::sync::Arc;

    const WATER: TileTypeId = TileTypeId(3);

    fn grid_with(w: u32, h: u32, cells: &[(u32, u32, TileTypeId)]) -> Grid {
        let mut g = Grid::new(w, h, TileTypeId(0), Arc::new(TileCatalog::standard())).unwrap();
        let updates: Vec<_> = cells.iter().map(|&c| CellUpdate::from(c)).collect();
        g.replace(&updates).unwrap();
        g
    }

    #[test]
    fn corner_neighbours_are_clipped() {
        assert_eq!(neighbours(0, 0, 3, 3).as_slice(), &[(1, 0), (0, 1)]);
        assert_eq!(neighbours(1, 1, 3, 3).len(), 4);
        assert_eq!(neighbours(2, 2, 3, 3).as_slice(), &[(2, 1), (1, 2)]);
    }

    #[test]
    fn no_targets_means_unreachable_everywhere() {
        let g = grid_with(5, 4, &[]);
        let field = distances_to(&g, &[WATER]);
        assert!(field.as_slice().iter().all(|&d| d == UNREACHABLE));
    }

    #[test]
    fn nearest_of_several_targets_wins() {
        let g = grid_with(7, 1, &[(0, 0, WATER), (6, 0, WATER)]);
        let field = distances_to(&g, &[WATER]);
        let row: Vec<u32> = field.as_slice().to_vec();
        assert_eq!(row, vec![0, 1, 2, 3, 2, 1, 0]);
    }

    #[test]
    fn other_tile_types_do_not_block() {
        let wall: Vec<_> = (0..5).map(|y| (2, y, TileTypeId(1))).collect();
        let mut cells = wall;
        cells.push((0, 0, WATER));
        let g = grid_with(5, 5, &cells);
        let field = distances_to(&g, &[WATER]);
        assert_eq!(field.get(4, 0), Some(&4));
    }

    #[test]
    fn out_of_bounds_seeds_ignored() {
        let field = distances_from(2, 2, [(5, 5), (1, 1)]);
        assert_eq!(field.get(0, 0), Some(&2));
    }

    proptest! {
        #[test]
        fn single_target_at_origin_gives_manhattan(w in 1u32..24, h in 1u32..24) {
            let g = grid_with(w, h, &[(0, 0, WATER)]);
            let field = distances_to(&g, &[WATER]);
            for (x, y, &d) in field.iter() {
                prop_assert_eq!(d, x + y);
            }
        }

        #[test]
        fn field_is_min_manhattan_over_seeds(
            w in 1u32..16,
            h in 1u32..16,
            raw in proptest::collection::vec((0u32..16, 0u32..16), 1..6),
        ) {
            let seeds: Vec<(u32, u32)> = raw.into_iter().map(|(x, y)| (x % w, y % h)).collect();
            let field = distances_from(w, h, seeds.iter().copied());
            for (x, y, &d) in field.iter() {
                let expected = seeds
                    .iter()
                    .map(|&(sx, sy)| sx.abs_diff(x) + sy.abs_diff(y))
                    .min()
                    .unwrap();
                prop_assert_eq!(d, expected);
            }
        }
    }
}
