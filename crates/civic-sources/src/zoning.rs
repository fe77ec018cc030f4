//! Tile counts per type.

use crate::names::{zone_count, ZONES_TOTAL};
use civic_core::{CalculateError, Goal, TileCatalog, TileTypeId, Value};
use civic_source::{CalculateContext, DataSource};
use indexmap::IndexMap;

/// Counts cells of every catalog type.
///
/// Publishes `zones-<type>-count` for each catalog entry and
/// `zones-total`, the grid's cell count. Reports no goals.
#[derive(Debug)]
pub struct ZoningData {
    counts: IndexMap<TileTypeId, (String, usize)>,
    total: usize,
}

impl ZoningData {
    /// A counter over every type in `catalog`.
    pub fn new(catalog: &TileCatalog) -> Self {
        let counts = catalog
            .iter()
            .map(|(id, tile)| (id, (zone_count(&tile.kind), 0)))
            .collect();
        Self { counts, total: 0 }
    }
}

impl DataSource for ZoningData {
    fn name(&self) -> &str {
        "zoning"
    }

    fn variable_names(&self) -> Vec<String> {
        self.counts
            .values()
            .map(|(name, _)| name.clone())
            .chain(std::iter::once(ZONES_TOTAL.to_string()))
            .collect()
    }

    fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        for (_, count) in self.counts.values_mut() {
            *count = 0;
        }
        let grid = ctx.grid();
        for (_, _, tile) in grid.all_cells() {
            if let Some((_, count)) = self.counts.get_mut(&tile) {
                *count += 1;
            }
        }
        self.total = grid.cell_count();
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        if name == ZONES_TOTAL {
            return Some(Value::from(self.total));
        }
        self.counts
            .values()
            .find(|(n, _)| n == name)
            .map(|&(_, count)| Value::from(count))
    }

    fn goals(&self) -> Vec<Goal> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::calculate;
    use civic_test_utils::grid_from_rows;

    #[test]
    fn counts_every_type() {
        let grid = grid_from_rows(&["RRW.", "P#N.", "tT.."]);
        let mut zoning = ZoningData::new(grid.catalog());
        calculate(&mut zoning, &grid, &IndexMap::new()).unwrap();
        let vars = zoning.variables();
        assert_eq!(vars["zones-residential-count"], Value::Number(2.0));
        assert_eq!(vars["zones-empty-count"], Value::Number(4.0));
        assert_eq!(vars["zones-nuclearPowerPlant-count"], Value::Number(1.0));
        assert_eq!(vars["zones-windTurbineBig-count"], Value::Number(1.0));
        assert_eq!(vars[ZONES_TOTAL], Value::Number(12.0));
        assert_eq!(vars.len(), 9);
    }

    #[test]
    fn recount_does_not_accumulate() {
        let grid = grid_from_rows(&["RR", "RR"]);
        let mut zoning = ZoningData::new(grid.catalog());
        calculate(&mut zoning, &grid, &IndexMap::new()).unwrap();
        calculate(&mut zoning, &grid, &IndexMap::new()).unwrap();
        assert_eq!(
            zoning.variable("zones-residential-count"),
            Some(Value::Number(4.0))
        );
    }
}
