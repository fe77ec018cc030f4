//! Execution context handed to [`DataSource::calculate`](crate::DataSource::calculate).

use civic_core::{PassId, VariableReader};
use civic_grid::Grid;

/// Everything a data source may read while recomputing.
///
/// The grid reference is taken under the pass-wide read guard, so every
/// source in a pass sees the same grid. `published` holds the variables
/// earlier sources produced in this same pass.
pub struct CalculateContext<'a> {
    grid: &'a Grid,
    published: &'a dyn VariableReader,
    pass: PassId,
}

impl<'a> CalculateContext<'a> {
    /// Assemble a context for one source's turn in a pass.
    pub fn new(grid: &'a Grid, published: &'a dyn VariableReader, pass: PassId) -> Self {
        Self {
            grid,
            published,
            pass,
        }
    }

    /// The grid being measured.
    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Variables published by earlier sources in this pass.
    pub fn published(&self) -> &'a dyn VariableReader {
        self.published
    }

    /// The pass this calculation belongs to.
    pub fn pass(&self) -> PassId {
        self.pass
    }
}
