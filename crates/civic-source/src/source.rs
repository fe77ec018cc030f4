//! The [`DataSource`] trait.

use crate::context::CalculateContext;
use civic_core::{CalculateError, Goal, Value};
use indexmap::IndexMap;

/// A metric producer registered with the aggregation engine.
///
/// Sources are stateful only in that they hold the snapshot their last
/// `calculate()` produced. `calculate()` must be a pure function of the
/// grid, the source's own configuration, and anything it reads from the
/// context: calling it twice with unchanged inputs yields identical
/// variables and goals.
///
/// Variable names and goal ids are fixed at construction. The registry
/// checks them against every other source once, when the source is
/// registered.
///
/// # Example
///
/// ```
/// use civic_core::{CalculateError, Goal, Value};
/// use civic_source::{CalculateContext, DataSource};
///
/// struct CellCount {
///     cells: usize,
/// }
///
/// impl DataSource for CellCount {
///     fn name(&self) -> &str { "cell-count" }
///
///     fn variable_names(&self) -> Vec<String> {
///         vec!["cell-count".to_string()]
///     }
///
///     fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
///         self.cells = ctx.grid().cell_count();
///         Ok(())
///     }
///
///     fn variable(&self, name: &str) -> Option<Value> {
///         (name == "cell-count").then(|| Value::from(self.cells))
///     }
///
///     fn goals(&self) -> Vec<Goal> { Vec::new() }
/// }
///
/// let source = CellCount { cells: 0 };
/// assert_eq!(source.variables()["cell-count"], Value::Number(0.0));
/// ```
pub trait DataSource: Send + 'static {
    /// Name used in logs, errors, and partial recomputation requests.
    fn name(&self) -> &str;

    /// Every variable this source publishes.
    ///
    /// Called at registration, not per pass.
    fn variable_names(&self) -> Vec<String>;

    /// Variables this source reads from sources registered before it.
    ///
    /// Default: none.
    fn reads(&self) -> Vec<String> {
        Vec::new()
    }

    /// Recompute internal state.
    fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError>;

    /// The latest value of one published variable.
    ///
    /// Never triggers recomputation. Returns `None` for names this
    /// source does not publish.
    fn variable(&self, name: &str) -> Option<Value>;

    /// The source's goals as of the latest `calculate()`.
    fn goals(&self) -> Vec<Goal>;

    /// Every published variable, in declaration order.
    fn variables(&self) -> IndexMap<String, Value> {
        self.variable_names()
            .into_iter()
            .filter_map(|name| self.variable(&name).map(|v| (name, v)))
            .collect()
    }
}
