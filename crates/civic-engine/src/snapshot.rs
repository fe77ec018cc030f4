//! Published pass results.

use civic_core::{Goal, LookupError, PassId, Value};
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Every variable and goal from one pass, immutable once published.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// The pass that produced this snapshot. `PassId(0)` is the state
    /// before any pass has run.
    pub pass: PassId,
    /// The merged namespace, in registration order.
    pub variables: IndexMap<String, Value>,
    /// Every source's goals, in registration order.
    pub goals: Vec<Goal>,
}

impl Snapshot {
    /// Look up one variable.
    pub fn get(&self, name: &str) -> Result<&Value, LookupError> {
        self.variables
            .get(name)
            .ok_or_else(|| LookupError::UnknownVariable {
                name: name.to_string(),
            })
    }
}

/// Emitted by the engine after each successful pass.
#[derive(Clone, Debug)]
pub enum EngineEvent {
    /// A new snapshot was published.
    Updated(Arc<Snapshot>),
}

/// Shared slot holding the latest [`Snapshot`].
///
/// Publishing swaps the whole `Arc`, so readers see either the old or the
/// new snapshot, never a mix.
#[derive(Clone, Debug, Default)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotHandle {
    /// The latest snapshot.
    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn store(&self, snapshot: Arc<Snapshot>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// A variable from the latest snapshot.
    pub fn get(&self, name: &str) -> Result<Value, LookupError> {
        self.latest().get(name).cloned()
    }

    /// Goals from the latest snapshot.
    pub fn goals(&self) -> Vec<Goal> {
        self.latest().goals.clone()
    }
}
