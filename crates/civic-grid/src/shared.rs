//! The grid as shared by the composition root, the engine, and viewers.

use crate::error::GridError;
use crate::grid::{CellUpdate, Grid};
use civic_core::{Broadcast, Subscription, SubscriptionId};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Emitted after every successful [`SharedGrid::replace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridChanged {
    /// Grid generation after the change.
    pub generation: u64,
    /// Number of cell updates applied.
    pub cells: usize,
}

/// A [`Grid`] behind a reader-writer lock, with "changed" observers.
///
/// Clones share the same grid and observer list. Readers holding
/// [`SharedGrid::read`] never observe a partially applied batch.
#[derive(Clone, Debug)]
pub struct SharedGrid {
    grid: Arc<RwLock<Grid>>,
    changed: Broadcast<GridChanged>,
}

impl SharedGrid {
    /// Wrap a grid.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid: Arc::new(RwLock::new(grid)),
            changed: Broadcast::new(),
        }
    }

    /// Shared read access. Writers block until the guard drops.
    pub fn read(&self) -> RwLockReadGuard<'_, Grid> {
        self.grid.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a batch of updates, then notify observers.
    ///
    /// Observers are notified before this returns, after the write lock
    /// is released, so anything they read reflects the final state. A
    /// rejected batch mutates nothing and notifies no one.
    pub fn replace(&self, updates: &[CellUpdate]) -> Result<GridChanged, GridError> {
        let event = {
            let mut grid = self.grid.write().unwrap_or_else(PoisonError::into_inner);
            let cells = grid.replace(updates)?;
            GridChanged {
                generation: grid.generation(),
                cells,
            }
        };
        self.changed.publish(event);
        Ok(event)
    }

    /// Register for change notifications.
    pub fn subscribe(&self) -> Subscription<GridChanged> {
        self.changed.subscribe()
    }

    /// Stop change notifications for `id`.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.changed.unsubscribe(id)
    }
}
