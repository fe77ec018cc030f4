//! Realtime engine: the [`DataManager`] on its own thread.
//!
//! # Architecture
//!
//! ```text
//! Callers                       Engine thread
//!     |                              |
//!     |--SharedGrid::replace()------>| grid_rx: throttled_calculate_all()
//!     |--calculate_all()------------>| cmd_rx:  forced pass
//!     |--calculate_from(name)------->| cmd_rx:  partial pass
//!     |                              | timer:   run_pending()
//!     |                              |    snapshots.store()
//!     |<--EngineEvent::Updated-------|    events.publish()
//!     |                              |
//!     |--get()/goals()/snapshot()--> SnapshotHandle (no thread hop)
//! ```
//!
//! Passes never overlap: there is one engine thread and it runs passes
//! one at a time. A grid write arriving mid-pass blocks on the grid lock,
//! then its change event lands in `grid_rx` and triggers the throttle.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use civic_core::{Broadcast, Goal, LookupError, PassError, Subscription, Value};
use civic_grid::GridChanged;
use crossbeam_channel::{select, Receiver, Sender};

use crate::manager::DataManager;
use crate::snapshot::{EngineEvent, Snapshot, SnapshotHandle};

// ── Error types ────────────────────────────────────────────────────

/// Error starting the engine thread.
#[derive(Debug)]
pub enum StartError {
    /// The initial pass failed.
    InitialPass(PassError),
    /// The OS refused to spawn the thread.
    Spawn(std::io::Error),
}

impl std::fmt::Display for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InitialPass(e) => write!(f, "initial pass failed: {e}"),
            Self::Spawn(e) => write!(f, "failed to spawn engine thread: {e}"),
        }
    }
}

impl std::error::Error for StartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InitialPass(e) => Some(e),
            Self::Spawn(e) => Some(e),
        }
    }
}

/// Error submitting a command to the engine thread.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The engine thread has shut down.
    Shutdown,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shutdown => write!(f, "engine thread has shut down"),
        }
    }
}

impl std::error::Error for SubmitError {}

// ── Command ────────────────────────────────────────────────────────

/// Work for the engine thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run every source now, cancelling any pending throttled pass.
    CalculateAll,
    /// Re-run the named source and every later one.
    CalculateFrom(String),
    /// Stop the thread.
    Shutdown,
}

// ── RealtimeEngine ─────────────────────────────────────────────────

/// Owns a [`DataManager`] on a dedicated thread.
///
/// Grid changes trigger throttled passes; explicit commands force them.
/// Queries read the latest published snapshot directly. Dropping the
/// engine stops the thread.
pub struct RealtimeEngine {
    snapshots: SnapshotHandle,
    manager_events: Broadcast<EngineEvent>,
    cmd_tx: Option<Sender<Command>>,
    thread: Option<JoinHandle<DataManager>>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("pass", &self.snapshots.latest().pass)
            .field("running", &self.thread.is_some())
            .finish()
    }
}

impl RealtimeEngine {
    /// Run the initial pass, then move `manager` onto the engine thread.
    ///
    /// The grid subscription is taken before the initial pass, so a
    /// change landing at any point after that schedules a pass.
    pub fn start(mut manager: DataManager) -> Result<Self, StartError> {
        let grid_events = manager.grid().subscribe();
        if let Err(e) = manager.calculate_all() {
            manager.grid().unsubscribe(grid_events.id());
            return Err(StartError::InitialPass(e));
        }

        let snapshots = manager.snapshots();
        let manager_events = manager.events().clone();
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();

        let thread = thread::Builder::new()
            .name("civic-engine".into())
            .spawn(move || run(manager, grid_events, cmd_rx))
            .map_err(StartError::Spawn)?;

        tracing::info!(target: "civic::engine", "engine thread started");
        Ok(Self {
            snapshots,
            manager_events,
            cmd_tx: Some(cmd_tx),
            thread: Some(thread),
        })
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.latest()
    }

    /// Handle on the published snapshot.
    pub fn snapshots(&self) -> SnapshotHandle {
        self.snapshots.clone()
    }

    /// A variable from the latest snapshot.
    pub fn get(&self, name: &str) -> Result<Value, LookupError> {
        self.snapshots.get(name)
    }

    /// Goals from the latest snapshot.
    pub fn goals(&self) -> Vec<Goal> {
        self.snapshots.goals()
    }

    /// Register for [`EngineEvent`]s.
    pub fn subscribe(&self) -> Subscription<EngineEvent> {
        self.manager_events.subscribe()
    }

    /// Queue a forced full pass.
    pub fn calculate_all(&self) -> Result<(), SubmitError> {
        self.submit(Command::CalculateAll)
    }

    /// Queue a partial pass starting at source `name`.
    pub fn calculate_from(&self, name: impl Into<String>) -> Result<(), SubmitError> {
        self.submit(Command::CalculateFrom(name.into()))
    }

    fn submit(&self, command: Command) -> Result<(), SubmitError> {
        let tx = self.cmd_tx.as_ref().ok_or(SubmitError::Shutdown)?;
        tx.send(command).map_err(|_| SubmitError::Shutdown)
    }

    /// Stop the engine thread and recover the manager.
    ///
    /// Returns `None` if already shut down or the thread panicked.
    pub fn shutdown(&mut self) -> Option<DataManager> {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Shutdown);
        }
        let manager = self.thread.take()?.join().ok();
        tracing::info!(target: "civic::engine", "engine thread stopped");
        manager
    }
}

impl Drop for RealtimeEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    mut manager: DataManager,
    grid_events: Subscription<GridChanged>,
    commands: Receiver<Command>,
) -> DataManager {
    let subscription = grid_events.id();
    let grid_rx = grid_events.into_receiver();
    loop {
        let timer = match manager.deadline() {
            Some(due) => crossbeam_channel::at(due),
            None => crossbeam_channel::never(),
        };
        select! {
            recv(grid_rx) -> msg => match msg {
                Ok(changed) => {
                    let due = manager.throttled_calculate_all();
                    tracing::trace!(
                        target: "civic::engine",
                        generation = changed.generation,
                        cells = changed.cells,
                        in_ms = due.saturating_duration_since(std::time::Instant::now()).as_millis() as u64,
                        "grid changed; pass scheduled"
                    );
                }
                Err(_) => break,
            },
            recv(commands) -> msg => match msg {
                Ok(Command::CalculateAll) => report(manager.calculate_all()),
                Ok(Command::CalculateFrom(name)) => report(manager.calculate_from(&name)),
                Ok(Command::Shutdown) | Err(_) => break,
            },
            recv(timer) -> _ => {
                if let Some(result) = manager.run_pending() {
                    report(result);
                }
            },
        }
    }
    manager.grid().unsubscribe(subscription);
    manager
}

fn report(result: Result<Arc<Snapshot>, PassError>) {
    if let Err(e) = result {
        tracing::warn!(target: "civic::engine", error = %e, "pass failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManagerConfig;
    use civic_core::{CalculateError, PassId, TileTypeId};
    use civic_grid::{CellUpdate, SharedGrid};
    use civic_source::{CalculateContext, DataSource};
    use civic_test_utils::{shared_grid_from_rows, CountingSource, FailingSource};
    use std::time::Duration;

    /// Edits the grid from another thread during its first calculation.
    ///
    /// The edit blocks on the grid lock until the pass releases it.
    struct EditsDuringPass {
        grid: Option<SharedGrid>,
        generation: u64,
    }

    impl DataSource for EditsDuringPass {
        fn name(&self) -> &str {
            "editor"
        }

        fn variable_names(&self) -> Vec<String> {
            vec!["editor-generation".into()]
        }

        fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
            self.generation = ctx.grid().generation();
            if let Some(grid) = self.grid.take() {
                thread::spawn(move || {
                    grid.replace(&[CellUpdate::new(0, 0, TileTypeId(1))]).unwrap();
                });
            }
            Ok(())
        }

        fn variable(&self, name: &str) -> Option<Value> {
            (name == "editor-generation").then(|| Value::Number(self.generation as f64))
        }

        fn goals(&self) -> Vec<Goal> {
            Vec::new()
        }
    }

    fn engine(throttle: Duration) -> (RealtimeEngine, civic_grid::SharedGrid) {
        let grid = shared_grid_from_rows(&["..", ".."]);
        let mut m = DataManager::new(grid.clone(), ManagerConfig { throttle });
        m.register_source(Box::new(CountingSource::new("c"))).unwrap();
        (RealtimeEngine::start(m).unwrap(), grid)
    }

    #[test]
    fn initial_pass_runs_before_start_returns() {
        let (e, _) = engine(Duration::from_millis(50));
        assert_eq!(e.snapshot().pass, PassId(1));
        assert_eq!(e.get("c-calls"), Ok(Value::Number(1.0)));
    }

    #[test]
    fn failing_initial_pass_is_reported() {
        let grid = shared_grid_from_rows(&[".."]);
        let mut m = DataManager::new(grid, ManagerConfig::default());
        m.register_source(Box::new(FailingSource::new("f", 0))).unwrap();
        assert!(matches!(
            RealtimeEngine::start(m),
            Err(StartError::InitialPass(PassError::SourceFailed { .. }))
        ));
    }

    #[test]
    fn grid_change_during_initial_pass_schedules_another() {
        let grid = shared_grid_from_rows(&["..", ".."]);
        let mut m = DataManager::new(
            grid.clone(),
            ManagerConfig {
                throttle: Duration::from_millis(20),
            },
        );
        m.register_source(Box::new(EditsDuringPass {
            grid: Some(grid),
            generation: 0,
        }))
        .unwrap();
        let sub = m.subscribe();
        let e = RealtimeEngine::start(m).unwrap();

        let EngineEvent::Updated(initial) = sub.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(initial.pass, PassId(1));
        assert_eq!(initial.variables["editor-generation"], Value::Number(0.0));
        let EngineEvent::Updated(next) = sub.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(next.pass, PassId(2));
        assert_eq!(next.variables["editor-generation"], Value::Number(1.0));
        drop(e);
    }

    #[test]
    fn forced_pass_publishes_update() {
        let (e, _) = engine(Duration::from_secs(60));
        let sub = e.subscribe();
        e.calculate_all().unwrap();
        let EngineEvent::Updated(snap) = sub.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(snap.pass, PassId(2));
    }

    #[test]
    fn shutdown_returns_manager_and_rejects_commands() {
        let (mut e, _) = engine(Duration::from_millis(50));
        let m = e.shutdown().unwrap();
        assert_eq!(m.snapshot().pass, PassId(1));
        assert_eq!(e.calculate_all(), Err(SubmitError::Shutdown));
        assert!(e.shutdown().is_none());
    }
}
