//! The aggregation engine: ordered registry, passes, merged namespace.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use civic_core::{Broadcast, Goal, LookupError, PassError, PassId, Subscription, Value};
use civic_grid::SharedGrid;
use civic_source::{validate_registry, CalculateContext, DataSource, RegistryError, RegistryPlan};
use indexmap::IndexMap;

use crate::config::ManagerConfig;
use crate::snapshot::{EngineEvent, Snapshot, SnapshotHandle};
use crate::throttle::Throttle;

/// Runs registered data sources in order and publishes their output.
///
/// A pass takes one read guard on the grid for its whole duration, so
/// every source measures the same grid. Each source's variables are
/// staged as soon as it finishes, so later sources can read them. After
/// the last source the merged variables and goals are published as one
/// [`Snapshot`] and [`EngineEvent::Updated`] is emitted.
///
/// A failing pass publishes nothing; the previous snapshot stays current.
/// The sources that ran before the failure keep their new state, so the
/// next pass resumes no later than the failed source.
pub struct DataManager {
    grid: SharedGrid,
    sources: Vec<Box<dyn DataSource>>,
    plan: RegistryPlan,
    throttle: Throttle,
    snapshots: SnapshotHandle,
    events: Broadcast<EngineEvent>,
    last_pass: PassId,
    /// Index of the source that failed the last pass, if it has not
    /// been re-run successfully since.
    resume_from: Option<usize>,
}

impl std::fmt::Debug for DataManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("DataManager")
            .field("sources", &names)
            .field("last_pass", &self.last_pass)
            .field("throttle", &self.throttle)
            .field("resume_from", &self.resume_from)
            .finish()
    }
}

impl DataManager {
    /// An engine with no sources over `grid`.
    pub fn new(grid: SharedGrid, config: ManagerConfig) -> Self {
        Self {
            grid,
            sources: Vec::new(),
            plan: RegistryPlan::default(),
            throttle: Throttle::new(config.throttle),
            snapshots: SnapshotHandle::default(),
            events: Broadcast::new(),
            last_pass: PassId(0),
            resume_from: None,
        }
    }

    /// Append a source to the registry.
    ///
    /// Rejects the source, leaving the registry unchanged, if one of its
    /// variables or goal ids is already claimed or it reads a variable no
    /// earlier source publishes. On success the published snapshot gains
    /// the new source's variables at their pre-pass values.
    pub fn register_source(&mut self, source: Box<dyn DataSource>) -> Result<(), RegistryError> {
        self.sources.push(source);
        match validate_registry(&self.sources) {
            Ok(plan) => {
                self.plan = plan;
                self.refresh_snapshot();
                Ok(())
            }
            Err(e) => {
                self.sources.pop();
                Err(e)
            }
        }
    }

    /// Source names in registration order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// The grid this engine measures.
    pub fn grid(&self) -> &SharedGrid {
        &self.grid
    }

    /// Handle on the published snapshot, for readers on other threads.
    pub fn snapshots(&self) -> SnapshotHandle {
        self.snapshots.clone()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.latest()
    }

    /// Register for [`EngineEvent`]s.
    pub fn subscribe(&self) -> Subscription<EngineEvent> {
        self.events.subscribe()
    }

    /// The observer list, shared with clones.
    pub fn events(&self) -> &Broadcast<EngineEvent> {
        &self.events
    }

    /// A variable from the latest snapshot.
    ///
    /// Names are fixed at registration, so an unknown name is a wiring
    /// error rather than a missing value.
    pub fn get(&self, name: &str) -> Result<Value, LookupError> {
        if self.plan.owner_of(name).is_none() {
            return Err(LookupError::UnknownVariable {
                name: name.to_string(),
            });
        }
        self.snapshots.get(name)
    }

    /// Every goal from the latest snapshot, in registration order.
    pub fn goals(&self) -> Vec<Goal> {
        self.snapshots.goals()
    }

    /// Run every source now.
    ///
    /// Cancels any pending throttled run.
    pub fn calculate_all(&mut self) -> Result<Arc<Snapshot>, PassError> {
        self.throttle.cancel();
        self.throttle.record_run(Instant::now());
        self.run_from(0)
    }

    /// Re-run `name` and every source registered after it.
    ///
    /// Earlier sources keep their last output. Used when an input only
    /// `name` observes changes, such as the wind. If the last pass failed
    /// at an earlier source, the pass starts there instead.
    pub fn calculate_from(&mut self, name: &str) -> Result<Arc<Snapshot>, PassError> {
        let start = self
            .sources
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| PassError::UnknownSource {
                name: name.to_string(),
            })?;
        self.run_from(start)
    }

    /// Schedule a deferred full pass. Returns when it is due.
    pub fn throttled_calculate_all(&mut self) -> Instant {
        self.throttle.trigger(Instant::now())
    }

    /// When the pending throttled pass is due.
    pub fn deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    /// Run the pending throttled pass if it is due.
    pub fn run_pending(&mut self) -> Option<Result<Arc<Snapshot>, PassError>> {
        let now = Instant::now();
        if !self.throttle.poll(now) {
            return None;
        }
        self.throttle.record_run(now);
        Some(self.run_from(0))
    }

    /// Run sources `start..` and publish the merged result.
    ///
    /// Sources are mutated in place. When source `i` fails, sources
    /// `start..i` have already taken their new state and sources `i..`
    /// still hold the previous one; nothing is published and `i` is
    /// remembered so the next pass re-runs it and everything after it.
    fn run_from(&mut self, start: usize) -> Result<Arc<Snapshot>, PassError> {
        let start = self.resume_from.map_or(start, |failed| failed.min(start));
        let started = Instant::now();
        let pass = self.last_pass.next();
        let grid = self.grid.read();

        let mut staged: IndexMap<String, Value> =
            IndexMap::with_capacity(self.plan.variable_count());
        for (i, source) in self.sources.iter_mut().enumerate() {
            if i >= start {
                let ctx = CalculateContext::new(&grid, &staged, pass);
                if let Err(reason) = source.calculate(&ctx) {
                    tracing::warn!(
                        target: "civic::engine",
                        pass = %pass,
                        source = source.name(),
                        error = %reason,
                        "pass aborted"
                    );
                    self.resume_from = Some(i);
                    return Err(PassError::SourceFailed {
                        name: source.name().to_string(),
                        reason,
                    });
                }
            }
            stage(&**source, &mut staged);
        }
        let generation = grid.generation();
        drop(grid);

        let goals = merge_goals(&self.sources)?;
        let snapshot = Arc::new(Snapshot {
            pass,
            variables: staged,
            goals,
        });
        self.snapshots.store(Arc::clone(&snapshot));
        self.last_pass = pass;
        self.resume_from = None;

        tracing::debug!(
            target: "civic::engine",
            pass = %pass,
            from = self.sources.get(start).map_or("", |s| s.name()),
            generation,
            elapsed_us = started.elapsed().as_micros() as u64,
            "pass complete"
        );
        self.events.publish(EngineEvent::Updated(Arc::clone(&snapshot)));
        Ok(snapshot)
    }

    /// Republish current source state without recomputing.
    fn refresh_snapshot(&mut self) {
        let mut variables = IndexMap::with_capacity(self.plan.variable_count());
        for source in &self.sources {
            stage(&**source, &mut variables);
        }
        let goals = self
            .sources
            .iter()
            .flat_map(|s| s.goals())
            .collect();
        self.snapshots.store(Arc::new(Snapshot {
            pass: self.last_pass,
            variables,
            goals,
        }));
    }
}

fn stage(source: &dyn DataSource, into: &mut IndexMap<String, Value>) {
    for name in source.variable_names() {
        if let Some(value) = source.variable(&name) {
            into.insert(name, value);
        }
    }
}

/// Concatenate goals in registration order, rejecting duplicate ids.
fn merge_goals(sources: &[Box<dyn DataSource>]) -> Result<Vec<Goal>, PassError> {
    let mut seen = HashSet::new();
    let mut goals = Vec::new();
    for source in sources {
        for goal in source.goals() {
            if !seen.insert(goal.id.clone()) {
                return Err(PassError::GoalCollision { id: goal.id });
            }
            goals.push(goal);
        }
    }
    Ok(goals)
}
