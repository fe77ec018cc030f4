//! Reusable data source test fixtures.
//!
//! - [`ConstSource`]: publishes fixed numbers, optionally with goals.
//! - [`EchoSource`]: copies a variable published by an earlier source.
//! - [`CountingSource`]: counts calculations through a shared counter.
//! - [`FailingSource`]: fails deterministically after N calls.

use civic_core::{CalculateError, Goal, Value};
use civic_source::{CalculateContext, DataSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Publishes a fixed set of numbers.
pub struct ConstSource {
    pub name: String,
    pub values: Vec<(String, f64)>,
    pub goals: Vec<Goal>,
}

impl ConstSource {
    pub fn new<'a>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            goals: Vec::new(),
        }
    }

    /// Add a goal with the given id and condition.
    pub fn with_goal(mut self, id: &str, condition: bool) -> Self {
        let progress = if condition { 1.0 } else { 0.0 };
        self.goals
            .push(Goal::new(id, "test", 1, condition, progress));
        self
    }
}

impl DataSource for ConstSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn variable_names(&self) -> Vec<String> {
        self.values.iter().map(|(k, _)| k.clone()).collect()
    }

    fn calculate(&mut self, _ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|&(_, v)| Value::Number(v))
    }

    fn goals(&self) -> Vec<Goal> {
        self.goals.clone()
    }
}

/// Copies `input` (published earlier in the pass) to `output`.
///
/// Useful for testing in-pass ordering: the copy only matches when the
/// engine stages earlier sources' variables before calling this one.
pub struct EchoSource {
    pub name: String,
    pub input: String,
    pub output: String,
    last: Option<Value>,
}

impl EchoSource {
    pub fn new(name: impl Into<String>, input: &str, output: &str) -> Self {
        Self {
            name: name.into(),
            input: input.to_string(),
            output: output.to_string(),
            last: None,
        }
    }
}

impl DataSource for EchoSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn variable_names(&self) -> Vec<String> {
        vec![self.output.clone()]
    }

    fn reads(&self) -> Vec<String> {
        vec![self.input.clone()]
    }

    fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        self.last = Some(ctx.published().require(&self.input)?.clone());
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        if name != self.output {
            return None;
        }
        Some(self.last.clone().unwrap_or(Value::Number(0.0)))
    }

    fn goals(&self) -> Vec<Goal> {
        Vec::new()
    }
}

/// Counts `calculate()` calls and records the grid generation it saw.
///
/// The counter is shared, so a test keeps a [`CountingSource::counter`]
/// handle after moving the source into an engine. Publishes
/// `<name>-calls` and `<name>-generation`.
pub struct CountingSource {
    pub name: String,
    calls: Arc<AtomicUsize>,
    generation: u64,
}

impl CountingSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Arc::new(AtomicUsize::new(0)),
            generation: 0,
        }
    }

    /// Shared handle to the call counter.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl DataSource for CountingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn variable_names(&self) -> Vec<String> {
        vec![
            format!("{}-calls", self.name),
            format!("{}-generation", self.name),
        ]
    }

    fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.generation = ctx.grid().generation();
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        if name == format!("{}-calls", self.name) {
            Some(Value::from(self.calls.load(Ordering::SeqCst)))
        } else if name == format!("{}-generation", self.name) {
            Some(Value::Number(self.generation as f64))
        } else {
            None
        }
    }

    fn goals(&self) -> Vec<Goal> {
        Vec::new()
    }
}

/// Succeeds `succeed_count` times, then fails every call.
///
/// Uses `AtomicUsize` for the call counter so it satisfies `Send`.
pub struct FailingSource {
    pub name: String,
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingSource {
    /// Create a source that succeeds `succeed_count` times then fails.
    pub fn new(name: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `calculate()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl DataSource for FailingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn variable_names(&self) -> Vec<String> {
        vec![format!("{}-ok", self.name)]
    }

    fn calculate(&mut self, _ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(CalculateError::ExecutionFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        (name == format!("{}-ok", self.name))
            .then(|| Value::from(self.call_count.load(Ordering::Relaxed)))
    }

    fn goals(&self) -> Vec<Goal> {
        Vec::new()
    }
}
