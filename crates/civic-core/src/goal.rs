//! Citizen-facing goals.

use serde::{Deserialize, Serialize};

/// A named pass/fail check derived from the current metrics.
///
/// Goals are immutable snapshots: every data source rebuilds its list from
/// scratch on each recomputation pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique id across all registered sources.
    pub id: String,
    /// Grouping tag, e.g. `"distance"`.
    pub category: String,
    /// Lower numbers are more important.
    pub priority: u32,
    /// Whether the goal is currently met.
    pub condition: bool,
    /// Fraction of the way to meeting the goal, in `[0, 1]`.
    pub progress: f64,
}

impl Goal {
    /// Build a goal, clamping `progress` into `[0, 1]`.
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        priority: u32,
        condition: bool,
        progress: f64,
    ) -> Self {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        Self {
            id: id.into(),
            category: category.into(),
            priority,
            condition,
            progress,
        }
    }
}

/// Progress of `value` towards `target`, clamped to `[0, 1]`.
///
/// A zero target reads as "keep this at zero": progress is complete while
/// `value` stays at or below zero and decays as `1 / (1 + value)` above.
pub fn goal_progress(value: f64, target: f64) -> f64 {
    if target == 0.0 {
        if value <= 0.0 {
            1.0
        } else {
            1.0 / (1.0 + value)
        }
    } else {
        (value / target).clamp(0.0, 1.0)
    }
}
