//! Registry validation.
//!
//! [`validate_registry`] checks an ordered source list for structural
//! errors and builds the [`RegistryPlan`]: which source owns each
//! variable name and goal id. It runs whenever a source is registered,
//! never per pass.

use indexmap::IndexMap;

use crate::source::DataSource;

use std::error::Error;
use std::fmt;

// ── Plan ───────────────────────────────────────────────────────────

/// Ownership table for the merged namespace.
#[derive(Debug, Default)]
#[must_use]
pub struct RegistryPlan {
    variables: IndexMap<String, usize>,
    goals: IndexMap<String, usize>,
}

impl RegistryPlan {
    /// Index of the source publishing `variable`.
    pub fn owner_of(&self, variable: &str) -> Option<usize> {
        self.variables.get(variable).copied()
    }

    /// Index of the source reporting goal `id`.
    pub fn goal_owner(&self, id: &str) -> Option<usize> {
        self.goals.get(id).copied()
    }

    /// Every variable name, in registration order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.variables.keys().map(String::as_str)
    }

    /// Number of variables in the merged namespace.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// A name claimed by two sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// The contested variable name or goal id.
    pub name: String,
    /// Source that claimed it first (earlier in registration order).
    pub first_source: String,
    /// Source that claimed it again.
    pub second_source: String,
}

/// Errors from registry validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two sources share a name.
    DuplicateSource {
        /// The shared name.
        name: String,
    },
    /// Two or more sources publish the same variable.
    VariableCollision(Vec<Collision>),
    /// Two or more sources report the same goal id.
    GoalCollision(Vec<Collision>),
    /// A source reads a variable no earlier source publishes.
    UnresolvedRead {
        /// The reading source.
        source: String,
        /// The missing variable.
        variable: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSource { name } => {
                write!(f, "data source '{name}' registered twice")
            }
            Self::VariableCollision(collisions) => {
                write!(f, "variable collision: ")?;
                write_collisions(f, collisions)
            }
            Self::GoalCollision(collisions) => {
                write!(f, "goal id collision: ")?;
                write_collisions(f, collisions)
            }
            Self::UnresolvedRead { source, variable } => write!(
                f,
                "data source '{source}' reads '{variable}', which no earlier source publishes"
            ),
        }
    }
}

fn write_collisions(f: &mut fmt::Formatter<'_>, collisions: &[Collision]) -> fmt::Result {
    for (i, c) in collisions.iter().enumerate() {
        if i > 0 {
            write!(f, "; ")?;
        }
        write!(
            f,
            "'{}' claimed by '{}' and '{}'",
            c.name, c.first_source, c.second_source
        )?;
    }
    Ok(())
}

impl Error for RegistryError {}

// ── Validation ─────────────────────────────────────────────────────

/// Validate an ordered source list and build its [`RegistryPlan`].
///
/// Checks, in order:
/// 1. Source names are unique.
/// 2. No variable name is published by two sources.
/// 3. No goal id is reported by two sources (ids are read from `goals()`
///    on each source's current state).
/// 4. Every name in a source's `reads()` is published by a source
///    registered before it.
pub fn validate_registry(sources: &[Box<dyn DataSource>]) -> Result<RegistryPlan, RegistryError> {
    let mut names: Vec<&str> = Vec::with_capacity(sources.len());
    for source in sources {
        if names.contains(&source.name()) {
            return Err(RegistryError::DuplicateSource {
                name: source.name().to_string(),
            });
        }
        names.push(source.name());
    }

    let mut plan = RegistryPlan::default();
    let mut variable_collisions = Vec::new();
    let mut goal_collisions = Vec::new();

    for (i, source) in sources.iter().enumerate() {
        for read in source.reads() {
            if plan.owner_of(&read).is_none() {
                return Err(RegistryError::UnresolvedRead {
                    source: source.name().to_string(),
                    variable: read,
                });
            }
        }
        for name in source.variable_names() {
            match plan.variables.get(&name) {
                Some(&first) => variable_collisions.push(Collision {
                    name,
                    first_source: names[first].to_string(),
                    second_source: names[i].to_string(),
                }),
                None => {
                    plan.variables.insert(name, i);
                }
            }
        }
        for goal in source.goals() {
            match plan.goals.get(&goal.id) {
                Some(&first) => goal_collisions.push(Collision {
                    name: goal.id,
                    first_source: names[first].to_string(),
                    second_source: names[i].to_string(),
                }),
                None => {
                    plan.goals.insert(goal.id, i);
                }
            }
        }
    }

    if !variable_collisions.is_empty() {
        return Err(RegistryError::VariableCollision(variable_collisions));
    }
    if !goal_collisions.is_empty() {
        return Err(RegistryError::GoalCollision(goal_collisions));
    }
    Ok(plan)
}
