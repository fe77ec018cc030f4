//! Error types shared across the civic workspace.
//!
//! Organized by subsystem: tile catalog, per-source calculation, the
//! recomputation pass as a whole, and variable lookup.

use crate::id::TileTypeId;
use std::error::Error;
use std::fmt;

/// Errors from building or querying the [`TileCatalog`](crate::TileCatalog).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// A machine name was looked up that no catalog entry carries.
    UnknownKind {
        /// The name that failed to resolve.
        kind: String,
    },
    /// Two entries share a machine name.
    DuplicateKind {
        /// The shared name.
        kind: String,
        /// Id of the first entry.
        first: TileTypeId,
        /// Id of the conflicting entry.
        second: TileTypeId,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind { kind } => write!(f, "unknown tile type '{kind}'"),
            Self::DuplicateKind {
                kind,
                first,
                second,
            } => write!(
                f,
                "tile type '{kind}' declared by both id {first} and id {second}"
            ),
        }
    }
}

impl Error for CatalogError {}

/// Errors from a single data source's `calculate()`.
///
/// Wrapped in [`PassError::SourceFailed`] by the aggregation engine.
#[derive(Clone, Debug, PartialEq)]
pub enum CalculateError {
    /// A variable the source reads was not published earlier in the pass.
    MissingInput {
        /// The variable name.
        variable: String,
    },
    /// A variable the source reads has the wrong shape.
    InvalidInput {
        /// The variable name.
        variable: String,
        /// What was expected instead.
        expected: &'static str,
    },
    /// The source's computation failed.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for CalculateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput { variable } => {
                write!(f, "input variable '{variable}' not published")
            }
            Self::InvalidInput { variable, expected } => {
                write!(f, "input variable '{variable}' is not {expected}")
            }
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
        }
    }
}

impl Error for CalculateError {}

/// Errors from a recomputation pass.
///
/// A failed pass leaves the previously published snapshot in place.
#[derive(Clone, Debug, PartialEq)]
pub enum PassError {
    /// A data source returned an error.
    SourceFailed {
        /// Name of the failing source.
        name: String,
        /// The underlying error.
        reason: CalculateError,
    },
    /// Two sources produced goals with the same id.
    GoalCollision {
        /// The duplicated goal id.
        id: String,
    },
    /// A partial pass named a source that is not registered.
    UnknownSource {
        /// The requested source name.
        name: String,
    },
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceFailed { name, reason } => {
                write!(f, "data source '{name}' failed: {reason}")
            }
            Self::GoalCollision { id } => write!(f, "goal id '{id}' produced twice"),
            Self::UnknownSource { name } => write!(f, "no data source named '{name}'"),
        }
    }
}

impl Error for PassError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SourceFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Errors from reading the merged variable namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupError {
    /// No registered source publishes this name.
    ///
    /// This is a configuration error: the name is fixed at registration
    /// time, so asking for an unknown one means the caller is miswired.
    UnknownVariable {
        /// The requested name.
        name: String,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariable { name } => write!(f, "unknown variable '{name}'"),
        }
    }
}

impl Error for LookupError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_error_exposes_source() {
        let err = PassError::SourceFailed {
            name: "slipstream".into(),
            reason: CalculateError::MissingInput {
                variable: "wind-speed".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "data source 'slipstream' failed: input variable 'wind-speed' not published"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn pass_errors_without_cause_name_their_subject() {
        let cases = [
            (PassError::GoalCollision { id: "g".into() }, "goal id 'g' produced twice"),
            (
                PassError::UnknownSource { name: "wind".into() },
                "no data source named 'wind'",
            ),
        ];
        for (err, text) in cases {
            assert_eq!(err.to_string(), text);
            assert!(err.source().is_none());
        }
    }
}
