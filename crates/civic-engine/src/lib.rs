//! Aggregation engine for the civic metrics engine.
//!
//! [`DataManager`] owns the ordered source registry and runs passes:
//! every source in order against one grid snapshot, then one merged
//! [`Snapshot`] of variables and goals. [`Throttle`] coalesces bursts of
//! grid edits into trailing-edge passes. [`RealtimeEngine`] puts the
//! manager on its own thread, driven by grid change events and commands.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod manager;
pub mod runtime;
pub mod snapshot;
pub mod throttle;

pub use config::{ConfigError, ManagerConfig};
pub use manager::DataManager;
pub use runtime::{Command, RealtimeEngine, StartError, SubmitError};
pub use snapshot::{EngineEvent, Snapshot, SnapshotHandle};
pub use throttle::Throttle;
