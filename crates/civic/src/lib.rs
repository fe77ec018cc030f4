//! Civic: a metrics aggregation engine for an interactive city-planning
//! sandbox.
//!
//! This is the facade crate that re-exports the public API of every
//! sub-crate.
//!
//! # Quick start
//!
//! ```rust
//! use civic::prelude::*;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(TileCatalog::standard());
//! let grid = Grid::new(8, 8, TileTypeId(0), Arc::clone(&catalog)).unwrap();
//! let mut manager = DataManager::new(SharedGrid::new(grid), ManagerConfig::default());
//! let sources = standard_sources(
//!     &catalog,
//!     &GoalsConfig::default(),
//!     &TurbineModels::default(),
//!     SharedWind::new(WindVector::default()),
//!     72.0,
//! )
//! .unwrap();
//! for source in sources {
//!     manager.register_source(source).unwrap();
//! }
//!
//! let snapshot = manager.calculate_all().unwrap();
//! assert_eq!(snapshot.get("zones-total").unwrap(), &Value::Number(64.0));
//! assert!(snapshot.goals.iter().any(|g| g.id == "plant-no-water"));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `civic-core` | Ids, tile catalog, values, goals, wind, events |
//! | [`grid`] | `civic-grid` | Grid, shared grid, distance fields, regions |
//! | [`source`] | `civic-source` | `DataSource` trait and registry validation |
//! | [`sources`] | `civic-sources` | The seven standard data sources |
//! | [`engine`] | `civic-engine` | Data manager, throttle, realtime engine |
//! | [`server`] | `civic-server` | City composition root and TCP surfaces |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`civic-core`).
pub use civic_core as types;

/// The city grid and its distance fields (`civic-grid`).
pub use civic_grid as grid;

/// The data source trait (`civic-source`).
///
/// [`source::DataSource`] is the extension point for new metrics.
pub use civic_source as source;

/// Standard data sources and their configuration (`civic-sources`).
pub use civic_sources as sources;

/// The aggregation engine (`civic-engine`).
///
/// [`engine::DataManager`] for synchronous passes,
/// [`engine::RealtimeEngine`] for throttled background recomputation.
pub use civic_engine as engine;

/// Composition root and network surfaces (`civic-server`).
pub use civic_server as server;

/// Common imports for typical use.
pub mod prelude {
    // Core types
    pub use civic_core::{
        goal_progress, Goal, PassId, SharedWind, TileCatalog, TileType, TileTypeId, Value,
        VariableReader, WindVector,
    };

    // Errors
    pub use civic_core::{CalculateError, LookupError, PassError};

    // Grid
    pub use civic_grid::{distances_to, CellUpdate, Grid, GridChanged, SharedGrid, UNREACHABLE};

    // Sources
    pub use civic_source::{CalculateContext, DataSource};
    pub use civic_sources::{standard_sources, GoalsConfig, TurbineModels};

    // Engine
    pub use civic_engine::{
        DataManager, EngineEvent, ManagerConfig, RealtimeEngine, Snapshot, SnapshotHandle,
    };
}
