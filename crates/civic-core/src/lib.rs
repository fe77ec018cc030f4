//! Core types and traits for the civic metrics engine.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by every layer above it: tile type ids and the tile
//! catalog, published variable values, goals, the ambient wind vector,
//! the event broadcast used for change notification, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod goal;
pub mod id;
pub mod tile;
pub mod traits;
pub mod value;
pub mod wind;

pub use error::{CalculateError, CatalogError, LookupError, PassError};
pub use events::{Broadcast, Subscription, SubscriptionId};
pub use goal::{goal_progress, Goal};
pub use id::{PassId, TileTypeId};
pub use tile::{TileCatalog, TileType};
pub use traits::VariableReader;
pub use value::Value;
pub use wind::{SharedWind, WindVector};
