//! The data source capability and the registry it plugs into.
//!
//! A [`DataSource`] is one metric producer: it recomputes its state from
//! the grid, publishes named variables, and reports goals. The
//! aggregation engine runs every registered source in order each pass;
//! [`validate_registry`] checks the ordered list once, at registration,
//! for variable and goal id collisions and for reads that no earlier
//! source publishes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod registry;
pub mod source;

pub use context::CalculateContext;
pub use registry::{validate_registry, Collision, RegistryError, RegistryPlan};
pub use source::DataSource;
