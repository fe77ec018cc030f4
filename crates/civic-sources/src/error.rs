//! Construction-time errors for data sources.

use civic_core::CatalogError;
use std::error::Error;
use std::fmt;

/// A data source could not be built from its configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceConfigError {
    /// A tile type the source needs is missing from the catalog.
    Catalog(CatalogError),
    /// A configuration value is out of range.
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl fmt::Display for SourceConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(e) => write!(f, "tile catalog: {e}"),
            Self::InvalidValue { key, reason } => write!(f, "invalid '{key}': {reason}"),
        }
    }
}

impl Error for SourceConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(e) => Some(e),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<CatalogError> for SourceConfigError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}
