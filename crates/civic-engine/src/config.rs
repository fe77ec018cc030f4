//! Engine configuration and validation.

use std::error::Error;
use std::fmt;
use std::time::Duration;

// ── ManagerConfig ──────────────────────────────────────────────────

/// Configuration for [`DataManager`](crate::DataManager).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Minimum spacing between throttled passes. Zero disables
    /// throttling: a trigger runs at the next loop turn. Default: 1 s.
    pub throttle: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(1000),
        }
    }
}

impl ManagerConfig {
    /// Build from a throttle interval in milliseconds, as configuration
    /// files carry it.
    pub fn from_millis(throttle_ms: f64) -> Result<Self, ConfigError> {
        if !throttle_ms.is_finite() || throttle_ms < 0.0 {
            return Err(ConfigError::InvalidThrottle { value: throttle_ms });
        }
        Ok(Self {
            throttle: Duration::from_secs_f64(throttle_ms / 1000.0),
        })
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building a [`ManagerConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Throttle interval is NaN, infinite, or negative.
    InvalidThrottle {
        /// The rejected value, in milliseconds.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThrottle { value } => {
                write!(f, "throttle must be a non-negative number of ms, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}
