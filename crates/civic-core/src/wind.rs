//! Ambient wind state.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Wind as set from the control surface.
///
/// `winddirection` is the compass bearing the wind blows *from*, in
/// degrees (0 = north, 90 = east). `windspeed` is the normalized position
/// of the speed knob; it wraps into `[0, 1)` and is scaled by the
/// configured maximum speed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WindVector {
    /// Bearing the wind comes from, in degrees.
    pub winddirection: f64,
    /// Normalized speed knob position.
    pub windspeed: f64,
}

impl WindVector {
    /// Construct a wind vector.
    pub fn new(winddirection: f64, windspeed: f64) -> Self {
        Self {
            winddirection,
            windspeed,
        }
    }

    /// Speed knob position wrapped into `[0, 1)`.
    pub fn normalized_speed(&self) -> f64 {
        let s = self.windspeed.rem_euclid(1.0);
        if s.is_finite() {
            s
        } else {
            0.0
        }
    }

    /// Speed in metres per second given the knob's full-scale km/h.
    pub fn speed_m_s(&self, max_speed_kmh: f64) -> f64 {
        self.normalized_speed() * max_speed_kmh / 3.6
    }

    /// Bearing wrapped into `[0, 360)`.
    pub fn bearing(&self) -> f64 {
        let b = self.winddirection.rem_euclid(360.0);
        if b.is_finite() {
            b
        } else {
            0.0
        }
    }

    /// Unit vector pointing downwind in grid coordinates (`+y` is south).
    pub fn downwind(&self) -> (f64, f64) {
        let rad = self.bearing().to_radians();
        (-rad.sin(), rad.cos())
    }
}

/// Wind state owned by the composition root.
///
/// Cloning shares the same underlying value. The control surface writes
/// it; the one data source that needs it reads it during `calculate()`.
#[derive(Clone, Debug, Default)]
pub struct SharedWind {
    inner: Arc<RwLock<WindVector>>,
}

impl SharedWind {
    /// Wrap an initial wind vector.
    pub fn new(wind: WindVector) -> Self {
        Self {
            inner: Arc::new(RwLock::new(wind)),
        }
    }

    /// Current wind.
    pub fn get(&self) -> WindVector {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the wind.
    pub fn set(&self, wind: WindVector) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = wind;
    }
}
