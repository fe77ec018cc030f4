//! Variable names shared between sources.
//!
//! Names read by one source and published by another live here so the
//! two sides cannot drift apart.

/// Total cell count.
pub const ZONES_TOTAL: &str = "zones-total";

/// Per-type cell count, e.g. `zones-park-count`.
pub fn zone_count(kind: &str) -> String {
    format!("zones-{kind}-count")
}

/// Wind bearing in degrees, as seen by the last pass.
pub const WIND_DIRECTION: &str = "wind-direction";
/// Wind speed in m/s, as seen by the last pass.
pub const WIND_SPEED: &str = "wind-speed";
/// Per-turbine `[loss, tileTypeId]` pairs.
pub const ENERGY_LOSSES: &str = "energy-losses";
