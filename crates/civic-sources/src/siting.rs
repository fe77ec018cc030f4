//! Minimum-distance classification shared by the siting sources.
//!
//! A facility reading is the grid distance from a facility cell to the
//! nearest cell of some protected type. Against a configured minimum `D`:
//!
//! | reading       | `D > 1`  | `D <= 1` |
//! |---------------|----------|----------|
//! | `< D`         | hard     | hard     |
//! | `== D`        | goodwill | hard     |
//! | `> D`         | clear    | clear    |
//!
//! Hard violations are flagged on the per-cell map; goodwill violations
//! only count. [`UNREACHABLE`](civic_grid::UNREACHABLE) readings (no
//! protected cell exists) are always clear.

use civic_grid::CellMap;

/// Outcome of comparing one reading against its minimum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reading {
    /// Far enough.
    Clear,
    /// Exactly at the minimum; tolerated but counted.
    Goodwill,
    /// Too close.
    Hard,
}

/// Classify `reading` against `minimum`.
pub fn classify(reading: u32, minimum: u32) -> Reading {
    if reading < minimum {
        Reading::Hard
    } else if reading == minimum {
        if minimum > 1 {
            Reading::Goodwill
        } else {
            Reading::Hard
        }
    } else {
        Reading::Clear
    }
}

/// Siting quality from violation counts: 5 (best) to 1 (worst).
///
/// Starts at 5, loses one point per goodwill violation and four more if
/// any hard violation exists. Never drops below 1.
pub fn siting_index(goodwill: u32, hard: u32) -> u8 {
    let penalty = i64::from(goodwill) + if hard > 0 { 4 } else { 0 };
    (5 - penalty).max(1) as u8
}

/// Running totals for one pass over the facility cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SitingTally {
    /// Number of hard violations.
    pub hard: u32,
    /// Number of goodwill violations.
    pub goodwill: u32,
    /// 1 where a facility has a hard violation, 0 elsewhere.
    pub map: CellMap<u8>,
}

impl SitingTally {
    /// An empty tally for a `width x height` grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            hard: 0,
            goodwill: 0,
            map: CellMap::new(width, height, 0),
        }
    }

    /// Zero the counters and clear the map.
    pub fn reset(&mut self) {
        self.hard = 0;
        self.goodwill = 0;
        self.map.fill(0);
    }

    /// Record the reading of the facility at `(x, y)`.
    pub fn record(&mut self, x: u32, y: u32, reading: Reading) {
        match reading {
            Reading::Clear => {}
            Reading::Goodwill => self.goodwill += 1,
            Reading::Hard => {
                self.hard += 1;
                self.map.set(x, y, 1);
            }
        }
    }

    /// [`siting_index`] of the current counts.
    pub fn index(&self) -> u8 {
        siting_index(self.goodwill, self.hard)
    }

    /// The map as `[y][x]` rows of 0.0 / 1.0.
    pub fn map_rows(&self) -> Vec<Vec<f64>> {
        self.map.to_rows(|&v| f64::from(v))
    }
}
