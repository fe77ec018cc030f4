//! Zoning mix against target shares.

use crate::config::ZoneBalanceConfig;
use crate::error::SourceConfigError;
use crate::names::zone_count;
use civic_core::{goal_progress, CalculateError, Goal, TileCatalog, Value};
use civic_source::{CalculateContext, DataSource};

const INDEX: &str = "zone-balance-index";

#[derive(Debug)]
struct Zone {
    kind: String,
    count_var: String,
    diff_var: String,
    target: f64,
    share: f64,
}

impl Zone {
    fn diff(&self) -> f64 {
        self.share - self.target
    }
}

/// Compares each targeted zone type's share of the zoned area with its
/// configured target.
///
/// Reads the `zones-<type>-count` variables published by the zoning
/// source. A type's share is its count over the summed count of all
/// targeted types; with no targeted cells at all every share is 0.
///
/// Publishes `zone-balance-<type>-diff` (share minus target) per type and
/// `zone-balance-index`: 5 minus one per bound out of tolerance, never
/// below 1. Reports `zone-balance-<type>-low` and `-high` goals.
#[derive(Debug)]
pub struct ZoneBalanceData {
    zones: Vec<Zone>,
    tolerance: f64,
    index: u8,
}

impl ZoneBalanceData {
    /// Build from targets whose type names must exist in `catalog`.
    pub fn new(
        catalog: &TileCatalog,
        config: &ZoneBalanceConfig,
    ) -> Result<Self, SourceConfigError> {
        config.validate()?;
        let zones = config
            .targets
            .iter()
            .map(|(kind, &target)| -> Result<Zone, SourceConfigError> {
                catalog.id_of(kind)?;
                Ok(Zone {
                    kind: kind.clone(),
                    count_var: zone_count(kind),
                    diff_var: format!("zone-balance-{kind}-diff"),
                    target,
                    share: 0.0,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            zones,
            tolerance: config.tolerance,
            index: 0,
        })
    }

    fn too_low(&self, zone: &Zone) -> bool {
        zone.diff() < -self.tolerance
    }

    fn too_high(&self, zone: &Zone) -> bool {
        zone.diff() > self.tolerance
    }
}

impl DataSource for ZoneBalanceData {
    fn name(&self) -> &str {
        "zone-balance"
    }

    fn variable_names(&self) -> Vec<String> {
        self.zones
            .iter()
            .map(|z| z.diff_var.clone())
            .chain(std::iter::once(INDEX.to_string()))
            .collect()
    }

    fn reads(&self) -> Vec<String> {
        self.zones.iter().map(|z| z.count_var.clone()).collect()
    }

    fn calculate(&mut self, ctx: &CalculateContext<'_>) -> Result<(), CalculateError> {
        let counts = self
            .zones
            .iter()
            .map(|z| ctx.published().require_number(&z.count_var))
            .collect::<Result<Vec<f64>, _>>()?;
        let total: f64 = counts.iter().sum();
        for (zone, count) in self.zones.iter_mut().zip(counts) {
            zone.share = if total > 0.0 { count / total } else { 0.0 };
        }
        let violations = self
            .zones
            .iter()
            .filter(|z| self.too_low(z) || self.too_high(z))
            .count();
        self.index = 5usize.saturating_sub(violations).max(1) as u8;
        Ok(())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        if name == INDEX {
            return Some(Value::from(u32::from(self.index)));
        }
        self.zones
            .iter()
            .find(|z| z.diff_var == name)
            .map(|z| Value::Number(z.diff()))
    }

    fn goals(&self) -> Vec<Goal> {
        let mut goals = Vec::with_capacity(self.zones.len() * 2);
        for zone in &self.zones {
            let floor = zone.target - self.tolerance;
            let ceiling = zone.target + self.tolerance;
            let low_progress = if floor <= 0.0 {
                1.0
            } else {
                goal_progress(zone.share, floor)
            };
            let high_progress = if zone.share <= ceiling {
                1.0
            } else {
                goal_progress(ceiling, zone.share)
            };
            goals.push(Goal::new(
                format!("zone-balance-{}-low", zone.kind),
                "zone-balance",
                2,
                !self.too_low(zone),
                low_progress,
            ));
            goals.push(Goal::new(
                format!("zone-balance-{}-high", zone.kind),
                "zone-balance",
                2,
                !self.too_high(zone),
                high_progress,
            ));
        }
        goals
    }
}
