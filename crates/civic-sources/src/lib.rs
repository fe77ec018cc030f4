//! Concrete data sources for the civic metrics engine.
//!
//! # Registration order
//!
//! 1. [`ZoningData`]: per-type counts
//! 2. [`ZoneBalanceData`]: reads the counts, compares with target shares
//! 3. [`GreenSpacesData`]: park and water coverage
//! 4. [`WindTurbinesData`]: turbine siting; publishes the pass's wind
//! 5. [`NuclearPowerData`]: plant siting
//! 6. [`SlipstreamData`]: reads the wind, publishes per-turbine wake losses
//! 7. [`EnergyData`]: reads losses, wind and plant count
//!
//! [`standard_sources`] builds all seven in this order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod curve;
pub mod energy;
pub mod error;
pub mod green_spaces;
pub mod names;
pub mod nuclear;
pub mod siting;
pub mod slipstream;
pub mod wind_turbines;
pub mod zone_balance;
pub mod zoning;

pub use config::{
    DistanceGoals, EnergyConfig, GoalsConfig, GreenSpacesConfig, SlipstreamConfig,
    TurbineModel, TurbineModels, ZoneBalanceConfig,
};
pub use energy::EnergyData;
pub use error::SourceConfigError;
pub use green_spaces::GreenSpacesData;
pub use nuclear::NuclearPowerData;
pub use siting::{classify, siting_index, Reading, SitingTally};
pub use slipstream::SlipstreamData;
pub use wind_turbines::WindTurbinesData;
pub use zone_balance::ZoneBalanceData;
pub use zoning::ZoningData;

use civic_core::{SharedWind, TileCatalog};
use civic_source::DataSource;

/// Build every source in registration order.
///
/// `wind` is handed to [`WindTurbinesData`] only; `max_speed_kmh` is the
/// speed a full wind knob turn represents.
pub fn standard_sources(
    catalog: &TileCatalog,
    goals: &GoalsConfig,
    turbines: &TurbineModels,
    wind: SharedWind,
    max_speed_kmh: f64,
) -> Result<Vec<Box<dyn DataSource>>, SourceConfigError> {
    Ok(vec![
        Box::new(ZoningData::new(catalog)),
        Box::new(ZoneBalanceData::new(catalog, &goals.zone_balance)?),
        Box::new(GreenSpacesData::new(catalog, goals.green_spaces.clone())?),
        Box::new(WindTurbinesData::new(
            catalog,
            goals.distances.clone(),
            wind,
            max_speed_kmh,
        )?),
        Box::new(NuclearPowerData::new(catalog, &goals.distances)?),
        Box::new(SlipstreamData::new(
            catalog,
            turbines.clone(),
            goals.slipstream.clone(),
        )?),
        Box::new(EnergyData::new(
            catalog,
            turbines.clone(),
            goals.energy.clone(),
        )?),
    ])
}


#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::WindVector;
    use civic_source::validate_registry;

    #[test]
    fn standard_sources_validate_in_order() {
        let sources = standard_sources(
            &TileCatalog::standard(),
            &GoalsConfig::default(),
            &TurbineModels::default(),
            SharedWind::new(WindVector::default()),
            72.0,
        )
        .unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            [
                "zoning",
                "zone-balance",
                "green-spaces",
                "wind-turbines",
                "nuclear-power",
                "slipstream",
                "energy"
            ]
        );
        let plan = validate_registry(&sources).unwrap();
        assert_eq!(plan.owner_of("energy-losses"), Some(5));
        assert_eq!(plan.owner_of("wind-speed"), Some(3));
    }

    #[test]
    fn unknown_zone_target_fails_construction() {
        let mut goals = GoalsConfig::default();
        goals.zone_balance.targets.insert("harbour".into(), 0.1);
        let err = standard_sources(
            &TileCatalog::standard(),
            &goals,
            &TurbineModels::default(),
            SharedWind::new(WindVector::default()),
            72.0,
        )
        .err()
        .unwrap();
        assert!(matches!(err, SourceConfigError::Catalog(_)));
    }
}
