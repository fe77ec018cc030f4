//! What viewers see.
//!
//! [`Views`] builds every [`ServerMessage`] from the current grid, the
//! latest engine snapshot, and the wind. Each message reads a single
//! snapshot, so a `vars_update` never mixes two passes.

mod hub;

pub use hub::{FanOut, ViewerHub};

use std::collections::BTreeMap;
use std::sync::Arc;

use civic_core::{SharedWind, TileCatalog};
use civic_engine::{Snapshot, SnapshotHandle};
use civic_grid::SharedGrid;
use civic_sources::names;
use indexmap::IndexMap;

use crate::protocol::{ClientMessage, Counter, ServerMessage};

#[derive(Clone, Debug)]
pub struct Views {
    grid: SharedGrid,
    snapshots: SnapshotHandle,
    wind: SharedWind,
    catalog: Arc<TileCatalog>,
    dashboard: Arc<IndexMap<String, String>>,
}

impl Views {
    pub fn new(
        grid: SharedGrid,
        snapshots: SnapshotHandle,
        wind: SharedWind,
        dashboard: IndexMap<String, String>,
    ) -> Self {
        let catalog = Arc::clone(grid.read().catalog());
        Self {
            grid,
            snapshots,
            wind,
            catalog,
            dashboard: Arc::new(dashboard),
        }
    }

    pub fn map_update(&self) -> ServerMessage {
        ServerMessage::MapUpdate {
            cells: self.grid.read().rows(),
        }
    }

    pub fn vars_update(&self) -> ServerMessage {
        self.vars_from(&self.snapshots.latest())
    }

    pub fn goals_update(&self) -> ServerMessage {
        self.goals_from(&self.snapshots.latest())
    }

    pub fn counters_update(&self) -> ServerMessage {
        self.counters_from(&self.snapshots.latest())
    }

    /// The `<variable>-map` overlay, if some source publishes one.
    pub fn map_var(&self, variable: &str) -> Option<ServerMessage> {
        let snapshot = self.snapshots.latest();
        let data = snapshot.get(&format!("{variable}-map")).ok()?.clone();
        Some(ServerMessage::ViewShowMapVar {
            variable: variable.to_string(),
            data,
        })
    }

    /// The three messages sent after every pass, all from `snapshot`.
    pub fn after_pass(&self, snapshot: &Snapshot) -> [ServerMessage; 3] {
        [
            self.vars_from(snapshot),
            self.goals_from(snapshot),
            self.counters_from(snapshot),
        ]
    }

    fn vars_from(&self, snapshot: &Snapshot) -> ServerMessage {
        let variables = self
            .dashboard
            .iter()
            .filter_map(|(key, name)| Some((key.clone(), snapshot.get(name).ok()?.clone())))
            .collect();
        ServerMessage::VarsUpdate { variables }
    }

    fn goals_from(&self, snapshot: &Snapshot) -> ServerMessage {
        ServerMessage::GoalsUpdate {
            goals: snapshot.goals.clone(),
        }
    }

    fn counters_from(&self, snapshot: &Snapshot) -> ServerMessage {
        let number = |name: &str| {
            snapshot
                .get(name)
                .ok()
                .and_then(|v| v.as_number())
                .unwrap_or(0.0)
        };
        let total = number(names::ZONES_TOTAL);
        let stats: BTreeMap<_, _> = self
            .catalog
            .iter()
            .filter(|(_, tile)| tile.counted)
            .map(|(id, tile)| {
                let count = number(&names::zone_count(&tile.kind));
                let share = if total > 0.0 { count / total * 100.0 } else { 0.0 };
                let counter = Counter {
                    count: count.max(0.0) as u64,
                    percentage: format!("{share:.1}"),
                };
                (id, counter)
            })
            .collect();
        ServerMessage::CountersUpdate {
            stats,
            wind: self.wind.get(),
        }
    }

    /// Handle one viewer message. Returns the reply for the sender, if any.
    ///
    /// `set_map` and `view_show_map_var` reach every viewer through the
    /// hub rather than as a reply.
    pub fn respond(&self, message: ClientMessage, hub: &ViewerHub) -> Option<ServerMessage> {
        match message {
            ClientMessage::GetMap => Some(self.map_update()),
            ClientMessage::SetMap { cells } => {
                if let Err(err) = self.grid.replace(&cells) {
                    tracing::warn!(target: "civic::server", error = %err, "rejected set_map");
                }
                None
            }
            ClientMessage::GetVars => Some(self.vars_update()),
            ClientMessage::GetGoals => Some(self.goals_update()),
            ClientMessage::GetCounters => Some(self.counters_update()),
            ClientMessage::ViewShowMapVar { variable } => {
                match self.map_var(&variable) {
                    Some(msg) => {
                        hub.broadcast(msg);
                    }
                    None => tracing::warn!(
                        target: "civic::server",
                        variable = %variable,
                        "no map published for variable"
                    ),
                }
                None
            }
            ClientMessage::Ping => Some(ServerMessage::Pong),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::{TileTypeId, Value, WindVector};
    use civic_engine::{DataManager, ManagerConfig};
    use civic_grid::CellUpdate;
    use civic_sources::{DistanceGoals, NuclearPowerData, ZoningData};
    use civic_test_utils::shared_grid_from_rows;

    fn views() -> (Views, SharedGrid, DataManager) {
        let grid = shared_grid_from_rows(&["RRP.", "##.."]);
        let catalog = Arc::clone(grid.read().catalog());
        let mut manager = DataManager::new(grid.clone(), ManagerConfig::default());
        manager
            .register_source(Box::new(ZoningData::new(&catalog)))
            .unwrap();
        manager
            .register_source(Box::new(
                NuclearPowerData::new(&catalog, &DistanceGoals::default()).unwrap(),
            ))
            .unwrap();
        manager.calculate_all().unwrap();
        let mut dashboard = IndexMap::new();
        dashboard.insert("distances".to_string(), "distances-index".to_string());
        let views = Views::new(
            grid.clone(),
            manager.snapshots(),
            SharedWind::new(WindVector::new(45.0, 0.5)),
            dashboard,
        );
        (views, grid, manager)
    }

    #[test]
    fn counters_skip_uncounted_types() {
        let (v, _, _) = views();
        let ServerMessage::CountersUpdate { stats, wind } = v.counters_update() else {
            panic!("expected counters");
        };
        assert!(!stats.contains_key(&TileTypeId(0)));
        assert_eq!(stats[&TileTypeId(1)].count, 2);
        assert_eq!(stats[&TileTypeId(1)].percentage, "25.0");
        assert_eq!(stats[&TileTypeId(7)].percentage, "0.0");
        assert_eq!(wind, WindVector::new(45.0, 0.5));
    }

    #[test]
    fn vars_use_dashboard_keys() {
        let (v, _, _) = views();
        let ServerMessage::VarsUpdate { variables } = v.vars_update() else {
            panic!("expected vars");
        };
        assert_eq!(variables.len(), 1);
        assert_eq!(variables["distances"], Value::Number(5.0));
    }

    #[test]
    fn map_var_requires_published_map() {
        let (v, _, _) = views();
        assert!(v.map_var("distances").is_some());
        assert!(v.map_var("noise").is_none());
    }

    #[test]
    fn respond_replies_and_broadcasts() {
        let (v, grid, _) = views();
        let hub = ViewerHub::default();
        let viewer = hub.connect();

        assert_eq!(v.respond(ClientMessage::Ping, &hub), Some(ServerMessage::Pong));
        assert!(matches!(
            v.respond(ClientMessage::GetMap, &hub),
            Some(ServerMessage::MapUpdate { cells }) if cells.len() == 2
        ));

        let show = ClientMessage::ViewShowMapVar {
            variable: "distances".into(),
        };
        assert_eq!(v.respond(show, &hub), None);
        assert!(matches!(
            viewer.try_recv(),
            Ok(ServerMessage::ViewShowMapVar { variable, .. }) if variable == "distances"
        ));

        let set = ClientMessage::SetMap {
            cells: vec![CellUpdate::new(3, 0, TileTypeId(3))],
        };
        assert_eq!(v.respond(set, &hub), None);
        assert_eq!(grid.read().get(3, 0), Some(TileTypeId(3)));
    }

    #[test]
    fn rejected_set_map_leaves_grid() {
        let (v, grid, _) = views();
        let hub = ViewerHub::default();
        let before = grid.read().rows();
        let set = ClientMessage::SetMap {
            cells: vec![
                CellUpdate::new(0, 0, TileTypeId(4)),
                CellUpdate::new(9, 9, TileTypeId(4)),
            ],
        };
        assert_eq!(v.respond(set, &hub), None);
        assert_eq!(grid.read().rows(), before);
    }
}
