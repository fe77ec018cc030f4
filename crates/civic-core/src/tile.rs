//! The static tile catalog.
//!
//! Tile semantics are configuration, not state: the catalog is built once
//! at startup and shared read-only by the grid (for input validation) and
//! by data sources (to resolve tile type names such as `"water"` to ids).

use crate::error::CatalogError;
use crate::id::TileTypeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of the tile catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileType {
    /// Machine name used by data sources and variable names, e.g. `"park"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable label.
    #[serde(default)]
    pub name: String,
    /// Whether the type is reported in the zone counters broadcast.
    #[serde(default = "counted_by_default")]
    pub counted: bool,
}

fn counted_by_default() -> bool {
    true
}

impl TileType {
    /// A counted tile type whose label equals its machine name.
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            name: kind.clone(),
            kind,
            counted: true,
        }
    }

    /// Exclude this type from the zone counters broadcast.
    pub fn uncounted(mut self) -> Self {
        self.counted = false;
        self
    }
}

/// Mapping from [`TileTypeId`] to [`TileType`], ordered by id.
///
/// Serializes as a JSON object keyed by the decimal id, which is the
/// `tileTypes` shape of the city configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<TileTypeId, TileType>", into = "BTreeMap<TileTypeId, TileType>")]
pub struct TileCatalog {
    types: BTreeMap<TileTypeId, TileType>,
}

impl TileCatalog {
    /// Build a catalog from `(id, type)` entries.
    ///
    /// Returns [`CatalogError::DuplicateKind`] if two ids share a machine
    /// name, since name lookups would otherwise be ambiguous.
    pub fn new(
        entries: impl IntoIterator<Item = (TileTypeId, TileType)>,
    ) -> Result<Self, CatalogError> {
        let mut types: BTreeMap<TileTypeId, TileType> = BTreeMap::new();
        for (id, tile) in entries {
            if let Some((&other, _)) = types.iter().find(|(_, t)| t.kind == tile.kind) {
                return Err(CatalogError::DuplicateKind {
                    kind: tile.kind,
                    first: other,
                    second: id,
                });
            }
            types.insert(id, tile);
        }
        Ok(Self { types })
    }

    /// The sandbox's stock catalog.
    pub fn standard() -> Self {
        let types = [
            (0, TileType::new("empty").uncounted()),
            (1, TileType::new("residential")),
            (2, TileType::new("park")),
            (3, TileType::new("water")),
            (4, TileType::new("road")),
            (5, TileType::new("windTurbineSmall")),
            (6, TileType::new("windTurbineBig")),
            (7, TileType::new("nuclearPowerPlant")),
        ]
        .into_iter()
        .map(|(id, tile)| (TileTypeId(id), tile))
        .collect();
        Self { types }
    }

    /// Resolve a machine name to its id.
    pub fn id_of(&self, kind: &str) -> Result<TileTypeId, CatalogError> {
        self.types
            .iter()
            .find(|(_, t)| t.kind == kind)
            .map(|(&id, _)| id)
            .ok_or_else(|| CatalogError::UnknownKind {
                kind: kind.to_string(),
            })
    }

    /// Look up an entry by id.
    pub fn get(&self, id: TileTypeId) -> Option<&TileType> {
        self.types.get(&id)
    }

    /// Whether `id` names a catalog entry.
    pub fn contains(&self, id: TileTypeId) -> bool {
        self.types.contains_key(&id)
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (TileTypeId, &TileType)> + '_ {
        self.types.iter().map(|(&id, t)| (id, t))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TryFrom<BTreeMap<TileTypeId, TileType>> for TileCatalog {
    type Error = CatalogError;

    fn try_from(types: BTreeMap<TileTypeId, TileType>) -> Result<Self, Self::Error> {
        Self::new(types)
    }
}

impl From<TileCatalog> for BTreeMap<TileTypeId, TileType> {
    fn from(catalog: TileCatalog) -> Self {
        catalog.types
    }
}
