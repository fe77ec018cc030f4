//! Wire formats for the viewer channel and the control surface.
//!
//! Viewers exchange newline-delimited JSON objects tagged by `type`. The
//! control surface speaks one request per line, `METHOD /path [json]`,
//! and answers each with one JSON line.

use std::collections::BTreeMap;

use civic_core::{Goal, TileTypeId, Value, WindVector};
use civic_grid::{CellUpdate, GridError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Viewer messages ────────────────────────────────────────────────

/// Messages a viewer may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    GetMap,
    SetMap { cells: Vec<CellUpdate> },
    GetVars,
    GetGoals,
    GetCounters,
    /// Ask every viewer to display the `<variable>-map` overlay.
    ViewShowMapVar { variable: String },
    Ping,
}

impl ClientMessage {
    const KINDS: [&'static str; 7] = [
        "get_map",
        "set_map",
        "get_vars",
        "get_goals",
        "get_counters",
        "view_show_map_var",
        "ping",
    ];

    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(line)?;
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(ProtocolError::MissingType)?;
        if !Self::KINDS.contains(&kind) {
            return Err(ProtocolError::UnknownType {
                kind: kind.to_string(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// One row of the zone counters broadcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counter {
    pub count: u64,
    /// Share of all cells, in percent with one decimal.
    pub percentage: String,
}

/// Messages pushed to viewers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    MapUpdate {
        cells: Vec<Vec<TileTypeId>>,
    },
    VarsUpdate {
        variables: IndexMap<String, Value>,
    },
    GoalsUpdate {
        goals: Vec<Goal>,
    },
    CountersUpdate {
        stats: BTreeMap<TileTypeId, Counter>,
        wind: WindVector,
    },
    ViewShowMapVar {
        variable: String,
        data: Value,
    },
    Pong,
}

impl ServerMessage {
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("message has no string `type` field")]
    MissingType,
    #[error("unknown message type `{kind}`")]
    UnknownType { kind: String },
    #[error("unknown route `{method} {path}`")]
    UnknownRoute { method: String, path: String },
    #[error("`{route}` requires a JSON body")]
    MissingBody { route: &'static str },
}

// ── Control surface ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ControlRequest {
    GetConfig,
    GetCity,
    /// Body is validated by [`parse_cells`] so that malformed input can be
    /// answered with a specific error.
    PostMap(serde_json::Value),
    PostWind(WindVector),
}

impl ControlRequest {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        let (method, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();
        let (path, body) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let body = body.trim();
        match (method, path) {
            ("GET", "/config") => Ok(Self::GetConfig),
            ("GET", "/city") => Ok(Self::GetCity),
            ("POST", "/city/map") => {
                if body.is_empty() {
                    return Err(ProtocolError::MissingBody {
                        route: "POST /city/map",
                    });
                }
                Ok(Self::PostMap(serde_json::from_str(body)?))
            }
            ("POST", "/wind") => {
                if body.is_empty() {
                    return Err(ProtocolError::MissingBody { route: "POST /wind" });
                }
                Ok(Self::PostWind(serde_json::from_str(body)?))
            }
            _ => Err(ProtocolError::UnknownRoute {
                method: method.to_string(),
                path: path.to_string(),
            }),
        }
    }
}

/// Status line for requests that return no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ControlStatus {
    Ok,
    Error { error: String },
}

impl ControlStatus {
    pub fn error(err: impl std::fmt::Display) -> Self {
        Self::Error {
            error: err.to_string(),
        }
    }
}

// ── Map input ──────────────────────────────────────────────────────

/// Rejections of a map replace request. None of them mutate the grid.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid input format: body must be a JSON object")]
    NotAnObject,
    #[error("invalid input format: `cells` must be an array")]
    CellsNotArray,
    #[error("invalid cell at index {index}: {reason}")]
    InvalidCell { index: usize, reason: String },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Extract `[x, y, tile]` triples from a `{"cells": [...]}` body.
pub fn parse_cells(payload: &serde_json::Value) -> Result<Vec<CellUpdate>, InputError> {
    let object = payload.as_object().ok_or(InputError::NotAnObject)?;
    let cells = object
        .get("cells")
        .and_then(serde_json::Value::as_array)
        .ok_or(InputError::CellsNotArray)?;
    cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            CellUpdate::deserialize(cell).map_err(|e| InputError::InvalidCell {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}
