//! Composition root: one city, its engine, and its viewers.

use std::io;
use std::sync::Arc;

use civic_core::{SharedWind, Subscription, SubscriptionId, WindVector};
use civic_engine::{ConfigError, DataManager, RealtimeEngine, StartError, SubmitError};
use civic_grid::{Grid, GridChanged, GridError, SharedGrid};
use civic_source::RegistryError;
use civic_sources::{standard_sources, SourceConfigError};
use serde_json::json;
use thiserror::Error;

use crate::config::CityConfig;
use crate::protocol::{
    parse_cells, ClientMessage, ControlRequest, ControlStatus, InputError, ServerMessage,
};
use crate::views::{FanOut, ViewerHub, Views};

/// The source whose pass re-reads the wind.
const WIND_SOURCE: &str = "wind-turbines";

/// Why a [`City`] could not be brought up.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The configured dimensions or default tile are invalid.
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),
    /// The throttle setting is out of range.
    #[error("invalid engine configuration: {0}")]
    Engine(#[from] ConfigError),
    /// A data source rejected the catalog, goals or turbine settings.
    #[error("invalid data source configuration: {0}")]
    Sources(#[from] SourceConfigError),
    /// Two sources claim the same name, variable or goal id.
    #[error("invalid data source registry: {0}")]
    Registry(#[from] RegistryError),
    /// A dashboard counter points at a variable no source publishes.
    #[error("dashboard entry `{key}` names unknown variable `{variable}`")]
    UnknownDashboardVariable { key: String, variable: String },
    /// The initial pass failed or the engine thread could not spawn.
    #[error("failed to start engine: {0}")]
    Start(#[from] StartError),
    /// The OS refused to spawn the fan-out thread.
    #[error("failed to spawn fan-out thread: {0}")]
    Spawn(#[source] io::Error),
}

/// A running city.
///
/// Holds the grid and wind, the engine thread, and the fan-out thread
/// that pushes changes to viewers. Dropping it stops both threads.
#[derive(Debug)]
pub struct City {
    config: Arc<CityConfig>,
    grid: SharedGrid,
    wind: SharedWind,
    views: Views,
    hub: ViewerHub,
    // Field order is drop order: stop fan-out before the engine.
    fanout: FanOut,
    engine: RealtimeEngine,
}

impl City {
    /// Build the grid and wind from `config`, register the standard
    /// sources, run the initial pass, and start the engine and fan-out
    /// threads.
    ///
    /// Fails before any thread starts if a dashboard entry names a
    /// variable the registry does not publish.
    ///
    /// ```
    /// use civic_server::{City, CityConfig};
    ///
    /// let city = City::start(CityConfig::builtin()?)?;
    /// assert_eq!(city.city_json()["width"], 16);
    /// assert!(city.engine().snapshot().pass.0 >= 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn start(config: CityConfig) -> Result<Self, StartupError> {
        let catalog = Arc::new(config.tile_types.clone());
        let grid = SharedGrid::new(Grid::new(
            config.city_width,
            config.city_height,
            config.default_tile,
            Arc::clone(&catalog),
        )?);
        let wind = SharedWind::new(config.initial_wind());

        let mut manager = DataManager::new(grid.clone(), config.manager_config()?);
        let sources = standard_sources(
            &catalog,
            &config.goals,
            &config.turbines,
            wind.clone(),
            config.wind.windspeed.max_speed,
        )?;
        for source in sources {
            manager.register_source(source)?;
        }
        check_dashboard(&config, &manager)?;

        let engine = RealtimeEngine::start(manager)?;
        let views = Views::new(
            grid.clone(),
            engine.snapshots(),
            wind.clone(),
            config.dashboard_variables.clone(),
        );
        let hub = ViewerHub::default();
        let fanout = FanOut::spawn(
            views.clone(),
            hub.clone(),
            grid.subscribe().into_receiver(),
            engine.subscribe().into_receiver(),
        )
        .map_err(StartupError::Spawn)?;

        tracing::info!(
            target: "civic::server",
            width = config.city_width,
            height = config.city_height,
            "city started"
        );
        Ok(Self {
            config: Arc::new(config),
            grid,
            wind,
            views,
            hub,
            fanout,
            engine,
        })
    }

    /// The configuration the city was started with.
    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    /// The live grid.
    pub fn grid(&self) -> &SharedGrid {
        &self.grid
    }

    /// The current wind.
    pub fn wind(&self) -> WindVector {
        self.wind.get()
    }

    /// The engine thread and its published snapshot.
    pub fn engine(&self) -> &RealtimeEngine {
        &self.engine
    }

    /// Every connected viewer.
    pub fn hub(&self) -> &ViewerHub {
        &self.hub
    }

    /// Builds the messages viewers receive.
    pub fn views(&self) -> &Views {
        &self.views
    }

    /// `GET /config`: the configuration document as loaded.
    pub fn config_json(&self) -> serde_json::Value {
        self.config.raw().clone()
    }

    /// `GET /city`.
    pub fn city_json(&self) -> serde_json::Value {
        let grid = self.grid.read();
        json!({
            "width": grid.width(),
            "height": grid.height(),
            "cells": grid.rows(),
        })
    }

    /// `POST /city/map`. Rejected payloads leave the grid untouched.
    pub fn replace_cells(&self, payload: &serde_json::Value) -> Result<GridChanged, InputError> {
        let cells = parse_cells(payload)?;
        Ok(self.grid.replace(&cells)?)
    }

    /// `POST /wind`: store the wind, push counters, and queue a pass from
    /// the wind-reading source onward.
    pub fn set_wind(&self, wind: WindVector) -> Result<(), SubmitError> {
        self.wind.set(wind);
        tracing::info!(
            target: "civic::server",
            direction = wind.winddirection,
            speed = wind.windspeed,
            "wind updated"
        );
        self.hub.broadcast(self.views.counters_update());
        self.engine.calculate_from(WIND_SOURCE)
    }

    /// Answer one control-surface request.
    pub fn handle_control(&self, request: ControlRequest) -> serde_json::Value {
        let status = match request {
            ControlRequest::GetConfig => return self.config_json(),
            ControlRequest::GetCity => return self.city_json(),
            ControlRequest::PostMap(payload) => match self.replace_cells(&payload) {
                Ok(_) => ControlStatus::Ok,
                Err(err) => {
                    tracing::warn!(target: "civic::server", error = %err, "rejected map update");
                    ControlStatus::error(err)
                }
            },
            ControlRequest::PostWind(wind) => match self.set_wind(wind) {
                Ok(()) => ControlStatus::Ok,
                Err(err) => ControlStatus::error(err),
            },
        };
        serde_json::to_value(status).unwrap_or_else(|_| json!({ "status": "error" }))
    }

    /// Answer one viewer message. Returns the reply for the sender, if any.
    pub fn handle_viewer(&self, message: ClientMessage) -> Option<ServerMessage> {
        self.views.respond(message, &self.hub)
    }

    /// Register a viewer. Every broadcast lands on the returned
    /// subscription.
    pub fn connect_viewer(&self) -> Subscription<ServerMessage> {
        self.hub.connect()
    }

    /// Stop broadcasting to viewer `id`.
    pub fn disconnect_viewer(&self, id: SubscriptionId) {
        self.hub.disconnect(id);
    }
}

/// Every dashboard entry must name a registered variable.
fn check_dashboard(config: &CityConfig, manager: &DataManager) -> Result<(), StartupError> {
    for (key, variable) in &config.dashboard_variables {
        if manager.get(variable).is_err() {
            return Err(StartupError::UnknownDashboardVariable {
                key: key.clone(),
                variable: variable.clone(),
            });
        }
    }
    Ok(())
}
