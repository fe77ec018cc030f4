//! Server surfaces for the civic metrics engine.
//!
//! [`City`] wires the grid, the wind, the seven standard data sources and
//! the realtime engine together from a [`CityConfig`]. The control
//! surface and the viewer channel are line-oriented TCP listeners in
//! [`transport`]; [`views`] turns engine output into viewer messages.

#![forbid(unsafe_code)]

pub mod city;
pub mod config;
pub mod protocol;
pub mod transport;
pub mod views;

pub use city::{City, StartupError};
pub use config::{CityConfig, ConfigFileError};
pub use protocol::{ClientMessage, ControlRequest, InputError, ProtocolError, ServerMessage};
pub use transport::{spawn_control_listener, spawn_viewer_listener, Listener};
pub use views::{ViewerHub, Views};
