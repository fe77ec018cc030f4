use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use civic_server::{spawn_control_listener, spawn_viewer_listener, City, CityConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Civic metrics server", long_about = None)]
struct Args {
    /// City configuration JSON (defaults to the builtin 16x16 city)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address for the control surface (`GET /config`, `POST /wind`, ...)
    #[arg(long, default_value = "127.0.0.1:4100")]
    control_bind: SocketAddr,

    /// Address for viewer connections
    #[arg(long, default_value = "127.0.0.1:4101")]
    viewer_bind: SocketAddr,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => CityConfig::from_file(path)
            .with_context(|| format!("Failed to load city configuration {}", path.display()))?,
        None => CityConfig::builtin().context("Builtin city configuration is invalid")?,
    };
    info!(
        target: "civic::server",
        width = config.city_width,
        height = config.city_height,
        "initializing city"
    );

    let city = Arc::new(City::start(config).context("Failed to start city")?);
    let control = spawn_control_listener(args.control_bind, Arc::clone(&city))
        .with_context(|| format!("Failed to bind control surface at {}", args.control_bind))?;
    let viewers = spawn_viewer_listener(args.viewer_bind, Arc::clone(&city))
        .with_context(|| format!("Failed to bind viewer channel at {}", args.viewer_bind))?;

    info!(
        target: "civic::server",
        control_bind = %control.local_addr(),
        viewer_bind = %viewers.local_addr(),
        "civic server ready"
    );

    control.join();
    viewers.join();
    Ok(())
}
