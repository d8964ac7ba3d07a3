//! # Parkchase Engine
//!
//! Headless driver for the Parkchase simulation.
//!
//! Usage: `parkchase [config.toml] [scene.ron]`
//!
//! Loads the configuration (falling back to defaults), builds the scene
//! (falling back to the built-in park), plays the scripted input and prints
//! the final report as JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use parkchase_engine::app;
use parkchase_engine::config::EngineConfig;
use parkchase_engine::scene::SceneDescription;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("parkchase=info".parse()?))
        .init();

    info!("Parkchase starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };
    let scene_path = args.next().map(PathBuf::from).or_else(|| config.scene_path.clone());

    let scene = match scene_path {
        Some(path) => SceneDescription::load(&path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => {
            info!("No scene given, using the default park");
            SceneDescription::default_park()
        },
    };

    let report = app::run(&config, &scene);
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Parkchase shutdown complete");
    Ok(())
}
