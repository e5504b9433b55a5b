//! # Duskblade
//!
//! Headless driver for the Duskblade gameplay core.
//!
//! Loads `duskblade.toml` (or the path given as the first argument), runs the
//! scripted player against a goblin in a walled arena, and prints a JSON
//! summary of the fight.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod animator;
mod arena;
mod config;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::arena::Arena;
use crate::config::{GameplayConfig, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("duskblade=info".parse()?))
        .init();

    info!("Duskblade starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());
    let mut config = GameplayConfig::load_from(&path);
    config.validate();

    let summary = Arena::new(&config).run();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    info!("Duskblade shutdown complete");
    Ok(())
}
