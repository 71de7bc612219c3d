//! `warden config`: show the effective configuration.

use std::path::Path;
use warden_config::WardenConfig;

use super::{config_path, load_config};

pub async fn run(explicit: Option<&Path>, show_path: bool) -> Result<(), Box<dyn std::error::Error>> {
    if show_path {
        println!("{}", config_path(explicit).display());
        return Ok(());
    }

    let config = load_config(explicit).map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", render(&config)?);
    Ok(())
}

fn render(config: &WardenConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}
