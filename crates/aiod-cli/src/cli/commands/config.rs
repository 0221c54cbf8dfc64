//! `aiod config` – show config path and effective settings.

use anyhow::{Context, Result};
use aiod_core::config::{config_path, AiodConfig};
use aiod_core::logging::log_file_path;

pub fn run_config(cfg: &AiodConfig) -> Result<()> {
    println!("config: {}", config_path()?.display());
    println!("log:    {}", log_file_path()?.display());
    println!();
    let toml = toml::to_string_pretty(cfg).context("serialize config")?;
    print!("{toml}");
    Ok(())
}
