//! Write a default hashring.toml.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let base_path = match path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if config_path.exists() {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
        return Ok(());
    }

    Config::default().save(&config_path)?;
    println!("  {} Created {}", "✓".green(), config_path.display());
    println!();
    println!("Next steps:");
    println!("  {} add your nodes to the [ring] table", "1.".blue());
    println!("  {} hashring locate <key>", "2.".blue());
    println!("  {} hashring distribution", "3.".blue());

    Ok(())
}
