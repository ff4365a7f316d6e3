//! Key → node lookups.

use anyhow::{Context, Result};
use colored::Colorize;

use super::populated_ring;
use crate::config::Config;

pub fn run(config: &Config, keys: &[String], count: usize) -> Result<()> {
    let ring = populated_ring(config)?;

    for key in keys {
        let coordinate = ring.coordinate_of(key);
        let nodes = ring
            .find_nodes(key, count.max(1))
            .with_context(|| format!("Lookup failed for key '{}'", key))?;

        let names: Vec<String> = nodes.iter().map(|n| n.to_string()).collect();
        println!(
            "{} {} {} {}",
            key.cyan(),
            "→".blue(),
            names.join(", ").green().bold(),
            format!("({})", coordinate).dimmed()
        );
    }

    if count > ring.node_count() {
        println!(
            "{} only {} nodes on the ring, asked for {}",
            "note:".yellow(),
            ring.node_count(),
            count
        );
    }

    Ok(())
}
