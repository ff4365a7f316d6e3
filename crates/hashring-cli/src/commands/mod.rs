//! CLI command implementations.

pub mod bench;
pub mod distribution;
pub mod dump;
pub mod init;
pub mod locate;
pub mod next;

use anyhow::{bail, Result};
use colored::Colorize;
use hashring::HashRing;

use crate::config::Config;

/// Build the configured ring, refusing to continue without nodes.
pub fn populated_ring(config: &Config) -> Result<HashRing> {
    let ring = config.build_ring()?;
    if ring.is_empty() {
        bail!(
            "No nodes configured. Add nodes to {} or pass {}.",
            crate::config::CONFIG_FILE.cyan(),
            "--node <NAME>".cyan()
        );
    }
    Ok(ring)
}
