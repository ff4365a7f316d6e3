//! Successor lookup on a raw coordinate.

use anyhow::Result;
use colored::Colorize;

use super::populated_ring;
use crate::config::Config;

pub fn run(config: &Config, value: u64) -> Result<()> {
    let ring = populated_ring(config)?;
    let point = ring.find_point(value)?;

    let wrapped = if point.coordinate < value {
        " (wrapped)".dimmed().to_string()
    } else {
        String::new()
    };
    println!(
        "{} {} {} {}{}",
        value.to_string().cyan(),
        "→".blue(),
        point.coordinate.to_string().bold(),
        point.node.to_string().green(),
        wrapped
    );
    Ok(())
}
