//! Key distribution across nodes.

use anyhow::Result;
use colored::Colorize;
use hashring::{HashRing, NodeId};
use std::collections::HashMap;

use super::populated_ring;
use crate::config::Config;

const BAR_WIDTH: usize = 40;

pub fn run(config: &Config, keys: usize) -> Result<()> {
    let ring = populated_ring(config)?;
    let counts = count_owners(&ring, keys)?;

    println!(
        "{} {} keys over {} nodes ({} points, {}, {} mode)",
        "distribution".green().bold(),
        keys,
        ring.node_count(),
        ring.point_count(),
        ring.hash_function(),
        ring.mode()
    );
    println!();

    let ideal = keys as f64 / ring.node_count() as f64;
    let max = counts.values().copied().max().unwrap_or(0).max(1);
    for node in ring.nodes() {
        let count = counts.get(node).copied().unwrap_or(0);
        let share = 100.0 * count as f64 / keys.max(1) as f64;
        let deviation = if ideal > 0.0 {
            100.0 * (count as f64 - ideal) / ideal
        } else {
            0.0
        };
        let bar = "#".repeat(count * BAR_WIDTH / max);
        println!(
            "  {:<24} {:>8} {:>6.2}% {:>+7.1}%  {}",
            node.to_string(),
            count,
            share,
            deviation,
            bar.cyan()
        );
    }

    Ok(())
}

/// Count how many of the synthetic keys `key-0 .. key-{keys-1}` each node owns.
pub fn count_owners(ring: &HashRing, keys: usize) -> Result<HashMap<NodeId, usize>> {
    let mut counts: HashMap<NodeId, usize> = HashMap::new();
    for i in 0..keys {
        let owner = ring.find_node(format!("key-{}", i))?;
        *counts.entry(owner).or_default() += 1;
    }
    Ok(counts)
}
