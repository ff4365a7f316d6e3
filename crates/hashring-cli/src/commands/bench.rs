//! Lookup throughput benchmarks.
//!
//! Without `--node-count` the default matrix runs rings of varying replica
//! and node counts; with it, a single ring is built from the configured
//! parameters and that many synthetic nodes.

use anyhow::Result;
use colored::Colorize;
use hashring::{HashRing, RingConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::config::Config;

/// `(replicas, nodes)` pairs run by default.
const MATRIX: &[(u32, usize)] = &[
    (1, 1),
    (1, 8),
    (1, 256),
    (8, 1),
    (8, 32),
    (8, 512),
    (512, 8),
    (512, 16),
    (512, 32),
];

/// Parameters of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub ring: RingConfig,
    pub nodes: usize,
    pub keys: usize,
    pub key_size: usize,
}

/// Results from a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchResults {
    pub replicas: u32,
    pub nodes: usize,
    pub points: usize,
    pub keys: usize,
    /// Time to add every node.
    pub build_time: Duration,
    /// Time for all lookups.
    pub lookup_time: Duration,
}

impl BenchResults {
    pub fn avg_lookup_us(&self) -> f64 {
        self.lookup_time.as_secs_f64() * 1_000_000.0 / self.keys.max(1) as f64
    }

    pub fn lookups_per_second(&self) -> f64 {
        let secs = self.lookup_time.as_secs_f64();
        if secs > 0.0 {
            self.keys as f64 / secs
        } else {
            0.0
        }
    }

    pub fn print_row(&self) {
        println!(
            "| {:>8} | {:>6} | {:>7} | {:>10.2?} | {:>10.2?} | {:>10.3} | {:>12.0} |",
            self.replicas,
            self.nodes,
            self.points,
            self.build_time,
            self.lookup_time,
            self.avg_lookup_us(),
            self.lookups_per_second()
        );
    }
}

/// Synthetic node names, `node-0000 ..`.
fn node_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("node-{:04}", i)).collect()
}

/// Synthetic keys of exactly `key_size` bytes.
fn generate_keys(count: usize, key_size: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let mut key = format!("key-{}", i).into_bytes();
            key.resize(key_size.max(key.len()), b'_');
            key
        })
        .collect()
}

/// Build a ring and time `keys` lookups against it.
pub fn run_benchmark(config: &BenchConfig) -> Result<BenchResults> {
    let names = node_names(config.nodes);
    let keys = generate_keys(config.keys, config.key_size);

    let start = Instant::now();
    let ring = HashRing::with_nodes(&config.ring, &names)?;
    let build_time = start.elapsed();

    let start = Instant::now();
    for key in &keys {
        black_box(ring.find_node(key)?);
    }
    let lookup_time = start.elapsed();

    Ok(BenchResults {
        replicas: config.ring.replicas,
        nodes: ring.node_count(),
        points: ring.point_count(),
        keys: config.keys,
        build_time,
        lookup_time,
    })
}

fn print_header() {
    println!(
        "| {:>8} | {:>6} | {:>7} | {:>10} | {:>10} | {:>10} | {:>12} |",
        "Replicas", "Nodes", "Points", "Build", "Lookups", "Avg (us)", "Lookups/sec"
    );
    println!("|----------|--------|---------|------------|------------|------------|--------------|");
}

pub fn run(config: &Config, node_count: Option<usize>, keys: Option<usize>) -> Result<()> {
    let keys = keys.unwrap_or(config.bench.keys);
    let runs: Vec<BenchConfig> = match node_count {
        Some(nodes) => vec![BenchConfig {
            ring: config.ring.params.clone(),
            nodes,
            keys,
            key_size: config.bench.key_size,
        }],
        None => MATRIX
            .iter()
            .map(|&(replicas, nodes)| BenchConfig {
                ring: RingConfig {
                    replicas,
                    ..config.ring.params.clone()
                },
                nodes,
                keys,
                key_size: config.bench.key_size,
            })
            .collect(),
    };

    println!(
        "{} {} lookups per run, {}-byte keys, {} ({} mode)",
        "bench".green().bold(),
        keys,
        config.bench.key_size,
        config.ring.params.hash_function,
        config.ring.params.mode
    );
    println!();

    let pb = ProgressBar::new(runs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} runs")?
            .progress_chars("#>-"),
    );

    let mut results = Vec::with_capacity(runs.len());
    for run in &runs {
        results.push(run_benchmark(run)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    print_header();
    for result in &results {
        result.print_row();
    }

    Ok(())
}
