//! hashring CLI - inspect, query and benchmark consistent hash rings.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hashring::{HashFunction, HashMode};
use std::path::PathBuf;
use tracing::Level;

use crate::config::{Config, Overrides};

#[derive(Parser)]
#[command(name = "hashring")]
#[command(author, version, about = "hashring - consistent hash ring lookups", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: hashring.toml in this or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Node to place on the ring; repeat for several. Replaces the config's node list
    #[arg(short = 'n', long = "node", global = true)]
    nodes: Vec<String>,

    /// Points per node
    #[arg(short, long, global = true)]
    replicas: Option<u32>,

    /// Hash function: sha1 or md5
    #[arg(long, global = true)]
    hash: Option<HashFunction>,

    /// Placement mode: normal or libmemcached_compat
    #[arg(long, global = true)]
    mode: Option<HashMode>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default hashring.toml
    Init {
        /// Directory to write into (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Find the node that owns each key
    Locate {
        /// Keys to look up
        #[arg(required = true)]
        keys: Vec<String>,

        /// Number of distinct nodes to return per key
        #[arg(short = 'k', long, default_value = "1")]
        count: usize,
    },

    /// Find the first point at or after a raw coordinate
    Next {
        /// Coordinate in the 64-bit ring space
        value: u64,
    },

    /// Print every point on the ring
    Dump,

    /// Show how synthetic keys spread across nodes
    Distribution {
        /// Number of keys to place
        #[arg(long, default_value = "10000")]
        keys: usize,
    },

    /// Measure lookup throughput
    Bench {
        /// Benchmark a single ring of this many synthetic nodes instead of
        /// the default replicas x nodes matrix
        #[arg(long)]
        node_count: Option<usize>,

        /// Lookups per run (default: from config)
        #[arg(long)]
        keys: Option<usize>,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let overrides = Overrides {
        nodes: cli.nodes,
        replicas: cli.replicas,
        hash_function: cli.hash,
        mode: cli.mode,
    };
    let load = || -> Result<Config> {
        let mut config = Config::load(cli.config.as_deref())?;
        config.apply(&overrides);
        Ok(config)
    };

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Locate { keys, count } => commands::locate::run(&load()?, &keys, count),
        Commands::Next { value } => commands::next::run(&load()?, value),
        Commands::Dump => commands::dump::run(&load()?),
        Commands::Distribution { keys } => commands::distribution::run(&load()?, keys),
        Commands::Bench { node_count, keys } => commands::bench::run(&load()?, node_count, keys),
    }
}
