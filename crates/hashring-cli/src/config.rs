//! Configuration management for the hashring CLI.

use anyhow::{Context, Result};
use hashring::{HashFunction, HashMode, HashRing, RingConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the config file searched for in the working directory tree.
pub const CONFIG_FILE: &str = "hashring.toml";

/// CLI configuration, read from `hashring.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ring: RingSection,
    #[serde(default)]
    pub bench: BenchSection,
}

/// The `[ring]` table: construction parameters plus the node list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RingSection {
    #[serde(flatten)]
    pub params: RingConfig,
    #[serde(default)]
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchSection {
    #[serde(default = "default_bench_keys")]
    pub keys: usize,
    #[serde(default = "default_key_size")]
    pub key_size: usize,
}

fn default_bench_keys() -> usize { 1000 }
fn default_key_size() -> usize { 16 }

impl Default for BenchSection {
    fn default() -> Self {
        Self {
            keys: default_bench_keys(),
            key_size: default_key_size(),
        }
    }
}

/// Values given on the command line, applied on top of the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub nodes: Vec<String>,
    pub replicas: Option<u32>,
    pub hash_function: Option<HashFunction>,
    pub mode: Option<HashMode>,
}

impl Config {
    /// Load config from `path`, or from hashring.toml in the current or
    /// parent directories, or from the user config directory.
    ///
    /// Falls back to defaults when no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path.map(Path::to_path_buf).or_else(find_config_file) {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("No {} found, using defaults", CONFIG_FILE);
                Ok(Config::default())
            }
        }
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Apply command-line overrides. A non-empty node list replaces the
    /// file's list rather than extending it.
    pub fn apply(&mut self, overrides: &Overrides) {
        if !overrides.nodes.is_empty() {
            self.ring.nodes = overrides.nodes.clone();
        }
        if let Some(replicas) = overrides.replicas {
            self.ring.params.replicas = replicas;
        }
        if let Some(hash) = overrides.hash_function {
            self.ring.params.hash_function = hash;
        }
        if let Some(mode) = overrides.mode {
            self.ring.params.mode = mode;
        }
    }

    /// Build the ring described by the `[ring]` table.
    pub fn build_ring(&self) -> Result<HashRing> {
        HashRing::with_nodes(&self.ring.params, &self.ring.nodes)
            .context("Invalid [ring] configuration")
    }
}

/// Find hashring.toml in current or parent directories, then in the user
/// config directory.
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut dir) = std::env::current_dir() {
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }
            if !dir.pop() {
                break;
            }
        }
    }

    let user_path = dirs::config_dir()?.join("hashring").join(CONFIG_FILE);
    user_path.exists().then_some(user_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashring::DEFAULT_REPLICAS;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [ring]
            hash_function = "sha1"
            nodes = ["slotA", "slotB"]
            "#,
        )
        .unwrap();

        assert_eq!(config.ring.params.replicas, DEFAULT_REPLICAS);
        assert_eq!(config.ring.params.hash_function, HashFunction::Sha1);
        assert_eq!(config.ring.params.mode, HashMode::Normal);
        assert_eq!(config.ring.nodes, vec!["slotA", "slotB"]);
        assert_eq!(config.bench.keys, 1000);
        assert_eq!(config.bench.key_size, 16);
    }

    #[test]
    fn test_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.ring.nodes.is_empty());
        assert_eq!(config.ring.params, RingConfig::default());
    }

    #[test]
    fn test_unknown_hash_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            [ring]
            hash_function = "crc32"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.ring.nodes = vec!["a".to_string()];
        config.apply(&Overrides {
            nodes: vec!["slotA".to_string(), "slotB".to_string()],
            replicas: Some(8),
            hash_function: Some(HashFunction::Sha1),
            mode: None,
        });

        assert_eq!(config.ring.nodes, vec!["slotA", "slotB"]);
        let ring = config.build_ring().unwrap();
        assert_eq!(ring.replicas(), 8);
        assert_eq!(ring.node_count(), 2);
        assert_eq!(ring.find_node("keyB_").unwrap(), "slotB");
    }

    #[test]
    fn test_empty_overrides_keep_file_values() {
        let mut config = Config::default();
        config.ring.nodes = vec!["a".to_string()];
        config.apply(&Overrides::default());
        assert_eq!(config.ring.nodes, vec!["a"]);
        assert_eq!(config.ring.params, RingConfig::default());
    }

    #[test]
    fn test_invalid_ring_config() {
        let mut config = Config::default();
        config.ring.params.replicas = 0;
        assert!(config.build_ring().is_err());

        let mut config = Config::default();
        config.ring.params.hash_function = HashFunction::Sha1;
        config.ring.params.mode = HashMode::LibmemcachedCompat;
        assert!(config.build_ring().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.ring.params.replicas = 64;
        config.ring.params.mode = HashMode::LibmemcachedCompat;
        config.ring.nodes = vec!["cache-a:11211".to_string()];
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.ring.params, config.ring.params);
        assert_eq!(loaded.ring.nodes, config.ring.nodes);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("missing.toml")));
        assert!(result.is_err());
    }
}
