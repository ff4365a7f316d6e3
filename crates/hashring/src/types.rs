//! Core types shared by the ring store and its callers.
//!
//! This module defines node identifiers, the points that make up the ring,
//! and the construction parameters of a ring.

use crate::coordinate::{CoordinateFunction, HashFunction, HashMode};
use crate::error::{RingError, RingResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of points placed on the ring per node.
pub const DEFAULT_REPLICAS: u32 = 128;

/// Identifier of a node on the ring.
///
/// An opaque byte string compared by exact byte equality. Lookups hand out
/// owned copies, never references into the ring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Vec<u8>);

impl NodeId {
    /// Create a node identifier from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&[u8]> for NodeId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for NodeId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// A single point on the ring: a coordinate and the node that owns it.
///
/// Points order by coordinate first and node identifier second, so two
/// nodes hashed to the same coordinate always sort the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RingPoint {
    /// Position in the 64-bit coordinate space.
    pub coordinate: u64,
    /// The node this point belongs to.
    pub node: NodeId,
}

impl RingPoint {
    pub fn new(coordinate: u64, node: NodeId) -> Self {
        Self { coordinate, node }
    }
}

impl fmt::Display for RingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.coordinate, self.node)
    }
}

/// Construction parameters of a ring.
///
/// Fixed for the lifetime of the ring once it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    /// Number of points placed on the ring per node.
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    /// Digest used for placement and lookup.
    #[serde(default)]
    pub hash_function: HashFunction,
    /// Placement layout.
    #[serde(default)]
    pub mode: HashMode,
}

fn default_replicas() -> u32 {
    DEFAULT_REPLICAS
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replicas: default_replicas(),
            hash_function: HashFunction::default(),
            mode: HashMode::default(),
        }
    }
}

impl RingConfig {
    /// Create a normal-mode configuration.
    pub fn new(replicas: u32, hash_function: HashFunction) -> Self {
        Self {
            replicas,
            hash_function,
            mode: HashMode::Normal,
        }
    }

    /// Set the placement mode.
    pub fn with_mode(mut self, mode: HashMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check the parameters and build the coordinate function they describe.
    pub fn validate(&self) -> RingResult<CoordinateFunction> {
        if self.replicas == 0 {
            return Err(RingError::InvalidConfiguration(
                "replicas must be at least 1".to_string(),
            ));
        }
        CoordinateFunction::new(self.hash_function, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let node = NodeId::from("cache-a:11211");
        assert_eq!(node.as_bytes(), b"cache-a:11211");
        assert_eq!(node.len(), 13);
        assert_eq!(node, "cache-a:11211");
        assert_eq!(format!("{}", node), "cache-a:11211");
        assert_eq!(NodeId::from(b"cache-a:11211".as_slice()), node);
    }

    #[test]
    fn test_node_id_display_is_lossy() {
        let node = NodeId::new(vec![b'n', 0xff, b'1']);
        assert_eq!(format!("{}", node), "n\u{fffd}1");
    }

    #[test]
    fn test_ring_point_ordering() {
        let a = RingPoint::new(10, NodeId::from("b"));
        let b = RingPoint::new(10, NodeId::from("a"));
        let c = RingPoint::new(5, NodeId::from("z"));
        let mut points = vec![a.clone(), b.clone(), c.clone()];
        points.sort();
        assert_eq!(points, vec![c, b, a]);
    }

    #[test]
    fn test_ring_config_default() {
        let config = RingConfig::default();
        assert_eq!(config.replicas, 128);
        assert_eq!(config.hash_function, HashFunction::Md5);
        assert_eq!(config.mode, HashMode::Normal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ring_config_validate() {
        assert!(matches!(
            RingConfig::new(0, HashFunction::Sha1).validate(),
            Err(RingError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            RingConfig::new(8, HashFunction::Sha1)
                .with_mode(HashMode::LibmemcachedCompat)
                .validate(),
            Err(RingError::InvalidConfiguration(_))
        ));
        let f = RingConfig::new(8, HashFunction::Md5)
            .with_mode(HashMode::LibmemcachedCompat)
            .validate()
            .unwrap();
        assert_eq!(f.mode(), HashMode::LibmemcachedCompat);
    }

    #[test]
    fn test_ring_config_serde_defaults() {
        let config: RingConfig = serde_json::from_str(r#"{"hash_function": "sha1"}"#).unwrap();
        assert_eq!(config.replicas, DEFAULT_REPLICAS);
        assert_eq!(config.hash_function, HashFunction::Sha1);
        assert_eq!(config.mode, HashMode::Normal);
    }
}
