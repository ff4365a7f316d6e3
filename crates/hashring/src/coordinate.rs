//! Coordinate functions: mapping bytes to points on the ring.
//!
//! A coordinate is a `u64`. Two digests are supported, SHA-1 and MD5, and
//! both are folded down to 64 bits the same way: the first eight digest
//! bytes read as a big-endian integer. The digest, the byte order, the
//! truncation width and the placement-key layout below are all part of the
//! compatibility contract: two rings built with the same configuration and
//! node set must agree on the owner of every key.
//!
//! # Placement keys
//!
//! Replica `i` of a node is placed at the coordinate of
//! [`placement_key`]`(node, i)`:
//!
//! | mode | layout | example (`"slotA"`, replica 3) |
//! |------|--------|--------------------------------|
//! | [`HashMode::Normal`] | `node ++ decimal(i)` | `b"slotA3"` |
//! | [`HashMode::LibmemcachedCompat`] | `node ++ "-" ++ decimal(i)` | `b"slotA-3"` |

use crate::error::{RingError, RingResult};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;

/// The digest used to place keys and nodes on the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFunction {
    /// 160-bit SHA-1 digest.
    Sha1,
    /// 128-bit MD5 digest.
    #[default]
    Md5,
}

impl HashFunction {
    /// Map `bytes` to a 64-bit ring coordinate.
    ///
    /// # Example
    ///
    /// ```
    /// use hashring::HashFunction;
    ///
    /// assert_eq!(HashFunction::Sha1.coordinate(b""), 0xda39_a3ee_5e6b_4b0d);
    /// assert_eq!(HashFunction::Md5.coordinate(b""), 0xd41d_8cd9_8f00_b204);
    /// ```
    pub fn coordinate(self, bytes: &[u8]) -> u64 {
        match self {
            HashFunction::Sha1 => fold_be64(&Sha1::digest(bytes)),
            HashFunction::Md5 => fold_be64(&Md5::digest(bytes)),
        }
    }

    /// Map `bytes` to a 32-bit coordinate the way libmemcached's ketama does.
    fn coordinate_le32(self, bytes: &[u8]) -> u64 {
        match self {
            HashFunction::Sha1 => fold_le32(&Sha1::digest(bytes)),
            HashFunction::Md5 => fold_le32(&Md5::digest(bytes)),
        }
    }

    /// Digest width in bits.
    pub fn digest_bits(self) -> u32 {
        match self {
            HashFunction::Sha1 => 160,
            HashFunction::Md5 => 128,
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashFunction::Sha1 => write!(f, "sha1"),
            HashFunction::Md5 => write!(f, "md5"),
        }
    }
}

impl FromStr for HashFunction {
    type Err = RingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(HashFunction::Sha1),
            "md5" => Ok(HashFunction::Md5),
            other => Err(RingError::InvalidConfiguration(format!(
                "unknown hash function '{}' (expected sha1 or md5)",
                other
            ))),
        }
    }
}

/// How node replicas and keys are placed on the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashMode {
    /// 64-bit coordinates, placement key `node ++ decimal(i)`.
    #[default]
    Normal,
    /// 32-bit little-endian MD5 coordinates and placement key
    /// `node ++ "-" ++ decimal(i)`, matching libmemcached's ketama layout.
    /// Only valid with [`HashFunction::Md5`].
    LibmemcachedCompat,
}

impl fmt::Display for HashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashMode::Normal => write!(f, "normal"),
            HashMode::LibmemcachedCompat => write!(f, "libmemcached_compat"),
        }
    }
}

impl FromStr for HashMode {
    type Err = RingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "normal" => Ok(HashMode::Normal),
            "libmemcached_compat" | "libmemcached" | "ketama" => Ok(HashMode::LibmemcachedCompat),
            other => Err(RingError::InvalidConfiguration(format!(
                "unknown hash mode '{}' (expected normal or libmemcached_compat)",
                other
            ))),
        }
    }
}

/// Build the bytes hashed to place replica `index` of `node`.
pub fn placement_key(node: &[u8], index: u32, mode: HashMode) -> Vec<u8> {
    let suffix = index.to_string();
    let mut key = Vec::with_capacity(node.len() + suffix.len() + 1);
    key.extend_from_slice(node);
    if mode == HashMode::LibmemcachedCompat {
        key.push(b'-');
    }
    key.extend_from_slice(suffix.as_bytes());
    key
}

/// A digest paired with a placement mode.
///
/// This is the single strategy value a ring is bound to for its lifetime.
/// It is `Copy` and stateless, so readers and writers share it freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinateFunction {
    hash: HashFunction,
    mode: HashMode,
}

impl CoordinateFunction {
    /// Pair `hash` with `mode`.
    ///
    /// Fails with [`RingError::InvalidConfiguration`] when `mode` is
    /// libmemcached compatibility and `hash` is not MD5.
    pub fn new(hash: HashFunction, mode: HashMode) -> RingResult<Self> {
        if mode == HashMode::LibmemcachedCompat && hash != HashFunction::Md5 {
            return Err(RingError::InvalidConfiguration(format!(
                "{} mode requires the md5 hash function, got {}",
                mode, hash
            )));
        }
        Ok(Self { hash, mode })
    }

    /// Coordinate function in normal mode.
    pub fn normal(hash: HashFunction) -> Self {
        Self {
            hash,
            mode: HashMode::Normal,
        }
    }

    pub fn hash_function(&self) -> HashFunction {
        self.hash
    }

    pub fn mode(&self) -> HashMode {
        self.mode
    }

    /// Coordinate of an arbitrary key.
    pub fn coordinate(&self, bytes: &[u8]) -> u64 {
        match self.mode {
            HashMode::Normal => self.hash.coordinate(bytes),
            HashMode::LibmemcachedCompat => self.hash.coordinate_le32(bytes),
        }
    }

    /// Coordinate of replica `index` of `node`.
    pub fn replica_coordinate(&self, node: &[u8], index: u32) -> u64 {
        self.coordinate(&placement_key(node, index, self.mode))
    }
}

fn fold_be64(digest: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(word)
}

fn fold_le32(digest: &[u8]) -> u64 {
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_vectors() {
        assert_eq!(HashFunction::Sha1.coordinate(b""), 0xda39a3ee5e6b4b0d);
        assert_eq!(HashFunction::Md5.coordinate(b""), 0xd41d8cd98f00b204);
        assert_eq!(HashFunction::Sha1.digest_bits(), 160);
        assert_eq!(HashFunction::Md5.digest_bits(), 128);
    }

    #[test]
    fn test_known_key_vectors() {
        assert_eq!(HashFunction::Sha1.coordinate(b"keyA"), 18046266546824863391);
        assert_eq!(HashFunction::Md5.coordinate(b"keyA"), 11857860017747944509);
    }

    #[test]
    fn test_deterministic() {
        for hash in [HashFunction::Sha1, HashFunction::Md5] {
            let a = hash.coordinate(b"user:123");
            let b = hash.coordinate(b"user:123");
            assert_eq!(a, b);
            assert_ne!(a, hash.coordinate(b"user:124"));
        }
    }

    #[test]
    fn test_placement_key_layout() {
        assert_eq!(placement_key(b"slotA", 3, HashMode::Normal), b"slotA3".to_vec());
        assert_eq!(placement_key(b"slotA", 12, HashMode::Normal), b"slotA12".to_vec());
        assert_eq!(
            placement_key(b"slotA", 3, HashMode::LibmemcachedCompat),
            b"slotA-3".to_vec()
        );
    }

    #[test]
    fn test_replica_coordinates() {
        let f = CoordinateFunction::normal(HashFunction::Sha1);
        assert_eq!(f.replica_coordinate(b"slotA", 0), f.coordinate(b"slotA0"));
        assert_eq!(f.replica_coordinate(b"slotA", 0), 9194987491154700840);
    }

    #[test]
    fn test_compat_mode() {
        let f = CoordinateFunction::new(HashFunction::Md5, HashMode::LibmemcachedCompat).unwrap();
        assert_eq!(f.coordinate(b""), 3649838548);
        assert_eq!(f.coordinate(b"keyA"), 3700723620);
        for i in 0..64 {
            assert!(f.replica_coordinate(b"node", i) <= u32::MAX as u64);
        }
    }

    #[test]
    fn test_compat_mode_requires_md5() {
        let err = CoordinateFunction::new(HashFunction::Sha1, HashMode::LibmemcachedCompat)
            .unwrap_err();
        assert!(matches!(err, RingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("SHA1".parse::<HashFunction>().unwrap(), HashFunction::Sha1);
        assert_eq!("md5".parse::<HashFunction>().unwrap(), HashFunction::Md5);
        assert!("crc32".parse::<HashFunction>().is_err());
        assert_eq!(format!("{}", HashFunction::Sha1), "sha1");

        assert_eq!(
            "libmemcached-compat".parse::<HashMode>().unwrap(),
            HashMode::LibmemcachedCompat
        );
        assert_eq!(format!("{}", HashMode::Normal), "normal");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&HashFunction::Sha1).unwrap(), "\"sha1\"");
        assert_eq!(
            serde_json::to_string(&HashMode::LibmemcachedCompat).unwrap(),
            "\"libmemcached_compat\""
        );
    }
}
