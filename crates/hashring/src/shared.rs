//! A ring handle for concurrent readers and serialized writers.
//!
//! Lookups hold the read lock only while searching. Writers take the write
//! lock, so at most one mutation is in flight, and update the ring through
//! [`Arc::make_mut`]: the ring is cloned only when a reader is still holding
//! a [`snapshot`](SharedRing::snapshot) of the previous version.

use crate::error::{RingError, RingResult};
use crate::ring::HashRing;
use crate::types::{NodeId, RingConfig};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::error;

/// Cloneable, thread-safe handle to one [`HashRing`].
///
/// # Example
///
/// ```
/// use hashring::{HashFunction, HashRing, SharedRing};
///
/// let shared = SharedRing::new(HashRing::new(8, HashFunction::Sha1).unwrap());
/// let writer = shared.clone();
/// std::thread::spawn(move || writer.add_node("slotA").unwrap())
///     .join()
///     .unwrap();
///
/// assert_eq!(shared.find_node("keyA").unwrap(), "slotA");
/// ```
#[derive(Debug, Clone)]
pub struct SharedRing {
    inner: Arc<RwLock<Arc<HashRing>>>,
}

impl SharedRing {
    /// Wrap an existing ring.
    pub fn new(ring: HashRing) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(ring))),
        }
    }

    /// Build an empty shared ring from a configuration.
    pub fn with_config(config: &RingConfig) -> RingResult<Self> {
        Ok(Self::new(HashRing::with_config(config)?))
    }

    fn read(&self) -> RingResult<RwLockReadGuard<'_, Arc<HashRing>>> {
        self.inner.read().map_err(|e| {
            error!("Ring lock poisoned: {}", e);
            RingError::InternalInvariantViolation(format!("Failed to acquire read lock: {}", e))
        })
    }

    fn write(&self) -> RingResult<RwLockWriteGuard<'_, Arc<HashRing>>> {
        self.inner.write().map_err(|e| {
            error!("Ring lock poisoned: {}", e);
            RingError::InternalInvariantViolation(format!("Failed to acquire write lock: {}", e))
        })
    }

    /// The current ring, frozen. Later writes do not affect it.
    pub fn snapshot(&self) -> RingResult<Arc<HashRing>> {
        Ok(Arc::clone(&*self.read()?))
    }

    /// See [`HashRing::add_node`].
    pub fn add_node(&self, node: impl AsRef<[u8]>) -> RingResult<bool> {
        let mut guard = self.write()?;
        if guard.contains_node(node.as_ref()) {
            return Ok(false);
        }
        Ok(Arc::make_mut(&mut *guard).add_node(node))
    }

    /// See [`HashRing::remove_node`].
    pub fn remove_node(&self, node: impl AsRef<[u8]>) -> RingResult<bool> {
        let mut guard = self.write()?;
        if !guard.contains_node(node.as_ref()) {
            return Ok(false);
        }
        Ok(Arc::make_mut(&mut *guard).remove_node(node))
    }

    /// See [`HashRing::find_node`].
    pub fn find_node(&self, key: impl AsRef<[u8]>) -> RingResult<NodeId> {
        self.read()?.find_node(key)
    }

    /// See [`HashRing::find_nodes`].
    pub fn find_nodes(&self, key: impl AsRef<[u8]>, count: usize) -> RingResult<Vec<NodeId>> {
        self.read()?.find_nodes(key, count)
    }

    /// See [`HashRing::find_next_highest_item`].
    pub fn find_next_highest_item(&self, value: u64) -> RingResult<u64> {
        self.read()?.find_next_highest_item(value)
    }

    pub fn contains_node(&self, node: impl AsRef<[u8]>) -> RingResult<bool> {
        Ok(self.read()?.contains_node(node))
    }

    pub fn node_count(&self) -> RingResult<usize> {
        Ok(self.read()?.node_count())
    }
}

impl From<HashRing> for SharedRing {
    fn from(ring: HashRing) -> Self {
        Self::new(ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::HashFunction;
    use std::thread;

    fn shared_ring() -> SharedRing {
        SharedRing::new(HashRing::new(8, HashFunction::Sha1).unwrap())
    }

    #[test]
    fn test_add_remove() {
        let shared = shared_ring();
        assert!(shared.add_node("slotA").unwrap());
        assert!(!shared.add_node("slotA").unwrap());
        assert!(shared.contains_node("slotA").unwrap());
        assert!(shared.remove_node("slotA").unwrap());
        assert!(!shared.remove_node("slotA").unwrap());
        assert_eq!(shared.node_count().unwrap(), 0);
    }

    #[test]
    fn test_empty_lookups() {
        let shared = shared_ring();
        assert_eq!(shared.find_node("key"), Err(RingError::EmptyRing));
        assert_eq!(shared.find_next_highest_item(7), Err(RingError::EmptyRing));
    }

    #[test]
    fn test_snapshot_isolated_from_writes() {
        let shared = shared_ring();
        shared.add_node("slotA").unwrap();
        let snapshot = shared.snapshot().unwrap();

        shared.add_node("slotB").unwrap();
        shared.remove_node("slotA").unwrap();

        assert_eq!(snapshot.node_count(), 1);
        assert!(snapshot.contains_node("slotA"));
        assert_eq!(snapshot.find_node("keyB_").unwrap(), "slotA");
        assert_eq!(shared.find_node("keyB_").unwrap(), "slotB");
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let shared = shared_ring();
        shared.add_node("slotA").unwrap();
        shared.add_node("slotB").unwrap();
        let expected = shared.find_node("keyB_").unwrap();

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..32 {
                    shared.add_node(format!("extra-{}", i)).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        let owner = shared.find_node("keyA").unwrap();
                        assert!(shared.snapshot().unwrap().contains_node(&owner));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(shared.node_count().unwrap(), 34);
        assert!(shared.snapshot().unwrap().verify().is_ok());
        // keyB_ either kept its owner or moved to one of the new nodes
        let owner = shared.find_node("keyB_").unwrap();
        assert!(owner == expected || owner.to_string().starts_with("extra-"));
    }
}
