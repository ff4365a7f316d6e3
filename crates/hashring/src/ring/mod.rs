//! The ring store: sorted points, node membership and successor lookup.
//!
//! Every node is placed on the ring `replicas` times. A key is owned by the
//! node of the first point at or after the key's coordinate, wrapping
//! around to the lowest point when the key lies past the last one. Adding
//! or removing a node therefore only moves the keys that fall between its
//! points and their predecessors.

use crate::coordinate::{CoordinateFunction, HashFunction, HashMode};
use crate::error::{RingError, RingResult};
use crate::types::{NodeId, RingConfig, RingPoint, DEFAULT_REPLICAS};
use std::fmt;
use tracing::{debug, error};

/// A consistent hash ring over caller-named nodes.
///
/// The point vector is kept sorted by `(coordinate, node)` at all times.
/// Lookups are a binary search; adding a node inserts each of its points
/// at its sorted position rather than re-sorting the whole ring.
///
/// # Thread Safety
///
/// `HashRing` is a plain owned value. Share it read-only behind an `Arc`,
/// or use [`SharedRing`](crate::SharedRing) for concurrent reads with
/// serialized updates.
///
/// # Example
///
/// ```
/// use hashring::{HashFunction, HashRing};
///
/// let mut ring = HashRing::new(8, HashFunction::Sha1).unwrap();
/// assert!(ring.add_node("slotA"));
/// assert!(ring.add_node("slotB"));
///
/// let owner = ring.find_node("keyB_").unwrap();
/// assert_eq!(owner, "slotB");
/// ```
#[derive(Debug, Clone)]
pub struct HashRing {
    /// All points, sorted ascending.
    points: Vec<RingPoint>,
    /// Present nodes in the order they were added.
    nodes: Vec<NodeId>,
    /// Points per node.
    replicas: u32,
    coordinates: CoordinateFunction,
}

impl HashRing {
    /// Create an empty normal-mode ring.
    ///
    /// # Errors
    ///
    /// [`RingError::InvalidConfiguration`] if `replicas` is 0.
    pub fn new(replicas: u32, hash_function: HashFunction) -> RingResult<Self> {
        Self::with_config(&RingConfig::new(replicas, hash_function))
    }

    /// Create an empty ring from a full configuration.
    pub fn with_config(config: &RingConfig) -> RingResult<Self> {
        let coordinates = config.validate()?;
        Ok(Self {
            points: Vec::new(),
            nodes: Vec::new(),
            replicas: config.replicas,
            coordinates,
        })
    }

    /// Create a ring and add every node in `nodes`.
    ///
    /// Duplicates and empty identifiers are skipped, as with
    /// [`add_node`](Self::add_node).
    pub fn with_nodes<I, N>(config: &RingConfig, nodes: I) -> RingResult<Self>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<[u8]>,
    {
        let mut ring = Self::with_config(config)?;
        for node in nodes {
            ring.add_node(node);
        }
        Ok(ring)
    }

    /// Add a node to the ring.
    ///
    /// Returns `false` without changing anything if the node is already
    /// present or the identifier is empty.
    pub fn add_node(&mut self, node: impl AsRef<[u8]>) -> bool {
        let node = node.as_ref();
        if node.is_empty() || self.contains_node(node) {
            return false;
        }

        let id = NodeId::from(node);
        self.points.reserve(self.replicas as usize);
        for index in 0..self.replicas {
            let coordinate = self.coordinates.replica_coordinate(node, index);
            let point = RingPoint::new(coordinate, id.clone());
            let at = self.points.partition_point(|p| p < &point);
            self.points.insert(at, point);
        }
        debug!(
            node = %id,
            replicas = self.replicas,
            points = self.points.len(),
            "Added node to ring"
        );
        self.nodes.push(id);
        true
    }

    /// Remove a node and all of its points.
    ///
    /// Returns `false` if the node is not present.
    pub fn remove_node(&mut self, node: impl AsRef<[u8]>) -> bool {
        let node = node.as_ref();
        let Some(position) = self.nodes.iter().position(|n| n.as_bytes() == node) else {
            return false;
        };
        let id = self.nodes.remove(position);

        let before = self.points.len();
        self.points.retain(|p| p.node != id);
        let removed = before - self.points.len();

        if removed != self.replicas as usize {
            error!(
                node = %id,
                removed,
                replicas = self.replicas,
                "Ring held the wrong number of points for a node"
            );
            debug_assert_eq!(removed, self.replicas as usize);
        }
        debug!(node = %id, removed, points = self.points.len(), "Removed node from ring");
        true
    }

    /// Whether `node` currently owns points on the ring.
    pub fn contains_node(&self, node: impl AsRef<[u8]>) -> bool {
        let node = node.as_ref();
        self.nodes.iter().any(|n| n.as_bytes() == node)
    }

    /// Find the node that owns `key`.
    ///
    /// # Errors
    ///
    /// [`RingError::EmptyRing`] if no nodes are present.
    pub fn find_node(&self, key: impl AsRef<[u8]>) -> RingResult<NodeId> {
        let coordinate = self.coordinate_of(key);
        Ok(self.find_point(coordinate)?.node.clone())
    }

    /// Find up to `count` distinct nodes for `key`, in ring order.
    ///
    /// The first node is the key's owner; the rest are the next distinct
    /// owners walking clockwise. Useful for choosing replica targets.
    ///
    /// # Errors
    ///
    /// [`RingError::EmptyRing`] if no nodes are present.
    pub fn find_nodes(&self, key: impl AsRef<[u8]>, count: usize) -> RingResult<Vec<NodeId>> {
        let start = self.successor_index(self.coordinate_of(key))?;
        let wanted = count.min(self.nodes.len());
        let mut found: Vec<NodeId> = Vec::with_capacity(wanted);
        if wanted == 0 {
            return Ok(found);
        }

        let (before, after) = self.points.split_at(start);
        for point in after.iter().chain(before) {
            if !found.contains(&point.node) {
                found.push(point.node.clone());
                if found.len() == wanted {
                    break;
                }
            }
        }
        Ok(found)
    }

    /// Find the coordinate of the first point at or after `value`,
    /// wrapping around to the lowest point.
    ///
    /// # Errors
    ///
    /// [`RingError::EmptyRing`] if the ring has no points.
    pub fn find_next_highest_item(&self, value: u64) -> RingResult<u64> {
        Ok(self.find_point(value)?.coordinate)
    }

    /// Find the first point at or after `value`, wrapping around.
    pub fn find_point(&self, value: u64) -> RingResult<&RingPoint> {
        let index = self.successor_index(value)?;
        Ok(&self.points[index])
    }

    /// Coordinate of `key` under this ring's hash function and mode.
    pub fn coordinate_of(&self, key: impl AsRef<[u8]>) -> u64 {
        self.coordinates.coordinate(key.as_ref())
    }

    fn successor_index(&self, value: u64) -> RingResult<usize> {
        if self.points.is_empty() {
            return Err(RingError::EmptyRing);
        }
        let index = self.points.partition_point(|p| p.coordinate < value);
        if index == self.points.len() {
            Ok(0)
        } else {
            Ok(index)
        }
    }

    /// Check the ring's invariants.
    ///
    /// # Errors
    ///
    /// [`RingError::InternalInvariantViolation`] naming the first invariant
    /// found broken.
    pub fn verify(&self) -> RingResult<()> {
        if let Some(pair) = self.points.windows(2).find(|w| w[0] > w[1]) {
            return Err(RingError::InternalInvariantViolation(format!(
                "points out of order: {} before {}",
                pair[0], pair[1]
            )));
        }

        let expected = self.nodes.len() * self.replicas as usize;
        if self.points.len() != expected {
            return Err(RingError::InternalInvariantViolation(format!(
                "{} points for {} nodes at {} replicas",
                self.points.len(),
                self.nodes.len(),
                self.replicas
            )));
        }

        for node in &self.nodes {
            let owned = self.points.iter().filter(|p| &p.node == node).count();
            if owned != self.replicas as usize {
                return Err(RingError::InternalInvariantViolation(format!(
                    "node {} owns {} points, expected {}",
                    node, owned, self.replicas
                )));
            }
        }
        Ok(())
    }

    pub fn replicas(&self) -> u32 {
        self.replicas
    }

    pub fn hash_function(&self) -> HashFunction {
        self.coordinates.hash_function()
    }

    pub fn mode(&self) -> HashMode {
        self.coordinates.mode()
    }

    pub fn coordinate_function(&self) -> CoordinateFunction {
        self.coordinates
    }

    /// The configuration this ring was built with.
    pub fn config(&self) -> RingConfig {
        RingConfig::new(self.replicas, self.hash_function()).with_mode(self.mode())
    }

    /// Number of nodes present.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of points on the ring.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Present nodes in the order they were added.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    /// All points in ascending order.
    pub fn points(&self) -> &[RingPoint] {
        &self.points
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            nodes: Vec::new(),
            replicas: DEFAULT_REPLICAS,
            coordinates: CoordinateFunction::normal(HashFunction::default()),
        }
    }
}

/// Diagnostic dump of the ring. The layout is for people, not parsers.
impl fmt::Display for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hash ring ({}, {} mode)", self.hash_function(), self.mode())?;
        writeln!(f, "replicas: {}", self.replicas)?;
        writeln!(f)?;
        writeln!(f, "nodes ({}):", self.nodes.len())?;
        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f, "  {}: {}", i, node)?;
        }
        writeln!(f)?;
        writeln!(f, "points ({}):", self.points.len())?;
        for point in &self.points {
            writeln!(f, "  {:>20} : {}", point.coordinate, point.node)?;
        }
        Ok(())
    }
}
