//! # hashring
//!
//! A consistent hash ring: keys are assigned to a dynamic set of named
//! nodes so that adding or removing a node remaps only the keys that fall
//! next to that node's points, instead of rehashing everything.
//!
//! ## Quick Start
//!
//! ```rust
//! use hashring::prelude::*;
//!
//! let mut ring = HashRing::new(8, HashFunction::Sha1)?;
//! ring.add_node("slotA");
//! ring.add_node("slotB");
//!
//! assert_eq!(ring.find_node("keyA")?, "slotA");
//! assert_eq!(ring.find_node("keyB_")?, "slotB");
//!
//! // Raw coordinates resolve to the next point at or after them.
//! let first = ring.points()[0].coordinate;
//! assert_eq!(ring.find_next_highest_item(u64::MAX)?, first);
//! # Ok::<(), RingError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`coordinate`] - SHA-1 / MD5 coordinate functions and placement keys
//! - [`ring`] - the sorted point store and its lookups
//! - [`shared`] - a lock-protected handle for concurrent use
//! - [`types`] - node identifiers, ring points, configuration
//!
//! ## Compatibility
//!
//! Digest choice, byte order, truncation and the placement-key layout are
//! fixed (see [`coordinate`]). Two rings built with the same
//! [`RingConfig`] and the same nodes agree on the owner of every key.

pub mod coordinate;
pub mod error;
pub mod ring;
pub mod shared;
pub mod types;

pub use coordinate::{placement_key, CoordinateFunction, HashFunction, HashMode};
pub use error::{RingError, RingResult};
pub use ring::HashRing;
pub use shared::SharedRing;
pub use types::{NodeId, RingConfig, RingPoint, DEFAULT_REPLICAS};

/// Commonly used items.
pub mod prelude {
    pub use crate::coordinate::{HashFunction, HashMode};
    pub use crate::error::{RingError, RingResult};
    pub use crate::ring::HashRing;
    pub use crate::shared::SharedRing;
    pub use crate::types::{NodeId, RingConfig, RingPoint};
}
