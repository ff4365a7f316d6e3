//! Error types for ring construction and lookup.

use thiserror::Error;

/// Errors that can occur while building or querying a hash ring.
///
/// Adding and removing nodes never produce an error: "already present" and
/// "not present" are ordinary outcomes reported as `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    /// Construction parameters were rejected (zero replicas, a mode the
    /// chosen hash function does not support, an unknown selector).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A lookup was attempted on a ring with no nodes.
    #[error("Ring is empty")]
    EmptyRing,

    /// The ring's internal state no longer satisfies its invariants.
    ///
    /// Never produced under correct use. Callers should treat it as fatal.
    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}

/// Result type for ring operations.
pub type RingResult<T> = Result<T, RingError>;
