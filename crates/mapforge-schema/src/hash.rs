//! Structural fingerprints
//!
//! Provides [`Fingerprint`], a 32-byte Blake3 digest of a schema or
//! configuration value. Two structurally equal inputs always produce the
//! same fingerprint, which makes it usable as a memoization key.

use std::fmt::{self, Display, Formatter};

/// A 32-byte structural fingerprint (Blake3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute Blake3 fingerprint of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Compute fingerprint from a serializable value (JSON encoding)
    ///
    /// The encoding only depends on field order and `Vec` order, so
    /// structurally equal values hash identically.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn of<T>(value: &T) -> Result<Self, HashError>
    where
        T: serde::Serialize,
    {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }

    /// Combine several fingerprints into one, order-sensitive
    #[must_use]
    pub fn combine(parts: &[Fingerprint]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(&part.0);
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Errors related to fingerprint computation
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Serialization failed while computing a fingerprint
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
