//! Error types for plan assembly
//!
//! A rejected pair carries every diagnostic collected while resolving it;
//! the other variants are engine failures.

use mapforge_diagnostics::Diagnostics;
use mapforge_resolve::ResolveError;
use mapforge_schema::{HashError, SchemaError};

/// Failure to produce a plan for one pair
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// At least one error diagnostic was reported
    #[error("mapping rejected with {} error(s)", .0.errors().count())]
    Rejected(Diagnostics),

    /// Cancellation was requested while resolving
    #[error("resolution cancelled")]
    Cancelled,

    /// A type id does not belong to the table
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Fingerprinting the inputs failed
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] HashError),

    /// Plan (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlanError {
    /// Diagnostics of a rejected pair
    #[must_use]
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Rejected(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }

    /// Whether the failure is a cancellation
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<ResolveError> for PlanError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Schema(e) => Self::Schema(e),
            ResolveError::Cancelled => Self::Cancelled,
        }
    }
}
