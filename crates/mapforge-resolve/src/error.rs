//! Engine-level resolver failures
//!
//! Problems in the user's declarations are diagnostics, not errors. These
//! variants abort resolution of one pair.

use mapforge_schema::SchemaError;

/// Failure that aborts resolving one pair
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Type table is inconsistent
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Cancellation was requested
    #[error("resolution cancelled")]
    Cancelled,
}
