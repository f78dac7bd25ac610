//! mapforge Diagnostics
//!
//! Build-time diagnostics are data, not errors: every resolver returns a
//! [`Resolved<T>`] carrying a value plus the [`Diagnostics`] it produced,
//! and the assembler decides whether the pair is rejected.

#![warn(unreachable_pub)]

mod diagnostic;
mod kind;

pub use diagnostic::{Diagnostic, Diagnostics, Resolved};
pub use kind::{DiagnosticKind, Severity};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
