//! mapforge Resolvers
//!
//! The per-concern resolvers the plan assembler runs for one source/target
//! pair. Each one reads a [`ResolveContext`] and returns a
//! [`Resolved`](mapforge_diagnostics::Resolved) value plus diagnostics;
//! only engine failures ([`ResolveError`]) abort.
//!
//! # Core Concepts
//!
//! - [`resolve_properties`]: Source path, write mode, null handling and
//!   conversion per target member
//! - [`resolve_constructor`]: Constructor selection and argument binding
//! - [`resolve_projection`]: Collection shape projection
//! - [`resolve_enum_mapping`]: Enum strategy, correspondence table, strict mode
//! - [`resolve_null_handling`]: Null policy per member
//! - [`resolve_reference_handling`]: Cycle guard decision
//! - [`resolve_converter`] / [`resolve_hook`]: User function validation
//! - [`CancellationFlag`]: Cooperative cancellation, checked per member

#![warn(unreachable_pub)]

mod cancel;
mod collection;
mod constructor;
mod context;
mod conversion;
mod converter;
mod enums;
mod error;
mod hook;
mod null;
mod property;
mod reference;
mod source_path;

pub use cancel::CancellationFlag;
pub use collection::{resolve_projection, terminal_for, CollectionProjection, ShapeTerminal};
pub use constructor::{
    resolve_constructor, ArgumentSource, ConstructorArgument, ConstructorChoice,
    ConstructorResolution,
};
pub use context::{normalized_name, parameter_name, ResolveContext};
pub use conversion::{converter_conversion, resolve_conversion, TypePair, ValueConversion};
pub use converter::{
    lifted_name, resolve_converter, ConverterBinding, HelperFunction, ResolvedConverter,
};
pub use enums::{resolve_enum_mapping, EnumCorrespondence, EnumFallback, EnumMappingPlan};
pub use error::ResolveError;
pub use hook::{resolve_hook, HookArgument, HookBinding, HookStage};
pub use null::{resolve_null_handling, NullHandling, NullInputs};
pub use property::{
    resolve_properties, unmapped_source_members, ExternalParameter, InitMode, PropertyMapping,
    PropertyResolution,
};
pub use reference::{resolve_reference_handling, CycleGuard};
pub use source_path::{
    find_member, resolve_explicit, resolve_implicit, PathSegment, SourcePath,
    MAX_FLATTENING_DEPTH,
};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        CancellationFlag, ConstructorChoice, CycleGuard, EnumMappingPlan, HookBinding, InitMode,
        NullHandling, PropertyMapping, ResolveContext, ResolveError, TypePair, ValueConversion,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
