//! mapforge Schema Model
//!
//! Immutable descriptors for the types a mapping converts between, plus the
//! layered configuration that steers resolution.
//!
//! # Core Concepts
//!
//! - [`TypeTable`]: Flat arena of [`TypeDescriptor`]s addressed by [`TypeId`]
//! - [`TypeRef`]: Primitive, named or collection type of a member
//! - [`MemberDescriptor`] / [`ConstructorDescriptor`] / [`FunctionDescriptor`]
//! - [`MappingConfiguration`]: Layered settings, directives, hooks, functions
//! - [`Fingerprint`]: 32-byte Blake3 structural hash used for memoization
//! - [`MemberPath`]: Dot-separated source access path
//!
//! # Example
//!
//! ```rust
//! use mapforge_schema::prelude::*;
//!
//! let mut table = TypeTable::new();
//! let manager = table.declare("App.Manager");
//! table
//!     .define(
//!         manager,
//!         TypeDescriptor::class("App.Manager")
//!             .with_member(MemberDescriptor::new("Id", Primitive::I32))
//!             .with_member(MemberDescriptor::new("Manager", manager).nullable()),
//!     )
//!     .unwrap();
//!
//! assert_eq!(table.get(manager).unwrap().members.len(), 2);
//! ```

#![warn(unreachable_pub)]

mod config;
mod descriptor;
mod hash;
mod path;
mod table;
mod types;

pub use config::{
    ConfigOverrides, ConverterSpec, EnumPairConfig, EnumStrategy, EnumValueOverride, HookRef,
    MappingConfiguration, MappingSettings, MemberDirective, NameMatching, NullPolicy,
    ReferenceHandling, StrictEnumMode,
};
pub use descriptor::{
    Accessibility, ConstructorDescriptor, DirectiveScope, EnumDescriptor, EnumMember,
    FunctionDescriptor, IgnoreDirective, Location, MemberDescriptor, MemberKind, Mutability,
    ParameterDescriptor, Semantics, Side, TypeDescriptor, TypeKind,
};
pub use hash::{Fingerprint, HashError};
pub use path::{MemberPath, PathError};
pub use table::{SchemaError, TypeId, TypeTable};
pub use types::{
    CollectionShape, CollectionType, Nullability, NullableContext, Primitive, ShapeCategory,
    TypeRef,
};

/// Convenience re-exports
pub mod prelude {
    pub use crate::{
        CollectionShape, ConfigOverrides, ConstructorDescriptor, EnumPairConfig, EnumStrategy,
        FunctionDescriptor, HookRef, IgnoreDirective, Location, MappingConfiguration,
        MemberDescriptor, MemberPath, NullPolicy, Nullability, ParameterDescriptor, Primitive,
        ReferenceHandling, Side, StrictEnumMode, TypeDescriptor, TypeId, TypeRef, TypeTable,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
