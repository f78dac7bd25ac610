//! mapforge Plan Engine
//!
//! Assembles complete [`MappingPlan`]s for source/target pairs and serves
//! them through a memoizing, parallel [`MappingSession`].
//!
//! # Core Concepts
//!
//! - [`PlanAssembler`]: Runs every resolver for one pair
//! - [`MappingPlan`]: Immutable, renderer-ready conversion description
//! - [`MappingSession`]: Cache + rayon batch + transitive dependency walk
//! - [`PlanCache`]: moka cache keyed by a Blake3 fingerprint of the inputs
//! - [`SchemaProvider`] / [`PlanRenderer`]: Input and output seams
//!
//! # Example
//!
//! ```rust
//! use mapforge_plan::prelude::*;
//! use mapforge_schema::{MemberDescriptor, Primitive, TypeDescriptor, TypeTable};
//!
//! let mut table = TypeTable::new();
//! let order = table.insert(
//!     TypeDescriptor::class("App.Order")
//!         .with_member(MemberDescriptor::new("Total", Primitive::I32)),
//! );
//! let dto = table.insert(
//!     TypeDescriptor::class("App.OrderDto")
//!         .with_member(MemberDescriptor::new("Total", Primitive::I64)),
//! );
//!
//! let session = MappingSession::new(table).unwrap();
//! let plan = session.resolve(order, dto, &MappingConfiguration::new()).unwrap();
//! assert_eq!(plan.properties.len(), 1);
//! ```

#![warn(unreachable_pub)]

mod assembler;
mod cache;
mod error;
mod plan;
mod provider;
mod render;
mod session;

pub use assembler::PlanAssembler;
pub use cache::{plan_key, CacheStats, PlanCache};
pub use error::PlanError;
pub use plan::{MappingPlan, RuntimeFailure};
pub use provider::{SchemaProvider, StaticSchema};
pub use render::{render_plan, JsonRenderer, PlanRenderer, RenderError};
pub use session::{MappingRequest, MappingSession, PlanGraph};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        MappingPlan, MappingRequest, MappingSession, PlanAssembler, PlanError, PlanRenderer,
        SchemaProvider,
    };
    pub use mapforge_schema::MappingConfiguration;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
