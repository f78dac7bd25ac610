//! Null handling

use mapforge_schema::{CollectionShape, MemberPath, NullPolicy, TypeRef};
use serde::{Deserialize, Serialize};

/// How a possibly-absent source value reaches the target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    /// Source cannot be null, assign as is
    Direct,
    /// Guarded assignment, skipped when the source is absent
    SkipWhenNull,
    /// Target admits null, pass it through
    Propagate,
    /// Raise an argument-null failure naming the source path
    Throw {
        /// Source path reported by the failure
        path: MemberPath,
    },
    /// Replace an absent collection by an empty instance of the target shape
    CoalesceEmpty {
        /// Shape of the empty instance
        shape: CollectionShape,
    },
}

impl NullHandling {
    /// Variant for a value that cannot be left unset
    ///
    /// Constructor arguments and object-initializer members have no
    /// "skip" form, so a guarded skip becomes a failure.
    #[must_use]
    pub fn unskippable(self, path: &MemberPath) -> Self {
        match self {
            Self::SkipWhenNull => Self::Throw { path: path.clone() },
            other => other,
        }
    }

    /// Whether the generated expression may raise an argument-null failure
    #[inline]
    #[must_use]
    pub fn throws(&self) -> bool {
        matches!(self, Self::Throw { .. })
    }
}

/// Inputs of the null-handling decision for one member
#[derive(Debug, Clone, Copy)]
pub struct NullInputs<'a> {
    /// Effective source nullability along the whole path
    pub source_nullable: bool,
    /// Effective target nullability
    pub target_nullable: bool,
    /// Target member type
    pub target_type: &'a TypeRef,
    /// Source access path
    pub source_path: &'a MemberPath,
    /// Whether the member may be left unset
    pub skippable: bool,
}

/// Decide null handling for one member
#[must_use]
pub fn resolve_null_handling(policy: NullPolicy, inputs: NullInputs<'_>) -> NullHandling {
    if !inputs.source_nullable {
        return NullHandling::Direct;
    }

    let collection_shape = inputs.target_type.as_collection().map(|c| c.shape);
    match (policy, collection_shape) {
        (NullPolicy::ThrowException, _) => NullHandling::Throw {
            path: inputs.source_path.clone(),
        },
        (NullPolicy::SetEmptyCollection, Some(shape)) => NullHandling::CoalesceEmpty { shape },
        _ if inputs.target_nullable => NullHandling::Propagate,
        _ if inputs.skippable => NullHandling::SkipWhenNull,
        _ => NullHandling::Throw {
            path: inputs.source_path.clone(),
        },
    }
}
