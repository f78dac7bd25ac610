//! The resolved mapping plan
//!
//! A plan is the complete, renderer-ready description of one source/target
//! conversion. It is built once by the assembler and never mutated.

use crate::error::PlanError;
use mapforge_diagnostics::Diagnostics;
use mapforge_resolve::{
    ConstructorArgument, ConstructorChoice, CycleGuard, EnumMappingPlan, ExternalParameter,
    HelperFunction, HookBinding, NullHandling, PropertyMapping, TypePair,
};
use mapforge_schema::{Fingerprint, HashError, MemberPath, TypeId};
use serde::{Deserialize, Serialize};

/// A failure the generated code may raise at runtime
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeFailure {
    /// An enum value without correspondence and no fallback
    EnumValueOutOfRange {
        /// Source enum
        source: TypeId,
        /// Target enum
        target: TypeId,
    },
    /// A null source value that cannot be skipped
    ArgumentNull {
        /// Source path reported by the failure
        path: MemberPath,
    },
}

/// Complete plan for converting one source type into one target type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingPlan {
    /// Source type
    pub source: TypeId,
    /// Target type
    pub target: TypeId,
    /// Source display name
    pub source_name: String,
    /// Target display name
    pub target_name: String,
    /// Constructor call
    pub constructor: ConstructorChoice,
    /// Member mappings in target declaration order
    pub properties: Vec<PropertyMapping>,
    /// Extra inputs of the generated conversion
    pub external_parameters: Vec<ExternalParameter>,
    /// Present only for enum-to-enum pairs
    pub enum_mapping: Option<EnumMappingPlan>,
    /// Whether the conversion threads an identity-keyed lookup table
    pub cycle_guard: CycleGuard,
    /// Hook run before any member is read
    pub before_map: Option<HookBinding>,
    /// Hook run after the target is built
    pub after_map: Option<HookBinding>,
    /// Lifted inline converters
    pub helpers: Vec<HelperFunction>,
    /// Pairs whose mappings this plan calls, in first-use order
    pub nested_pairs: Vec<TypePair>,
    /// Failures the generated code may raise
    pub runtime_failures: Vec<RuntimeFailure>,
    /// Warnings and infos; never errors
    pub diagnostics: Diagnostics,
}

impl MappingPlan {
    /// Source/target pair of this plan
    #[inline]
    #[must_use]
    pub fn pair(&self) -> TypePair {
        TypePair::new(self.source, self.target)
    }

    /// Whether this is an enum-only plan
    #[inline]
    #[must_use]
    pub fn is_enum_mapping(&self) -> bool {
        self.enum_mapping.is_some()
    }

    /// Mapping of a target member
    #[must_use]
    pub fn property(&self, target: &str) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.target == target)
    }

    /// Members written after construction, in declaration order
    pub fn post_construction(&self) -> impl Iterator<Item = &PropertyMapping> {
        self.properties
            .iter()
            .filter(|p| p.init_mode.is_post_construction())
    }

    /// Arguments of the constructor call, in parameter order
    #[inline]
    #[must_use]
    pub fn constructor_arguments(&self) -> &[ConstructorArgument] {
        self.constructor.arguments()
    }

    /// External parameter feeding a target member
    #[must_use]
    pub fn external_parameter(&self, member: &str) -> Option<&ExternalParameter> {
        self.external_parameters.iter().find(|p| p.member == member)
    }

    /// Structural fingerprint
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn fingerprint(&self) -> Result<Fingerprint, HashError> {
        Fingerprint::of(self)
    }

    /// Serialize to JSON
    ///
    /// # Errors
    /// Returns [`PlanError::Serialization`] if encoding fails
    pub fn to_json(&self) -> Result<String, PlanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    ///
    /// # Errors
    /// Returns [`PlanError::Serialization`] for malformed input
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Collect the runtime failures of a set of mappings, deduplicated in order
pub(crate) fn runtime_failures<'p>(
    properties: impl IntoIterator<Item = &'p PropertyMapping>,
    enum_mapping: Option<&EnumMappingPlan>,
) -> Vec<RuntimeFailure> {
    let mut failures = Vec::new();
    let mut push = |failure: RuntimeFailure| {
        if !failures.contains(&failure) {
            failures.push(failure);
        }
    };

    let enum_failure = |plan: &EnumMappingPlan| {
        plan.can_fail().then_some(RuntimeFailure::EnumValueOutOfRange {
            source: plan.source,
            target: plan.target,
        })
    };

    if let Some(failure) = enum_mapping.and_then(enum_failure) {
        push(failure);
    }
    for property in properties {
        if let NullHandling::Throw { path } = &property.null_handling {
            push(RuntimeFailure::ArgumentNull { path: path.clone() });
        }
        for plan in property.conversion.enum_plans() {
            if let Some(failure) = enum_failure(plan) {
                push(failure);
            }
        }
    }
    failures
}
