//! Mapping configuration
//!
//! Settings arrive in layers: assembly-level defaults, per-type overrides
//! on the target descriptor, the mapper attribute and per-call overrides.
//! [`MappingConfiguration::settings_for`] merges them, later layers winning,
//! into one [`MappingSettings`]. Directives, hooks and declared functions
//! are carried alongside unchanged.

use crate::descriptor::{
    FunctionDescriptor, IgnoreDirective, Location, ParameterDescriptor, TypeDescriptor,
};
use crate::path::MemberPath;
use crate::types::{CollectionShape, NullableContext, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Null-handling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Decide per member from effective nullability
    #[default]
    Auto,
    /// Guard and skip (or propagate null) when the source is absent
    SetNull,
    /// Raise an argument-null failure when the source is absent
    ThrowException,
    /// Coalesce absent collections to an empty instance of the target shape
    SetEmptyCollection,
}

/// Reference (cycle guard) handling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceHandling {
    /// Enable when the target schema may form cycles
    #[default]
    Auto,
    /// Always thread an identity lookup table
    Enabled,
    /// Pure conversions without lookup table
    Disabled,
}

/// Enum-to-enum conversion strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumStrategy {
    /// Cast the underlying value
    #[default]
    ByUnderlyingValue,
    /// Match member names exactly
    ByName,
    /// Match member names ignoring case
    ByNameCaseInsensitive,
}

/// Strict enum validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrictEnumMode {
    /// No validation
    #[default]
    Off,
    /// Every source member must exist on the target
    SourceOnly,
    /// Every target member must exist on the source
    TargetOnly,
    /// Both directions
    SourceAndTarget,
}

impl StrictEnumMode {
    /// Whether source-excess members are reported
    #[inline]
    #[must_use]
    pub fn checks_source(self) -> bool {
        matches!(self, Self::SourceOnly | Self::SourceAndTarget)
    }

    /// Whether target-excess members are reported
    #[inline]
    #[must_use]
    pub fn checks_target(self) -> bool {
        matches!(self, Self::TargetOnly | Self::SourceAndTarget)
    }
}

/// How member names are compared between source and target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatching {
    /// Exact match
    #[default]
    CaseSensitive,
    /// ASCII case-insensitive match
    CaseInsensitive,
}

impl NameMatching {
    /// Compare two member names
    #[inline]
    #[must_use]
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            Self::CaseSensitive => a == b,
            Self::CaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }
}

/// One configuration layer; unset fields defer to lower layers
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    /// Null-handling policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_policy: Option<NullPolicy>,
    /// Reference handling mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_handling: Option<ReferenceHandling>,
    /// Default enum strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_strategy: Option<EnumStrategy>,
    /// Default strict enum mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_enum: Option<StrictEnumMode>,
    /// Copy primitive arrays element-wise instead of reusing them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_primitive_arrays: Option<bool>,
    /// Member name comparison
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_matching: Option<NameMatching>,
    /// Ambient nullable context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable_context: Option<NullableContext>,
}

impl ConfigOverrides {
    /// Empty layer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With null policy
    #[inline]
    #[must_use]
    pub fn with_null_policy(mut self, policy: NullPolicy) -> Self {
        self.null_policy = Some(policy);
        self
    }

    /// With reference handling
    #[inline]
    #[must_use]
    pub fn with_reference_handling(mut self, mode: ReferenceHandling) -> Self {
        self.reference_handling = Some(mode);
        self
    }

    /// With enum strategy
    #[inline]
    #[must_use]
    pub fn with_enum_strategy(mut self, strategy: EnumStrategy) -> Self {
        self.enum_strategy = Some(strategy);
        self
    }

    /// With strict enum mode
    #[inline]
    #[must_use]
    pub fn with_strict_enum(mut self, mode: StrictEnumMode) -> Self {
        self.strict_enum = Some(mode);
        self
    }

    /// With primitive array copying
    #[inline]
    #[must_use]
    pub fn with_copy_primitive_arrays(mut self, enabled: bool) -> Self {
        self.copy_primitive_arrays = Some(enabled);
        self
    }

    /// With name matching
    #[inline]
    #[must_use]
    pub fn with_name_matching(mut self, matching: NameMatching) -> Self {
        self.name_matching = Some(matching);
        self
    }

    /// With nullable context
    #[inline]
    #[must_use]
    pub fn with_nullable_context(mut self, context: NullableContext) -> Self {
        self.nullable_context = Some(context);
        self
    }
}

/// Fully merged settings for one mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingSettings {
    /// Null-handling policy
    pub null_policy: NullPolicy,
    /// Reference handling mode
    pub reference_handling: ReferenceHandling,
    /// Default enum strategy
    pub enum_strategy: EnumStrategy,
    /// Default strict enum mode
    pub strict_enum: StrictEnumMode,
    /// Copy primitive arrays element-wise
    pub copy_primitive_arrays: bool,
    /// Member name comparison
    pub name_matching: NameMatching,
    /// Ambient nullable context
    pub nullable_context: NullableContext,
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            null_policy: NullPolicy::Auto,
            reference_handling: ReferenceHandling::Auto,
            enum_strategy: EnumStrategy::ByUnderlyingValue,
            strict_enum: StrictEnumMode::Off,
            copy_primitive_arrays: false,
            name_matching: NameMatching::CaseSensitive,
            nullable_context: NullableContext::Enabled,
        }
    }
}

impl MappingSettings {
    /// Apply one layer on top of these settings
    #[must_use]
    pub fn apply(mut self, layer: &ConfigOverrides) -> Self {
        if let Some(v) = layer.null_policy {
            self.null_policy = v;
        }
        if let Some(v) = layer.reference_handling {
            self.reference_handling = v;
        }
        if let Some(v) = layer.enum_strategy {
            self.enum_strategy = v;
        }
        if let Some(v) = layer.strict_enum {
            self.strict_enum = v;
        }
        if let Some(v) = layer.copy_primitive_arrays {
            self.copy_primitive_arrays = v;
        }
        if let Some(v) = layer.name_matching {
            self.name_matching = v;
        }
        if let Some(v) = layer.nullable_context {
            self.nullable_context = v;
        }
        self
    }
}

/// A converter referenced by a member directive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterSpec {
    /// A declared function, looked up by name
    Named(String),
    /// An anonymous converter written inline
    Inline {
        /// Inline parameters
        parameters: Vec<ParameterDescriptor>,
        /// Inline return type
        returns: TypeRef,
    },
}

/// Per-member directive on the mapping declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberDirective {
    /// Do not map the target member
    Ignore {
        /// Target member name
        target: String,
        /// Directive location
        #[serde(default)]
        location: Option<Location>,
    },
    /// Take the target member from another source member or path
    MapFrom {
        /// Target member name
        target: String,
        /// Source path
        source: MemberPath,
        /// Directive location
        #[serde(default)]
        location: Option<Location>,
    },
    /// Convert the target member through a user function
    Converter {
        /// Target member name
        target: String,
        /// Converter reference
        converter: ConverterSpec,
        /// Directive location
        #[serde(default)]
        location: Option<Location>,
    },
}

impl MemberDirective {
    /// Target member the directive applies to
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Ignore { target, .. }
            | Self::MapFrom { target, .. }
            | Self::Converter { target, .. } => target,
        }
    }

    /// Directive location
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Ignore { location, .. }
            | Self::MapFrom { location, .. }
            | Self::Converter { location, .. } => location.as_ref(),
        }
    }
}

/// Reference to a before/after hook function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookRef {
    /// Function name
    pub name: String,
    /// Where the hook was declared on the mapping
    #[serde(default)]
    pub location: Option<Location>,
}

impl HookRef {
    /// Hook by name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
        }
    }
}

/// Explicit source → target enum value correspondence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValueOverride {
    /// Source member name
    pub source: String,
    /// Target member name
    pub target: String,
}

/// Configuration for one enum pair, overriding the defaults
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumPairConfig {
    /// Fully-qualified source enum name
    pub source: String,
    /// Fully-qualified target enum name
    pub target: String,
    /// Strategy override
    #[serde(default)]
    pub strategy: Option<EnumStrategy>,
    /// Strict mode override
    #[serde(default)]
    pub strict: Option<StrictEnumMode>,
    /// Target member used when no correspondence exists
    #[serde(default)]
    pub fallback: Option<String>,
    /// Explicit value correspondences
    #[serde(default)]
    pub value_overrides: Vec<EnumValueOverride>,
    /// Declaration-level ignores of this pair, wherever it is mapped
    #[serde(default)]
    pub ignores: Vec<IgnoreDirective>,
}

impl EnumPairConfig {
    /// Pair configuration without overrides
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            strategy: None,
            strict: None,
            fallback: None,
            value_overrides: Vec::new(),
            ignores: Vec::new(),
        }
    }

    /// With strategy
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: EnumStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// With strict mode
    #[inline]
    #[must_use]
    pub fn with_strict(mut self, strict: StrictEnumMode) -> Self {
        self.strict = Some(strict);
        self
    }

    /// With fallback target member
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, member: impl Into<String>) -> Self {
        self.fallback = Some(member.into());
        self
    }

    /// With explicit value correspondence
    #[inline]
    #[must_use]
    pub fn with_value(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.value_overrides.push(EnumValueOverride {
            source: source.into(),
            target: target.into(),
        });
        self
    }

    /// With declaration-level ignore directive
    #[inline]
    #[must_use]
    pub fn with_ignore(mut self, directive: IgnoreDirective) -> Self {
        self.ignores.push(directive);
        self
    }
}

fn all_shapes() -> BTreeSet<CollectionShape> {
    CollectionShape::ALL.into_iter().collect()
}

/// Everything the provider hands the engine for one mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfiguration {
    /// Assembly-level layer
    pub assembly: ConfigOverrides,
    /// Mapper attribute layer
    pub mapper: ConfigOverrides,
    /// Per-call layer
    pub call: ConfigOverrides,
    /// Collection shapes the renderer can materialize
    pub projection_shapes: BTreeSet<CollectionShape>,
    /// Hook run before mapping
    pub before_map: Option<HookRef>,
    /// Hook run after mapping
    pub after_map: Option<HookRef>,
    /// Per-member directives
    pub directives: Vec<MemberDirective>,
    /// Per-enum-pair configuration
    pub enum_pairs: Vec<EnumPairConfig>,
    /// Declaration-level enum ignore directives of a top-level enum mapping
    pub enum_ignores: Vec<IgnoreDirective>,
    /// Functions declared on the mapper
    pub functions: Vec<FunctionDescriptor>,
    /// Type of the optional converter parameter bag
    pub parameter_bag: Option<TypeRef>,
}

impl Default for MappingConfiguration {
    fn default() -> Self {
        Self {
            assembly: ConfigOverrides::default(),
            mapper: ConfigOverrides::default(),
            call: ConfigOverrides::default(),
            projection_shapes: all_shapes(),
            before_map: None,
            after_map: None,
            directives: Vec::new(),
            enum_pairs: Vec::new(),
            enum_ignores: Vec::new(),
            functions: Vec::new(),
            parameter_bag: None,
        }
    }
}

impl MappingConfiguration {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the layers for a target type
    ///
    /// Order: defaults, assembly, target type overrides, mapper, call.
    #[must_use]
    pub fn settings_for(&self, target: &TypeDescriptor) -> MappingSettings {
        MappingSettings::default()
            .apply(&self.assembly)
            .apply(&target.overrides)
            .apply(&self.mapper)
            .apply(&self.call)
    }

    /// Configuration for an implicitly generated nested mapping
    ///
    /// Keeps the settings layers, declared functions, enum pair
    /// configuration and parameter bag; drops everything that was written
    /// for the outer pair's members.
    #[must_use]
    pub fn for_nested(&self) -> Self {
        Self {
            before_map: None,
            after_map: None,
            directives: Vec::new(),
            enum_ignores: Vec::new(),
            ..self.clone()
        }
    }

    /// With assembly layer
    #[inline]
    #[must_use]
    pub fn with_assembly(mut self, layer: ConfigOverrides) -> Self {
        self.assembly = layer;
        self
    }

    /// With mapper layer
    #[inline]
    #[must_use]
    pub fn with_mapper(mut self, layer: ConfigOverrides) -> Self {
        self.mapper = layer;
        self
    }

    /// With per-call layer
    #[inline]
    #[must_use]
    pub fn with_call(mut self, layer: ConfigOverrides) -> Self {
        self.call = layer;
        self
    }

    /// Restrict projection shapes
    #[inline]
    #[must_use]
    pub fn with_projection_shapes(
        mut self,
        shapes: impl IntoIterator<Item = CollectionShape>,
    ) -> Self {
        self.projection_shapes = shapes.into_iter().collect();
        self
    }

    /// With before hook
    #[inline]
    #[must_use]
    pub fn with_before_map(mut self, hook: HookRef) -> Self {
        self.before_map = Some(hook);
        self
    }

    /// With after hook
    #[inline]
    #[must_use]
    pub fn with_after_map(mut self, hook: HookRef) -> Self {
        self.after_map = Some(hook);
        self
    }

    /// Add a member directive
    #[inline]
    #[must_use]
    pub fn with_directive(mut self, directive: MemberDirective) -> Self {
        self.directives.push(directive);
        self
    }

    /// Ignore a target member
    #[must_use]
    pub fn ignore(self, target: impl Into<String>) -> Self {
        self.with_directive(MemberDirective::Ignore {
            target: target.into(),
            location: None,
        })
    }

    /// Map a target member from a source path
    #[must_use]
    pub fn map_from(self, target: impl Into<String>, source: MemberPath) -> Self {
        self.with_directive(MemberDirective::MapFrom {
            target: target.into(),
            source,
            location: None,
        })
    }

    /// Convert a target member through a user function
    #[must_use]
    pub fn convert_with(self, target: impl Into<String>, converter: ConverterSpec) -> Self {
        self.with_directive(MemberDirective::Converter {
            target: target.into(),
            converter,
            location: None,
        })
    }

    /// Add per-enum-pair configuration
    #[inline]
    #[must_use]
    pub fn with_enum_pair(mut self, pair: EnumPairConfig) -> Self {
        self.enum_pairs.push(pair);
        self
    }

    /// Add a declaration-level enum ignore directive
    #[inline]
    #[must_use]
    pub fn with_enum_ignore(mut self, directive: IgnoreDirective) -> Self {
        self.enum_ignores.push(directive);
        self
    }

    /// Declare a function
    #[inline]
    #[must_use]
    pub fn with_function(mut self, function: FunctionDescriptor) -> Self {
        self.functions.push(function);
        self
    }

    /// With converter parameter bag type
    #[inline]
    #[must_use]
    pub fn with_parameter_bag(mut self, ty: TypeRef) -> Self {
        self.parameter_bag = Some(ty);
        self
    }

    /// Find a declared function by name
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Configuration for an enum pair
    #[must_use]
    pub fn enum_pair(&self, source: &str, target: &str) -> Option<&EnumPairConfig> {
        self.enum_pairs
            .iter()
            .find(|p| p.source == source && p.target == target)
    }

    /// Directives for a target member, in declaration order
    pub fn directives_for<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = &'a MemberDirective> + 'a {
        self.directives.iter().filter(move |d| d.target() == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_win() {
        let target = TypeDescriptor::class("T")
            .with_overrides(ConfigOverrides::new().with_null_policy(NullPolicy::SetNull));
        let config = MappingConfiguration::new()
            .with_assembly(
                ConfigOverrides::new()
                    .with_null_policy(NullPolicy::ThrowException)
                    .with_copy_primitive_arrays(true),
            )
            .with_call(ConfigOverrides::new().with_enum_strategy(EnumStrategy::ByName));

        let settings = config.settings_for(&target);
        assert_eq!(settings.null_policy, NullPolicy::SetNull);
        assert!(settings.copy_primitive_arrays);
        assert_eq!(settings.enum_strategy, EnumStrategy::ByName);
        assert_eq!(settings.reference_handling, ReferenceHandling::Auto);
    }

    #[test]
    fn call_layer_beats_type_overrides() {
        let target = TypeDescriptor::class("T")
            .with_overrides(ConfigOverrides::new().with_null_policy(NullPolicy::SetNull));
        let config = MappingConfiguration::new()
            .with_call(ConfigOverrides::new().with_null_policy(NullPolicy::SetEmptyCollection));
        assert_eq!(
            config.settings_for(&target).null_policy,
            NullPolicy::SetEmptyCollection
        );
    }

    #[test]
    fn default_projection_shapes_cover_everything() {
        let config = MappingConfiguration::new();
        assert_eq!(config.projection_shapes.len(), CollectionShape::ALL.len());
    }

    #[test]
    fn nested_configuration_drops_member_directives() {
        let config = MappingConfiguration::new()
            .ignore("Secret")
            .with_before_map(HookRef::new("Before"))
            .with_function(FunctionDescriptor::new("Convert"));
        let nested = config.for_nested();
        assert!(nested.directives.is_empty());
        assert!(nested.before_map.is_none());
        assert!(nested.function("Convert").is_some());
    }

    #[test]
    fn directives_for_filters_by_target() {
        let config = MappingConfiguration::new()
            .ignore("A")
            .map_from("B", "Other".parse().unwrap());
        assert_eq!(config.directives_for("B").count(), 1);
        assert_eq!(config.directives_for("C").count(), 0);
    }

    #[test]
    fn strict_mode_sides() {
        assert!(StrictEnumMode::SourceOnly.checks_source());
        assert!(!StrictEnumMode::SourceOnly.checks_target());
        assert!(StrictEnumMode::SourceAndTarget.checks_target());
        assert!(!StrictEnumMode::Off.checks_source());
    }

    #[test]
    fn configuration_json_roundtrip_uses_defaults() {
        let config: MappingConfiguration = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MappingConfiguration::default());
    }
}
