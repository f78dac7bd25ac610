//! Diagnostic kinds and severities

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Severity of a diagnostic
///
/// Ordered so that `Error` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational, never blocks a plan
    Info,
    /// Reported, plan is still usable
    Warning,
    /// Plan is discarded
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Closed set of build-time diagnostic kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Source and target member types have no conversion strategy
    PropertyTypeIncompatible,
    /// The chosen constructor's parameters cannot all be satisfied
    MissingUsableConstructor,
    /// Designated constructor takes the target type itself
    SelfReferencingConstructorParameter,
    /// No projection exists between the collection shapes
    SuitableCollectionShapeNotFound,
    /// Strict enum validation found an unmatched member
    StrictEnumMappingMismatch,
    /// Ignore directive has the wrong number of arguments
    InvalidIgnoreDirectiveUsage,
    /// Converter directive names an unknown function
    ConverterNotFound,
    /// Converter input does not accept the source type
    ConverterInputIncompatible,
    /// Converter return is not assignable to the target type
    ConverterReturnIncompatible,
    /// Hook reference names an unknown function
    HookNotFound,
    /// Hook signature violates the hook rules
    HookInvalidParameters,
    /// Hook declared in a different nullable context
    HookMissingNullabilityAnnotation,
    /// Explicit source path does not resolve
    ConfiguredSourcePathNotFound,
    /// Source member never read by the plan
    SourceMemberNotMapped,
    /// Ignore directive names an unknown target member
    IgnoredMemberNotFound,
    /// Read-only member not covered by the constructor
    ReadOnlyMemberNotSettable,
    /// Enum fallback names an unknown target member
    EnumFallbackNotFound,
    /// Enum ignore directive names an unknown member
    IgnoredEnumMemberNotFound,
    /// Converter wants a parameter bag but none is configured
    ConverterParameterBagMissing,
}

impl DiagnosticKind {
    /// Every kind, in code order
    pub const ALL: [DiagnosticKind; 19] = [
        Self::PropertyTypeIncompatible,
        Self::MissingUsableConstructor,
        Self::SelfReferencingConstructorParameter,
        Self::SuitableCollectionShapeNotFound,
        Self::StrictEnumMappingMismatch,
        Self::InvalidIgnoreDirectiveUsage,
        Self::ConverterNotFound,
        Self::ConverterInputIncompatible,
        Self::ConverterReturnIncompatible,
        Self::HookNotFound,
        Self::HookInvalidParameters,
        Self::HookMissingNullabilityAnnotation,
        Self::ConfiguredSourcePathNotFound,
        Self::SourceMemberNotMapped,
        Self::IgnoredMemberNotFound,
        Self::ReadOnlyMemberNotSettable,
        Self::EnumFallbackNotFound,
        Self::IgnoredEnumMemberNotFound,
        Self::ConverterParameterBagMissing,
    ];

    /// Stable identifier, `MF0001` onwards
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::PropertyTypeIncompatible => "MF0001",
            Self::MissingUsableConstructor => "MF0002",
            Self::SelfReferencingConstructorParameter => "MF0003",
            Self::SuitableCollectionShapeNotFound => "MF0004",
            Self::StrictEnumMappingMismatch => "MF0005",
            Self::InvalidIgnoreDirectiveUsage => "MF0006",
            Self::ConverterNotFound => "MF0007",
            Self::ConverterInputIncompatible => "MF0008",
            Self::ConverterReturnIncompatible => "MF0009",
            Self::HookNotFound => "MF0010",
            Self::HookInvalidParameters => "MF0011",
            Self::HookMissingNullabilityAnnotation => "MF0012",
            Self::ConfiguredSourcePathNotFound => "MF0013",
            Self::SourceMemberNotMapped => "MF0014",
            Self::IgnoredMemberNotFound => "MF0015",
            Self::ReadOnlyMemberNotSettable => "MF0016",
            Self::EnumFallbackNotFound => "MF0017",
            Self::IgnoredEnumMemberNotFound => "MF0018",
            Self::ConverterParameterBagMissing => "MF0019",
        }
    }

    /// Severity reported unless overridden
    #[must_use]
    pub fn default_severity(self) -> Severity {
        match self {
            Self::SourceMemberNotMapped => Severity::Info,
            Self::IgnoredMemberNotFound
            | Self::ReadOnlyMemberNotSettable
            | Self::IgnoredEnumMemberNotFound
            | Self::ConverterParameterBagMissing => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
