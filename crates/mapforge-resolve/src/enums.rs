//! Enum-to-enum mapping
//!
//! Strategy precedence is per-pair configuration over the merged default.
//! `ByUnderlyingValue` casts; the by-name strategies build a correspondence
//! table over the target members in ascending value order. Explicit value
//! overrides are honored by every strategy and always come first.

use crate::error::ResolveError;
use mapforge_diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Resolved};
use mapforge_schema::{
    DirectiveScope, EnumDescriptor, EnumMember, EnumStrategy, IgnoreDirective, Location,
    MappingConfiguration, MappingSettings, SchemaError, Side, StrictEnumMode, TypeDescriptor,
    TypeId, TypeTable,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of the correspondence table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumCorrespondence {
    /// Source member name
    pub source: String,
    /// Target member name
    pub target: String,
}

/// What happens to a source value without a correspondence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumFallback {
    /// Fail at runtime with an out-of-range error
    Throw,
    /// Use this target member
    Value(String),
}

/// Resolved conversion between two enums
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumMappingPlan {
    /// Source enum
    pub source: TypeId,
    /// Target enum
    pub target: TypeId,
    /// Effective strategy
    pub strategy: EnumStrategy,
    /// Explicit correspondences, empty for a plain cast
    pub table: Vec<EnumCorrespondence>,
    /// Behavior for unmatched source values
    pub fallback: EnumFallback,
}

impl EnumMappingPlan {
    /// Whether the generated code is a plain cast
    #[must_use]
    pub fn is_cast(&self) -> bool {
        self.strategy == EnumStrategy::ByUnderlyingValue && self.table.is_empty()
    }

    /// Whether an unmatched value fails at runtime
    #[must_use]
    pub fn can_fail(&self) -> bool {
        self.strategy != EnumStrategy::ByUnderlyingValue && self.fallback == EnumFallback::Throw
    }
}

fn enumeration(descriptor: &TypeDescriptor) -> Result<&EnumDescriptor, SchemaError> {
    descriptor
        .enumeration
        .as_ref()
        .ok_or_else(|| SchemaError::NotAnEnum(descriptor.full_name.clone()))
}

/// Ignored member names per side, validated
struct Ignored {
    source: BTreeSet<String>,
    target: BTreeSet<String>,
}

fn collect_ignored(
    source: (&TypeDescriptor, &EnumDescriptor),
    target: (&TypeDescriptor, &EnumDescriptor),
    declaration_ignores: &[IgnoreDirective],
    diagnostics: &mut Diagnostics,
) -> Ignored {
    let mut ignored = Ignored {
        source: BTreeSet::new(),
        target: BTreeSet::new(),
    };

    for (side, (ty, def)) in [(Side::Source, source), (Side::Target, target)] {
        for member in &def.members {
            let Some(directive) = &member.ignore else {
                continue;
            };
            if !directive.arguments.is_empty() {
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::InvalidIgnoreDirectiveUsage)
                        .with("enum", &ty.name)
                        .with("member", &member.name)
                        .with("expected_arguments", 0)
                        .with("actual_arguments", directive.arguments.len())
                        .at(directive.location.as_ref()),
                );
            }
            let set = match side {
                Side::Source => &mut ignored.source,
                Side::Target => &mut ignored.target,
            };
            set.insert(member.name.clone());
        }
    }

    for directive in declaration_ignores {
        let [name] = directive.arguments.as_slice() else {
            diagnostics.push(
                Diagnostic::new(DiagnosticKind::InvalidIgnoreDirectiveUsage)
                    .with("expected_arguments", 1)
                    .with("actual_arguments", directive.arguments.len())
                    .at(directive.location.as_ref()),
            );
            continue;
        };
        let side = match directive.scope {
            DirectiveScope::Declaration(side) => side,
            DirectiveScope::Member => Side::Target,
        };
        let ((ty, def), set) = match side {
            Side::Source => (source, &mut ignored.source),
            Side::Target => (target, &mut ignored.target),
        };
        if def.member(name).is_none() {
            diagnostics.push(
                Diagnostic::new(DiagnosticKind::IgnoredEnumMemberNotFound)
                    .with("enum", &ty.name)
                    .with("member", name)
                    .at(directive.location.as_ref()),
            );
            continue;
        }
        set.insert(name.clone());
    }

    ignored
}

fn names_equal(strategy: EnumStrategy, a: &str, b: &str) -> bool {
    match strategy {
        EnumStrategy::ByNameCaseInsensitive => a.eq_ignore_ascii_case(b),
        EnumStrategy::ByName | EnumStrategy::ByUnderlyingValue => a == b,
    }
}

/// Strict validation: one diagnostic for the first unmatched member,
/// source-excess before target-excess
fn check_strict(
    mode: StrictEnumMode,
    strategy: EnumStrategy,
    source: (&TypeDescriptor, &EnumDescriptor),
    target: (&TypeDescriptor, &EnumDescriptor),
    ignored: &Ignored,
    overrides: &[EnumCorrespondence],
    location: Option<&Location>,
) -> Option<Diagnostic> {
    let (source_ty, source_def) = source;
    let (target_ty, target_def) = target;
    let corresponds = |s: &EnumMember, t: &EnumMember| {
        overrides.iter().any(|o| o.source == s.name && o.target == t.name)
            || match strategy {
                EnumStrategy::ByUnderlyingValue => s.value == t.value,
                EnumStrategy::ByName | EnumStrategy::ByNameCaseInsensitive => {
                    names_equal(strategy, &s.name, &t.name)
                }
            }
    };
    let sources = || {
        source_def
            .members
            .iter()
            .filter(|m| !ignored.source.contains(&m.name))
    };
    let targets = || {
        target_def
            .members
            .iter()
            .filter(|m| !ignored.target.contains(&m.name))
    };

    let report = |member: &str, missing_on: &TypeDescriptor, side: &str| {
        Diagnostic::new(DiagnosticKind::StrictEnumMappingMismatch)
            .with("member", member)
            .with("side", side)
            .with("missing_on", &missing_on.name)
            .at(location)
    };

    if mode.checks_source() {
        if let Some(excess) = sources().find(|s| !targets().any(|t| corresponds(s, t))) {
            return Some(report(&excess.name, target_ty, "source"));
        }
    }
    if mode.checks_target() {
        if let Some(excess) = targets().find(|t| !sources().any(|s| corresponds(s, t))) {
            return Some(report(&excess.name, source_ty, "target"));
        }
    }
    None
}

/// Resolve the conversion between two enums
///
/// `declaration_ignores` are the declaration-level ignore directives of a
/// top-level enum mapping; pass an empty slice for enums reached through a
/// member. Ignores configured on the pair apply in both cases.
///
/// # Errors
/// Returns [`ResolveError::Schema`] for unknown ids or non-enum types
pub fn resolve_enum_mapping(
    table: &TypeTable,
    config: &MappingConfiguration,
    settings: &MappingSettings,
    source_id: TypeId,
    target_id: TypeId,
    declaration_ignores: &[IgnoreDirective],
) -> Result<Resolved<EnumMappingPlan>, ResolveError> {
    let source_ty = table.get(source_id)?;
    let target_ty = table.get(target_id)?;
    let source_def = enumeration(source_ty)?;
    let target_def = enumeration(target_ty)?;
    let source = (source_ty, source_def);
    let target = (target_ty, target_def);
    let location = target_ty.location.as_ref();

    let pair = config.enum_pair(&source_ty.full_name, &target_ty.full_name);
    let strategy = pair
        .and_then(|p| p.strategy)
        .unwrap_or(settings.enum_strategy);
    let strict = pair.and_then(|p| p.strict).unwrap_or(settings.strict_enum);

    let mut diagnostics = Diagnostics::new();
    let pair_ignores = pair.map(|p| p.ignores.as_slice()).unwrap_or_default();
    let ignores: Vec<IgnoreDirective> = declaration_ignores
        .iter()
        .chain(pair_ignores)
        .cloned()
        .collect();
    let ignored = collect_ignored(source, target, &ignores, &mut diagnostics);

    let mut overrides = Vec::new();
    for value in pair.map(|p| p.value_overrides.as_slice()).unwrap_or_default() {
        let missing = [
            (source_def.member(&value.source).is_none(), &value.source, source_ty),
            (target_def.member(&value.target).is_none(), &value.target, target_ty),
        ];
        let mut valid = true;
        for (is_missing, member, ty) in missing {
            if is_missing {
                valid = false;
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::ConfiguredSourcePathNotFound)
                        .with("enum", &ty.name)
                        .with("member", member)
                        .at(location),
                );
            }
        }
        if valid {
            overrides.push(EnumCorrespondence {
                source: value.source.clone(),
                target: value.target.clone(),
            });
        }
    }

    let mismatch = check_strict(strict, strategy, source, target, &ignored, &overrides, location);
    if let Some(mismatch) = mismatch {
        diagnostics.push(mismatch);
    }

    let fallback = match pair.and_then(|p| p.fallback.as_deref()) {
        None => EnumFallback::Throw,
        Some(name) if target_def.member(name).is_some() => EnumFallback::Value(name.to_string()),
        Some(name) => {
            diagnostics.push(
                Diagnostic::new(DiagnosticKind::EnumFallbackNotFound)
                    .with("enum", &target_ty.name)
                    .with("member", name)
                    .at(location),
            );
            EnumFallback::Throw
        }
    };

    let mut rows = overrides;
    if strategy != EnumStrategy::ByUnderlyingValue {
        let mut targets: Vec<_> = target_def
            .members
            .iter()
            .filter(|m| !ignored.target.contains(&m.name))
            .collect();
        targets.sort_by_key(|m| m.value);

        let mut used: BTreeSet<String> = rows.iter().map(|r| r.source.clone()).collect();
        for t in targets {
            let matched = source_def.members.iter().find(|s| {
                !ignored.source.contains(&s.name)
                    && !used.contains(&s.name)
                    && names_equal(strategy, &s.name, &t.name)
            });
            if let Some(s) = matched {
                used.insert(s.name.clone());
                rows.push(EnumCorrespondence {
                    source: s.name.clone(),
                    target: t.name.clone(),
                });
            }
        }
    }

    tracing::trace!(
        "Enum mapping {} -> {}: {:?}, {} rows",
        source_ty.name,
        target_ty.name,
        strategy,
        rows.len()
    );

    Ok(Resolved::new(
        EnumMappingPlan {
            source: source_id,
            target: target_id,
            strategy,
            table: rows,
            fallback,
        },
        diagnostics,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapforge_schema::{ConfigOverrides, EnumPairConfig, Primitive};

    fn enum_pair(source: &[(&str, i64)], target: &[(&str, i64)]) -> (TypeTable, TypeId, TypeId) {
        let mut table = TypeTable::new();
        let mut s = TypeDescriptor::enumeration("App.Source", Primitive::I32);
        for (name, value) in source {
            s = s.with_enum_member(*name, *value);
        }
        let mut t = TypeDescriptor::enumeration("App.Target", Primitive::I32);
        for (name, value) in target {
            t = t.with_enum_member(*name, *value);
        }
        let s = table.insert(s);
        let t = table.insert(t);
        (table, s, t)
    }

    fn resolve(
        table: &TypeTable,
        config: &MappingConfiguration,
        s: TypeId,
        t: TypeId,
    ) -> Resolved<EnumMappingPlan> {
        let target = table.get(t).unwrap();
        resolve_enum_mapping(
            table,
            config,
            &config.settings_for(target),
            s,
            t,
            &config.enum_ignores,
        )
        .unwrap()
    }

    #[test]
    fn by_value_is_a_cast() {
        let (table, s, t) = enum_pair(&[("A", 0)], &[("X", 0)]);
        let plan = resolve(&table, &MappingConfiguration::new(), s, t);
        assert!(plan.diagnostics.is_empty());
        assert!(plan.value.is_cast());
        assert!(!plan.value.can_fail());
    }

    #[test]
    fn by_name_table_follows_target_values() {
        let (table, s, t) = enum_pair(
            &[("Red", 0), ("Green", 1), ("Blue", 2)],
            &[("Blue", 10), ("Red", 20), ("Green", 5)],
        );
        let config = MappingConfiguration::new()
            .with_mapper(ConfigOverrides::new().with_enum_strategy(EnumStrategy::ByName));
        let plan = resolve(&table, &config, s, t).value;
        let order: Vec<_> = plan.table.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(order, ["Green", "Blue", "Red"]);
        assert!(plan.can_fail());
    }

    #[test]
    fn pair_strategy_beats_default_and_ignores_case() {
        let (table, s, t) = enum_pair(&[("ACTIVE", 0)], &[("Active", 3)]);
        let config = MappingConfiguration::new().with_enum_pair(
            EnumPairConfig::new("App.Source", "App.Target")
                .with_strategy(EnumStrategy::ByNameCaseInsensitive),
        );
        let plan = resolve(&table, &config, s, t).value;
        assert_eq!(plan.strategy, EnumStrategy::ByNameCaseInsensitive);
        assert_eq!(plan.table.len(), 1);
    }

    #[test]
    fn strict_source_only_reports_first_excess() {
        let (table, s, t) = enum_pair(
            &[("A", 0), ("B", 1), ("C", 2), ("D", 3)],
            &[("A", 0), ("B", 1)],
        );
        let config = MappingConfiguration::new().with_enum_pair(
            EnumPairConfig::new("App.Source", "App.Target")
                .with_strategy(EnumStrategy::ByName)
                .with_strict(StrictEnumMode::SourceOnly),
        );
        let r = resolve(&table, &config, s, t);
        let errors: Vec<_> = r.diagnostics.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].param("member"), Some("C"));
    }

    #[test]
    fn strict_source_checked_before_target() {
        let (table, s, t) = enum_pair(&[("A", 0), ("S", 1)], &[("A", 0), ("T", 1)]);
        let config = MappingConfiguration::new().with_enum_pair(
            EnumPairConfig::new("App.Source", "App.Target")
                .with_strategy(EnumStrategy::ByName)
                .with_strict(StrictEnumMode::SourceAndTarget),
        );
        let r = resolve(&table, &config, s, t);
        assert_eq!(r.diagnostics.len(), 1);
        assert_eq!(r.diagnostics.iter().next().unwrap().param("member"), Some("S"));
    }

    #[test]
    fn ignored_members_are_subtracted_before_strict_check() {
        let mut table = TypeTable::new();
        let s = table.insert(
            TypeDescriptor::enumeration("App.Source", Primitive::I32)
                .with_enum_member("A", 0)
                .with_ignored_enum_member("Legacy", 9, IgnoreDirective::on_member()),
        );
        let t = table.insert(
            TypeDescriptor::enumeration("App.Target", Primitive::I32).with_enum_member("A", 0),
        );
        let config = MappingConfiguration::new().with_mapper(
            ConfigOverrides::new()
                .with_enum_strategy(EnumStrategy::ByName)
                .with_strict_enum(StrictEnumMode::SourceAndTarget),
        );
        let r = resolve(&table, &config, s, t);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn ignore_directive_argument_counts() {
        let mut table = TypeTable::new();
        let s = table.insert(
            TypeDescriptor::enumeration("App.Source", Primitive::I32)
                .with_enum_member("A", 0)
                .with_ignored_enum_member(
                    "B",
                    1,
                    IgnoreDirective::on_member().with_arguments(vec!["B".into()]),
                ),
        );
        let t = table.insert(
            TypeDescriptor::enumeration("App.Target", Primitive::I32).with_enum_member("A", 0),
        );
        let config = MappingConfiguration::new()
            .with_enum_ignore(
                IgnoreDirective::on_declaration(Side::Target, "A").with_arguments(vec![]),
            )
            .with_enum_ignore(IgnoreDirective::on_declaration(Side::Source, "Missing"));
        let r = resolve(&table, &config, s, t);
        assert_eq!(r.diagnostics.of_kind(DiagnosticKind::InvalidIgnoreDirectiveUsage).count(), 2);
        assert_eq!(r.diagnostics.of_kind(DiagnosticKind::IgnoredEnumMemberNotFound).count(), 1);
    }

    #[test]
    fn fallback_and_overrides() {
        let (table, s, t) = enum_pair(&[("Old", 0), ("Other", 1)], &[("New", 0), ("Unknown", 1)]);
        let config = MappingConfiguration::new().with_enum_pair(
            EnumPairConfig::new("App.Source", "App.Target")
                .with_strategy(EnumStrategy::ByName)
                .with_value("Old", "New")
                .with_fallback("Unknown"),
        );
        let plan = resolve(&table, &config, s, t).value;
        assert_eq!(
            plan.table[0],
            EnumCorrespondence {
                source: "Old".into(),
                target: "New".into()
            }
        );
        assert_eq!(plan.fallback, EnumFallback::Value("Unknown".into()));
        assert!(!plan.can_fail());
    }

    #[test]
    fn unknown_fallback_is_an_error() {
        let (table, s, t) = enum_pair(&[("A", 0)], &[("A", 0)]);
        let config = MappingConfiguration::new().with_enum_pair(
            EnumPairConfig::new("App.Source", "App.Target").with_fallback("Nope"),
        );
        let r = resolve(&table, &config, s, t);
        assert_eq!(r.diagnostics.of_kind(DiagnosticKind::EnumFallbackNotFound).count(), 1);
        assert_eq!(r.value.fallback, EnumFallback::Throw);
    }

    #[test]
    fn non_enum_is_a_schema_error() {
        let mut table = TypeTable::new();
        let c = table.insert(TypeDescriptor::class("App.C"));
        let config = MappingConfiguration::new();
        let result = resolve_enum_mapping(&table, &config, &MappingSettings::default(), c, c, &[]);
        assert!(matches!(result, Err(ResolveError::Schema(SchemaError::NotAnEnum(_)))));
    }
}
