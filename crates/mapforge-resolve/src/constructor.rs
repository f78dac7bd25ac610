//! Constructor selection
//!
//! Order: designated constructor, then the widest constructor whose
//! parameters all match resolved members, then the widest constructor as a
//! best effort. A target without any declared constructor gets a
//! synthesized one over its constructor-argument members.

use crate::context::{normalized_name, parameter_name, ResolveContext};
use crate::error::ResolveError;
use crate::property::{InitMode, PropertyMapping};
use crate::source_path::{PathSegment, SourcePath};
use mapforge_diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Resolved};
use mapforge_schema::{ConstructorDescriptor, ParameterDescriptor, TypeRef};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// Where a constructor argument comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentSource {
    /// The value of the named target member mapping
    Property(String),
    /// Read straight from a source member
    SourceMember(SourcePath),
}

/// One bound constructor argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructorArgument {
    /// Parameter name
    pub parameter: String,
    /// Value origin
    pub source: ArgumentSource,
}

/// The constructor the generated code calls
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorChoice {
    /// A declared constructor, by declaration index
    Declared {
        /// Index into the target's constructor list
        index: usize,
        /// Arguments in parameter order
        arguments: Vec<ConstructorArgument>,
    },
    /// Synthesized over the constructor-argument members
    Synthesized {
        /// Arguments in member order
        arguments: Vec<ConstructorArgument>,
    },
    /// No usable constructor
    None,
}

impl ConstructorChoice {
    /// Bound arguments, empty for [`ConstructorChoice::None`]
    #[must_use]
    pub fn arguments(&self) -> &[ConstructorArgument] {
        match self {
            Self::Declared { arguments, .. } | Self::Synthesized { arguments } => arguments,
            Self::None => &[],
        }
    }
}

/// Output of constructor selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorResolution {
    /// Selected constructor
    pub choice: ConstructorChoice,
    /// Member mappings with consumed members switched to constructor mode
    pub mappings: Vec<PropertyMapping>,
}

fn names_correspond(parameter: &str, member: &str) -> bool {
    normalized_name(parameter) == normalized_name(member)
}

fn exact_mapping<'m>(
    param: &ParameterDescriptor,
    mappings: &'m [PropertyMapping],
) -> Option<&'m PropertyMapping> {
    mappings
        .iter()
        .find(|m| names_correspond(&param.name, &m.target) && m.target_type == param.ty)
}

fn is_full_match(ctor: &ConstructorDescriptor, mappings: &[PropertyMapping]) -> bool {
    ctor.parameters.iter().all(|p| exact_mapping(p, mappings).is_some())
}

fn widest<'c>(
    candidates: impl Iterator<Item = (usize, &'c ConstructorDescriptor)>,
) -> Option<(usize, &'c ConstructorDescriptor)> {
    candidates.min_by_key(|(index, ctor)| (Reverse(ctor.parameters.len()), *index))
}

fn bind_parameter(
    ctx: &ResolveContext<'_>,
    param: &ParameterDescriptor,
    mappings: &[PropertyMapping],
) -> Option<ArgumentSource> {
    if let Some(mapping) = exact_mapping(param, mappings).or_else(|| {
        mappings
            .iter()
            .find(|m| {
                names_correspond(&param.name, &m.target)
                    && m.target_type.is_assignable_to(&param.ty)
            })
    }) {
        return Some(ArgumentSource::Property(mapping.target.clone()));
    }

    ctx.source
        .members
        .iter()
        .filter(|m| m.is_readable())
        .find(|m| names_correspond(&param.name, &m.name) && m.ty.is_assignable_to(&param.ty))
        .map(|m| {
            ArgumentSource::SourceMember(SourcePath {
                segments: vec![PathSegment {
                    name: m.name.clone(),
                    kind: m.kind,
                    nullable: ctx.is_nullable(m.nullability, &m.ty),
                }],
                ty: m.ty.clone(),
            })
        })
}

fn bind(
    ctx: &ResolveContext<'_>,
    index: usize,
    ctor: &ConstructorDescriptor,
    mappings: &[PropertyMapping],
    diagnostics: &mut Diagnostics,
) -> ConstructorChoice {
    let mut arguments = Vec::with_capacity(ctor.parameters.len());
    for param in &ctor.parameters {
        match bind_parameter(ctx, param, mappings) {
            Some(source) => arguments.push(ConstructorArgument {
                parameter: param.name.clone(),
                source,
            }),
            None => {
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::MissingUsableConstructor)
                        .with("type", &ctx.target.name)
                        .with("constructor", ctor.signature())
                        .with("parameter", &param.name)
                        .at(ctor.location.as_ref().or(ctx.target.location.as_ref())),
                );
                return ConstructorChoice::None;
            }
        }
    }
    ConstructorChoice::Declared { index, arguments }
}

fn select(
    ctx: &ResolveContext<'_>,
    mappings: &[PropertyMapping],
    diagnostics: &mut Diagnostics,
) -> ConstructorChoice {
    let ctors = &ctx.target.constructors;
    let self_type = TypeRef::Named(ctx.target_id);

    let designated = ctors.iter().enumerate().find(|(_, c)| c.designated && !c.is_static);
    if let Some((index, ctor)) = designated {
        if let Some(param) = ctor.parameters.iter().find(|p| p.ty == self_type) {
            diagnostics.push(
                Diagnostic::new(DiagnosticKind::SelfReferencingConstructorParameter)
                    .with("type", &ctx.target.name)
                    .with("parameter", &param.name)
                    .at(ctor.location.as_ref().or(ctx.target.location.as_ref())),
            );
            return ConstructorChoice::None;
        }
        return bind(ctx, index, ctor, mappings, diagnostics);
    }

    if ctors.is_empty() {
        let arguments = mappings
            .iter()
            .filter(|m| m.init_mode == InitMode::ConstructorArgument)
            .map(|m| ConstructorArgument {
                parameter: parameter_name(&m.target),
                source: ArgumentSource::Property(m.target.clone()),
            })
            .collect();
        return ConstructorChoice::Synthesized { arguments };
    }

    let candidates = || ctors.iter().enumerate().filter(|(_, c)| c.is_candidate());
    let full = widest(candidates().filter(|(_, c)| is_full_match(c, mappings)));
    match full.or_else(|| widest(candidates())) {
        Some((index, ctor)) => bind(ctx, index, ctor, mappings, diagnostics),
        None => {
            diagnostics.push(
                Diagnostic::new(DiagnosticKind::MissingUsableConstructor)
                    .with("type", &ctx.target.name)
                    .with("reason", "no_accessible_constructor")
                    .at(ctx.target.location.as_ref()),
            );
            ConstructorChoice::None
        }
    }
}

/// Select the target constructor and rewrite the member mappings it consumes
///
/// Consumed members become constructor arguments and lose their skip-when-
/// null form. Read-only members left unconsumed by a declared constructor
/// are dropped with a warning.
///
/// # Errors
/// Returns [`ResolveError::Cancelled`] when cancellation is observed
pub fn resolve_constructor(
    ctx: &ResolveContext<'_>,
    mappings: Vec<PropertyMapping>,
) -> Result<Resolved<ConstructorResolution>, ResolveError> {
    ctx.check_cancelled()?;

    let mut diagnostics = Diagnostics::new();
    let choice = select(ctx, &mappings, &mut diagnostics);

    let consumed: BTreeSet<&str> = choice
        .arguments()
        .iter()
        .filter_map(|a| match &a.source {
            ArgumentSource::Property(target) => Some(target.as_str()),
            ArgumentSource::SourceMember(_) => None,
        })
        .collect();

    let declared = matches!(choice, ConstructorChoice::Declared { .. });
    let mut rewritten = Vec::with_capacity(mappings.len());
    for mut mapping in mappings {
        if consumed.contains(mapping.target.as_str()) {
            mapping.init_mode = InitMode::ConstructorArgument;
            if let Some(source) = &mapping.source {
                mapping.null_handling = mapping.null_handling.unskippable(&source.path());
            }
        } else if declared && mapping.init_mode == InitMode::ConstructorArgument {
            diagnostics.push(
                Diagnostic::new(DiagnosticKind::ReadOnlyMemberNotSettable)
                    .with("member", &mapping.target)
                    .with("type", &ctx.target.name)
                    .at(ctx.target.member(&mapping.target).and_then(|m| m.location.as_ref())),
            );
            continue;
        }
        rewritten.push(mapping);
    }

    tracing::trace!("Constructor for {}: {:?}", ctx.target.name, choice);

    Ok(Resolved::new(
        ConstructorResolution {
            choice,
            mappings: rewritten,
        },
        diagnostics,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationFlag;
    use crate::null::NullHandling;
    use crate::property::resolve_properties;
    use mapforge_schema::{
        Accessibility, MappingConfiguration, MemberDescriptor, Primitive, TypeDescriptor, TypeTable,
    };
    use pretty_assertions::assert_eq;

    fn source() -> TypeDescriptor {
        TypeDescriptor::class("App.Person")
            .with_member(MemberDescriptor::new("Id", Primitive::I32))
            .with_member(MemberDescriptor::new("Name", Primitive::String).nullable())
            .with_member(MemberDescriptor::new("Email", Primitive::String))
    }

    fn run(target: TypeDescriptor) -> Resolved<ConstructorResolution> {
        let mut table = TypeTable::new();
        let s = table.insert(source());
        let t = table.insert(target);
        let config = MappingConfiguration::new();
        let cancel = CancellationFlag::new();
        let ctx = ResolveContext::new(&table, &config, s, t, &cancel).unwrap();
        let properties = resolve_properties(&ctx).unwrap();
        resolve_constructor(&ctx, properties.value.mappings).unwrap()
    }

    fn ctor(params: &[(&str, Primitive)]) -> ConstructorDescriptor {
        ConstructorDescriptor::new(
            params
                .iter()
                .map(|(n, p)| ParameterDescriptor::new(*n, *p))
                .collect(),
        )
    }

    fn target() -> TypeDescriptor {
        TypeDescriptor::class("App.PersonDto")
            .with_member(MemberDescriptor::new("Id", Primitive::I32).read_only())
            .with_member(MemberDescriptor::new("Name", Primitive::String))
    }

    #[test]
    fn equal_width_full_matches_pick_first_declared() {
        let r = run(target()
            .with_constructor(ctor(&[("name", Primitive::String), ("id", Primitive::I32)]))
            .with_constructor(ctor(&[("id", Primitive::I32), ("name", Primitive::String)])));
        assert!(r.diagnostics.is_empty(), "{}", r.diagnostics);
        let ConstructorChoice::Declared { index, arguments } = &r.value.choice else {
            panic!("expected a declared constructor");
        };
        assert_eq!(*index, 0);
        assert_eq!(arguments[0].parameter, "name");
    }

    #[test]
    fn widest_full_match_beats_parameterless() {
        let r = run(target()
            .with_constructor(ConstructorDescriptor::parameterless())
            .with_constructor(ctor(&[("id", Primitive::I32), ("name", Primitive::String)])));
        assert!(matches!(r.value.choice, ConstructorChoice::Declared { index: 1, .. }));
        let name = r.value.mappings.iter().find(|m| m.target == "Name").unwrap();
        assert_eq!(name.init_mode, InitMode::ConstructorArgument);
        assert_eq!(
            name.null_handling,
            NullHandling::Throw {
                path: "Name".parse().unwrap()
            }
        );
    }

    #[test]
    fn fallback_reads_source_members() {
        let r = run(target().with_constructor(ctor(&[
            ("id", Primitive::I32),
            ("email", Primitive::String),
        ])));
        assert!(!r.has_errors(), "{}", r.diagnostics);
        let args = r.value.choice.arguments();
        assert_eq!(args[0].source, ArgumentSource::Property("Id".into()));
        assert!(matches!(
            &args[1].source,
            ArgumentSource::SourceMember(p) if p.root() == Some("Email")
        ));
    }

    #[test]
    fn unsatisfiable_parameter_is_reported() {
        let r = run(target().with_constructor(ctor(&[
            ("id", Primitive::I32),
            ("age", Primitive::I32),
        ])));
        assert!(matches!(r.value.choice, ConstructorChoice::None));
        let diag = r.diagnostics.of_kind(DiagnosticKind::MissingUsableConstructor).next().unwrap();
        assert_eq!(diag.param("parameter"), Some("age"));
        assert_eq!(diag.param("constructor"), Some("(id, age)"));
    }

    #[test]
    fn designated_self_reference_is_rejected() {
        let mut table = TypeTable::new();
        let s = table.insert(source());
        let t = table.declare("App.Node");
        table
            .define(
                t,
                TypeDescriptor::class("App.Node")
                    .with_constructor(ConstructorDescriptor::parameterless())
                    .with_constructor(
                        ConstructorDescriptor::new(vec![ParameterDescriptor::new("parent", t)])
                            .designated(),
                    ),
            )
            .unwrap();
        let config = MappingConfiguration::new();
        let cancel = CancellationFlag::new();
        let ctx = ResolveContext::new(&table, &config, s, t, &cancel).unwrap();
        let r = resolve_constructor(&ctx, Vec::new()).unwrap();
        assert_eq!(
            r.diagnostics.of_kind(DiagnosticKind::SelfReferencingConstructorParameter).count(),
            1
        );
    }

    #[test]
    fn no_declared_constructor_synthesizes_one() {
        let r = run(target());
        assert_eq!(
            r.value.choice,
            ConstructorChoice::Synthesized {
                arguments: vec![ConstructorArgument {
                    parameter: "id".into(),
                    source: ArgumentSource::Property("Id".into()),
                }]
            }
        );
    }

    #[test]
    fn synthesized_constructor_takes_external_read_only_members() {
        let tenant = MemberDescriptor::new("TenantId", Primitive::Guid).read_only().required();
        let r = run(target().with_member(tenant));
        assert!(r.diagnostics.is_empty(), "{}", r.diagnostics);
        let parameters: Vec<&str> = r
            .value
            .choice
            .arguments()
            .iter()
            .map(|a| a.parameter.as_str())
            .collect();
        assert_eq!(parameters, ["id", "tenantId"]);

        let tenant = r.value.mappings.iter().find(|m| m.target == "TenantId").unwrap();
        assert!(tenant.is_external());
        assert_eq!(tenant.init_mode, InitMode::ConstructorArgument);
    }

    #[test]
    fn external_member_consumed_by_declared_constructor() {
        let r = run(target()
            .with_member(MemberDescriptor::new("TenantId", Primitive::Guid).read_only().required())
            .with_constructor(ctor(&[("id", Primitive::I32), ("tenantId", Primitive::Guid)])));
        assert!(r.diagnostics.is_empty(), "{}", r.diagnostics);
        assert_eq!(
            r.value.choice.arguments()[1].source,
            ArgumentSource::Property("TenantId".into())
        );
    }

    #[test]
    fn unconsumed_read_only_member_is_dropped() {
        let r = run(target().with_constructor(ConstructorDescriptor::parameterless()));
        assert!(r.value.mappings.iter().all(|m| m.target != "Id"));
        assert_eq!(r.diagnostics.of_kind(DiagnosticKind::ReadOnlyMemberNotSettable).count(), 1);
        assert!(!r.has_errors());
    }

    #[test]
    fn private_and_static_constructors_are_not_candidates() {
        let r = run(target()
            .with_constructor(
                ConstructorDescriptor::parameterless().with_accessibility(Accessibility::Private),
            )
            .with_constructor(ConstructorDescriptor::parameterless().static_ctor()));
        assert!(matches!(r.value.choice, ConstructorChoice::None));
        assert_eq!(
            r.diagnostics.iter().next().unwrap().param("reason"),
            Some("no_accessible_constructor")
        );
    }
}
