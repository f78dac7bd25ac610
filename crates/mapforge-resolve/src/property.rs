//! Target member resolution
//!
//! Walks the eligible target members in declaration order and decides for
//! each one where its value comes from, how it is written and how it is
//! converted. Cancellation is checked before every member.

use crate::context::{parameter_name, ResolveContext};
use crate::conversion::{converter_conversion, resolve_conversion, ValueConversion};
use crate::converter::{resolve_converter, HelperFunction};
use crate::error::ResolveError;
use crate::null::{resolve_null_handling, NullHandling, NullInputs};
use crate::source_path::{resolve_explicit, resolve_implicit, SourcePath};
use mapforge_diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Resolved};
use mapforge_schema::{
    ConverterSpec, Location, MemberDescriptor, MemberDirective, MemberPath, Mutability, TypeRef,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a target member receives its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitMode {
    /// Passed to the constructor
    ConstructorArgument,
    /// Set in the object initializer
    ObjectInitializer,
    /// Assigned after construction
    Setter,
}

impl InitMode {
    /// Whether the member is written after the constructor ran
    #[inline]
    #[must_use]
    pub fn is_post_construction(self) -> bool {
        matches!(self, Self::ObjectInitializer | Self::Setter)
    }
}

/// Resolved mapping of one target member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyMapping {
    /// Target member name
    pub target: String,
    /// Target member type
    pub target_type: TypeRef,
    /// Source access path, `None` when the value comes from an [`ExternalParameter`]
    pub source: Option<SourcePath>,
    /// Write mode, independent of where the value comes from
    pub init_mode: InitMode,
    /// Null handling of the source value
    pub null_handling: NullHandling,
    /// Value conversion
    pub conversion: ValueConversion,
}

impl PropertyMapping {
    /// Whether the value is supplied by the caller through an extra parameter
    #[inline]
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.source.is_none()
    }
}

/// Extra input of the generated conversion for an unresolvable required member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalParameter {
    /// Parameter name, camel-cased member name
    pub name: String,
    /// Target member it initializes
    pub member: String,
    /// Parameter type
    pub ty: TypeRef,
}

/// Output of the member resolver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyResolution {
    /// Member mappings in target declaration order
    pub mappings: Vec<PropertyMapping>,
    /// External parameters in target declaration order
    pub external_parameters: Vec<ExternalParameter>,
    /// Lifted inline converters
    pub helpers: Vec<HelperFunction>,
}

/// Directives written for one target member
#[derive(Default)]
struct MemberDirectives<'c> {
    ignored: bool,
    map_from: Option<(&'c MemberPath, Option<&'c Location>)>,
    converter: Option<(&'c ConverterSpec, Option<&'c Location>)>,
}

fn directives_for<'c>(ctx: &ResolveContext<'c>, member: &'c str) -> MemberDirectives<'c> {
    let mut found = MemberDirectives::default();
    for directive in ctx.config.directives_for(member) {
        match directive {
            MemberDirective::Ignore { .. } => found.ignored = true,
            MemberDirective::MapFrom {
                source, location, ..
            } => {
                found.map_from.get_or_insert((source, location.as_ref()));
            }
            MemberDirective::Converter {
                converter,
                location,
                ..
            } => {
                found.converter.get_or_insert((converter, location.as_ref()));
            }
        }
    }
    found
}

fn init_mode(member: &MemberDescriptor) -> InitMode {
    match member.mutability {
        Mutability::ReadOnly => InitMode::ConstructorArgument,
        Mutability::InitOnly => InitMode::ObjectInitializer,
        Mutability::Settable if member.required && member.ty.is_primitive() => {
            InitMode::ObjectInitializer
        }
        Mutability::Settable => InitMode::Setter,
    }
}

fn is_eligible(member: &MemberDescriptor) -> bool {
    member.accessibility.is_accessible() && !member.synthesized && !member.ignored
}

/// Resolve every eligible target member
///
/// # Errors
/// Returns [`ResolveError::Cancelled`] when cancellation is observed, or
/// [`ResolveError::Schema`] for dangling type ids
pub fn resolve_properties(
    ctx: &ResolveContext<'_>,
) -> Result<Resolved<PropertyResolution>, ResolveError> {
    let mut diagnostics = Diagnostics::new();
    let mut resolution = PropertyResolution::default();

    for directive in &ctx.config.directives {
        if let MemberDirective::Ignore { target, location } = directive {
            if ctx.target.member(target).is_none() {
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::IgnoredMemberNotFound)
                        .with("member", target)
                        .with("type", &ctx.target.name)
                        .at(location.as_ref()),
                );
            }
        }
    }

    for member in &ctx.target.members {
        ctx.check_cancelled()?;

        if !is_eligible(member) {
            continue;
        }
        let directives = directives_for(ctx, &member.name);
        if directives.ignored {
            continue;
        }
        let location = member.location.as_ref();

        let explicit = directives
            .map_from
            .map(|(path, loc)| (path, loc.or(location)))
            .or_else(|| member.rename.as_ref().map(|path| (path, location)));

        let source = match explicit {
            Some((path, loc)) => match resolve_explicit(ctx, path) {
                Some(source) => Some(source),
                None => {
                    diagnostics.push(
                        Diagnostic::new(DiagnosticKind::ConfiguredSourcePathNotFound)
                            .with("member", &member.name)
                            .with("path", path)
                            .with("type", &ctx.source.name)
                            .at(loc),
                    );
                    continue;
                }
            },
            None => resolve_implicit(ctx, &member.name),
        };

        let Some(source) = source else {
            if member.required {
                tracing::trace!("Member {} has no source, adding external parameter", member.name);
                resolution.external_parameters.push(ExternalParameter {
                    name: parameter_name(&member.name),
                    member: member.name.clone(),
                    ty: member.ty.clone(),
                });
                resolution.mappings.push(PropertyMapping {
                    target: member.name.clone(),
                    target_type: member.ty.clone(),
                    source: None,
                    init_mode: init_mode(member),
                    null_handling: NullHandling::Direct,
                    conversion: ValueConversion::Direct,
                });
            }
            continue;
        };

        let conversion = match directives.converter {
            Some((spec, loc)) => resolve_converter(
                ctx,
                &member.name,
                spec,
                &source.ty,
                &member.ty,
                loc.or(location),
            )
            .report_into(&mut diagnostics)
            .map(|c| {
                resolution.helpers.extend(c.helper);
                converter_conversion(c.binding, &source.ty, &member.ty)
            }),
            None => resolve_conversion(ctx, &member.name, &source.ty, &member.ty, location)?
                .report_into(&mut diagnostics),
        };
        let Some(conversion) = conversion else {
            continue;
        };

        let init_mode = init_mode(member);
        let path = source.path();
        let null_handling = resolve_null_handling(
            ctx.settings.null_policy,
            NullInputs {
                source_nullable: source.is_nullable(),
                target_nullable: ctx.is_nullable(member.nullability, &member.ty),
                target_type: &member.ty,
                source_path: &path,
                skippable: init_mode == InitMode::Setter,
            },
        );

        resolution.mappings.push(PropertyMapping {
            target: member.name.clone(),
            target_type: member.ty.clone(),
            source: Some(source),
            init_mode,
            null_handling,
            conversion,
        });
    }

    tracing::debug!(
        "Resolved {} of {} members of {}",
        resolution.mappings.len(),
        ctx.target.members.len(),
        ctx.target.name
    );

    Ok(Resolved::new(resolution, diagnostics))
}

/// Report readable source members no mapping reads
///
/// `used` holds the root member names of every source path in the plan.
pub fn unmapped_source_members(ctx: &ResolveContext<'_>, used: &BTreeSet<String>) -> Diagnostics {
    ctx.source
        .members
        .iter()
        .filter(|m| m.is_readable() && !used.contains(&m.name))
        .map(|m| {
            Diagnostic::new(DiagnosticKind::SourceMemberNotMapped)
                .with("member", &m.name)
                .with("type", &ctx.source.name)
                .at(m.location.as_ref())
        })
        .collect()
}
