//! Value conversion between a source and a target type

use crate::collection::{resolve_projection, terminal_for, CollectionProjection};
use crate::context::ResolveContext;
use crate::converter::ConverterBinding;
use crate::enums::{resolve_enum_mapping, EnumMappingPlan};
use crate::error::ResolveError;
use mapforge_diagnostics::{Diagnostic, DiagnosticKind, Resolved};
use mapforge_schema::{Location, TypeId, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A source/target type pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypePair {
    /// Source type
    pub source: TypeId,
    /// Target type
    pub target: TypeId,
}

impl TypePair {
    /// Create a pair
    #[inline]
    #[must_use]
    pub fn new(source: TypeId, target: TypeId) -> Self {
        Self { source, target }
    }
}

impl Display for TypePair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// How a value is turned into the target type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueConversion {
    /// Identical types, assign as is
    Direct,
    /// Built-in widening or upcast to `object`
    Implicit,
    /// Call the mapping of another type pair
    Nested(TypePair),
    /// Enum-to-enum conversion
    Enum(EnumMappingPlan),
    /// Collection projection
    Collection(CollectionProjection),
    /// User converter
    Converter(ConverterBinding),
}

impl ValueConversion {
    /// Type pairs this conversion delegates to, in first-use order
    pub fn collect_nested_pairs(&self, out: &mut Vec<TypePair>) {
        match self {
            Self::Nested(pair) => {
                if !out.contains(pair) {
                    out.push(*pair);
                }
            }
            Self::Collection(CollectionProjection::Transform { element, .. }) => {
                element.collect_nested_pairs(out);
            }
            _ => {}
        }
    }

    /// Enum plans used by this conversion, including element conversions
    pub fn enum_plans(&self) -> Vec<&EnumMappingPlan> {
        match self {
            Self::Enum(plan) => vec![plan],
            Self::Collection(CollectionProjection::Transform { element, .. }) => {
                element.enum_plans()
            }
            _ => Vec::new(),
        }
    }
}

/// Conversion through a resolved user converter
///
/// Element-wise converters become the element step of a collection
/// transform, so the target shape is materialized like any other projection.
#[must_use]
pub fn converter_conversion(
    binding: ConverterBinding,
    source: &TypeRef,
    target: &TypeRef,
) -> ValueConversion {
    match (source.as_collection(), target.as_collection()) {
        (Some(s), Some(t)) if binding.element_wise => {
            ValueConversion::Collection(CollectionProjection::Transform {
                element: Box::new(ValueConversion::Converter(binding)),
                terminal: terminal_for(s.shape, t.shape),
            })
        }
        _ => ValueConversion::Converter(binding),
    }
}

/// Report that no conversion strategy exists
pub(crate) fn incompatible<T>(
    ctx: &ResolveContext<'_>,
    member: &str,
    source: &TypeRef,
    target: &TypeRef,
    location: Option<&Location>,
) -> Resolved<Option<T>> {
    Resolved::failed(
        None,
        Diagnostic::new(DiagnosticKind::PropertyTypeIncompatible)
            .with("member", member)
            .with("source_type", ctx.display(source))
            .with("target_type", ctx.display(target))
            .at(location),
    )
}

/// Find the conversion from `source` to `target` without user converters
///
/// Collections route to the projection resolver, enum pairs to the enum
/// resolver and class/record pairs become nested mappings.
///
/// # Errors
/// Returns [`ResolveError::Schema`] for dangling type ids
pub fn resolve_conversion(
    ctx: &ResolveContext<'_>,
    member: &str,
    source: &TypeRef,
    target: &TypeRef,
    location: Option<&Location>,
) -> Result<Resolved<Option<ValueConversion>>, ResolveError> {
    match (source, target) {
        (TypeRef::Collection(s), TypeRef::Collection(t)) => Ok(resolve_projection(
            ctx, member, s, t, location,
        )?
        .map(|p| p.map(ValueConversion::Collection))),
        _ if source == target => Ok(Resolved::ok(Some(ValueConversion::Direct))),
        _ if source.is_assignable_to(target) => Ok(Resolved::ok(Some(ValueConversion::Implicit))),
        (TypeRef::Named(s), TypeRef::Named(t)) => {
            let source_ty = ctx.table.get(*s)?;
            let target_ty = ctx.table.get(*t)?;
            match (source_ty.is_enum(), target_ty.is_enum()) {
                (true, true) => {
                    // Declaration ignores belong to top-level enum mappings
                    let plan =
                        resolve_enum_mapping(ctx.table, ctx.config, &ctx.settings, *s, *t, &[])?;
                    Ok(plan.map(|p| Some(ValueConversion::Enum(p))))
                }
                (false, false) => {
                    let nested = ValueConversion::Nested(TypePair::new(*s, *t));
                    Ok(Resolved::ok(Some(nested)))
                }
                _ => Ok(incompatible(ctx, member, source, target, location)),
            }
        }
        _ => Ok(incompatible(ctx, member, source, target, location)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationFlag;
    use mapforge_schema::{MappingConfiguration, Primitive, TypeDescriptor, TypeTable};

    #[test]
    fn scalar_conversions() {
        let mut table = TypeTable::new();
        let a = table.insert(TypeDescriptor::class("App.A"));
        let b = table.insert(TypeDescriptor::class("App.B"));
        let e = table.insert(TypeDescriptor::enumeration("App.E", Primitive::I32));
        let f = table.insert(TypeDescriptor::enumeration("App.F", Primitive::I32));
        let config = MappingConfiguration::new();
        let cancel = CancellationFlag::new();
        let ctx = ResolveContext::new(&table, &config, a, b, &cancel).unwrap();

        let conv = |s: TypeRef, t: TypeRef| resolve_conversion(&ctx, "M", &s, &t, None).unwrap();

        assert_eq!(
            conv(Primitive::I32.into(), Primitive::I32.into()).value,
            Some(ValueConversion::Direct)
        );
        assert_eq!(
            conv(Primitive::I32.into(), Primitive::I64.into()).value,
            Some(ValueConversion::Implicit)
        );
        assert_eq!(
            conv(a.into(), b.into()).value,
            Some(ValueConversion::Nested(TypePair::new(a, b)))
        );
        assert!(matches!(conv(e.into(), f.into()).value, Some(ValueConversion::Enum(_))));

        let bad = conv(Primitive::String.into(), Primitive::I32.into());
        assert!(bad.value.is_none());
        assert_eq!(bad.diagnostics.of_kind(DiagnosticKind::PropertyTypeIncompatible).count(), 1);

        let mixed = conv(a.into(), e.into());
        assert!(mixed.has_errors());
    }

    #[test]
    fn element_wise_converter_gets_a_shape_terminal() {
        let binding = |element_wise| ConverterBinding {
            function: "parse_score".into(),
            element_wise,
            passes_parameter_bag: false,
        };
        let source = TypeRef::enumerable(Primitive::String.into());
        let target = TypeRef::array(Primitive::I32.into());

        assert_eq!(
            converter_conversion(binding(true), &source, &target),
            ValueConversion::Collection(CollectionProjection::Transform {
                element: Box::new(ValueConversion::Converter(binding(true))),
                terminal: crate::collection::ShapeTerminal::ArrayCollect,
            })
        );
        assert_eq!(
            converter_conversion(binding(false), &source, &target),
            ValueConversion::Converter(binding(false))
        );
    }

    #[test]
    fn nested_pairs_are_collected_once() {
        let pair = TypePair::new(TypeId(0), TypeId(1));
        let mut out = Vec::new();
        ValueConversion::Nested(pair).collect_nested_pairs(&mut out);
        ValueConversion::Nested(pair).collect_nested_pairs(&mut out);
        assert_eq!(out, vec![pair]);
    }
}
