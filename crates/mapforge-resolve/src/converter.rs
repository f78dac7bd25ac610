//! User converter resolution
//!
//! A converter directive names a declared function or carries an inline
//! converter. Inline converters are lifted into private helpers named
//! `convert_<member>_to_<target element type>`. A converter whose input only
//! accepts the source element type is applied element-wise.

use crate::context::ResolveContext;
use convert_case::{Boundary, Case, Casing};
use mapforge_diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Resolved};
use mapforge_schema::{ConverterSpec, FunctionDescriptor, Location, ParameterDescriptor, TypeRef};
use serde::{Deserialize, Serialize};

/// A private helper function the renderer must emit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HelperFunction {
    /// Generated name
    pub name: String,
    /// Parameters of the inline converter
    pub parameters: Vec<ParameterDescriptor>,
    /// Return type
    pub returns: TypeRef,
}

/// How a member value is passed through a converter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConverterBinding {
    /// Function to call, declared or lifted
    pub function: String,
    /// Applied to each element instead of the whole value
    pub element_wise: bool,
    /// Second argument is the parameter bag
    pub passes_parameter_bag: bool,
}

/// Successful converter resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConverter {
    /// Call description
    pub binding: ConverterBinding,
    /// Lifted helper for inline converters
    pub helper: Option<HelperFunction>,
}

/// Deterministic helper name for an inline converter
///
/// Digits stay attached to their word, so `i32` is not split into `i_32`.
#[must_use]
pub fn lifted_name(member: &str, target_element: &str) -> String {
    let snake = |name: &str| name.without_boundaries(&Boundary::digits()).to_case(Case::Snake);
    format!("convert_{}_to_{}", snake(member), snake(target_element))
}

fn element_types<'t>(
    source: &'t TypeRef,
    target: &'t TypeRef,
) -> Option<(&'t TypeRef, &'t TypeRef)> {
    let s = source.as_collection()?.element()?;
    let t = target.as_collection()?.element()?;
    Some((s, t))
}

/// Resolve a converter directive for one target member
pub fn resolve_converter(
    ctx: &ResolveContext<'_>,
    member: &str,
    spec: &ConverterSpec,
    source_ty: &TypeRef,
    target_ty: &TypeRef,
    location: Option<&Location>,
) -> Resolved<Option<ResolvedConverter>> {
    let fail = |kind: DiagnosticKind, converter: &str| {
        Resolved::failed(
            None,
            Diagnostic::new(kind)
                .with("member", member)
                .with("converter", converter)
                .at(location),
        )
    };

    let (function, helper) = match spec {
        ConverterSpec::Named(name) => match ctx.config.function(name) {
            Some(f) => (f.clone(), None),
            None => return fail(DiagnosticKind::ConverterNotFound, name),
        },
        ConverterSpec::Inline { parameters, returns } => {
            let element = target_ty
                .as_collection()
                .and_then(|c| c.element())
                .unwrap_or(target_ty);
            let name = lifted_name(member, &ctx.display(element));
            let helper = HelperFunction {
                name: name.clone(),
                parameters: parameters.clone(),
                returns: returns.clone(),
            };
            let function = FunctionDescriptor {
                name,
                parameters: parameters.clone(),
                returns: Some(returns.clone()),
                nullable_context: ctx.settings.nullable_context,
                location: location.cloned(),
            };
            (function, Some(helper))
        }
    };

    let Some(input) = function.parameters.first() else {
        return fail(DiagnosticKind::ConverterInputIncompatible, &function.name);
    };
    if function.parameters.len() > 2 {
        return fail(DiagnosticKind::ConverterInputIncompatible, &function.name);
    }
    let Some(returns) = function.returns.as_ref() else {
        return fail(DiagnosticKind::ConverterReturnIncompatible, &function.name);
    };

    let element_wise = if source_ty.is_assignable_to(&input.ty) {
        false
    } else if element_types(source_ty, target_ty)
        .is_some_and(|(s, _)| s.is_assignable_to(&input.ty))
    {
        true
    } else {
        return fail(DiagnosticKind::ConverterInputIncompatible, &function.name);
    };

    let expected = if element_wise {
        element_types(source_ty, target_ty).map_or(target_ty, |(_, t)| t)
    } else {
        target_ty
    };
    if !returns.is_assignable_to(expected) {
        return fail(DiagnosticKind::ConverterReturnIncompatible, &function.name);
    }

    let mut diagnostics = Diagnostics::new();
    let mut passes_parameter_bag = false;
    if let Some(bag_param) = function.parameters.get(1) {
        match &ctx.config.parameter_bag {
            Some(bag) if bag.is_assignable_to(&bag_param.ty) => passes_parameter_bag = true,
            Some(_) => return fail(DiagnosticKind::ConverterInputIncompatible, &function.name),
            None => diagnostics.push(
                Diagnostic::new(DiagnosticKind::ConverterParameterBagMissing)
                    .with("member", member)
                    .with("converter", &function.name)
                    .at(location),
            ),
        }
    }

    Resolved::new(
        Some(ResolvedConverter {
            binding: ConverterBinding {
                function: function.name,
                element_wise,
                passes_parameter_bag,
            },
            helper,
        }),
        diagnostics,
    )
}
