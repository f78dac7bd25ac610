//! Before/after map hook validation

use crate::context::ResolveContext;
use mapforge_diagnostics::{Diagnostic, DiagnosticKind, Resolved};
use mapforge_schema::{FunctionDescriptor, HookRef, ParameterDescriptor, TypeRef};
use serde::{Deserialize, Serialize};

/// Value passed to a hook argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookArgument {
    /// The source object
    Source,
    /// The target object
    Target,
}

/// When a hook runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStage {
    /// Before any member is read
    Before,
    /// After the target is fully built
    After,
}

/// A validated hook call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookBinding {
    /// Function name
    pub function: String,
    /// Arguments in declaration order
    pub arguments: Vec<HookArgument>,
    /// The return value replaces the source (before) or target (after)
    pub replaces_value: bool,
}

fn accepts(ty: &TypeRef, param: &ParameterDescriptor) -> bool {
    ty.is_assignable_to(&param.ty)
}

fn bind_arguments(
    stage: HookStage,
    function: &FunctionDescriptor,
    source: &TypeRef,
    target: &TypeRef,
) -> Option<Vec<HookArgument>> {
    use HookArgument::{Source, Target};

    match (stage, function.parameters.as_slice()) {
        (_, []) => Some(Vec::new()),
        (HookStage::Before, [p]) => accepts(source, p).then(|| vec![Source]),
        (HookStage::Before, _) => None,
        (HookStage::After, [p]) => {
            if accepts(target, p) {
                Some(vec![Target])
            } else if accepts(source, p) {
                Some(vec![Source])
            } else {
                None
            }
        }
        (HookStage::After, [a, b]) => {
            if accepts(source, a) && accepts(target, b) {
                Some(vec![Source, Target])
            } else if accepts(target, a) && accepts(source, b) {
                Some(vec![Target, Source])
            } else {
                None
            }
        }
        (HookStage::After, _) => None,
    }
}

/// Validate a hook reference
///
/// A before-hook takes nothing or the source; an after-hook takes up to one
/// source and one target argument. A non-void hook must take at least one
/// argument and return a value compatible with the object it replaces.
pub fn resolve_hook(
    ctx: &ResolveContext<'_>,
    stage: HookStage,
    hook: &HookRef,
) -> Resolved<Option<HookBinding>> {
    let location = hook.location.as_ref();
    let stage_name = match stage {
        HookStage::Before => "before",
        HookStage::After => "after",
    };
    let diagnostic = |kind| {
        Diagnostic::new(kind)
            .with("hook", &hook.name)
            .with("stage", stage_name)
            .at(location)
    };

    let Some(function) = ctx.config.function(&hook.name) else {
        return Resolved::failed(None, diagnostic(DiagnosticKind::HookNotFound));
    };
    let location = function.location.as_ref().or(location);

    let source = TypeRef::Named(ctx.source_id);
    let target = TypeRef::Named(ctx.target_id);

    let Some(arguments) = bind_arguments(stage, function, &source, &target) else {
        return Resolved::failed(
            None,
            diagnostic(DiagnosticKind::HookInvalidParameters)
                .with("parameters", function.parameters.len())
                .at(location),
        );
    };

    if let Some(returns) = &function.returns {
        let replaced = match stage {
            HookStage::Before => &source,
            HookStage::After => &target,
        };
        if arguments.is_empty() || !returns.is_assignable_to(replaced) {
            return Resolved::failed(
                None,
                diagnostic(DiagnosticKind::HookInvalidParameters)
                    .with("returns", ctx.display(returns))
                    .at(location),
            );
        }
    }

    if function.nullable_context != ctx.settings.nullable_context {
        return Resolved::failed(
            None,
            diagnostic(DiagnosticKind::HookMissingNullabilityAnnotation).at(location),
        );
    }

    Resolved::ok(Some(HookBinding {
        function: function.name.clone(),
        arguments,
        replaces_value: !function.is_void(),
    }))
}
