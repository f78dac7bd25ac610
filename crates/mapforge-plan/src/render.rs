//! Renderer seam
//!
//! Renderers turn a plan into source text or any other artifact. The
//! engine never hands out a plan with error diagnostics, and
//! [`render_plan`] checks again so a plan decoded from elsewhere cannot
//! slip through.

use crate::plan::MappingPlan;
use mapforge_diagnostics::Diagnostics;

/// Consumes mapping plans
pub trait PlanRenderer {
    /// Rendered artifact
    type Output;
    /// Renderer failure
    type Error: std::error::Error + 'static;

    /// Render one plan
    ///
    /// # Errors
    /// Renderer-specific
    fn render(&mut self, plan: &MappingPlan) -> Result<Self::Output, Self::Error>;
}

/// Failure to render a plan
#[derive(Debug, thiserror::Error)]
pub enum RenderError<E: std::error::Error + 'static> {
    /// The plan carries error diagnostics
    #[error("plan blocked by {} error diagnostic(s)", .0.errors().count())]
    Blocked(Diagnostics),

    /// The renderer failed
    #[error("renderer failed: {0}")]
    Renderer(#[source] E),
}

/// Render a plan, refusing plans that carry error diagnostics
///
/// # Errors
/// - [`RenderError::Blocked`] if the plan has error diagnostics
/// - [`RenderError::Renderer`] if the renderer fails
pub fn render_plan<R: PlanRenderer + ?Sized>(
    renderer: &mut R,
    plan: &MappingPlan,
) -> Result<R::Output, RenderError<R::Error>> {
    if plan.diagnostics.has_errors() {
        tracing::warn!("Refusing to render {} -> {}", plan.source_name, plan.target_name);
        return Err(RenderError::Blocked(plan.diagnostics.clone()));
    }
    renderer.render(plan).map_err(RenderError::Renderer)
}

/// Renders plans as pretty-printed JSON for out-of-process renderers
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl PlanRenderer for JsonRenderer {
    type Output = String;
    type Error = serde_json::Error;

    fn render(&mut self, plan: &MappingPlan) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::PlanAssembler;
    use mapforge_diagnostics::{Diagnostic, DiagnosticKind};
    use mapforge_schema::MappingConfiguration;
    use mapforge_test_utils::company;

    fn point_plan() -> MappingPlan {
        let c = company();
        PlanAssembler::new(&c.table)
            .assemble(c.point, c.point_dto, &MappingConfiguration::new())
            .unwrap()
    }

    #[test]
    fn json_renderer_output_decodes_to_the_same_plan() {
        let plan = point_plan();
        let json = render_plan(&mut JsonRenderer, &plan).unwrap();
        assert_eq!(MappingPlan::from_json(&json).unwrap(), plan);
    }

    #[test]
    fn plans_with_errors_are_blocked() {
        let mut plan = point_plan();
        plan.diagnostics
            .push(Diagnostic::new(DiagnosticKind::ConverterNotFound).with("converter", "ToMoney"));
        let err = render_plan(&mut JsonRenderer, &plan).unwrap_err();
        assert!(matches!(err, RenderError::Blocked(d) if d.len() == 1));
    }
}
