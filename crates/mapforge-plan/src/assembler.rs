//! Mapping plan assembler
//!
//! Runs every resolver for one source/target pair and either returns a
//! plan carrying its warnings and infos, or rejects the pair with every
//! diagnostic collected.
//!
//! # Workflow
//! 1. Merge settings for the target
//! 2. Resolve target members
//! 3. Select the constructor
//! 4. Report unread source members
//! 5. Decide the cycle guard
//! 6. Validate before/after hooks

use crate::error::PlanError;
use crate::plan::{runtime_failures, MappingPlan};
use mapforge_diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use mapforge_resolve::{
    resolve_constructor, resolve_enum_mapping, resolve_hook, resolve_properties,
    resolve_reference_handling, unmapped_source_members, ArgumentSource, CancellationFlag,
    ConstructorChoice, CycleGuard, HookStage, ResolveContext,
};
use mapforge_schema::{MappingConfiguration, TypeId, TypeTable};
use std::collections::BTreeSet;

/// Builds [`MappingPlan`]s over one type table
#[derive(Debug, Clone)]
pub struct PlanAssembler<'a> {
    table: &'a TypeTable,
    cancel: CancellationFlag,
}

impl<'a> PlanAssembler<'a> {
    /// Create assembler over a type table
    #[inline]
    #[must_use]
    pub fn new(table: &'a TypeTable) -> Self {
        Self {
            table,
            cancel: CancellationFlag::new(),
        }
    }

    /// Share a cancellation flag with the caller
    #[inline]
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cancellation flag observed by this assembler
    #[inline]
    #[must_use]
    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    /// Assemble the plan converting `source` into `target`
    ///
    /// # Errors
    /// - [`PlanError::Rejected`] if any resolver reported an error
    /// - [`PlanError::Cancelled`] if cancellation was observed
    /// - [`PlanError::Schema`] for ids not in the table
    pub fn assemble(
        &self,
        source: TypeId,
        target: TypeId,
        config: &MappingConfiguration,
    ) -> Result<MappingPlan, PlanError> {
        let ctx = ResolveContext::new(self.table, config, source, target, &self.cancel)?;
        ctx.check_cancelled()?;
        tracing::debug!("Assembling plan: {} -> {}", ctx.source.full_name, ctx.target.full_name);

        match (ctx.source.is_enum(), ctx.target.is_enum()) {
            (true, true) => self.assemble_enum(&ctx),
            (false, false) => self.assemble_object(&ctx),
            _ => {
                let diagnostic = Diagnostic::new(DiagnosticKind::PropertyTypeIncompatible)
                    .with("source_type", &ctx.source.name)
                    .with("target_type", &ctx.target.name)
                    .at(ctx.target.location.as_ref());
                Err(PlanError::Rejected(Diagnostics::from(vec![diagnostic])))
            }
        }
    }

    fn assemble_enum(&self, ctx: &ResolveContext<'_>) -> Result<MappingPlan, PlanError> {
        let (enum_plan, diagnostics) = resolve_enum_mapping(
            self.table,
            ctx.config,
            &ctx.settings,
            ctx.source_id,
            ctx.target_id,
            &ctx.config.enum_ignores,
        )?
        .into_parts();

        let plan = MappingPlan {
            source: ctx.source_id,
            target: ctx.target_id,
            source_name: ctx.source.name.clone(),
            target_name: ctx.target.name.clone(),
            constructor: ConstructorChoice::None,
            properties: Vec::new(),
            external_parameters: Vec::new(),
            runtime_failures: runtime_failures(&[], Some(&enum_plan)),
            enum_mapping: Some(enum_plan),
            cycle_guard: CycleGuard::Disabled,
            before_map: None,
            after_map: None,
            helpers: Vec::new(),
            nested_pairs: Vec::new(),
            diagnostics,
        };
        finish(plan)
    }

    fn assemble_object(&self, ctx: &ResolveContext<'_>) -> Result<MappingPlan, PlanError> {
        let mut diagnostics = Diagnostics::new();

        let properties = resolve_properties(ctx)?.report_into(&mut diagnostics);
        tracing::debug!("Resolved {} member mappings", properties.mappings.len());

        let constructor =
            resolve_constructor(ctx, properties.mappings)?.report_into(&mut diagnostics);

        let mut used: BTreeSet<String> = constructor
            .mappings
            .iter()
            .filter_map(|m| m.source.as_ref()?.root().map(str::to_string))
            .collect();
        used.extend(constructor.choice.arguments().iter().filter_map(|a| match &a.source {
            ArgumentSource::SourceMember(path) => path.root().map(str::to_string),
            ArgumentSource::Property(_) => None,
        }));
        diagnostics.append(unmapped_source_members(ctx, &used));

        let cycle_guard =
            resolve_reference_handling(self.table, ctx.target_id, ctx.settings.reference_handling)?;

        let before_map = ctx
            .config
            .before_map
            .as_ref()
            .and_then(|hook| {
                resolve_hook(ctx, HookStage::Before, hook).report_into(&mut diagnostics)
            });
        let after_map = ctx
            .config
            .after_map
            .as_ref()
            .and_then(|hook| {
                resolve_hook(ctx, HookStage::After, hook).report_into(&mut diagnostics)
            });

        let external_parameters: Vec<_> = properties
            .external_parameters
            .into_iter()
            .filter(|p| constructor.mappings.iter().any(|m| m.target == p.member))
            .collect();

        let mut nested_pairs = Vec::new();
        for mapping in &constructor.mappings {
            mapping.conversion.collect_nested_pairs(&mut nested_pairs);
        }

        let plan = MappingPlan {
            source: ctx.source_id,
            target: ctx.target_id,
            source_name: ctx.source.name.clone(),
            target_name: ctx.target.name.clone(),
            runtime_failures: runtime_failures(&constructor.mappings, None),
            constructor: constructor.choice,
            properties: constructor.mappings,
            external_parameters,
            enum_mapping: None,
            cycle_guard,
            before_map,
            after_map,
            helpers: properties.helpers,
            nested_pairs,
            diagnostics,
        };
        finish(plan)
    }
}

/// Reject a plan carrying errors, otherwise hand it out
fn finish(plan: MappingPlan) -> Result<MappingPlan, PlanError> {
    if plan.diagnostics.has_errors() {
        tracing::warn!(
            "Rejected {} -> {}: {} error(s)",
            plan.source_name,
            plan.target_name,
            plan.diagnostics.errors().count()
        );
        return Err(PlanError::Rejected(plan.diagnostics));
    }
    tracing::info!(
        "Plan ready: {} -> {} ({} members, {} diagnostics)",
        plan.source_name,
        plan.target_name,
        plan.properties.len(),
        plan.diagnostics.len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapforge_resolve::{InitMode, NullHandling, ValueConversion};
    use mapforge_schema::HookRef;
    use mapforge_test_utils::company;

    #[test]
    fn employee_plan() {
        let c = company();
        let plan = PlanAssembler::new(&c.table)
            .assemble(c.employee, c.employee_dto, &MappingConfiguration::new())
            .unwrap();

        assert!(matches!(plan.constructor, ConstructorChoice::Declared { index: 0, .. }));
        assert_eq!(plan.property("Id").unwrap().init_mode, InitMode::ConstructorArgument);
        assert_eq!(plan.property("Email").unwrap().null_handling, NullHandling::Propagate);
        assert_eq!(plan.property("Scores").unwrap().null_handling, NullHandling::SkipWhenNull);
        assert_eq!(
            plan.property("AddressCity").unwrap().source.as_ref().unwrap().path().to_string(),
            "Address.City"
        );
        assert!(matches!(
            plan.property("Status").unwrap().conversion,
            ValueConversion::Enum(ref e) if e.is_cast()
        ));
        assert_eq!(plan.external_parameters.len(), 1);
        assert!(plan.cycle_guard.is_enabled());
        assert_eq!(plan.nested_pairs.len(), 2);
        assert_eq!(
            plan.diagnostics
                .of_kind(DiagnosticKind::SourceMemberNotMapped)
                .next()
                .unwrap()
                .param("member"),
            Some("InternalNotes")
        );
        assert!(plan.post_construction().all(|p| p.target != "Id"));
    }

    #[test]
    fn external_member_keeps_its_write_step() {
        let c = company();
        let plan = PlanAssembler::new(&c.table)
            .assemble(c.employee, c.employee_dto, &MappingConfiguration::new())
            .unwrap();

        let parameters: Vec<&str> = plan
            .constructor_arguments()
            .iter()
            .map(|a| a.parameter.as_str())
            .collect();
        assert_eq!(parameters, ["id"]);

        let tenant = plan.property("TenantId").unwrap();
        assert!(tenant.is_external());
        assert_eq!(tenant.init_mode, InitMode::ObjectInitializer);
        assert!(plan.post_construction().any(|p| p.target == "TenantId"));
        assert_eq!(plan.external_parameter("TenantId").unwrap().name, "tenantId");
    }

    #[test]
    fn errors_reject_the_pair() {
        let c = company();
        let config = MappingConfiguration::new().with_after_map(HookRef::new("Missing"));
        let err = PlanAssembler::new(&c.table)
            .assemble(c.point, c.point_dto, &config)
            .unwrap_err();
        let diagnostics = err.diagnostics().unwrap();
        assert_eq!(diagnostics.of_kind(DiagnosticKind::HookNotFound).count(), 1);
    }

    #[test]
    fn enum_pairs_produce_enum_only_plans() {
        let c = company();
        let plan = PlanAssembler::new(&c.table)
            .assemble(c.status, c.status_dto, &MappingConfiguration::new())
            .unwrap();
        assert!(plan.is_enum_mapping());
        assert!(plan.properties.is_empty());
        assert!(matches!(plan.constructor, ConstructorChoice::None));
    }

    #[test]
    fn enum_against_class_is_incompatible() {
        let c = company();
        let err = PlanAssembler::new(&c.table)
            .assemble(c.status, c.point_dto, &MappingConfiguration::new())
            .unwrap_err();
        assert_eq!(
            err.diagnostics().unwrap().of_kind(DiagnosticKind::PropertyTypeIncompatible).count(),
            1
        );
    }

    #[test]
    fn cancelled_before_start() {
        let c = company();
        let cancel = CancellationFlag::new();
        cancel.cancel();
        let err = PlanAssembler::new(&c.table)
            .with_cancellation(cancel)
            .assemble(c.point, c.point_dto, &MappingConfiguration::new())
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn unknown_ids_are_schema_errors() {
        let c = company();
        let err = PlanAssembler::new(&c.table)
            .assemble(TypeId(999), c.point_dto, &MappingConfiguration::new())
            .unwrap_err();
        assert!(matches!(err, PlanError::Schema(_)));
    }
}
