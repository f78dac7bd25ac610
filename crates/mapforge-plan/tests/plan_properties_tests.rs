use mapforge_diagnostics::DiagnosticKind;
use mapforge_plan::{MappingPlan, MappingRequest, MappingSession, PlanAssembler, PlanError};
use mapforge_resolve::{
    ArgumentSource, CollectionProjection, ConstructorChoice, CycleGuard, EnumFallback, InitMode,
    NullHandling, ShapeTerminal, TypePair, ValueConversion,
};
use mapforge_schema::{
    CollectionShape, ConfigOverrides, ConstructorDescriptor, EnumPairConfig, EnumStrategy,
    IgnoreDirective, MappingConfiguration, MemberDescriptor, NameMatching, NullPolicy,
    ParameterDescriptor, Primitive, ReferenceHandling, Side, StrictEnumMode, TypeDescriptor,
    TypeId, TypeTable,
};
use mapforge_test_utils::{company, init_tracing, Company};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn assemble(
    c: &Company,
    source: TypeId,
    target: TypeId,
    config: &MappingConfiguration,
) -> Result<MappingPlan, PlanError> {
    init_tracing();
    PlanAssembler::new(&c.table).assemble(source, target, config)
}

fn null_policy() -> impl Strategy<Value = NullPolicy> {
    prop_oneof![
        Just(NullPolicy::Auto),
        Just(NullPolicy::SetNull),
        Just(NullPolicy::ThrowException),
        Just(NullPolicy::SetEmptyCollection),
    ]
}

fn enum_strategy() -> impl Strategy<Value = EnumStrategy> {
    prop_oneof![
        Just(EnumStrategy::ByUnderlyingValue),
        Just(EnumStrategy::ByName),
        Just(EnumStrategy::ByNameCaseInsensitive),
    ]
}

fn reference_handling() -> impl Strategy<Value = ReferenceHandling> {
    prop_oneof![
        Just(ReferenceHandling::Auto),
        Just(ReferenceHandling::Enabled),
        Just(ReferenceHandling::Disabled),
    ]
}

fn name_matching() -> impl Strategy<Value = NameMatching> {
    prop_oneof![Just(NameMatching::CaseSensitive), Just(NameMatching::CaseInsensitive)]
}

proptest! {
    #[test]
    fn prop_resolution_is_deterministic(
        pair_index in 0..5usize,
        policy in null_policy(),
        strategy in enum_strategy(),
        references in reference_handling(),
        matching in name_matching(),
        copy_arrays in any::<bool>(),
    ) {
        let c = company();
        let pairs = [
            (c.employee, c.employee_dto),
            (c.team, c.team_dto),
            (c.manager, c.manager_dto),
            (c.point, c.point_dto),
            (c.status, c.status_dto),
        ];
        let (source, target) = pairs[pair_index];
        let config = MappingConfiguration::new().with_mapper(
            ConfigOverrides::new()
                .with_null_policy(policy)
                .with_enum_strategy(strategy)
                .with_reference_handling(references)
                .with_name_matching(matching)
                .with_copy_primitive_arrays(copy_arrays),
        );

        let first = PlanAssembler::new(&c.table).assemble(source, target, &config);
        let second = PlanAssembler::new(&company().table).assemble(source, target, &config);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
                prop_assert_eq!(a, b);
            }
            (Err(PlanError::Rejected(a)), Err(PlanError::Rejected(b))) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "diverging results: {:?} / {:?}", a.is_ok(), b.is_ok()),
        }
    }
}

#[test]
fn test_constructor_tie_break_picks_first_declared() {
    let c = company();
    let plan = assemble(&c, c.pair, c.pair_dto, &MappingConfiguration::new()).unwrap();

    let ConstructorChoice::Declared { index, arguments } = &plan.constructor else {
        panic!("expected a declared constructor, got {:?}", plan.constructor);
    };
    assert_eq!(*index, 0);
    let parameters: Vec<&str> = arguments.iter().map(|a| a.parameter.as_str()).collect();
    assert_eq!(parameters, ["number", "label"]);
    assert_eq!(arguments[0].source, ArgumentSource::Property("Number".into()));
    assert!(plan.post_construction().next().is_none());
}

#[test]
fn test_constructor_tie_break_prefers_widest_full_match() {
    init_tracing();
    let mut table = TypeTable::new();
    let user = table.insert(
        TypeDescriptor::class("App.User")
            .with_member(MemberDescriptor::new("Id", Primitive::I32))
            .with_member(MemberDescriptor::new("Name", Primitive::String)),
    );
    let ctor = |params: &[(&str, Primitive)]| {
        ConstructorDescriptor::new(
            params
                .iter()
                .map(|(n, p)| ParameterDescriptor::new(*n, *p))
                .collect(),
        )
    };
    let user_dto = table.insert(
        TypeDescriptor::class("App.UserDto")
            .with_member(MemberDescriptor::new("Id", Primitive::I32).read_only())
            .with_member(MemberDescriptor::new("Name", Primitive::String).read_only())
            .with_constructor(ctor(&[("id", Primitive::I32)]))
            .with_constructor(ctor(&[("name", Primitive::String)]))
            .with_constructor(ctor(&[("id", Primitive::I32), ("name", Primitive::String)])),
    );

    let plan = PlanAssembler::new(&table)
        .assemble(user, user_dto, &MappingConfiguration::new())
        .unwrap();

    let ConstructorChoice::Declared { index, arguments } = &plan.constructor else {
        panic!("expected a declared constructor, got {:?}", plan.constructor);
    };
    assert_eq!(*index, 2);
    let parameters: Vec<&str> = arguments.iter().map(|a| a.parameter.as_str()).collect();
    assert_eq!(parameters, ["id", "name"]);
    assert!(plan.diagnostics.is_empty(), "{}", plan.diagnostics);
}

#[test]
fn test_cycle_guard_auto_manager_vs_point() {
    let c = company();
    let config = MappingConfiguration::new();
    let manager = assemble(&c, c.manager, c.manager_dto, &config).unwrap();
    let point = assemble(&c, c.point, c.point_dto, &config).unwrap();

    assert_eq!(manager.cycle_guard, CycleGuard::Enabled);
    assert_eq!(point.cycle_guard, CycleGuard::Disabled);
    assert_eq!(manager.nested_pairs, vec![TypePair::new(c.manager, c.manager_dto)]);
}

#[test]
fn test_explicit_reference_handling_overrides_auto() {
    let c = company();
    let config = MappingConfiguration::new()
        .with_call(ConfigOverrides::new().with_reference_handling(ReferenceHandling::Disabled));
    let manager = assemble(&c, c.manager, c.manager_dto, &config).unwrap();
    assert_eq!(manager.cycle_guard, CycleGuard::Disabled);
}

#[test]
fn test_strict_enum_mismatch_names_c() {
    let c = company();
    let config = MappingConfiguration::new().with_enum_pair(
        EnumPairConfig::new("App.Letter", "App.LetterDto")
            .with_strategy(EnumStrategy::ByName)
            .with_strict(StrictEnumMode::SourceAndTarget),
    );
    let err = assemble(&c, c.letter, c.letter_dto, &config).unwrap_err();
    let diagnostics = err.diagnostics().expect("rejected");

    let mismatches: Vec<_> = diagnostics
        .of_kind(DiagnosticKind::StrictEnumMappingMismatch)
        .collect();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].param("member"), Some("C"));
    assert_eq!(mismatches[0].param("side"), Some("source"));
}

#[test]
fn test_non_strict_by_name_enum_records_runtime_failure() {
    let c = company();
    let config = MappingConfiguration::new()
        .with_call(ConfigOverrides::new().with_enum_strategy(EnumStrategy::ByName));
    let plan = assemble(&c, c.letter, c.letter_dto, &config).unwrap();
    let mapping = plan.enum_mapping.as_ref().unwrap();

    assert_eq!(mapping.table.len(), 2);
    assert_eq!(mapping.fallback, EnumFallback::Throw);
    assert_eq!(plan.runtime_failures.len(), 1);
}

#[test]
fn test_enum_fallback_suppresses_runtime_failure() {
    let c = company();
    let config = MappingConfiguration::new().with_enum_pair(
        EnumPairConfig::new("App.Letter", "App.LetterDto")
            .with_strategy(EnumStrategy::ByName)
            .with_fallback("A"),
    );
    let plan = assemble(&c, c.letter, c.letter_dto, &config).unwrap();
    assert!(plan.runtime_failures.is_empty());
}

#[test]
fn test_pair_ignores_apply_to_member_enums() {
    let c = company();
    let strict = EnumPairConfig::new("App.Status", "App.StatusDto")
        .with_strategy(EnumStrategy::ByName)
        .with_strict(StrictEnumMode::SourceOnly);

    let rejected = MappingConfiguration::new().with_enum_pair(strict.clone());
    let err = assemble(&c, c.employee, c.employee_dto, &rejected).unwrap_err();
    let diagnostics = err.diagnostics().expect("rejected");
    assert_eq!(diagnostics.of_kind(DiagnosticKind::StrictEnumMappingMismatch).count(), 1);

    let suspended = IgnoreDirective::on_declaration(Side::Source, "Suspended");
    let ignoring = MappingConfiguration::new().with_enum_pair(strict.with_ignore(suspended));
    let plan = assemble(&c, c.employee, c.employee_dto, &ignoring).unwrap();
    let ValueConversion::Enum(status) = &plan.property("Status").unwrap().conversion else {
        panic!("expected an enum conversion");
    };
    assert_eq!(status.table.len(), 2);
}

#[test]
fn test_enumerable_to_list_collects() {
    let c = company();
    let plan = assemble(&c, c.team, c.team_dto, &MappingConfiguration::new()).unwrap();
    let members = plan.property("Members").unwrap();

    assert_eq!(
        members.conversion,
        ValueConversion::Collection(CollectionProjection::Transform {
            element: Box::new(ValueConversion::Nested(TypePair::new(c.employee, c.employee_dto))),
            terminal: ShapeTerminal::ListCollect,
        })
    );
    assert_eq!(plan.nested_pairs, vec![TypePair::new(c.employee, c.employee_dto)]);
}

#[test]
fn test_set_empty_collection_coalesces_nullable_array() {
    let c = company();
    let config = MappingConfiguration::new()
        .with_call(ConfigOverrides::new().with_null_policy(NullPolicy::SetEmptyCollection));
    let plan = assemble(&c, c.employee, c.employee_dto, &config).unwrap();

    assert_eq!(
        plan.property("Scores").unwrap().null_handling,
        NullHandling::CoalesceEmpty {
            shape: CollectionShape::Array
        }
    );
    assert_eq!(plan.property("Email").unwrap().null_handling, NullHandling::Propagate);
}

#[test]
fn test_throw_policy_records_argument_null_failures() {
    let c = company();
    let config = MappingConfiguration::new()
        .with_call(ConfigOverrides::new().with_null_policy(NullPolicy::ThrowException));
    let plan = assemble(&c, c.employee, c.employee_dto, &config).unwrap();
    assert!(plan.property("Scores").unwrap().null_handling.throws());
    assert!(!plan.runtime_failures.is_empty());
}

#[test]
fn test_required_member_becomes_one_external_parameter() {
    let c = company();
    let plan = assemble(&c, c.employee, c.employee_dto, &MappingConfiguration::new()).unwrap();

    assert_eq!(plan.external_parameters.len(), 1);
    assert_eq!(plan.external_parameters[0].name, "tenantId");
    let tenant = plan.property("TenantId").unwrap();
    assert!(tenant.is_external());
    assert_eq!(tenant.init_mode, InitMode::ObjectInitializer);
    assert!(plan.constructor_arguments().iter().all(|a| a.parameter != "tenantId"));
    assert!(plan.post_construction().any(|p| p.target == "TenantId"));
}

#[test]
fn test_batch_keeps_request_order_and_isolates_failures() {
    let c = company();
    let session = MappingSession::new(c.table.clone()).unwrap();
    let strict = MappingConfiguration::new()
        .with_call(ConfigOverrides::new().with_strict_enum(StrictEnumMode::SourceOnly));
    let requests = vec![
        MappingRequest::new(c.point, c.point_dto),
        MappingRequest::new(c.letter, c.letter_dto).with_config(strict),
        MappingRequest::new(c.team, c.team_dto),
    ];

    let results = session.resolve_all(&requests);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().target, c.point_dto);
    assert!(matches!(results[1], Err(PlanError::Rejected(_))));
    assert_eq!(results[2].as_ref().unwrap().target, c.team_dto);
}

#[test]
fn test_dependencies_of_team_are_resolved_transitively() {
    let c = company();
    let session = MappingSession::new(c.table.clone()).unwrap();
    let graph = session.resolve_with_dependencies(c.team, c.team_dto, &MappingConfiguration::new());

    let pairs: Vec<TypePair> = graph.keys().copied().collect();
    assert_eq!(
        pairs,
        vec![
            TypePair::new(c.team, c.team_dto),
            TypePair::new(c.employee, c.employee_dto),
            TypePair::new(c.address, c.address_dto),
        ]
    );
}
