use mapforge_schema::{
    ConfigOverrides, MappingConfiguration, MappingSettings, NullPolicy, ReferenceHandling,
    TypeDescriptor,
};
use proptest::prelude::*;

fn null_policy() -> impl Strategy<Value = Option<NullPolicy>> {
    prop_oneof![
        Just(None),
        Just(Some(NullPolicy::Auto)),
        Just(Some(NullPolicy::SetNull)),
        Just(Some(NullPolicy::ThrowException)),
        Just(Some(NullPolicy::SetEmptyCollection)),
    ]
}

fn reference_handling() -> impl Strategy<Value = Option<ReferenceHandling>> {
    prop_oneof![
        Just(None),
        Just(Some(ReferenceHandling::Auto)),
        Just(Some(ReferenceHandling::Enabled)),
        Just(Some(ReferenceHandling::Disabled)),
    ]
}

fn layer() -> impl Strategy<Value = ConfigOverrides> {
    (null_policy(), reference_handling(), proptest::option::of(any::<bool>())).prop_map(
        |(null_policy, reference_handling, copy_primitive_arrays)| ConfigOverrides {
            null_policy,
            reference_handling,
            copy_primitive_arrays,
            ..ConfigOverrides::default()
        },
    )
}

#[test]
fn empty_layer_is_identity() {
    let settings = MappingSettings::default();
    assert_eq!(settings.apply(&ConfigOverrides::new()), settings);
}

proptest! {
    #[test]
    fn prop_last_set_layer_wins(
        assembly in layer(),
        per_type in layer(),
        mapper in layer(),
        call in layer(),
    ) {
        let target = TypeDescriptor::class("App.Target").with_overrides(per_type.clone());
        let config = MappingConfiguration::new()
            .with_assembly(assembly.clone())
            .with_mapper(mapper.clone())
            .with_call(call.clone());
        let settings = config.settings_for(&target);

        let expected_null = [&call, &mapper, &per_type, &assembly]
            .iter()
            .find_map(|l| l.null_policy)
            .unwrap_or_default();
        prop_assert_eq!(settings.null_policy, expected_null);

        let expected_refs = [&call, &mapper, &per_type, &assembly]
            .iter()
            .find_map(|l| l.reference_handling)
            .unwrap_or_default();
        prop_assert_eq!(settings.reference_handling, expected_refs);

        let expected_copy = [&call, &mapper, &per_type, &assembly]
            .iter()
            .find_map(|l| l.copy_primitive_arrays)
            .unwrap_or(false);
        prop_assert_eq!(settings.copy_primitive_arrays, expected_copy);
    }

    #[test]
    fn prop_settings_are_deterministic(call in layer()) {
        let target = TypeDescriptor::class("App.Target");
        let config = MappingConfiguration::new().with_call(call);
        prop_assert_eq!(config.settings_for(&target), config.clone().settings_for(&target));
    }
}
