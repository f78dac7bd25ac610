use mapforge_resolve::{resolve_explicit, resolve_implicit, CancellationFlag, ResolveContext};
use mapforge_schema::{ConfigOverrides, MappingConfiguration, MemberKind, NameMatching};
use mapforge_test_utils::company;

#[test]
fn test_flattening_and_accessor_aliases() {
    let c = company();
    let config = MappingConfiguration::new();
    let cancel = CancellationFlag::new();
    let ctx = ResolveContext::new(&c.table, &config, c.employee, c.employee_dto, &cancel).unwrap();

    let city = resolve_implicit(&ctx, "AddressCity").unwrap();
    assert_eq!(city.path().to_string(), "Address.City");
    assert!(city.is_nested());

    let display = resolve_implicit(&ctx, "DisplayName").unwrap();
    assert_eq!(display.root(), Some("GetDisplayName"));
    assert_eq!(display.segments[0].kind, MemberKind::Accessor);

    assert!(resolve_implicit(&ctx, "TenantId").is_none());
}

#[test]
fn test_explicit_paths_and_case_insensitive_matching() {
    let c = company();
    let config = MappingConfiguration::new()
        .with_mapper(ConfigOverrides::new().with_name_matching(NameMatching::CaseInsensitive));
    let cancel = CancellationFlag::new();
    let ctx = ResolveContext::new(&c.table, &config, c.employee, c.employee_dto, &cancel).unwrap();

    let street = resolve_explicit(&ctx, &"address.street".parse().unwrap()).unwrap();
    assert_eq!(street.path().to_string(), "Address.Street");

    let through_manager = resolve_explicit(&ctx, &"Manager.Address.City".parse().unwrap()).unwrap();
    assert!(through_manager.is_nullable());

    assert!(resolve_explicit(&ctx, &"Address.Zip".parse().unwrap()).is_none());
}
