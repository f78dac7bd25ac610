//! Testing utilities for the mapforge workspace
//!
//! Shared schemas, configurations and helpers.

#![allow(missing_docs)]

use mapforge_schema::{
    ConstructorDescriptor, Location, MemberDescriptor, ParameterDescriptor, Primitive,
    TypeDescriptor, TypeId, TypeRef, TypeTable,
};

/// Location inside the fixture mapper file
pub fn location(line: u32) -> Location {
    Location::new("Mapper.cs", line, 5)
}

/// Install a test subscriber honoring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The company schema and the ids of its types
#[derive(Debug, Clone)]
pub struct Company {
    pub table: TypeTable,
    pub address: TypeId,
    pub address_dto: TypeId,
    pub employee: TypeId,
    pub employee_dto: TypeId,
    pub team: TypeId,
    pub team_dto: TypeId,
    pub manager: TypeId,
    pub manager_dto: TypeId,
    pub point: TypeId,
    pub point_dto: TypeId,
    pub pair: TypeId,
    pub pair_dto: TypeId,
    pub status: TypeId,
    pub status_dto: TypeId,
    pub letter: TypeId,
    pub letter_dto: TypeId,
}

fn enumeration(full_name: &str, members: &[&str]) -> TypeDescriptor {
    members
        .iter()
        .zip(0_i64..)
        .fold(TypeDescriptor::enumeration(full_name, Primitive::I32), |ty, (name, value)| {
            ty.with_enum_member(*name, value)
        })
}

fn self_referencing(
    table: &mut TypeTable,
    full_name: &str,
    build: impl FnOnce(TypeId) -> TypeDescriptor,
) -> TypeId {
    let id = table.declare(full_name);
    table
        .define(id, build(id))
        .expect("fixture type declared just above");
    id
}

/// Build the company schema
///
/// - `Employee` → `EmployeeDto`: nested self-reference, flattening
///   (`AddressCity`), accessor (`GetDisplayName`), nullable array, enum,
///   a required member with no source and an unmapped source member
/// - `Team` → `TeamDto`: enumerable of employees into a list of dtos
/// - `Manager` (self-referencing) and `Point` (primitives only)
/// - `Pair` → `PairDto`: two equal-width `(int, string)` constructors
/// - `Letter { A, B, C }` → `LetterDto { A, B }` for strict enum checks
pub fn company() -> Company {
    let mut table = TypeTable::new();

    let status = table.insert(enumeration("App.Status", &["Active", "Inactive", "Suspended"]));
    let status_dto = table.insert(enumeration("App.StatusDto", &["Active", "Inactive"]));
    let letter = table.insert(enumeration("App.Letter", &["A", "B", "C"]));
    let letter_dto = table.insert(enumeration("App.LetterDto", &["A", "B"]));

    let address = table.insert(
        TypeDescriptor::class("App.Address")
            .with_member(MemberDescriptor::new("Street", Primitive::String))
            .with_member(MemberDescriptor::new("City", Primitive::String)),
    );
    let address_dto = table.insert(
        TypeDescriptor::class("App.AddressDto")
            .with_member(MemberDescriptor::new("Street", Primitive::String))
            .with_member(MemberDescriptor::new("City", Primitive::String)),
    );

    let employee = self_referencing(&mut table, "App.Employee", |id| {
        TypeDescriptor::class("App.Employee")
            .with_member(MemberDescriptor::new("Id", Primitive::I32))
            .with_member(MemberDescriptor::new("FirstName", Primitive::String))
            .with_member(MemberDescriptor::new("Email", Primitive::String).nullable())
            .with_member(MemberDescriptor::new("Manager", id).nullable())
            .with_member(MemberDescriptor::new("Address", address))
            .with_member(
                MemberDescriptor::new("Scores", TypeRef::array(Primitive::I32.into())).nullable(),
            )
            .with_member(MemberDescriptor::new("Status", status))
            .with_member(MemberDescriptor::accessor("GetDisplayName", Primitive::String))
            .with_member(MemberDescriptor::new("InternalNotes", Primitive::String))
    });
    let employee_dto = self_referencing(&mut table, "App.EmployeeDto", |id| {
        TypeDescriptor::class("App.EmployeeDto")
            .with_member(MemberDescriptor::new("Id", Primitive::I32).read_only().at(location(10)))
            .with_member(MemberDescriptor::new("FirstName", Primitive::String))
            .with_member(MemberDescriptor::new("Email", Primitive::String).nullable())
            .with_member(MemberDescriptor::new("Manager", id).nullable())
            .with_member(MemberDescriptor::new("Address", address_dto))
            .with_member(MemberDescriptor::new("AddressCity", Primitive::String))
            .with_member(MemberDescriptor::new("Scores", TypeRef::array(Primitive::I32.into())))
            .with_member(MemberDescriptor::new("Status", status_dto))
            .with_member(MemberDescriptor::new("DisplayName", Primitive::String))
            .with_member(MemberDescriptor::new("TenantId", Primitive::Guid).required())
            .with_constructor(ConstructorDescriptor::new(vec![ParameterDescriptor::new(
                "id",
                Primitive::I32,
            )]))
            .at(location(8))
    });

    let team = table.insert(
        TypeDescriptor::class("App.Team")
            .with_member(MemberDescriptor::new("Name", Primitive::String))
            .with_member(MemberDescriptor::new("Members", TypeRef::enumerable(employee.into()))),
    );
    let team_dto = table.insert(
        TypeDescriptor::class("App.TeamDto")
            .with_member(MemberDescriptor::new("Name", Primitive::String))
            .with_member(MemberDescriptor::new("Members", TypeRef::list(employee_dto.into()))),
    );

    let manager_members = |ty: TypeDescriptor, id: TypeId| {
        ty.with_member(MemberDescriptor::new("Id", Primitive::I32))
            .with_member(MemberDescriptor::new("Name", Primitive::String))
            .with_member(MemberDescriptor::new("Manager", id).nullable())
    };
    let manager = self_referencing(&mut table, "App.Manager", |id| {
        manager_members(TypeDescriptor::class("App.Manager"), id)
    });
    let manager_dto = self_referencing(&mut table, "App.ManagerDto", |id| {
        manager_members(TypeDescriptor::class("App.ManagerDto"), id)
    });

    let point_members = |ty: TypeDescriptor| {
        ty.value_type()
            .with_member(MemberDescriptor::new("X", Primitive::I32).read_only())
            .with_member(MemberDescriptor::new("Y", Primitive::I32).read_only())
            .with_constructor(ConstructorDescriptor::new(vec![
                ParameterDescriptor::new("x", Primitive::I32),
                ParameterDescriptor::new("y", Primitive::I32),
            ]))
    };
    let point = table.insert(point_members(TypeDescriptor::record("App.Point")));
    let point_dto = table.insert(point_members(TypeDescriptor::record("App.PointDto")));

    let pair = table.insert(
        TypeDescriptor::class("App.Pair")
            .with_member(MemberDescriptor::new("Number", Primitive::I32))
            .with_member(MemberDescriptor::new("Label", Primitive::String)),
    );
    let pair_dto = table.insert(
        TypeDescriptor::class("App.PairDto")
            .with_member(MemberDescriptor::new("Number", Primitive::I32).read_only())
            .with_member(MemberDescriptor::new("Label", Primitive::String).read_only())
            .with_constructor(ConstructorDescriptor::new(vec![
                ParameterDescriptor::new("number", Primitive::I32),
                ParameterDescriptor::new("label", Primitive::String),
            ]))
            .with_constructor(ConstructorDescriptor::new(vec![
                ParameterDescriptor::new("label", Primitive::String),
                ParameterDescriptor::new("number", Primitive::I32),
            ])),
    );

    Company {
        table,
        address,
        address_dto,
        employee,
        employee_dto,
        team,
        team_dto,
        manager,
        manager_dto,
        point,
        point_dto,
        pair,
        pair_dto,
        status,
        status_dto,
        letter,
        letter_dto,
    }
}
