//! Reference handling (cycle guard)

use mapforge_schema::{ReferenceHandling, SchemaError, TypeId, TypeKind, TypeRef, TypeTable};
use serde::{Deserialize, Serialize};

/// Whether the generated conversion threads an identity-keyed lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleGuard {
    /// Already-converted instances are looked up, partial targets registered
    /// before nested members are mapped
    Enabled,
    /// Pure conversion, no lookup table
    Disabled,
}

impl CycleGuard {
    /// Whether the guard is on
    #[inline]
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

fn is_object_graph(table: &TypeTable, ty: &TypeRef, target: TypeId) -> Result<bool, SchemaError> {
    match ty {
        TypeRef::Primitive(_) => Ok(false),
        TypeRef::Named(id) if *id == target => Ok(true),
        TypeRef::Named(id) => Ok(matches!(
            table.get(*id)?.kind,
            TypeKind::Class | TypeKind::Record
        )),
        TypeRef::Collection(c) => match c.element() {
            Some(element) => is_object_graph(table, element, target),
            None => Ok(false),
        },
    }
}

/// Decide reference handling for a target type
///
/// `Auto` turns the guard on when the target has a member of its own type
/// or any nested class/record member, directly or as a collection element.
///
/// # Errors
/// Returns [`SchemaError::UnknownType`] for ids not in the table
pub fn resolve_reference_handling(
    table: &TypeTable,
    target: TypeId,
    mode: ReferenceHandling,
) -> Result<CycleGuard, SchemaError> {
    match mode {
        ReferenceHandling::Enabled => Ok(CycleGuard::Enabled),
        ReferenceHandling::Disabled => Ok(CycleGuard::Disabled),
        ReferenceHandling::Auto => {
            let descriptor = table.get(target)?;
            for member in &descriptor.members {
                if is_object_graph(table, &member.ty, target)? {
                    return Ok(CycleGuard::Enabled);
                }
            }
            Ok(CycleGuard::Disabled)
        }
    }
}
