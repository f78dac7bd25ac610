//! Per-pair resolution context

use crate::cancel::CancellationFlag;
use crate::error::ResolveError;
use convert_case::{Case, Casing};
use mapforge_schema::{
    MappingConfiguration, MappingSettings, Nullability, NullableContext, Semantics,
    TypeDescriptor, TypeId, TypeRef, TypeTable,
};

/// Read-only inputs shared by every resolver of one source/target pair
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Type arena
    pub table: &'a TypeTable,
    /// Raw configuration (directives, hooks, functions)
    pub config: &'a MappingConfiguration,
    /// Merged settings for the target
    pub settings: MappingSettings,
    /// Source type id
    pub source_id: TypeId,
    /// Target type id
    pub target_id: TypeId,
    /// Source descriptor
    pub source: &'a TypeDescriptor,
    /// Target descriptor
    pub target: &'a TypeDescriptor,
    cancel: &'a CancellationFlag,
}

impl<'a> ResolveContext<'a> {
    /// Look up both descriptors and merge settings for the target
    ///
    /// # Errors
    /// Returns [`ResolveError::Schema`] if either id is unknown
    pub fn new(
        table: &'a TypeTable,
        config: &'a MappingConfiguration,
        source_id: TypeId,
        target_id: TypeId,
        cancel: &'a CancellationFlag,
    ) -> Result<Self, ResolveError> {
        let source = table.get(source_id)?;
        let target = table.get(target_id)?;
        Ok(Self {
            table,
            config,
            settings: config.settings_for(target),
            source_id,
            target_id,
            source,
            target,
            cancel,
        })
    }

    /// Fail if cancellation was requested
    ///
    /// # Errors
    /// Returns [`ResolveError::Cancelled`]
    #[inline]
    pub fn check_cancelled(&self) -> Result<(), ResolveError> {
        self.cancel.check()
    }

    /// Cancellation flag of this pair
    #[inline]
    #[must_use]
    pub fn cancellation(&self) -> &'a CancellationFlag {
        self.cancel
    }

    /// Compare member names under the configured matching
    #[inline]
    #[must_use]
    pub fn names_match(&self, a: &str, b: &str) -> bool {
        self.settings.name_matching.matches(a, b)
    }

    /// Whether a value of `ty` has reference semantics
    #[must_use]
    pub fn is_reference(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Primitive(p) => p.is_reference(),
            TypeRef::Collection(_) => true,
            TypeRef::Named(id) => self
                .table
                .get(*id)
                .map_or(true, |t| t.semantics == Semantics::Reference),
        }
    }

    /// Effective nullability of a member or element
    ///
    /// Oblivious reference members are nullable only when the ambient
    /// nullable context is disabled.
    #[must_use]
    pub fn is_nullable(&self, nullability: Nullability, ty: &TypeRef) -> bool {
        let type_admits_null = ty
            .as_named()
            .and_then(|id| self.table.get(id).ok())
            .is_some_and(|t| t.nullable);
        match nullability {
            Nullability::Nullable => true,
            Nullability::NotNull => type_admits_null,
            Nullability::Oblivious => {
                type_admits_null
                    || (self.settings.nullable_context == NullableContext::Disabled
                        && self.is_reference(ty))
            }
        }
    }

    /// Display name of a type
    #[inline]
    #[must_use]
    pub fn display(&self, ty: &TypeRef) -> String {
        self.table.display(ty)
    }
}

/// Casing-insensitive identity of a member or parameter name
///
/// `FirstName`, `firstName` and `first_name` all normalize to `first_name`.
#[must_use]
pub fn normalized_name(name: &str) -> String {
    name.to_case(Case::Snake)
}

/// Parameter-style name for a member, `FirstName` → `firstName`
#[must_use]
pub fn parameter_name(name: &str) -> String {
    name.to_case(Case::Camel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapforge_schema::{ConfigOverrides, Primitive};

    #[test]
    fn names_normalize_across_casings() {
        assert_eq!(normalized_name("FirstName"), normalized_name("firstName"));
        assert_eq!(normalized_name("first_name"), "first_name");
        assert_eq!(parameter_name("EmployeeId"), "employeeId");
    }

    #[test]
    fn oblivious_depends_on_context() {
        let mut table = TypeTable::new();
        let a = table.insert(TypeDescriptor::class("A"));
        let cancel = CancellationFlag::new();

        let enabled = MappingConfiguration::new();
        let ctx = ResolveContext::new(&table, &enabled, a, a, &cancel).unwrap();
        let string = TypeRef::primitive(Primitive::String);
        assert!(!ctx.is_nullable(Nullability::Oblivious, &string));
        assert!(ctx.is_nullable(Nullability::Nullable, &string));

        let disabled = MappingConfiguration::new().with_assembly(
            ConfigOverrides::new().with_nullable_context(NullableContext::Disabled),
        );
        let ctx = ResolveContext::new(&table, &disabled, a, a, &cancel).unwrap();
        assert!(ctx.is_nullable(Nullability::Oblivious, &string));
        assert!(!ctx.is_nullable(Nullability::Oblivious, &Primitive::I32.into()));
    }

    #[test]
    fn unknown_ids_are_schema_errors() {
        let table = TypeTable::new();
        let config = MappingConfiguration::new();
        let cancel = CancellationFlag::new();
        assert!(matches!(
            ResolveContext::new(&table, &config, TypeId(0), TypeId(1), &cancel),
            Err(ResolveError::Schema(_))
        ));
    }
}
