//! Type arena
//!
//! Descriptors are stored by stable [`TypeId`] in a flat [`TypeTable`].
//! Members refer to other descriptors only by id, so "type equals self"
//! is an id comparison and self-referential schemas never recurse.

use crate::descriptor::TypeDescriptor;
use crate::hash::{Fingerprint, HashError};
use crate::types::TypeRef;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Stable identifier of a descriptor in a [`TypeTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl Display for TypeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Flat arena of type descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTable {
    types: Vec<TypeDescriptor>,
}

impl TypeTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { types: Vec::new() }
    }

    /// Insert a descriptor, returning its id
    ///
    /// # Panics
    /// Panics if the table already holds `u32::MAX` descriptors.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> TypeId {
        let id = TypeId(u32::try_from(self.types.len()).expect("type table overflow"));
        self.types.push(descriptor);
        id
    }

    /// Reserve an id for a type whose members refer to itself
    ///
    /// The slot holds an empty class until [`define`](Self::define) fills it.
    pub fn declare(&mut self, full_name: &str) -> TypeId {
        self.insert(TypeDescriptor::class(full_name))
    }

    /// Fill a previously declared slot
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownType`] if the id was never issued
    pub fn define(&mut self, id: TypeId, descriptor: TypeDescriptor) -> Result<(), SchemaError> {
        let slot = self
            .types
            .get_mut(id.0 as usize)
            .ok_or(SchemaError::UnknownType(id))?;
        *slot = descriptor;
        Ok(())
    }

    /// Look up a descriptor
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownType`] for ids not in this table
    #[inline]
    pub fn get(&self, id: TypeId) -> Result<&TypeDescriptor, SchemaError> {
        self.types.get(id.0 as usize).ok_or(SchemaError::UnknownType(id))
    }

    /// Find a descriptor id by fully-qualified name
    #[must_use]
    pub fn find(&self, full_name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .position(|t| t.full_name == full_name)
            .and_then(|i| u32::try_from(i).ok())
            .map(TypeId)
    }

    /// Number of descriptors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over `(id, descriptor)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeDescriptor)> {
        self.types
            .iter()
            .enumerate()
            .filter_map(|(i, t)| u32::try_from(i).ok().map(|i| (TypeId(i), t)))
    }

    /// Structural fingerprint of the whole table
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn fingerprint(&self) -> Result<Fingerprint, HashError> {
        Fingerprint::of(self)
    }

    /// Display name of a type reference, resolving named ids
    #[must_use]
    pub fn display(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive(p) => p.name().to_string(),
            TypeRef::Named(id) => self
                .get(*id)
                .map_or_else(|_| id.to_string(), |t| t.name.clone()),
            TypeRef::Collection(c) => {
                let element = c
                    .element()
                    .map_or_else(|| "?".to_string(), |e| self.display(e));
                format!("{:?}<{element}>", c.shape)
            }
        }
    }
}

/// Errors raised while reading the schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Id does not belong to the table
    #[error("unknown type id {0}")]
    UnknownType(TypeId),

    /// Enum operation on a non-enum type
    #[error("type '{0}' is not an enum")]
    NotAnEnum(String),
}
