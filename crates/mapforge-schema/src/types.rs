//! Type references
//!
//! A [`TypeRef`] names the type of a member, parameter or collection
//! element: a primitive tag, a descriptor in the [`TypeTable`](crate::TypeTable)
//! or a collection shape over another type reference.

use crate::table::TypeId;
use serde::{Deserialize, Serialize};

/// Primitive type tags understood by provider and engine alike
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Boolean
    Bool,
    /// UTF-16 code unit
    Char,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer
    I64,
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Unsigned 64-bit integer
    U64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
    /// Decimal number
    Decimal,
    /// String (reference semantics)
    String,
    /// Point in time
    DateTime,
    /// Globally unique identifier
    Guid,
    /// Top type, every value is assignable to it
    Object,
}

impl Primitive {
    /// Whether the primitive has reference semantics
    #[inline]
    #[must_use]
    pub fn is_reference(self) -> bool {
        matches!(self, Self::String | Self::Object)
    }

    /// Whether the primitive is an integer type
    #[inline]
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    /// Implicit widening conversion, the lossless numeric promotions
    #[must_use]
    pub fn widens_to(self, to: Self) -> bool {
        use Primitive::{Char, Decimal, F32, F64, I16, I32, I64, I8, U16, U32, U64, U8};

        let targets: &[Primitive] = match self {
            I8 => &[I16, I32, I64, F32, F64, Decimal],
            U8 => &[I16, U16, I32, U32, I64, U64, F32, F64, Decimal],
            I16 => &[I32, I64, F32, F64, Decimal],
            U16 => &[I32, U32, I64, U64, F32, F64, Decimal],
            I32 => &[I64, F32, F64, Decimal],
            U32 => &[I64, U64, F32, F64, Decimal],
            I64 | U64 => &[F32, F64, Decimal],
            Char => &[U16, I32, U32, I64, U64, F32, F64, Decimal],
            F32 => &[F64],
            _ => &[],
        };
        targets.contains(&to)
    }

    /// Display name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::DateTime => "datetime",
            Self::Guid => "guid",
            Self::Object => "object",
        }
    }
}

/// Declared nullability of a member, parameter or element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nullability {
    /// Annotated as never null
    #[default]
    NotNull,
    /// Annotated as nullable
    Nullable,
    /// Declared outside an annotated context
    Oblivious,
}

/// Ambient nullable-annotation context of a compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullableContext {
    /// Annotations are meaningful; oblivious members are treated as non-null
    #[default]
    Enabled,
    /// No annotations; oblivious reference members may be null
    Disabled,
}

/// Concrete collection shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionShape {
    /// Fixed-size array
    Array,
    /// Mutable span over contiguous memory
    Span,
    /// Read-only span over contiguous memory
    ReadOnlySpan,
    /// Owned memory block
    Memory,
    /// Read-only memory block
    ReadOnlyMemory,
    /// Growable indexable list
    List,
    /// Unordered set
    Set,
    /// Countable collection with unordered add
    Collection,
    /// Single-pass sequence
    Enumerable,
    /// Immutable array
    ImmutableArray,
}

impl CollectionShape {
    /// All shapes, in declaration order
    pub const ALL: [CollectionShape; 10] = [
        Self::Array,
        Self::Span,
        Self::ReadOnlySpan,
        Self::Memory,
        Self::ReadOnlyMemory,
        Self::List,
        Self::Set,
        Self::Collection,
        Self::Enumerable,
        Self::ImmutableArray,
    ];

    /// Structural category of this shape
    #[must_use]
    pub fn category(self) -> ShapeCategory {
        match self {
            Self::Array | Self::Span | Self::ReadOnlySpan | Self::Memory | Self::ReadOnlyMemory => {
                ShapeCategory::FixedSize
            }
            Self::List => ShapeCategory::ListLike,
            Self::Set | Self::Collection => ShapeCategory::CollectionLike,
            Self::Enumerable => ShapeCategory::EnumerableOnly,
            Self::ImmutableArray => ShapeCategory::ImmutableArrayLike,
        }
    }

    /// Whether the element count is known without enumerating
    #[inline]
    #[must_use]
    pub fn is_sized(self) -> bool {
        self.category() != ShapeCategory::EnumerableOnly
    }

    /// Whether elements can be read by index
    #[inline]
    #[must_use]
    pub fn is_indexable(self) -> bool {
        matches!(
            self.category(),
            ShapeCategory::FixedSize | ShapeCategory::ListLike | ShapeCategory::ImmutableArrayLike
        )
    }
}

/// Structural category of a collection shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeCategory {
    /// Array, span or memory
    FixedSize,
    /// Mutable, indexable, growable
    ListLike,
    /// Countable with unordered add
    CollectionLike,
    /// Single-pass
    EnumerableOnly,
    /// Immutable array
    ImmutableArrayLike,
}

/// A collection type: shape plus optional element type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionType {
    /// Collection shape
    pub shape: CollectionShape,

    /// Element type; `None` marks a non-generic (untyped) collection
    pub element: Option<Box<TypeRef>>,

    /// Declared nullability of the elements
    #[serde(default)]
    pub element_nullability: Nullability,
}

impl CollectionType {
    /// Whether this is an untyped collection
    #[inline]
    #[must_use]
    pub fn is_untyped(&self) -> bool {
        self.element.is_none()
    }

    /// Element type, if typed
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<&TypeRef> {
        self.element.as_deref()
    }
}

/// The type of a member, parameter or element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// Primitive tag
    Primitive(Primitive),

    /// Descriptor in the type table
    Named(TypeId),

    /// Collection of another type
    Collection(CollectionType),
}

impl TypeRef {
    /// Primitive type reference
    #[inline]
    #[must_use]
    pub fn primitive(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }

    /// Named type reference
    #[inline]
    #[must_use]
    pub fn named(id: TypeId) -> Self {
        Self::Named(id)
    }

    /// Typed collection reference with non-null elements
    #[inline]
    #[must_use]
    pub fn collection(shape: CollectionShape, element: TypeRef) -> Self {
        Self::Collection(CollectionType {
            shape,
            element: Some(Box::new(element)),
            element_nullability: Nullability::NotNull,
        })
    }

    /// Non-generic collection reference
    #[inline]
    #[must_use]
    pub fn untyped(shape: CollectionShape) -> Self {
        Self::Collection(CollectionType {
            shape,
            element: None,
            element_nullability: Nullability::Oblivious,
        })
    }

    /// Array of the given element
    #[inline]
    #[must_use]
    pub fn array(element: TypeRef) -> Self {
        Self::collection(CollectionShape::Array, element)
    }

    /// List of the given element
    #[inline]
    #[must_use]
    pub fn list(element: TypeRef) -> Self {
        Self::collection(CollectionShape::List, element)
    }

    /// Enumerable of the given element
    #[inline]
    #[must_use]
    pub fn enumerable(element: TypeRef) -> Self {
        Self::collection(CollectionShape::Enumerable, element)
    }

    /// Whether this is a primitive tag
    #[inline]
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Primitive tag, if any
    #[inline]
    #[must_use]
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Self::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Named descriptor id, if any
    #[inline]
    #[must_use]
    pub fn as_named(&self) -> Option<TypeId> {
        match self {
            Self::Named(id) => Some(*id),
            _ => None,
        }
    }

    /// Collection type, if any
    #[inline]
    #[must_use]
    pub fn as_collection(&self) -> Option<&CollectionType> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Whether a value of `self` can be assigned to `to` without a
    /// user-visible conversion: identity, anything to `object`, or a
    /// lossless numeric widening.
    #[must_use]
    pub fn is_assignable_to(&self, to: &TypeRef) -> bool {
        if self == to {
            return true;
        }
        match (self, to) {
            (_, Self::Primitive(Primitive::Object)) => true,
            (Self::Primitive(from), Self::Primitive(to)) => from.widens_to(*to),
            _ => false,
        }
    }
}

impl From<Primitive> for TypeRef {
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

impl From<TypeId> for TypeRef {
    fn from(id: TypeId) -> Self {
        Self::Named(id)
    }
}
