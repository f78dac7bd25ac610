//! Type, member, constructor and function descriptors
//!
//! These are the read-only inputs built by the schema provider. All of
//! them are plain data: the engine never inspects raw annotations, only
//! the fields populated here.

use crate::config::ConfigOverrides;
use crate::path::MemberPath;
use crate::types::{Nullability, NullableContext, Primitive, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Location of a declaration in the user's sources
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Source file
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl Location {
    /// Create a new location
    #[inline]
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Declared accessibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// Visible everywhere
    #[default]
    Public,
    /// Visible within the compilation unit
    Internal,
    /// Visible to derived types
    Protected,
    /// Visible to the declaring type only
    Private,
}

impl Accessibility {
    /// Whether generated mapping code may use the declaration
    #[inline]
    #[must_use]
    pub fn is_accessible(self) -> bool {
        matches!(self, Self::Public | Self::Internal)
    }
}

/// How a member can be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    /// No setter
    ReadOnly,
    /// Settable during object initialization only
    InitOnly,
    /// Settable at any time
    #[default]
    Settable,
}

/// Member flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Field or property
    #[default]
    Property,
    /// Zero-argument method returning a value
    Accessor,
}

/// Declared kind of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Class-like type
    Class,
    /// Record-like type
    Record,
    /// Enumeration
    Enum,
}

/// Value vs. reference semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semantics {
    /// Copied on assignment
    Value,
    /// Shared on assignment
    Reference,
}

/// Which side of a mapping a directive refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The source type
    Source,
    /// The target type
    Target,
}

/// Where an ignore directive is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveScope {
    /// Attached to the member it ignores
    Member,
    /// Attached to the enclosing type or mapping declaration
    Declaration(Side),
}

/// A user directive excluding a member from a mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IgnoreDirective {
    /// Attachment point
    pub scope: DirectiveScope,

    /// Arguments written by the user
    #[serde(default)]
    pub arguments: Vec<String>,

    /// Where the directive was written
    #[serde(default)]
    pub location: Option<Location>,
}

impl IgnoreDirective {
    /// Directive attached to the ignored member itself
    #[inline]
    #[must_use]
    pub fn on_member() -> Self {
        Self {
            scope: DirectiveScope::Member,
            arguments: Vec::new(),
            location: None,
        }
    }

    /// Directive attached to the mapping declaration, naming a member
    #[inline]
    #[must_use]
    pub fn on_declaration(side: Side, member: impl Into<String>) -> Self {
        Self {
            scope: DirectiveScope::Declaration(side),
            arguments: vec![member.into()],
            location: None,
        }
    }

    /// With explicit arguments
    #[inline]
    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }

    /// With location
    #[inline]
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// A member of a class-like or record-like type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Member name
    pub name: String,
    /// Member type
    pub ty: TypeRef,
    /// Declared accessibility
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Write mode
    #[serde(default)]
    pub mutability: Mutability,
    /// Nullability annotation
    #[serde(default)]
    pub nullability: Nullability,
    /// Must be set at construction
    #[serde(default)]
    pub required: bool,
    /// Field/property or zero-argument accessor
    #[serde(default)]
    pub kind: MemberKind,
    /// Generated by the compiler rather than declared
    #[serde(default)]
    pub synthesized: bool,
    /// Member-attached ignore directive
    #[serde(default)]
    pub ignored: bool,
    /// Member-attached source rename directive
    #[serde(default)]
    pub rename: Option<MemberPath>,
    /// Declaration location
    #[serde(default)]
    pub location: Option<Location>,
}

impl MemberDescriptor {
    /// Public settable non-null member
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            accessibility: Accessibility::Public,
            mutability: Mutability::Settable,
            nullability: Nullability::NotNull,
            required: false,
            kind: MemberKind::Property,
            synthesized: false,
            ignored: false,
            rename: None,
            location: None,
        }
    }

    /// Zero-argument accessor
    #[must_use]
    pub fn accessor(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            kind: MemberKind::Accessor,
            mutability: Mutability::ReadOnly,
            ..Self::new(name, ty)
        }
    }

    /// Without setter
    #[inline]
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.mutability = Mutability::ReadOnly;
        self
    }

    /// Settable during initialization only
    #[inline]
    #[must_use]
    pub fn init_only(mut self) -> Self {
        self.mutability = Mutability::InitOnly;
        self
    }

    /// Annotated nullable
    #[inline]
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullability = Nullability::Nullable;
        self
    }

    /// Declared outside an annotated context
    #[inline]
    #[must_use]
    pub fn oblivious(mut self) -> Self {
        self.nullability = Nullability::Oblivious;
        self
    }

    /// Marked required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Compiler-synthesized
    #[inline]
    #[must_use]
    pub fn synthesized(mut self) -> Self {
        self.synthesized = true;
        self
    }

    /// Member-attached ignore
    #[inline]
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Member-attached rename to a source path
    #[inline]
    #[must_use]
    pub fn renamed_from(mut self, path: MemberPath) -> Self {
        self.rename = Some(path);
        self
    }

    /// With accessibility
    #[inline]
    #[must_use]
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// With location
    #[inline]
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether the member can be read by generated code
    #[inline]
    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.accessibility.is_accessible() && !self.synthesized
    }
}

/// A constructor or function parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: TypeRef,
    /// Nullability annotation
    #[serde(default)]
    pub nullability: Nullability,
}

impl ParameterDescriptor {
    /// Non-null parameter
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            nullability: Nullability::NotNull,
        }
    }

    /// Annotated nullable
    #[inline]
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullability = Nullability::Nullable;
        self
    }
}

/// A constructor of a class-like or record-like type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructorDescriptor {
    /// Ordered parameters
    pub parameters: Vec<ParameterDescriptor>,
    /// Declared accessibility
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Static constructors are never candidates
    #[serde(default)]
    pub is_static: bool,
    /// Explicitly chosen by the user
    #[serde(default)]
    pub designated: bool,
    /// Declaration location
    #[serde(default)]
    pub location: Option<Location>,
}

impl ConstructorDescriptor {
    /// Public constructor with the given parameters
    #[must_use]
    pub fn new(parameters: Vec<ParameterDescriptor>) -> Self {
        Self {
            parameters,
            accessibility: Accessibility::Public,
            is_static: false,
            designated: false,
            location: None,
        }
    }

    /// Public parameterless constructor
    #[inline]
    #[must_use]
    pub fn parameterless() -> Self {
        Self::new(Vec::new())
    }

    /// Explicitly designated by the user
    #[inline]
    #[must_use]
    pub fn designated(mut self) -> Self {
        self.designated = true;
        self
    }

    /// Static constructor
    #[inline]
    #[must_use]
    pub fn static_ctor(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// With accessibility
    #[inline]
    #[must_use]
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Parameter-name signature, e.g. `(id, name)`
    #[must_use]
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(|p| p.name.clone()).collect();
        format!("({})", params.join(", "))
    }

    /// Whether the constructor is usable by generated code
    #[inline]
    #[must_use]
    pub fn is_candidate(&self) -> bool {
        self.accessibility.is_accessible() && !self.is_static
    }
}

/// A user function visible to the mapper: converter or hook
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    /// Function name
    pub name: String,
    /// Ordered parameters
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Return type, `None` for void
    #[serde(default)]
    pub returns: Option<TypeRef>,
    /// Nullable context the function was declared in
    #[serde(default)]
    pub nullable_context: NullableContext,
    /// Declaration location
    #[serde(default)]
    pub location: Option<Location>,
}

impl FunctionDescriptor {
    /// Void function without parameters
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            returns: None,
            nullable_context: NullableContext::Enabled,
            location: None,
        }
    }

    /// Add a parameter
    #[inline]
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.parameters.push(ParameterDescriptor::new(name, ty));
        self
    }

    /// Set return type
    #[inline]
    #[must_use]
    pub fn returning(mut self, ty: impl Into<TypeRef>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    /// Set declared nullable context
    #[inline]
    #[must_use]
    pub fn in_context(mut self, context: NullableContext) -> Self {
        self.nullable_context = context;
        self
    }

    /// With location
    #[inline]
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether the function returns nothing
    #[inline]
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.returns.is_none()
    }
}

/// A member of an enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumMember {
    /// Member name
    pub name: String,
    /// Underlying value
    pub value: i64,
    /// Member-attached ignore directive
    #[serde(default)]
    pub ignore: Option<IgnoreDirective>,
}

/// Enumeration details of an enum descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// Underlying integer type
    pub underlying: Primitive,
    /// Members in declaration order
    pub members: Vec<EnumMember>,
}

impl EnumDescriptor {
    /// Find member by exact name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A type in the schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Simple name
    pub name: String,
    /// Fully-qualified name
    pub full_name: String,
    /// Namespace, empty for the global namespace
    pub namespace: String,
    /// Declared kind
    pub kind: TypeKind,
    /// Value or reference semantics
    pub semantics: Semantics,
    /// Whether the type itself admits null
    #[serde(default)]
    pub nullable: bool,
    /// Ordered members
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
    /// Ordered constructors
    #[serde(default)]
    pub constructors: Vec<ConstructorDescriptor>,
    /// Enumeration details, for enums only
    #[serde(default)]
    pub enumeration: Option<EnumDescriptor>,
    /// Per-type configuration overrides
    #[serde(default)]
    pub overrides: ConfigOverrides,
    /// Declaration location
    #[serde(default)]
    pub location: Option<Location>,
}

impl TypeDescriptor {
    fn with_kind(full_name: &str, kind: TypeKind, semantics: Semantics) -> Self {
        let (namespace, name) = match full_name.rsplit_once('.') {
            Some((ns, name)) => (ns.to_string(), name.to_string()),
            None => (String::new(), full_name.to_string()),
        };
        Self {
            name,
            full_name: full_name.to_string(),
            namespace,
            kind,
            semantics,
            nullable: false,
            members: Vec::new(),
            constructors: Vec::new(),
            enumeration: None,
            overrides: ConfigOverrides::default(),
            location: None,
        }
    }

    /// Class-like reference type
    #[must_use]
    pub fn class(full_name: &str) -> Self {
        Self::with_kind(full_name, TypeKind::Class, Semantics::Reference)
    }

    /// Record-like reference type
    #[must_use]
    pub fn record(full_name: &str) -> Self {
        Self::with_kind(full_name, TypeKind::Record, Semantics::Reference)
    }

    /// Enumeration with the given underlying type
    #[must_use]
    pub fn enumeration(full_name: &str, underlying: Primitive) -> Self {
        let mut ty = Self::with_kind(full_name, TypeKind::Enum, Semantics::Value);
        ty.enumeration = Some(EnumDescriptor {
            underlying,
            members: Vec::new(),
        });
        ty
    }

    /// Switch to value semantics
    #[inline]
    #[must_use]
    pub fn value_type(mut self) -> Self {
        self.semantics = Semantics::Value;
        self
    }

    /// Add a member
    #[inline]
    #[must_use]
    pub fn with_member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    /// Add a constructor
    #[inline]
    #[must_use]
    pub fn with_constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Add an enum member; no-op on non-enum types
    #[must_use]
    pub fn with_enum_member(mut self, name: impl Into<String>, value: i64) -> Self {
        if let Some(def) = self.enumeration.as_mut() {
            def.members.push(EnumMember {
                name: name.into(),
                value,
                ignore: None,
            });
        }
        self
    }

    /// Add an enum member carrying a member-attached ignore directive
    #[must_use]
    pub fn with_ignored_enum_member(
        mut self,
        name: impl Into<String>,
        value: i64,
        directive: IgnoreDirective,
    ) -> Self {
        if let Some(def) = self.enumeration.as_mut() {
            def.members.push(EnumMember {
                name: name.into(),
                value,
                ignore: Some(directive),
            });
        }
        self
    }

    /// Set per-type overrides
    #[inline]
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// With location
    #[inline]
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether the type is an enumeration
    #[inline]
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    /// Find member by exact name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }
}
