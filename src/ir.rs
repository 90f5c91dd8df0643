// Strongly-typed schema IR. Named types point into `model::Model`.

use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Binary,
    Boolean,
    Byte,
    SByte,
    Int16,
    Int32,
    Int64,
    Decimal,
    Single,
    Double,
    Guid,
    String,
    Date,
    TimeOfDay,
    Duration,
    DateTimeOffset,
    Stream,
    Geography,
    Geometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    AnnotationPath,
    PropertyPath,
    NavigationPropertyPath,
    Generic,
}

/// Coarse classification of a [`TypeRef`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive,
    Enum,
    Complex,
    Entity,
    Collection,
    Path,
    TypeDefinition,
    EntityReference,
    Untyped,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    Enum(String),
    Complex(String),
    Entity(String),
    Collection(Box<TypeRef>),
    Path(PathKind),
    TypeDefinition(String),
    EntityReference(String),
    Untyped,
}

impl TypeRef {
    pub fn collection_of(element: TypeRef) -> Self {
        TypeRef::Collection(Box::new(element))
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            TypeRef::Primitive(_) => TypeKind::Primitive,
            TypeRef::Enum(_) => TypeKind::Enum,
            TypeRef::Complex(_) => TypeKind::Complex,
            TypeRef::Entity(_) => TypeKind::Entity,
            TypeRef::Collection(_) => TypeKind::Collection,
            TypeRef::Path(_) => TypeKind::Path,
            TypeRef::TypeDefinition(_) => TypeKind::TypeDefinition,
            TypeRef::EntityReference(_) => TypeKind::EntityReference,
            TypeRef::Untyped => TypeKind::Untyped,
        }
    }
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 19] = [
        PrimitiveKind::Binary,
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::SByte,
        PrimitiveKind::Int16,
        PrimitiveKind::Int32,
        PrimitiveKind::Int64,
        PrimitiveKind::Decimal,
        PrimitiveKind::Single,
        PrimitiveKind::Double,
        PrimitiveKind::Guid,
        PrimitiveKind::String,
        PrimitiveKind::Date,
        PrimitiveKind::TimeOfDay,
        PrimitiveKind::Duration,
        PrimitiveKind::DateTimeOffset,
        PrimitiveKind::Stream,
        PrimitiveKind::Geography,
        PrimitiveKind::Geometry,
    ];

    /// Unqualified EDM name, e.g. `Int32`.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Binary => "Binary",
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::SByte => "SByte",
            PrimitiveKind::Int16 => "Int16",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::Decimal => "Decimal",
            PrimitiveKind::Single => "Single",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::Guid => "Guid",
            PrimitiveKind::String => "String",
            PrimitiveKind::Date => "Date",
            PrimitiveKind::TimeOfDay => "TimeOfDay",
            PrimitiveKind::Duration => "Duration",
            PrimitiveKind::DateTimeOffset => "DateTimeOffset",
            PrimitiveKind::Stream => "Stream",
            PrimitiveKind::Geography => "Geography",
            PrimitiveKind::Geometry => "Geometry",
        }
    }

    /// Inclusive value range for the integral kinds.
    pub fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            PrimitiveKind::Byte => Some((u8::MIN as i64, u8::MAX as i64)),
            PrimitiveKind::SByte => Some((i8::MIN as i64, i8::MAX as i64)),
            PrimitiveKind::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            PrimitiveKind::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            PrimitiveKind::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl PathKind {
    pub fn name(self) -> &'static str {
        match self {
            PathKind::AnnotationPath => "AnnotationPath",
            PathKind::PropertyPath => "PropertyPath",
            PathKind::NavigationPropertyPath => "NavigationPropertyPath",
            PathKind::Generic => "Path",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edm.{}", self.name())
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(kind) => write!(f, "{kind}"),
            TypeRef::Enum(name)
            | TypeRef::Complex(name)
            | TypeRef::Entity(name)
            | TypeRef::TypeDefinition(name) => f.write_str(name),
            TypeRef::Collection(element) => write!(f, "Collection({element})"),
            TypeRef::Path(PathKind::Generic) => f.write_str("Edm.AnyPropertyPath"),
            TypeRef::Path(kind) => write!(f, "Edm.{}", kind.name()),
            TypeRef::EntityReference(name) => write!(f, "Ref({name})"),
            TypeRef::Untyped => f.write_str("Edm.Untyped"),
        }
    }
}

// ------------------------------ Definitions ------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub is_flags: bool,
    pub members: Vec<EnumMember>,  // declaration order
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Complex,
    Entity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    pub name: String,
    pub kind: RecordKind,
    pub base_type: Option<String>,
    pub properties: IndexMap<String, TypeRef>,  // declared on this type only
}

/// Always wraps a primitive, so unwrapping can never yield another definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub underlying: PrimitiveKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<String>,
    pub applies_to: Vec<String>,
}

impl EnumType {
    pub fn member_by_name(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn member_by_value(&self, value: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == value)
    }
}
