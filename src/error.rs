use thiserror::Error;

use crate::ir::{PrimitiveKind, TypeKind};

/// Failure while turning a raw default value into an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The type has no literal form at all.
    #[error("type `{ty}` ({kind}) has no literal representation")]
    UnsupportedKind { kind: TypeKind, ty: String },

    /// The type has a literal form that is not wired up yet.
    #[error("default values of type `{ty}` are not implemented yet")]
    NotImplemented { ty: String },

    #[error("`{raw}` is not a valid {kind} literal")]
    MalformedLiteral { kind: PrimitiveKind, raw: String },

    #[error("`{record}` has no property `{field}`")]
    UnknownField { record: String, field: String },

    #[error("`{enum_type}` has no member `{member}`")]
    UnknownMember { enum_type: String, member: String },

    #[error("`{raw}` combines several members but `{enum_type}` is not a flags enum")]
    NotFlags { enum_type: String, raw: String },

    #[error("type `{name}` is not declared in the model")]
    UnknownType { name: String },

    #[error("cannot read a `\"name\": value` pair from `{line}`")]
    MalformedRecord { line: String },

    #[error("field `{field}` appears more than once")]
    DuplicateField { field: String },

    #[error("literal is nested more than {limit} levels deep")]
    TooDeeplyNested { limit: usize },

    #[error("term `{term}` has no default value")]
    MissingDefault { term: String },

    #[error("term `{term}` is not declared in the model")]
    UnknownTerm { term: String },
}

impl BuildError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, BuildError::UnsupportedKind { .. })
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, BuildError::NotImplemented { .. })
    }
}

/// Failure while loading schema documents into a [`crate::model::Model`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },

    #[error("`{name}` is not a valid type name")]
    InvalidTypeName { name: String },

    #[error("type `{name}` is not declared")]
    UnknownType { name: String },

    #[error("type definition `{name}` must wrap a primitive type, found `{ty}`")]
    NotPrimitive { name: String, ty: String },

    #[error("`{name}` is declared more than once")]
    Duplicate { name: String },
}
