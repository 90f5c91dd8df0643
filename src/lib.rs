pub mod annotation;
pub mod cli;
pub mod error;
pub mod expr;
pub mod ir;
pub mod literal;
pub mod lower;
pub mod model;
pub mod path_de;

pub use annotation::VocabularyAnnotation;
pub use error::{BuildError, SchemaError};
pub use expr::{Expr, ScalarValue};
pub use ir::{PathKind, PrimitiveKind, TypeRef};
pub use literal::{build_default_expression, BuildOptions, Builder};
pub use model::Model;
