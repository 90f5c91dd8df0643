use serde_json::{Map, Value};
use tracing::debug;

use crate::error::BuildError;
use crate::expr::Expr;
use crate::literal::{BuildOptions, Builder};
use crate::model::Model;

/// A term applied to a model element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyAnnotation {
    pub target: String,
    pub term: String,
    pub qualifier: Option<String>,
    pub value: Expr,
    /// True exactly when `value` was built from the term's default value.
    pub uses_default: bool,
}

impl VocabularyAnnotation {
    pub fn new(target: impl Into<String>, term: impl Into<String>, qualifier: Option<String>, value: Expr) -> Self {
        Self {
            target: target.into(),
            term: term.into(),
            qualifier,
            value,
            uses_default: false,
        }
    }

    /// Annotate `target` with the default value declared on `term`.
    pub fn from_default(
        model: &Model,
        target: impl Into<String>,
        term: &str,
        options: BuildOptions,
    ) -> Result<Self, BuildError> {
        let decl = model.term(term).ok_or_else(|| BuildError::UnknownTerm { term: term.to_string() })?;
        let raw = decl.default_value.as_deref()
            .ok_or_else(|| BuildError::MissingDefault { term: term.to_string() })?;

        let value = Builder::with_options(model, options).build(&decl.ty, raw)?;
        let target = target.into();
        debug!(%target, term, "annotation uses term default");
        Ok(Self {
            target,
            term: decl.name.clone(),
            qualifier: None,
            value,
            uses_default: true,
        })
    }

    pub fn to_json(&self) -> Value {
        let mut o = Map::new();
        o.insert("target".into(), Value::from(self.target.clone()));
        o.insert("term".into(), Value::from(self.term.clone()));
        if let Some(q) = &self.qualifier {
            o.insert("qualifier".into(), Value::from(q.clone()));
        }
        o.insert("value".into(), self.value.to_json());
        o.insert("usesDefault".into(), Value::from(self.uses_default));
        Value::Object(o)
    }
}
