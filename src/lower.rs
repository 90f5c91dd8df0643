//! Lower JSON schema documents into a [`Model`].
//!
//! Two passes: declare every named type first, then resolve property, base
//! and term types, so documents may refer forward and across files.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::SchemaError;
use crate::ir::{
    EnumMember, EnumType, PathKind, PrimitiveKind, RecordKind, RecordType, Term, TypeDefinition, TypeRef,
};
use crate::model::Model;

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDoc {
    #[serde(default)]
    pub enum_types: Vec<EnumTypeDoc>,
    #[serde(default)]
    pub type_definitions: Vec<TypeDefinitionDoc>,
    #[serde(default)]
    pub complex_types: Vec<RecordTypeDoc>,
    #[serde(default)]
    pub entity_types: Vec<RecordTypeDoc>,
    #[serde(default)]
    pub terms: Vec<TermDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumTypeDoc {
    pub name: String,
    #[serde(default)]
    pub is_flags: bool,
    pub members: Vec<EnumMemberDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumMemberDoc {
    pub name: String,
    /// previous value + 1 (starting at 0) when omitted
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefinitionDoc {
    pub name: String,
    pub underlying_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTypeDoc {
    pub name: String,
    pub base_type: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub default_value: Option<String>,
    #[serde(default)]
    pub applies_to: Vec<String>,
}

impl SchemaDoc {
    pub fn from_json(src: &str) -> Result<Self, SchemaError> {
        crate::path_de::from_str_with_path(src)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// LOWERING
// ————————————————————————————————————————————————————————————————————————————

pub fn lower_schema<'a, I>(docs: I) -> Result<Model, SchemaError>
where
    I: IntoIterator<Item = &'a SchemaDoc>,
{
    let docs: Vec<&SchemaDoc> = docs.into_iter().collect();
    let mut model = Model::new();

    // 1) declare
    for doc in &docs {
        for e in &doc.enum_types {
            ensure_new(&model, &e.name)?;
            model.add_enum(lower_enum(e));
        }
        for td in &doc.type_definitions {
            ensure_new(&model, &td.name)?;
            let underlying = match resolve_type_name(&model, &td.underlying_type)? {
                TypeRef::Primitive(kind) => kind,
                other => {
                    return Err(SchemaError::NotPrimitive { name: td.name.clone(), ty: other.to_string() });
                }
            };
            model.add_type_definition(TypeDefinition { name: td.name.clone(), underlying });
        }
        for (kind, records) in [(RecordKind::Complex, &doc.complex_types), (RecordKind::Entity, &doc.entity_types)] {
            for r in records {
                ensure_new(&model, &r.name)?;
                model.add_record(RecordType {
                    name: r.name.clone(),
                    kind,
                    base_type: r.base_type.clone(),
                    properties: IndexMap::new(),
                });
            }
        }
    }

    // 2) resolve
    for doc in &docs {
        for r in doc.complex_types.iter().chain(&doc.entity_types) {
            if let Some(base) = &r.base_type {
                if model.record_type(base).is_none() {
                    return Err(SchemaError::UnknownType { name: base.clone() });
                }
            }
            let mut properties = IndexMap::new();
            for p in &r.properties {
                let ty = resolve_type_name(&model, &p.ty)?;
                if properties.insert(p.name.clone(), ty).is_some() {
                    return Err(SchemaError::Duplicate { name: format!("{}/{}", r.name, p.name) });
                }
            }
            if let Some(record) = model.records.get_mut(&r.name) {
                record.properties = properties;
            }
        }
        for t in &doc.terms {
            ensure_new(&model, &t.name)?;
            let ty = resolve_type_name(&model, &t.ty)?;
            model.add_term(Term {
                name: t.name.clone(),
                ty,
                default_value: t.default_value.clone(),
                applies_to: t.applies_to.clone(),
            });
        }
    }

    tracing::debug!(
        enums = model.enums.len(),
        records = model.records.len(),
        type_definitions = model.type_definitions.len(),
        terms = model.terms.len(),
        "lowered schema"
    );
    Ok(model)
}

fn ensure_new(model: &Model, name: &str) -> Result<(), SchemaError> {
    if model.declares(name) {
        return Err(SchemaError::Duplicate { name: name.to_string() });
    }
    Ok(())
}

fn lower_enum(doc: &EnumTypeDoc) -> EnumType {
    let mut next = 0i64;
    let members = doc.members.iter().map(|m| {
        let value = m.value.unwrap_or(next);
        next = value.saturating_add(1);
        EnumMember { name: m.name.clone(), value }
    }).collect();
    EnumType { name: doc.name.clone(), is_flags: doc.is_flags, members }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE NAMES
// ————————————————————————————————————————————————————————————————————————————

/// Resolve a CSDL type name: `Edm.*`, `Collection(T)`, `Ref(T)` or the name
/// of a type declared in `model`.
pub fn resolve_type_name(model: &Model, name: &str) -> Result<TypeRef, SchemaError> {
    let name = name.trim();
    if let Some(inner) = unwrap_call(name, "Collection") {
        return Ok(TypeRef::collection_of(resolve_type_name(model, inner)?));
    }
    if let Some(inner) = unwrap_call(name, "Ref") {
        return match resolve_type_name(model, inner)? {
            TypeRef::Entity(entity) => Ok(TypeRef::EntityReference(entity)),
            _ => Err(SchemaError::InvalidTypeName { name: name.to_string() }),
        };
    }
    if let Some(edm) = name.strip_prefix("Edm.") {
        if let Some(kind) = primitive_kind(edm) {
            return Ok(TypeRef::Primitive(kind));
        }
        return match edm {
            "Untyped" => Ok(TypeRef::Untyped),
            "AnnotationPath" => Ok(TypeRef::Path(PathKind::AnnotationPath)),
            "PropertyPath" => Ok(TypeRef::Path(PathKind::PropertyPath)),
            "NavigationPropertyPath" => Ok(TypeRef::Path(PathKind::NavigationPropertyPath)),
            "AnyPropertyPath" | "ModelElementPath" | "Path" => Ok(TypeRef::Path(PathKind::Generic)),
            _ => Err(SchemaError::UnknownType { name: name.to_string() }),
        };
    }

    if !is_qualified_name(name) {
        return Err(SchemaError::InvalidTypeName { name: name.to_string() });
    }
    if model.enum_type(name).is_some() {
        return Ok(TypeRef::Enum(name.to_string()));
    }
    if let Some(record) = model.record_type(name) {
        return Ok(match record.kind {
            RecordKind::Complex => TypeRef::Complex(name.to_string()),
            RecordKind::Entity => TypeRef::Entity(name.to_string()),
        });
    }
    if model.type_definition(name).is_some() {
        return Ok(TypeRef::TypeDefinition(name.to_string()));
    }
    Err(SchemaError::UnknownType { name: name.to_string() })
}

fn unwrap_call<'a>(name: &'a str, wrapper: &str) -> Option<&'a str> {
    name.strip_prefix(wrapper)?.strip_prefix('(')?.strip_suffix(')')
}

fn primitive_kind(name: &str) -> Option<PrimitiveKind> {
    if let Some(kind) = PrimitiveKind::ALL.iter().copied().find(|k| k.name() == name) {
        return Some(kind);
    }
    // GeographyPoint, GeometryPolygon, ...
    if name.starts_with("Geography") {
        Some(PrimitiveKind::Geography)
    } else if name.starts_with("Geometry") {
        Some(PrimitiveKind::Geometry)
    } else {
        None
    }
}

fn is_qualified_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|seg| {
            let mut chars = seg.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

// ------------------------------- Tests ------------------------------------ //
