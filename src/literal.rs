//! Type-directed default-value builder.
//!
//! Takes a declared type and the raw text of a default value, and produces a
//! typed [`Expr`] tree. Dispatch is one exhaustive match over [`TypeRef`]:
//! - primitives go through the `try_parse_*` converters in `num`/`text`;
//! - collections are split with `arr::split_top_level` and built per item;
//! - records are read with `obj::extract_fields` and built per property;
//! - type definitions unwrap to their primitive, enums resolve members.
//!
//! Pure: no shared state, the first failure aborts the whole build.
pub mod arr;
pub mod enums;
pub mod num;
pub mod obj;
pub mod scan;
pub mod text;

use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::error::BuildError;
use crate::expr::{Expr, PropertyValue, ScalarValue};
use crate::ir::{PrimitiveKind, TypeKind, TypeRef};
use crate::model::Model;

pub use arr::split_top_level;
pub use obj::extract_fields;

// ------------------------------- Policy ---------------------------------- //

/// Collections/records nested deeper than this fail with `TooDeeplyNested`.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

// ------------------------------- Builder --------------------------------- //

pub struct Builder<'m> {
    model: &'m Model,
    options: BuildOptions,
}

impl<'m> Builder<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self::with_options(model, BuildOptions::default())
    }

    pub fn with_options(model: &'m Model, options: BuildOptions) -> Self {
        Self { model, options }
    }

    pub fn build(&self, ty: &TypeRef, raw: &str) -> Result<Expr, BuildError> {
        self.build_at(ty, raw, 0)
    }

    fn build_at(&self, ty: &TypeRef, raw: &str, depth: usize) -> Result<Expr, BuildError> {
        debug!(ty = %ty, depth, "building default value");
        match ty {
            TypeRef::Primitive(kind) => build_primitive(*kind, raw),
            TypeRef::Collection(element) => self.build_collection(element, raw, depth),
            TypeRef::Complex(name) | TypeRef::Entity(name) => self.build_record(name, raw, depth),
            TypeRef::TypeDefinition(name) => {
                let def = self.model.type_definition(name)
                    .ok_or_else(|| unknown_type(name))?;
                build_primitive(def.underlying, raw)
            }
            TypeRef::Enum(name) => {
                let enum_type = self.model.enum_type(name)
                    .ok_or_else(|| unknown_type(name))?;
                let members = enums::resolve_members(enum_type, raw)?;
                Ok(Expr::EnumMember { enum_type: name.clone(), members })
            }
            TypeRef::Path(kind) => Ok(Expr::Path { kind: *kind, path: raw.to_string() }),
            TypeRef::EntityReference(_) | TypeRef::Untyped => Err(BuildError::UnsupportedKind {
                kind: ty.kind(),
                ty: ty.to_string(),
            }),
        }
    }

    fn build_collection(&self, element: &TypeRef, raw: &str, depth: usize) -> Result<Expr, BuildError> {
        let depth = self.enter(depth)?;
        let parts = split_top_level(raw);
        trace!(count = parts.len(), ?parts, "split collection literal");

        let items = parts
            .iter()
            .map(|part| self.build_at(element, part, depth))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Expr::Collection { element: element.clone(), items })
    }

    fn build_record(&self, name: &str, raw: &str, depth: usize) -> Result<Expr, BuildError> {
        let depth = self.enter(depth)?;
        let record = self.model.record_type(name).ok_or_else(|| unknown_type(name))?;
        let raw_fields = extract_fields(raw)?;
        trace!(record = name, ?raw_fields, "extracted record fields");

        let mut fields = Vec::with_capacity(raw_fields.len());
        for (field, text) in raw_fields {
            let Some(field_ty) = self.model.find_property(record, &field) else {
                return Err(BuildError::UnknownField { record: name.to_string(), field });
            };
            let value = self.build_at(field_ty, &text, depth)?;
            fields.push(PropertyValue { name: field, value });
        }
        Ok(Expr::Record { type_name: name.to_string(), fields })
    }

    fn enter(&self, depth: usize) -> Result<usize, BuildError> {
        if depth >= self.options.max_depth {
            return Err(BuildError::TooDeeplyNested { limit: self.options.max_depth });
        }
        Ok(depth + 1)
    }
}

// ------------------------------ Primitives ------------------------------- //

/// Convert `raw` with the converter for `kind`. String keeps the text verbatim.
pub fn build_primitive(kind: PrimitiveKind, raw: &str) -> Result<Expr, BuildError> {
    let malformed = || BuildError::MalformedLiteral { kind, raw: raw.to_string() };
    let value = match kind {
        PrimitiveKind::String => ScalarValue::String(raw.to_string()),
        PrimitiveKind::Boolean => ScalarValue::Boolean(text::try_parse_bool(raw).ok_or_else(malformed)?),
        PrimitiveKind::Byte
        | PrimitiveKind::SByte
        | PrimitiveKind::Int16
        | PrimitiveKind::Int32
        | PrimitiveKind::Int64 => ScalarValue::Integer {
            kind,
            value: num::try_parse_integer(raw, kind).ok_or_else(malformed)?,
        },
        PrimitiveKind::Decimal => ScalarValue::Decimal(num::try_parse_decimal(raw).ok_or_else(malformed)?),
        PrimitiveKind::Single | PrimitiveKind::Double => ScalarValue::Float {
            kind,
            value: OrderedFloat(num::try_parse_float(raw, kind).ok_or_else(malformed)?),
        },
        PrimitiveKind::Guid => ScalarValue::Guid(text::try_parse_guid(raw).ok_or_else(malformed)?),
        PrimitiveKind::Date => ScalarValue::Date(text::try_parse_date(raw).ok_or_else(malformed)?),
        PrimitiveKind::TimeOfDay => ScalarValue::TimeOfDay(text::try_parse_time_of_day(raw).ok_or_else(malformed)?),
        PrimitiveKind::Duration => ScalarValue::Duration(text::try_parse_duration(raw).ok_or_else(malformed)?),
        PrimitiveKind::DateTimeOffset => {
            ScalarValue::DateTimeOffset(text::try_parse_date_time_offset(raw).ok_or_else(malformed)?)
        }
        PrimitiveKind::Binary => ScalarValue::Binary(text::try_parse_binary(raw).ok_or_else(malformed)?),
        PrimitiveKind::Stream => {
            return Err(BuildError::UnsupportedKind { kind: TypeKind::Primitive, ty: kind.to_string() });
        }
        // well-known text literals exist, no converter yet
        PrimitiveKind::Geography | PrimitiveKind::Geometry => {
            return Err(BuildError::NotImplemented { ty: kind.to_string() });
        }
    };
    Ok(Expr::Constant(value))
}

fn unknown_type(name: &str) -> BuildError {
    BuildError::UnknownType { name: name.to_string() }
}

// ------------------------------- Front API -------------------------------- //

/// One-shot build with default options.
pub fn build_default_expression(model: &Model, ty: &TypeRef, raw: &str) -> Result<Expr, BuildError> {
    Builder::new(model).build(ty, raw)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::EnumMemberRef;
    use crate::ir::{EnumMember, EnumType, PathKind, RecordKind, RecordType, TypeDefinition};
    use chrono::{NaiveDate, TimeDelta};

    fn int32() -> TypeRef { TypeRef::Primitive(PrimitiveKind::Int32) }
    fn string() -> TypeRef { TypeRef::Primitive(PrimitiveKind::String) }

    fn int(value: i64) -> Expr {
        Expr::Constant(ScalarValue::Integer { kind: PrimitiveKind::Int32, value })
    }

    fn sample_model() -> Model {
        let mut model = Model::new();
        model.add_type_definition(TypeDefinition { name: "Org.Percent".into(), underlying: PrimitiveKind::Int32 });
        model.add_enum(EnumType {
            name: "Org.Color".into(),
            is_flags: true,
            members: vec![
                EnumMember { name: "Red".into(), value: 1 },
                EnumMember { name: "Blue".into(), value: 2 },
            ],
        });
        model.add_record(RecordType {
            name: "Org.Place".into(),
            kind: RecordKind::Complex,
            base_type: None,
            properties: [("City".to_string(), string())].into_iter().collect(),
        });
        model.add_record(RecordType {
            name: "Org.Address".into(),
            kind: RecordKind::Complex,
            base_type: Some("Org.Place".into()),
            properties: [
                ("Street".to_string(), string()),
                ("Zip".to_string(), int32()),
                ("Tags".to_string(), TypeRef::collection_of(string())),
            ]
            .into_iter()
            .collect(),
        });
        model.add_record(RecordType {
            name: "Org.Person".into(),
            kind: RecordKind::Entity,
            base_type: None,
            properties: [
                ("Name".to_string(), string()),
                ("Home".to_string(), TypeRef::Complex("Org.Place".into())),
            ]
            .into_iter()
            .collect(),
        });
        model
    }

    #[test]
    fn collection_of_integers_keeps_order() {
        let model = Model::new();
        let expr = build_default_expression(&model, &TypeRef::collection_of(int32()), "[1,2,3]").unwrap();
        assert_eq!(expr, Expr::Collection { element: int32(), items: vec![int(1), int(2), int(3)] });
    }

    #[test]
    fn spaced_collection_items_still_parse_as_numbers() {
        let model = Model::new();
        let expr = build_default_expression(&model, &TypeRef::collection_of(int32()), "[5, 6, 8]").unwrap();
        assert_eq!(expr.to_json(), serde_json::json!([5, 6, 8]));
    }

    #[test]
    fn nested_collections_recurse() {
        let model = Model::new();
        let ty = TypeRef::collection_of(TypeRef::collection_of(int32()));
        let expr = build_default_expression(&model, &ty, "[[1,2],[3]]").unwrap();
        assert_eq!(expr.to_json(), serde_json::json!([[1, 2], [3]]));
    }

    #[test]
    fn empty_collection_literal_keeps_its_single_empty_item() {
        let model = Model::new();
        let expr = build_default_expression(&model, &TypeRef::collection_of(string()), "[]").unwrap();
        assert_eq!(expr, Expr::Collection {
            element: string(),
            items: vec![Expr::Constant(ScalarValue::String(String::new()))],
        });
        // an empty item is not an integer
        let err = build_default_expression(&model, &TypeRef::collection_of(int32()), "[]").unwrap_err();
        assert!(matches!(err, BuildError::MalformedLiteral { kind: PrimitiveKind::Int32, .. }));
    }

    #[test]
    fn type_definition_unwraps_to_its_primitive() {
        let model = sample_model();
        let via_def = build_default_expression(&model, &TypeRef::TypeDefinition("Org.Percent".into()), "42").unwrap();
        let direct = build_default_expression(&model, &int32(), "42").unwrap();
        assert_eq!(via_def, direct);
        assert_eq!(direct, int(42));
    }

    #[test]
    fn primitives_round_trip_their_canonical_text() {
        let model = Model::new();
        let cases = [
            (PrimitiveKind::Boolean, "true"),
            (PrimitiveKind::Byte, "200"),
            (PrimitiveKind::Int64, "-9000000000"),
            (PrimitiveKind::Decimal, "12.50"),
            (PrimitiveKind::Double, "3.14"),
            (PrimitiveKind::Guid, "21ec2020-3aea-1069-a2dd-08002b30309d"),
            (PrimitiveKind::String, "hello, world"),
            (PrimitiveKind::Date, "2020-01-31"),
            (PrimitiveKind::TimeOfDay, "08:30:00"),
            (PrimitiveKind::Duration, "P1DT2H"),
            (PrimitiveKind::DateTimeOffset, "2020-01-31T08:30:00+00:00"),
            (PrimitiveKind::Binary, "CAFE"),
        ];
        for (kind, text) in cases {
            let expr = build_default_expression(&model, &TypeRef::Primitive(kind), text).unwrap();
            let Expr::Constant(value) = &expr else { panic!("{kind}: not a constant") };
            assert_eq!(value.kind(), kind);
            let again = value.to_json();
            let again = again.as_str().map(|s| s.to_string()).unwrap_or_else(|| again.to_string());
            assert_eq!(build_default_expression(&model, &TypeRef::Primitive(kind), &again).unwrap(), expr, "{kind}");
        }
    }

    #[test]
    fn primitive_values_are_typed() {
        let model = Model::new();
        let float = build_default_expression(&model, &TypeRef::Primitive(PrimitiveKind::Double), "3.14").unwrap();
        assert_eq!(float, Expr::Constant(ScalarValue::Float { kind: PrimitiveKind::Double, value: OrderedFloat(3.14) }));
        let boolean = build_default_expression(&model, &TypeRef::Primitive(PrimitiveKind::Boolean), "true").unwrap();
        assert_eq!(boolean, Expr::Constant(ScalarValue::Boolean(true)));
        let date = build_default_expression(&model, &TypeRef::Primitive(PrimitiveKind::Date), "2020-01-31").unwrap();
        assert_eq!(date, Expr::Constant(ScalarValue::Date(NaiveDate::from_ymd_opt(2020, 1, 31).unwrap())));
        let dur = build_default_expression(&model, &TypeRef::Primitive(PrimitiveKind::Duration), "PT1M").unwrap();
        assert_eq!(dur, Expr::Constant(ScalarValue::Duration(TimeDelta::minutes(1))));
    }

    #[test]
    fn string_is_taken_verbatim() {
        let model = Model::new();
        let expr = build_default_expression(&model, &TypeRef::collection_of(string()), r#"["a", "b\"c"]"#).unwrap();
        assert_eq!(expr.to_json(), serde_json::json!([r#""a""#, r#" "b\"c""#]));
    }

    #[test]
    fn malformed_and_unsupported_literals() {
        let model = Model::new();
        assert_eq!(
            build_default_expression(&model, &int32(), "not-a-number"),
            Err(BuildError::MalformedLiteral { kind: PrimitiveKind::Int32, raw: "not-a-number".into() })
        );
        for raw in ["", "1", "anything"] {
            let err = build_default_expression(&model, &TypeRef::Untyped, raw).unwrap_err();
            assert!(err.is_unsupported(), "{raw}");
        }
        let err = build_default_expression(&model, &TypeRef::EntityReference("Org.Customer".into()), "1").unwrap_err();
        assert!(err.is_unsupported());
        let err = build_default_expression(&model, &TypeRef::Primitive(PrimitiveKind::Stream), "x").unwrap_err();
        assert!(err.is_unsupported());
        let err = build_default_expression(&model, &TypeRef::Primitive(PrimitiveKind::Geography), "POINT(1 2)").unwrap_err();
        assert!(err.is_not_implemented());
    }

    #[test]
    fn first_failing_item_aborts_the_collection() {
        let model = Model::new();
        let err = build_default_expression(&model, &TypeRef::collection_of(int32()), "[1,x,y]").unwrap_err();
        assert_eq!(err, BuildError::MalformedLiteral { kind: PrimitiveKind::Int32, raw: "x".into() });
    }

    #[test]
    fn records_build_fields_against_declared_and_inherited_types() {
        let model = sample_model();
        let raw = "{\n  \"Street\": \"156TH, AVE\",\n  \"Zip\": \"98052\",\n  \"City\": \"Redmond\",\n  \"Tags\": [\"a\",\"b\"]\n}";
        let expr = build_default_expression(&model, &TypeRef::Complex("Org.Address".into()), raw).unwrap();
        let Expr::Record { type_name, fields } = &expr else { panic!("not a record") };
        assert_eq!(type_name, "Org.Address");
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Street", "Zip", "City", "Tags"]);
        assert_eq!(fields[1].value, int(98052));
        assert_eq!(
            expr.to_json(),
            serde_json::json!({
                "@type": "#Org.Address",
                "Street": "156TH, AVE",
                "Zip": 98052,
                "City": "Redmond",
                "Tags": ["\"a\"", "\"b\""]
            })
        );
    }

    #[test]
    fn record_with_unknown_field_fails() {
        let model = sample_model();
        let raw = "{\n\"Planet\": \"Earth\"\n}";
        assert_eq!(
            build_default_expression(&model, &TypeRef::Complex("Org.Address".into()), raw),
            Err(BuildError::UnknownField { record: "Org.Address".into(), field: "Planet".into() })
        );
    }

    #[test]
    fn records_inside_collections_keep_their_fields() {
        let model = sample_model();
        let ty = TypeRef::collection_of(TypeRef::Complex("Org.Place".into()));
        let expr = build_default_expression(&model, &ty, r#"[{"City":"Redmond"}, {"City":"Seattle"}]"#).unwrap();
        assert_eq!(
            expr.to_json(),
            serde_json::json!([
                { "@type": "#Org.Place", "City": "Redmond" },
                { "@type": "#Org.Place", "City": "Seattle" }
            ])
        );

        assert_eq!(
            build_default_expression(&model, &ty, r#"[{"Planet":"Mars"}]"#),
            Err(BuildError::UnknownField { record: "Org.Place".into(), field: "Planet".into() })
        );
    }

    #[test]
    fn record_valued_fields_build_recursively() {
        let model = sample_model();
        let ty = TypeRef::Entity("Org.Person".into());
        let expected = serde_json::json!({
            "@type": "#Org.Person",
            "Name": "Ann",
            "Home": { "@type": "#Org.Place", "City": "Redmond" }
        });

        let one_line = "{\n\"Name\": \"Ann\",\n\"Home\": {\"City\": \"Redmond\"}\n}";
        assert_eq!(build_default_expression(&model, &ty, one_line).unwrap().to_json(), expected);

        let spread = "{\n\"Name\": \"Ann\",\n\"Home\": {\n  \"City\": \"Redmond\"\n}\n}";
        assert_eq!(build_default_expression(&model, &ty, spread).unwrap().to_json(), expected);

        let single = r#"{"Name": "Ann", "Home": {"City": "Redmond"}}"#;
        assert_eq!(build_default_expression(&model, &ty, single).unwrap().to_json(), expected);
    }

    #[test]
    fn single_line_record_with_unknown_field_fails() {
        let model = sample_model();
        assert_eq!(
            build_default_expression(&model, &TypeRef::Complex("Org.Place".into()), r#"{"Planet": "Mars"}"#),
            Err(BuildError::UnknownField { record: "Org.Place".into(), field: "Planet".into() })
        );
    }

    #[test]
    fn enums_and_paths() {
        let model = sample_model();
        let expr = build_default_expression(&model, &TypeRef::Enum("Org.Color".into()), "Red,Blue").unwrap();
        assert_eq!(expr, Expr::EnumMember {
            enum_type: "Org.Color".into(),
            members: vec![
                EnumMemberRef { name: "Red".into(), value: 1 },
                EnumMemberRef { name: "Blue".into(), value: 2 },
            ],
        });

        let ty = TypeRef::collection_of(TypeRef::Enum("Org.Color".into()));
        let expr = build_default_expression(&model, &ty, r#"["Blue","Red"]"#).unwrap();
        assert_eq!(expr.to_json(), serde_json::json!(["Blue", "Red"]));

        let expr = build_default_expression(&model, &TypeRef::Path(PathKind::AnnotationPath), "Items/@UI.LineItem").unwrap();
        assert_eq!(expr, Expr::Path { kind: PathKind::AnnotationPath, path: "Items/@UI.LineItem".into() });
    }

    #[test]
    fn undeclared_named_types_fail() {
        let model = Model::new();
        for ty in [
            TypeRef::Enum("Org.Nope".into()),
            TypeRef::Complex("Org.Nope".into()),
            TypeRef::TypeDefinition("Org.Nope".into()),
        ] {
            assert_eq!(
                build_default_expression(&model, &ty, "x"),
                Err(BuildError::UnknownType { name: "Org.Nope".into() })
            );
        }
    }

    #[test]
    fn nesting_is_bounded() {
        let model = Model::new();
        let ty = TypeRef::collection_of(TypeRef::collection_of(TypeRef::collection_of(int32())));
        let shallow = Builder::with_options(&model, BuildOptions { max_depth: 2 });
        assert_eq!(shallow.build(&ty, "[[[1]]]"), Err(BuildError::TooDeeplyNested { limit: 2 }));
        let deep = Builder::with_options(&model, BuildOptions { max_depth: 3 });
        assert_eq!(deep.build(&ty, "[[[1]]]").unwrap().to_json(), serde_json::json!([[[1]]]));
    }
}
