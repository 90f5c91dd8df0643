//! Literal expression tree produced by [`crate::literal::Builder`].
//!
//! Nodes are plain immutable values. `to_json` renders them the way CSDL JSON
//! writes annotation values.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::ir::{PathKind, PrimitiveKind, TypeRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Binary(Vec<u8>),
    Boolean(bool),
    Integer { kind: PrimitiveKind, value: i64 },  // Byte | SByte | Int16 | Int32 | Int64
    Decimal(Decimal),
    Float { kind: PrimitiveKind, value: OrderedFloat<f64> },  // Single | Double
    Guid(Uuid),
    String(String),
    Date(NaiveDate),
    TimeOfDay(NaiveTime),
    Duration(TimeDelta),
    DateTimeOffset(DateTime<FixedOffset>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMemberRef {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Constant(ScalarValue),
    EnumMember {
        enum_type: String,
        members: Vec<EnumMemberRef>,  // in the order they were written
    },
    Record {
        type_name: String,
        fields: Vec<PropertyValue>,   // in the order they were written
    },
    Collection {
        element: TypeRef,
        items: Vec<Expr>,
    },
    Path {
        kind: PathKind,
        path: String,
    },
}

impl ScalarValue {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            ScalarValue::Binary(_) => PrimitiveKind::Binary,
            ScalarValue::Boolean(_) => PrimitiveKind::Boolean,
            ScalarValue::Integer { kind, .. } | ScalarValue::Float { kind, .. } => *kind,
            ScalarValue::Decimal(_) => PrimitiveKind::Decimal,
            ScalarValue::Guid(_) => PrimitiveKind::Guid,
            ScalarValue::String(_) => PrimitiveKind::String,
            ScalarValue::Date(_) => PrimitiveKind::Date,
            ScalarValue::TimeOfDay(_) => PrimitiveKind::TimeOfDay,
            ScalarValue::Duration(_) => PrimitiveKind::Duration,
            ScalarValue::DateTimeOffset(_) => PrimitiveKind::DateTimeOffset,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ScalarValue::Binary(bytes) => Value::from(hex::encode_upper(bytes)),
            ScalarValue::Boolean(b) => Value::from(*b),
            ScalarValue::Integer { value, .. } => Value::from(*value),
            // strings keep every digit; JSON numbers would go through f64
            ScalarValue::Decimal(d) => Value::from(d.to_string()),
            ScalarValue::Float { value, .. } => float_to_json(value.0),
            ScalarValue::Guid(g) => Value::from(g.hyphenated().to_string()),
            ScalarValue::String(s) => Value::from(s.clone()),
            ScalarValue::Date(d) => Value::from(d.format("%Y-%m-%d").to_string()),
            ScalarValue::TimeOfDay(t) => Value::from(t.format("%H:%M:%S%.f").to_string()),
            ScalarValue::Duration(d) => Value::from(format_duration(d)),
            ScalarValue::DateTimeOffset(dt) => Value::from(dt.to_rfc3339()),
        }
    }
}

impl Expr {
    pub fn to_json(&self) -> Value {
        match self {
            Expr::Constant(c) => c.to_json(),
            Expr::EnumMember { members, .. } => {
                let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
                Value::from(names.join(","))
            }
            Expr::Record { type_name, fields } => {
                let mut o = Map::new();
                o.insert("@type".into(), Value::from(format!("#{type_name}")));
                for f in fields {
                    o.insert(f.name.clone(), f.value.to_json());
                }
                Value::Object(o)
            }
            Expr::Collection { items, .. } => Value::Array(items.iter().map(Expr::to_json).collect()),
            Expr::Path { kind, path } => {
                let mut o = Map::new();
                o.insert(format!("${}", kind.name()), Value::from(path.clone()));
                Value::Object(o)
            }
        }
    }
}

// CSDL JSON spells the non-finite values as strings.
fn float_to_json(f: f64) -> Value {
    if f.is_nan() {
        Value::from("NaN")
    } else if f.is_infinite() {
        Value::from(if f > 0.0 { "INF" } else { "-INF" })
    } else {
        Value::from(f)
    }
}

/// `[-]P[nD][T[nH][nM][n[.fff]S]]`, the inverse of `literal::text::try_parse_duration`.
pub fn format_duration(d: &TimeDelta) -> String {
    let mut out = String::new();
    let abs = d.abs();
    if *d < TimeDelta::zero() {
        out.push('-');
    }
    out.push('P');

    let total_secs = abs.num_seconds();
    let nanos = abs.subsec_nanos();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours > 0 || minutes > 0 || seconds > 0 || nanos > 0 || days == 0 {
        out.push('T');
        if hours > 0 { out.push_str(&format!("{hours}H")); }
        if minutes > 0 { out.push_str(&format!("{minutes}M")); }
        if seconds > 0 || nanos > 0 || (hours == 0 && minutes == 0) {
            if nanos > 0 {
                let frac = format!("{nanos:09}");
                out.push_str(&format!("{seconds}.{}S", frac.trim_end_matches('0')));
            } else {
                out.push_str(&format!("{seconds}S"));
            }
        }
    }
    out
}
