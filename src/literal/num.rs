use std::str::FromStr;

use rust_decimal::Decimal;

use crate::ir::PrimitiveKind;

/// Integral literal for `kind`, range-checked against its storage width.
pub fn try_parse_integer(text: &str, kind: PrimitiveKind) -> Option<i64> {
    let (min, max) = kind.integer_range()?;
    let n = text.trim().parse::<i64>().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Plain or scientific notation. Digit separators like `1_000` are rejected.
pub fn try_parse_decimal(text: &str) -> Option<Decimal> {
    let t = text.trim();
    if !t.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')) {
        return None;
    }
    if t.contains(['e', 'E']) {
        Decimal::from_scientific(t).ok()
    } else {
        Decimal::from_str(t).ok()
    }
}

/// `Single`/`Double` literal. Accepts the XML Schema spellings `INF`, `-INF`
/// and `NaN`, rejects Rust-only spellings like `inf` or `infinity`.
pub fn try_parse_float(text: &str, kind: PrimitiveKind) -> Option<f64> {
    let t = text.trim();
    let f = match t {
        "INF" | "+INF" => f64::INFINITY,
        "-INF" => f64::NEG_INFINITY,
        "NaN" => f64::NAN,
        _ => {
            if t.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
                return None;
            }
            t.parse::<f64>().ok()?
        }
    };
    if kind == PrimitiveKind::Single && f.is_finite() && f.abs() > f32::MAX as f64 {
        return None;
    }
    Some(f)
}
