use indexmap::IndexMap;

use super::scan::{self, Event, Scanner};
use crate::error::BuildError;

/// Extract `field → raw value text` from a brace-delimited record literal.
///
/// A pair ends at a comma or a line break outside quotes and nested groups,
/// so both layouts read the same:
///
/// ```text
/// {
///   "City": "Redmond",
///   "Zip": 98052,
///   "Tags": ["a", "b"]
/// }
/// {"City": "Redmond", "Zip": 98052}
/// ```
///
/// A quoted value is decoded, anything else is kept as written. Nested
/// records and collections may span lines.
pub fn extract_fields(text: &str) -> Result<IndexMap<String, String>, BuildError> {
    let body = record_body(text)?;
    let mut fields = IndexMap::new();
    for pair in split_pairs(body) {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((name, value)) = parse_pair(pair) else {
            return Err(BuildError::MalformedRecord { line: pair.to_string() });
        };
        if fields.contains_key(&name) {
            return Err(BuildError::DuplicateField { field: name });
        }
        fields.insert(name, value);
    }
    Ok(fields)
}

/// Text between the outer braces. Unbraced text is read as bare pairs.
fn record_body(text: &str) -> Result<&str, BuildError> {
    let t = text.trim();
    match (t.starts_with('{'), t.ends_with('}')) {
        (true, true) => Ok(scan::interior(t)),
        (false, false) => Ok(t),
        _ => Err(BuildError::MalformedRecord { line: t.lines().next().unwrap_or_default().to_string() }),
    }
}

fn split_pairs(body: &str) -> Vec<String> {
    let mut pairs = Vec::new();
    let mut current = String::new();
    let mut scanner = Scanner::new(body);
    while let Some(event) = scanner.next() {
        match event {
            Event::Separator => pairs.push(std::mem::take(&mut current)),
            Event::Char('\n') if scanner.at_top_level() => pairs.push(std::mem::take(&mut current)),
            Event::Char(c) => current.push(c),
        }
    }
    pairs.push(current);
    pairs
}

fn parse_pair(pair: &str) -> Option<(String, String)> {
    let (name_lit, rest) = scan::split_quoted(pair)?;
    let rest = rest.trim_start().strip_prefix(':')?.trim();
    let value = if rest.starts_with('"') {
        let (value_lit, tail) = scan::split_quoted(rest)?;
        if !tail.trim().is_empty() {
            return None;
        }
        scan::unquote(value_lit)?
    } else if rest.is_empty() {
        return None;
    } else {
        rest.to_string()
    };
    Some((scan::unquote(name_lit)?, value))
}
