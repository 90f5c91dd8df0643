use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

// xs:dayTimeDuration: days, hours, minutes, seconds with up to 9 fraction digits
static DURATION_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-)?P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.(\d{1,9}))?S)?)?$")
        .expect("duration pattern is valid")
});

pub fn try_parse_bool(text: &str) -> Option<bool> {
    let t = text.trim();
    if t.eq_ignore_ascii_case("true") || t == "1" {
        Some(true)
    } else if t.eq_ignore_ascii_case("false") || t == "0" {
        Some(false)
    } else {
        None
    }
}

/// Hyphenated 8-4-4-4-12 form only.
pub fn try_parse_guid(text: &str) -> Option<Uuid> {
    let t = text.trim();
    if t.len() != 36 {
        return None;
    }
    Uuid::parse_str(t).ok()
}

pub fn try_parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// `HH:MM`, `HH:MM:SS` or `HH:MM:SS.fffffff`.
pub fn try_parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let t = text.trim();
    NaiveTime::parse_from_str(t, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
        .ok()
}

pub fn try_parse_date_time_offset(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text.trim()).ok()
}

pub fn try_parse_duration(text: &str) -> Option<TimeDelta> {
    let t = text.trim();
    let caps = DURATION_RX.captures(t)?;
    let part = |i: usize| caps.get(i).map(|m| m.as_str());

    let has_time_part = part(3).is_some() || part(4).is_some() || part(5).is_some();
    // "P", "PT" and "P1DT" match the pattern but are not durations
    if (part(2).is_none() && !has_time_part) || (t.contains('T') && !has_time_part) {
        return None;
    }

    let field = |i: usize| -> Option<i64> {
        match part(i) {
            Some(s) => s.parse::<i64>().ok(),
            None => Some(0),
        }
    };
    let secs = field(2)?
        .checked_mul(86_400)?
        .checked_add(field(3)?.checked_mul(3_600)?)?
        .checked_add(field(4)?.checked_mul(60)?)?
        .checked_add(field(5)?)?;
    let nanos = match part(6) {
        Some(frac) => format!("{frac:0<9}").parse::<u32>().ok()?,
        None => 0,
    };

    let delta = TimeDelta::new(secs, nanos)?;
    Some(if part(1).is_some() { -delta } else { delta })
}

/// EDM binary literals are base16.
pub fn try_parse_binary(text: &str) -> Option<Vec<u8>> {
    hex::decode(text.trim()).ok()
}
