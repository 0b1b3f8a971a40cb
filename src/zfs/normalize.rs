//! Raw token to typed value conversion

use serde::{Serialize, Serializer};

use super::error::FieldParseError;
use super::fields::{FieldKind, FieldSpec};

/// Placeholder zpool prints when a value was not measured
pub const MISSING_TOKEN: &str = "-";

/// Size suffixes in rank order; rank n scales by 1024^n
const SIZE_SUFFIXES: [char; 8] = ['B', 'K', 'M', 'G', 'T', 'P', 'E', 'Z'];

/// Time units and how many of them make a second. `s` must come last so
/// that `ns`/`us`/`ms` are matched first.
const DURATION_UNITS: [(&str, f64); 5] = [
    ("ns", NANOS_PER_SEC),
    ("us", 1e6),
    ("µs", 1e6),
    ("ms", 1e3),
    ("s", 1.0),
];

/// Bare latency numbers are nanoseconds in parsable mode
const NANOS_PER_SEC: f64 = 1e9;

/// A typed column value. `Missing` is distinct from any number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Count(u64),
    Float(f64),
    Missing,
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            MetricValue::Count(n) => Some(n as f64),
            MetricValue::Float(x) => Some(x),
            MetricValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, MetricValue::Missing)
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            MetricValue::Count(n) => serializer.serialize_u64(n),
            MetricValue::Float(x) => serializer.serialize_f64(x),
            MetricValue::Missing => serializer.serialize_none(),
        }
    }
}

/// Convert one token of the given column
pub fn normalize(spec: &FieldSpec, token: &str) -> Result<MetricValue, FieldParseError> {
    let token = token.trim();
    if token.is_empty() || token == MISSING_TOKEN {
        return Ok(MetricValue::Missing);
    }

    let value = match spec.kind {
        FieldKind::Size => parse_size(token).map(MetricValue::Float),
        FieldKind::Count => parse_count(token),
        FieldKind::Duration => parse_duration_secs(token).map(MetricValue::Float),
        FieldKind::Float => parse_number(token).map(MetricValue::Float),
    };
    value.map_err(|reason| FieldParseError::new(&spec.name, token, reason))
}

fn parse_number(number: &str) -> Result<f64, &'static str> {
    let value: f64 = number.parse().map_err(|_| "invalid numeric value")?;
    if !value.is_finite() || value < 0.0 {
        return Err("value out of range");
    }
    Ok(value)
}

/// Parse a byte size such as `1024`, `1K`, `2.5M` or `3G` (1024-based)
pub fn parse_size(token: &str) -> Result<f64, &'static str> {
    let (number, rank) = match token.char_indices().last() {
        Some((idx, suffix)) if suffix.is_ascii_alphabetic() => {
            let rank = SIZE_SUFFIXES
                .iter()
                .position(|s| *s == suffix.to_ascii_uppercase())
                .ok_or("unknown size suffix")?;
            (&token[..idx], rank)
        }
        _ => (token, 0),
    };
    Ok(parse_number(number)? * 1024f64.powi(rank as i32))
}

/// Parse a count: plain integers stay integers, scaled values become floats
pub fn parse_count(token: &str) -> Result<MetricValue, &'static str> {
    match token.parse::<u64>() {
        Ok(n) => Ok(MetricValue::Count(n)),
        Err(_) => parse_size(token).map(MetricValue::Float),
    }
}

/// Parse a latency and return it in seconds. A bare number is nanoseconds.
pub fn parse_duration_secs(token: &str) -> Result<f64, &'static str> {
    for (unit, per_sec) in DURATION_UNITS {
        if let Some(number) = token.strip_suffix(unit) {
            return Ok(parse_number(number)? / per_sec);
        }
    }
    Ok(parse_number(token)? / NANOS_PER_SEC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn spec(name: &str) -> FieldSpec {
        FieldSpec::for_column(name)
    }

    #[test]
    fn test_parse_size_bytes() {
        assert_eq!(parse_size("1024").unwrap(), 1024.0);
        assert_eq!(parse_size("0").unwrap(), 0.0);
        assert_eq!(parse_size("512B").unwrap(), 512.0);
    }

    #[test]
    fn test_parse_size_with_units() {
        assert_eq!(parse_size("1K").unwrap(), 1024.0);
        assert_eq!(parse_size("2.5M").unwrap(), 2.5 * 1024.0 * 1024.0);
        assert_eq!(parse_size("3G").unwrap(), 3.0 * 1024.0 * 1024.0 * 1024.0);
        assert_eq!(parse_size("1T").unwrap(), 1024f64.powi(4));
        assert_eq!(parse_size("100G").unwrap(), 107374182400.0);
    }

    #[test]
    fn test_parse_size_invalid() {
        assert_eq!(parse_size("100X"), Err("unknown size suffix"));
        assert_eq!(parse_size("abc"), Err("unknown size suffix"));
        assert_eq!(parse_size("1.2.3"), Err("invalid numeric value"));
        assert_eq!(parse_size("K"), Err("invalid numeric value"));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12"), Ok(MetricValue::Count(12)));
        assert_eq!(parse_count("1.5K"), Ok(MetricValue::Float(1536.0)));
        assert_eq!(parse_count("0.5"), Ok(MetricValue::Float(0.5)));
        assert!(parse_count("many").is_err());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration_secs("1500000").unwrap(), 0.0015);
        assert_eq!(parse_duration_secs("250ns").unwrap(), 2.5e-7);
        assert_eq!(parse_duration_secs("345us").unwrap(), 0.000345);
        assert_eq!(parse_duration_secs("12µs").unwrap(), 0.000012);
        assert_eq!(parse_duration_secs("12ms").unwrap(), 0.012);
        assert_eq!(parse_duration_secs("2s").unwrap(), 2.0);
        assert!(parse_duration_secs("12h").is_err());
    }

    #[test]
    fn test_nanoseconds_convert_without_noise() {
        assert_eq!(parse_duration_secs("6").unwrap(), 6e-9);
        assert_eq!(parse_duration_secs("917504").unwrap(), 0.000917504);
        assert_eq!(
            serde_json::to_value(normalize(&spec("write_wait"), "6").unwrap()).unwrap(),
            serde_json::json!(6e-9)
        );
    }

    #[test]
    fn test_normalize_dispatches_on_kind() {
        assert_eq!(
            normalize(&spec("alloc"), "100G").unwrap(),
            MetricValue::Float(107374182400.0)
        );
        assert_eq!(normalize(&spec("read_ops"), "12").unwrap(), MetricValue::Count(12));
        assert_eq!(
            normalize(&spec("read_wait"), "2ms").unwrap(),
            MetricValue::Float(0.002)
        );
        assert_eq!(
            normalize(&spec("fragmentation"), "12.5").unwrap(),
            MetricValue::Float(12.5)
        );
    }

    #[test]
    fn test_placeholder_is_missing_not_zero() {
        for name in ["alloc", "read_ops", "scrub_wait", "fragmentation"] {
            let value = normalize(&spec(name), "-").unwrap();
            assert!(value.is_missing());
            assert_eq!(value.as_f64(), None);
        }
    }

    #[test]
    fn test_parse_failure_names_field() {
        let err = normalize(&spec("read_wait"), "soon").unwrap_err();
        assert_eq!(err.field, "read_wait");
        assert_eq!(err.token, "soon");
    }

    #[test]
    fn test_serialize_values() {
        assert_eq!(serde_json::to_string(&MetricValue::Count(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&MetricValue::Float(107374182400.0)).unwrap(),
            "107374182400.0"
        );
        assert_eq!(serde_json::to_string(&MetricValue::Missing).unwrap(), "null");
    }

    #[quickcheck]
    fn prop_suffix_scales_by_power_of_1024(prefix: u32, rank: u8) -> bool {
        let rank = (rank % SIZE_SUFFIXES.len() as u8) as usize;
        let token = format!("{}{}", prefix, SIZE_SUFFIXES[rank]);
        parse_size(&token) == Ok(prefix as f64 * 1024f64.powi(rank as i32))
    }

    #[quickcheck]
    fn prop_normalize_is_idempotent(token: String) -> bool {
        ["alloc", "read_ops", "read_wait", "other"].iter().all(|name| {
            let spec = spec(name);
            normalize(&spec, &token) == normalize(&spec, &token)
        })
    }

    #[quickcheck]
    fn prop_numbers_never_normalize_to_missing(value: u32) -> bool {
        let token = value.to_string();
        ["alloc", "read_ops", "read_wait"]
            .iter()
            .all(|name| !normalize(&spec(name), &token).unwrap().is_missing())
    }
}
