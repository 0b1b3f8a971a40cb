use log::{debug, warn};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::error::LineError;
use super::header::RawSample;
use super::normalize::{normalize, MetricValue};

/// Key of the derived capacity field
pub const STORAGE_USED_PERCENT: &str = "storage_used_percent";

/// Typed metrics of one pool for one collection cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PoolRecord {
    pool: String,
    fields: Vec<(String, MetricValue)>,
    storage_used_percent: Option<f64>,
}

impl PoolRecord {
    /// Align a data line with its header and normalize every column.
    /// A column that fails to parse is kept as missing; only a token count
    /// mismatch rejects the whole line.
    pub fn from_sample(sample: &RawSample) -> Result<Self, LineError> {
        let header = sample.header.as_deref().ok_or(LineError::MissingHeader)?;
        if sample.tokens.len() != header.column_count() {
            return Err(LineError::HeaderMismatch {
                expected: header.column_count(),
                found: sample.tokens.len(),
            });
        }

        let pool = sample.pool_name().to_string();
        let fields: Vec<(String, MetricValue)> = header
            .fields
            .iter()
            .zip(sample.tokens.iter().skip(1))
            .map(|(spec, token)| {
                let value = normalize(spec, token).unwrap_or_else(|e| {
                    warn!("Pool {}: {}", pool, e);
                    MetricValue::Missing
                });
                (spec.name.clone(), value)
            })
            .collect();

        let missing = fields.iter().filter(|(_, value)| value.is_missing()).count();
        if missing > 0 {
            debug!("Pool {}: {} of {} columns not measured", pool, missing, fields.len());
        }

        Ok(Self::new(pool, fields))
    }

    pub fn new(pool: String, fields: Vec<(String, MetricValue)>) -> Self {
        let mut record = Self {
            pool,
            fields,
            storage_used_percent: None,
        };
        let lookup = |name: &str| record.get(name).unwrap_or(MetricValue::Missing);
        record.storage_used_percent = storage_used_percent(lookup("alloc"), lookup("free"));
        record
    }

    pub fn pool(&self) -> &str {
        &self.pool
    }

    /// Value of a column; `None` if the header had no such column
    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| *value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, MetricValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn storage_used_percent(&self) -> Option<f64> {
        self.storage_used_percent
    }
}

/// `alloc / (alloc + free) * 100`, absent when either side is missing or the pool is empty
pub fn storage_used_percent(alloc: MetricValue, free: MetricValue) -> Option<f64> {
    let alloc = alloc.as_f64()?;
    let total = alloc + free.as_f64()?;
    if total > 0.0 {
        Some(alloc / total * 100.0)
    } else {
        None
    }
}

impl Serialize for PoolRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry("pool", self.pool())?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, &value)?;
        }
        map.serialize_entry(STORAGE_USED_PERCENT, &self.storage_used_percent())?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zfs::header::split_samples;

    fn record(output: &str) -> Result<PoolRecord, LineError> {
        let samples = split_samples(output);
        PoolRecord::from_sample(&samples[0])
    }

    #[test]
    fn test_scenario_record() {
        let record = record("pool alloc free read_ops write_ops\ntank 100G 50G 12 7\n").unwrap();
        assert_eq!(record.pool(), "tank");
        assert_eq!(record.get("alloc"), Some(MetricValue::Float(107374182400.0)));
        assert_eq!(record.get("free"), Some(MetricValue::Float(53687091200.0)));
        assert_eq!(record.get("read_ops"), Some(MetricValue::Count(12)));
        assert_eq!(record.get("write_ops"), Some(MetricValue::Count(7)));

        let percent = record.storage_used_percent().unwrap();
        assert!((percent - 200.0 / 3.0).abs() < 1e-9);

        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["pool"], "tank");
        assert_eq!(json["alloc"], 107374182400.0);
        assert_eq!(json["read_ops"], 12);
        assert!(json["read_ops"].is_u64());
        assert!((json["storage_used_percent"].as_f64().unwrap() - 66.666).abs() < 0.001);
    }

    #[test]
    fn test_json_key_order_follows_header() {
        let record = record("pool alloc free read_ops write_ops\ntank 100G 50G 12 7\n").unwrap();
        let text = serde_json::to_string(&record).unwrap();
        assert!(text.starts_with(
            r#"{"pool":"tank","alloc":107374182400.0,"free":53687091200.0,"read_ops":12,"write_ops":7,"storage_used_percent":66.66666666666"#
        ));
    }

    #[test]
    fn test_missing_scrub_wait_only_affects_that_field() {
        let record = record("pool alloc free read_wait scrub_wait\ntank 1G 1G 1500000 -\n").unwrap();
        assert_eq!(record.get("scrub_wait"), Some(MetricValue::Missing));
        assert_eq!(record.get("read_wait"), Some(MetricValue::Float(0.0015)));
        assert_eq!(record.storage_used_percent(), Some(50.0));

        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert!(json["scrub_wait"].is_null());
        assert!(json.as_object().unwrap().contains_key("scrub_wait"));
    }

    #[test]
    fn test_bad_token_becomes_missing() {
        let record = record("pool alloc free read_ops\ntank 1G 3G lots\n").unwrap();
        assert_eq!(record.get("read_ops"), Some(MetricValue::Missing));
        assert_eq!(record.storage_used_percent(), Some(25.0));
    }

    #[test]
    fn test_empty_pool_has_no_percent() {
        let record = record("pool alloc free\ntank 0 0\n").unwrap();
        assert_eq!(record.storage_used_percent(), None);
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert!(json["storage_used_percent"].is_null());
        assert_eq!(json["alloc"], 0.0);
    }

    #[test]
    fn test_missing_alloc_has_no_percent() {
        assert_eq!(
            storage_used_percent(MetricValue::Missing, MetricValue::Float(10.0)),
            None
        );
        assert_eq!(
            storage_used_percent(MetricValue::Float(1.0), MetricValue::Float(3.0)),
            Some(25.0)
        );
    }

    #[test]
    fn test_token_count_mismatch() {
        let result = record("pool alloc free read_ops write_ops\ntank 100G 50G 12\n");
        assert_eq!(
            result,
            Err(LineError::HeaderMismatch {
                expected: 5,
                found: 4
            })
        );
    }

    #[test]
    fn test_line_without_header() {
        assert_eq!(record("tank 100G 50G 12 7\n"), Err(LineError::MissingHeader));
    }

    #[test]
    fn test_absent_column_is_none() {
        let record = record("pool alloc free\ntank 1 1\n").unwrap();
        assert_eq!(record.get("trim_wait"), None);
    }
}
