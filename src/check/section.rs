//! Reading an emitted agent section back into per-pool data

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::zfs::emitter::{ERROR_ITEM, SEPARATOR};

/// What the section says about one pool
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
    Metrics(Map<String, Value>),
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    /// Set when the agent reported a cycle failure
    pub parse_error: Option<String>,
    pub pools: BTreeMap<String, PoolEntry>,
}

impl Section {
    /// Pools that can be monitored: those with metrics and no error
    pub fn discover(&self) -> Vec<&str> {
        self.pools
            .iter()
            .filter(|(_, entry)| matches!(entry, PoolEntry::Metrics(_)))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Parse `<pool>|<json>` lines; section headers and malformed lines are skipped
pub fn parse_section(text: &str) -> Section {
    let mut section = Section::default();

    for line in text.lines() {
        if line.starts_with("<<<") {
            continue;
        }
        let Some((name, payload)) = line.split_once(SEPARATOR) else {
            continue;
        };

        if name == ERROR_ITEM {
            let message = if payload.is_empty() {
                "Unknown error".to_string()
            } else {
                payload.to_string()
            };
            section.parse_error = Some(message);
            continue;
        }

        let entry = match serde_json::from_str::<Value>(payload) {
            Ok(Value::Object(map)) => match map.get("_error") {
                Some(error) => PoolEntry::Error(
                    error
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string()),
                ),
                None => PoolEntry::Metrics(map),
            },
            Ok(_) => PoolEntry::Error("Invalid JSON structure".to_string()),
            Err(e) => PoolEntry::Error(format!("JSON parsing failed: {}", e)),
        };
        section.pools.insert(name.to_string(), entry);
    }

    section
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records() {
        let section = parse_section(
            "<<<zpool_iostat:sep(124)>>>\n\
             tank|{\"pool\":\"tank\",\"read_ops\":12}\n\
             odd|{\"_error\":\"header/data column mismatch\"}\n",
        );
        assert_eq!(section.parse_error, None);
        assert_eq!(section.discover(), vec!["tank"]);
        assert_eq!(
            section.pools["odd"],
            PoolEntry::Error("header/data column mismatch".to_string())
        );
    }

    #[test]
    fn test_error_line() {
        let section = parse_section("ERROR|collection timed out after 30s\n");
        assert_eq!(
            section.parse_error.as_deref(),
            Some("collection timed out after 30s")
        );
        assert!(section.pools.is_empty());
    }

    #[test]
    fn test_split_on_first_separator_only() {
        let section = parse_section("tank|{\"note\":\"a|b\"}\n");
        match &section.pools["tank"] {
            PoolEntry::Metrics(map) => assert_eq!(map["note"], "a|b"),
            other => panic!("Expected metrics, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_payloads() {
        let section = parse_section("a|[1,2]\nb|{not json\nno separator here\n");
        assert_eq!(
            section.pools["a"],
            PoolEntry::Error("Invalid JSON structure".to_string())
        );
        assert!(matches!(&section.pools["b"], PoolEntry::Error(msg) if msg.starts_with("JSON parsing failed")));
        assert_eq!(section.pools.len(), 2);
    }
}
