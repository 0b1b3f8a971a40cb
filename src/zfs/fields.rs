//! Column semantics derived from canonical column names

/// How a column's raw token is to be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Bytes, optionally with a K/M/G/... suffix
    Size,
    /// Operations or queue entries
    Count,
    /// Latency, canonicalized to seconds
    Duration,
    /// Anything else
    Float,
}

impl FieldKind {
    /// Classify a column by its canonical name. Unknown columns still get a
    /// kind, so a newer zpool adding fields never breaks the record.
    pub fn classify(name: &str) -> Self {
        if name.ends_with("_wait") {
            FieldKind::Duration
        } else if matches!(name, "alloc" | "free" | "size") || name.ends_with("_bytes") {
            FieldKind::Size
        } else if name.ends_with("_ops") || name.ends_with("_pend") || name.ends_with("_activ") {
            FieldKind::Count
        } else {
            FieldKind::Float
        }
    }
}

/// One value column of the observed header
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn for_column(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::classify(name),
        }
    }
}
