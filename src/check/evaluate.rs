//! Level evaluation of one pool's section data

use serde_json::{Map, Value};
use std::fmt;

use super::params::{CheckParams, Levels};
use super::section::{PoolEntry, Section};
use crate::display::{
    format_count, format_latency_ms, format_ops_per_second, format_percent, format_rate,
};
use crate::zfs::record::{storage_used_percent, STORAGE_USED_PERCENT};
use crate::zfs::MetricValue;

/// Monitoring state of a check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Ok,
    Warn,
    Crit,
    Unknown,
}

impl State {
    fn severity(self) -> u8 {
        match self {
            State::Ok => 0,
            State::Warn => 1,
            State::Unknown => 2,
            State::Crit => 3,
        }
    }

    /// CRIT outranks UNKNOWN, which outranks WARN
    pub fn worst(self, other: State) -> State {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            State::Ok => 0,
            State::Warn => 1,
            State::Crit => 2,
            State::Unknown => 3,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            State::Ok => "",
            State::Warn => "(!)",
            State::Crit => "(!!)",
            State::Unknown => "(?)",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            State::Ok => "OK",
            State::Warn => "WARN",
            State::Crit => "CRIT",
            State::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// Compare against upper levels
pub fn check_levels(value: f64, levels: Option<Levels>) -> State {
    match levels {
        Some(levels) if value >= levels.crit() => State::Crit,
        Some(levels) if value >= levels.warn() => State::Warn,
        _ => State::Ok,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub levels: Option<Levels>,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(levels) = self.levels {
            write!(f, ";{};{}", levels.warn(), levels.crit())?;
        }
        Ok(())
    }
}

/// Result for one pool
#[derive(Debug, Clone, PartialEq)]
pub struct PoolCheck {
    pub item: String,
    pub state: State,
    pub summaries: Vec<String>,
    pub metrics: Vec<Metric>,
}

impl PoolCheck {
    fn new(item: &str) -> Self {
        Self {
            item: item.to_string(),
            state: State::Ok,
            summaries: Vec::new(),
            metrics: Vec::new(),
        }
    }

    fn unknown(item: &str, message: impl Into<String>) -> Self {
        let mut check = Self::new(item);
        check.state = State::Unknown;
        check.summaries.push(message.into());
        check
    }

    /// Record one evaluated value. `summarize` controls whether an OK value
    /// shows up in the summary text.
    fn add(
        &mut self,
        label: &str,
        metric_name: String,
        value: f64,
        levels: Option<Levels>,
        render: fn(f64) -> String,
        summarize: bool,
    ) {
        let state = check_levels(value, levels);
        self.state = self.state.worst(state);

        if summarize || levels.is_some() {
            let mut summary = format!("{}: {}", label, render(value));
            if let (State::Warn | State::Crit, Some(levels)) = (state, levels) {
                summary.push_str(&format!(
                    " (warn/crit at {}/{}){}",
                    render(levels.warn()),
                    render(levels.crit()),
                    state.marker()
                ));
            }
            self.summaries.push(summary);
        }

        self.metrics.push(Metric {
            name: metric_name,
            value,
            levels,
        });
    }

    /// `<STATE> ZPool I/O <pool> - <summaries> | <metrics>`
    pub fn render(&self) -> String {
        let summary = if self.summaries.is_empty() {
            "No metrics available".to_string()
        } else {
            self.summaries.join(", ")
        };
        let mut line = format!("{} ZPool I/O {} - {}", self.state, self.item, summary);
        if !self.metrics.is_empty() {
            let metrics: Vec<String> = self.metrics.iter().map(Metric::to_string).collect();
            line.push_str(" | ");
            line.push_str(&metrics.join(" "));
        }
        line
    }
}

const WAIT_FIELDS: &[(&str, &str)] = &[
    ("read_wait", "Read wait"),
    ("write_wait", "Write wait"),
    ("disk_read_wait", "Disk read wait"),
    ("disk_write_wait", "Disk write wait"),
    ("syncq_read_wait", "Sync queue read wait"),
    ("syncq_write_wait", "Sync queue write wait"),
    ("asyncq_read_wait", "Async queue read wait"),
    ("asyncq_write_wait", "Async queue write wait"),
    ("scrub_wait", "Scrub wait"),
    ("trim_wait", "Trim wait"),
    ("rebuild_wait", "Rebuild wait"),
];

fn value(metrics: &Map<String, Value>, name: &str) -> Option<f64> {
    metrics.get(name).and_then(Value::as_f64)
}

fn metric_value(metrics: &Map<String, Value>, name: &str) -> MetricValue {
    value(metrics, name).map_or(MetricValue::Missing, MetricValue::Float)
}

/// Evaluate one pool of the section against `params`
pub fn check_pool(item: &str, params: &CheckParams, section: &Section) -> PoolCheck {
    if let Some(error) = &section.parse_error {
        return PoolCheck::unknown(item, error.clone());
    }

    let metrics = match section.pools.get(item) {
        Some(PoolEntry::Metrics(metrics)) => metrics,
        Some(PoolEntry::Error(error)) => return PoolCheck::unknown(item, error.clone()),
        None => return PoolCheck::unknown(item, "Pool not found in agent output"),
    };

    let mut check = PoolCheck::new(item);

    let storage = value(metrics, STORAGE_USED_PERCENT).or_else(|| {
        storage_used_percent(metric_value(metrics, "alloc"), metric_value(metrics, "free"))
    });
    if let Some(percent) = storage {
        check.add(
            "Storage used",
            STORAGE_USED_PERCENT.to_string(),
            percent,
            params.levels("storage"),
            format_percent,
            true,
        );
    }

    for (field, label) in [("read_ops", "Read operations"), ("write_ops", "Write operations")] {
        if let Some(ops) = value(metrics, field) {
            check.add(label, field.to_string(), ops, params.levels(field), format_ops_per_second, true);
        }
    }

    for (field, name, label) in [
        ("read_bytes", "read_throughput", "Read throughput"),
        ("write_bytes", "write_throughput", "Write throughput"),
    ] {
        if let Some(bytes) = value(metrics, field) {
            check.add(label, name.to_string(), bytes, params.levels(name), format_rate, true);
        }
    }

    for (field, label) in WAIT_FIELDS {
        if let Some(wait) = value(metrics, field) {
            let levels = params.levels(field).map(Levels::ms_to_seconds);
            check.add(label, format!("{}_s", field), wait, levels, format_latency_ms, false);
        }
    }

    if let (Some(read), Some(write)) = (
        value(metrics, "disk_read_wait"),
        value(metrics, "disk_write_wait"),
    ) {
        let levels = params.levels("disk_wait").map(Levels::ms_to_seconds);
        check.add(
            "Disk wait",
            "disk_wait_max_s".to_string(),
            read.max(write),
            levels,
            format_latency_ms,
            true,
        );
    }

    for (field, raw) in metrics {
        if !(field.ends_with("_pend") || field.ends_with("_activ")) {
            continue;
        }
        if let Some(depth) = raw.as_f64() {
            check.add(field, field.clone(), depth, params.levels(field), format_count, false);
        }
    }

    check
}

/// Evaluate `item`, or every pool that reported metrics when no item is given.
/// Pools with only an error line are evaluated when asked for by name.
pub fn check_section(item: Option<&str>, params: &CheckParams, section: &Section) -> Vec<PoolCheck> {
    match item {
        Some(item) => vec![check_pool(item, params, section)],
        None if section.parse_error.is_some() && section.pools.is_empty() => {
            vec![PoolCheck::unknown("ERROR", section.parse_error.clone().unwrap_or_default())]
        }
        None => section
            .discover()
            .into_iter()
            .map(|item| check_pool(item, params, section))
            .collect(),
    }
}
