//! Header parsing for `zpool iostat` output.
//!
//! Column names are read from the header rows of every run, never assumed.
//! Non-scripted output carries a group row above the column row, e.g.
//!
//! ```text
//!               capacity     operations     bandwidth    total_wait ...
//! pool        alloc   free   read  write   read  write   read  write ...
//! ----------  -----  -----  -----  -----  -----  -----  -----  ----- ...
//! ```
//!
//! Group labels are centered over their columns, so both rows are tokenized
//! with character offsets and each column is attached to the group label
//! that starts at the greatest offset not past the column's end.

use log::warn;
use std::collections::HashMap;
use std::rc::Rc;

use super::fields::FieldSpec;

/// A header token and the character offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderToken {
    pub name: String,
    pub start: usize,
}

impl HeaderToken {
    pub fn end(&self) -> usize {
        self.start + self.name.chars().count()
    }
}

/// Split a line on whitespace, keeping each token's start offset.
/// Leading whitespace counts towards the offsets.
pub fn tokenize_with_offsets(line: &str) -> Vec<HeaderToken> {
    let mut tokens = Vec::new();
    let mut current: Option<HeaderToken> = None;

    for (offset, ch) in line.chars().enumerate() {
        if ch.is_whitespace() {
            if let Some(token) = current.take() {
                tokens.push(token);
            }
        } else {
            current
                .get_or_insert_with(|| HeaderToken {
                    name: String::new(),
                    start: offset,
                })
                .name
                .push(ch);
        }
    }
    tokens.extend(current);
    tokens
}

/// Canonical field name for a column under an optional group label
pub fn canonical_name(group: Option<&str>, column: &str) -> String {
    let Some(group) = group else {
        return column.to_string();
    };
    match group {
        "capacity" => column.to_string(),
        "operations" => format!("{}_ops", column),
        "bandwidth" => format!("{}_bytes", column),
        "total_wait" => format!("{}_wait", column),
        _ => match group.strip_suffix("_wait") {
            Some(queue) => format!("{}_{}_wait", queue, column),
            None => format!("{}_{}", group, column),
        },
    }
}

/// Column layout of one header block. The first column always holds the
/// pool name and is not part of `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLayout {
    /// Value columns in output order
    pub fields: Vec<FieldSpec>,
}

impl HeaderLayout {
    /// Build a layout from the non-separator header rows of one block.
    /// The last row names the columns, the row above it (if any) groups them.
    pub fn from_lines(lines: &[&str]) -> Self {
        let column_row = lines.last().copied().unwrap_or_default();
        let groups = match lines.len() {
            0 | 1 => Vec::new(),
            n => tokenize_with_offsets(lines[n - 2]),
        };
        let columns = tokenize_with_offsets(column_row);

        let names = columns.iter().skip(1).map(|column| {
            let group = groups
                .iter()
                .rev()
                .find(|group| group.start <= column.end())
                .map(|group| group.name.as_str());
            canonical_name(group, &column.name)
        });

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut fields = Vec::with_capacity(columns.len().saturating_sub(1));
        for name in names {
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            let name = if *count > 1 {
                warn!("Duplicate header column '{}', renaming to {}_{}", name, name, count);
                format!("{}_{}", name, count)
            } else {
                name
            };
            fields.push(FieldSpec::for_column(&name));
        }

        Self { fields }
    }

    /// Number of whitespace tokens a data line must have
    pub fn column_count(&self) -> usize {
        self.fields.len() + 1
    }
}

/// One data line and the header it belongs to
#[derive(Debug, Clone)]
pub struct RawSample {
    /// Whitespace tokens, never empty; the first is the pool name
    pub tokens: Vec<String>,
    pub header: Option<Rc<HeaderLayout>>,
}

impl RawSample {
    pub fn pool_name(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or_default()
    }
}

/// Rows of dashes between the header and the data
pub fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '-' || c.is_whitespace())
}

/// Data lines carry at least one value token after the pool name:
/// a number, or the `-` placeholder. Header tokens never start with a digit.
pub fn is_data_line(line: &str) -> bool {
    line.split_whitespace()
        .skip(1)
        .any(|token| token == "-" || token.starts_with(|c: char| c.is_ascii_digit()))
}

/// Split command output into data lines, each tied to the most recent header block
pub fn split_samples(output: &str) -> Vec<RawSample> {
    let mut pending: Vec<&str> = Vec::new();
    let mut layout: Option<Rc<HeaderLayout>> = None;
    let mut samples = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() || is_separator(line) {
            continue;
        }
        if !is_data_line(line) {
            pending.push(line);
            continue;
        }
        if !pending.is_empty() {
            layout = Some(Rc::new(HeaderLayout::from_lines(&pending)));
            pending.clear();
        }
        samples.push(RawSample {
            tokens: line.split_whitespace().map(str::to_string).collect(),
            header: layout.clone(),
        });
    }

    samples
}
