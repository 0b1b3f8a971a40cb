//! Agent section output: one `<pool>|<json>` line per pool

use serde_json::json;
use std::io::{self, Write};

use super::collector::ParsedLine;
use super::error::{CollectError, LineError};
use super::record::PoolRecord;

pub const SECTION_NAME: &str = "zpool_iostat";

/// Splits the pool name from its JSON object; consumers split on the first one
pub const SEPARATOR: char = '|';

/// Pool name used for cycle-level failures
pub const ERROR_ITEM: &str = "ERROR";

pub fn section_header() -> String {
    format!("<<<{}:sep({})>>>", SECTION_NAME, SEPARATOR as u32)
}

pub fn format_record(record: &PoolRecord) -> serde_json::Result<String> {
    Ok(format!(
        "{}{}{}",
        record.pool(),
        SEPARATOR,
        serde_json::to_string(record)?
    ))
}

/// A pool whose line could not be aligned shows up with an `_error` object
pub fn format_unparseable(pool: &str, error: &LineError) -> String {
    format!(
        "{}{}{}",
        pool,
        SEPARATOR,
        json!({ "_error": error.to_string() })
    )
}

/// Cycle failure line. Newlines would split it into bogus records.
pub fn format_error(message: &str) -> String {
    let message = message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}{}{}", ERROR_ITEM, SEPARATOR, message)
}

/// Writes the section, printing the header before the first line only
pub struct Emitter<W: Write> {
    out: W,
    header_written: bool,
    lines: usize,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
            lines: 0,
        }
    }

    pub fn emit(&mut self, line: &ParsedLine) -> io::Result<()> {
        let text = match line {
            ParsedLine::Record(record) => format_record(record).map_err(io::Error::other)?,
            ParsedLine::Unparseable { pool, error } => format_unparseable(pool, error),
        };
        self.write_line(&text)
    }

    /// Emit the failure of a whole cycle. Quiet outcomes print nothing.
    pub fn emit_error(&mut self, error: &CollectError) -> io::Result<()> {
        if !error.is_reported() {
            return Ok(());
        }
        let text = format_error(&error.diagnostic());
        self.write_line(&text)
    }

    /// Number of lines written below the section header
    pub fn lines_written(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.out, "{}", section_header())?;
            self.header_written = true;
        }
        writeln!(self.out, "{}", text)?;
        self.lines += 1;
        Ok(())
    }
}
