use log::{debug, info, warn};

use super::error::{CollectError, CollectResult, LineError};
use super::header::split_samples;
use super::record::PoolRecord;
use crate::config::AgentConfig;
use crate::system::{CommandExecutor, ExecError};

pub const ZPOOL_COMMAND: &str = "zpool";

/// Latency (`l`), queues (`q`), exact numbers (`p`), skip the since-boot
/// sample (`y`). Scripted mode (`H`) is not used because it drops the
/// header rows the column layout is read from. Headerless `-H` output fed
/// to the parser yields one `MissingHeader` error line per pool.
pub const IOSTAT_FLAGS: &str = "-ylpq";

/// Result of aligning one data line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Record(PoolRecord),
    Unparseable { pool: String, error: LineError },
}

/// Turn captured iostat text into one parsed line per pool.
/// A broken line never affects its neighbours.
pub fn parse_iostat_output(output: &str) -> Vec<ParsedLine> {
    split_samples(output)
        .iter()
        .map(|sample| match PoolRecord::from_sample(sample) {
            Ok(record) => ParsedLine::Record(record),
            Err(error) => {
                warn!("Skipping pool {}: {}", sample.pool_name(), error);
                ParsedLine::Unparseable {
                    pool: sample.pool_name().to_string(),
                    error,
                }
            }
        })
        .collect()
}

/// Runs `zpool iostat` once per cycle and parses what it printed
pub struct IostatCollector<E: CommandExecutor> {
    command_executor: E,
}

impl<E: CommandExecutor> IostatCollector<E> {
    pub fn new(command_executor: E) -> Self {
        Self { command_executor }
    }

    #[cfg(test)]
    pub fn executor(&self) -> &E {
        &self.command_executor
    }

    /// Arguments for one sampling window of `sampling_duration` seconds
    pub fn iostat_args(sampling_duration: u64) -> Vec<String> {
        vec![
            "iostat".to_string(),
            IOSTAT_FLAGS.to_string(),
            sampling_duration.to_string(),
            "1".to_string(),
        ]
    }

    /// Run the command and return its stdout
    pub async fn collect_raw(&self, config: &AgentConfig) -> CollectResult<String> {
        let args = Self::iostat_args(config.sampling_duration);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = self
            .command_executor
            .execute_with_timeout(ZPOOL_COMMAND, &args, config.timeout())
            .await
            .map_err(|e| match e {
                ExecError::NotFound { command } => CollectError::unavailable(&command),
                ExecError::TimedOut { timeout } => CollectError::Timeout { timeout },
                ExecError::Io(e) => CollectError::Io {
                    reason: e.to_string(),
                },
            })?;

        if !output.success() {
            return Err(CollectError::failed(output.code, &output.stderr));
        }
        if !output.stderr.trim().is_empty() {
            debug!("zpool iostat stderr: {}", output.stderr.trim_end());
        }
        Ok(output.stdout)
    }

    /// One full collection: run, then parse every pool line
    pub async fn collect(&self, config: &AgentConfig) -> CollectResult<Vec<ParsedLine>> {
        let raw = self.collect_raw(config).await?;
        let lines = parse_iostat_output(&raw);
        if lines.is_empty() {
            return Err(CollectError::NoPoolsFound);
        }
        info!("Collected iostat for {} pool(s)", lines.len());
        Ok(lines)
    }
}
