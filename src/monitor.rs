use log::{debug, error, info};
use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::{default_config_path, load_config};
use crate::system::{
    CommandExecutor, DemoCommandExecutor, DemoFilesystemReader, FilesystemReader,
    RealCommandExecutor, RealFilesystemReader,
};
use crate::zfs::{CollectError, Emitter, IostatCollector, ParsedLine};

/// How a collection cycle ended
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// `enabled: false`; zpool was not run
    Disabled,
    /// Pool lines were written
    Emitted { records: usize, unparseable: usize },
    /// Valid state with nothing to print (no binary, no pools)
    Quiet(String),
    /// An `ERROR|` line was written
    Reported(String),
}

/// Run one collection cycle with real or demo system access
pub async fn run_with_args(
    demo_mode: bool,
    config_path: Option<PathBuf>,
) -> Result<CycleOutcome, Box<dyn Error>> {
    let config_path = config_path.unwrap_or_else(default_config_path);
    let stdout = io::stdout();

    let outcome = if demo_mode {
        let collector = IostatCollector::new(DemoCommandExecutor);
        run_cycle(&collector, &DemoFilesystemReader, &config_path, stdout.lock()).await?
    } else {
        let collector = IostatCollector::new(RealCommandExecutor);
        run_cycle(&collector, &RealFilesystemReader, &config_path, stdout.lock()).await?
    };
    Ok(outcome)
}

/// Load configuration, collect once and write the agent section to `out`.
/// Only writing to `out` can fail; every collection problem becomes an outcome.
pub async fn run_cycle<E, F, W>(
    collector: &IostatCollector<E>,
    reader: &F,
    config_path: &Path,
    out: W,
) -> io::Result<CycleOutcome>
where
    E: CommandExecutor,
    F: FilesystemReader,
    W: Write,
{
    let mut emitter = Emitter::new(out);

    let config = match load_config(reader, config_path) {
        Ok(config) => config,
        Err(e) => {
            let e = CollectError::from(e);
            error!("{}", e);
            emitter.emit_error(&e)?;
            return Ok(CycleOutcome::Reported(e.diagnostic()));
        }
    };

    if !config.enabled {
        info!("Collection disabled by {}", config_path.display());
        return Ok(CycleOutcome::Disabled);
    }

    let lines = match collector.collect(&config).await {
        Ok(lines) => lines,
        Err(e) if e.is_reported() => {
            error!("{}", e);
            emitter.emit_error(&e)?;
            return Ok(CycleOutcome::Reported(e.diagnostic()));
        }
        Err(e) => {
            info!("{}", e);
            return Ok(CycleOutcome::Quiet(e.to_string()));
        }
    };

    let mut records = 0;
    let mut unparseable = 0;
    for line in &lines {
        emitter.emit(line)?;
        match line {
            ParsedLine::Record(_) => records += 1,
            ParsedLine::Unparseable { .. } => unparseable += 1,
        }
    }
    debug!("Wrote {} section line(s)", emitter.lines_written());
    emitter.into_inner().flush()?;

    Ok(CycleOutcome::Emitted {
        records,
        unparseable,
    })
}
