mod check;
mod config;
mod demo;
mod display;
mod monitor;
mod system;
mod zfs;

use clap::{Parser, Subcommand};
use log::debug;
use std::env;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process;

use crate::system::{DemoFilesystemReader, RealFilesystemReader};

#[derive(Parser)]
#[command(
    name = "zpool-iostat-agent",
    version,
    about = "Emit per-pool zpool iostat records as a monitoring agent section"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample zpool iostat once and print the agent section (default)
    Collect {
        /// Agent configuration file (defaults to $MK_CONFDIR/zpool_iostat.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Evaluate an agent section read from stdin against levels
    Check {
        /// JSON file with `*_levels` entries
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// Only check this pool
        #[arg(long)]
        pool: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32, Box<dyn Error>> {
    // Check for demo mode
    let demo_mode = env::var("DEMO_MODE").unwrap_or_else(|_| "false".to_string()) == "true";
    if demo_mode {
        debug!("Running in demo mode");
    }

    match cli.command.unwrap_or(Commands::Collect { config: None }) {
        Commands::Collect { config } => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let outcome = rt.block_on(monitor::run_with_args(demo_mode, config))?;
            debug!("Cycle finished: {:?}", outcome);
            Ok(0)
        }
        Commands::Check { params, pool } => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let state = if demo_mode {
                check::run_check(
                    &DemoFilesystemReader,
                    params.as_deref(),
                    pool.as_deref(),
                    stdin.lock(),
                    stdout.lock(),
                )?
            } else {
                check::run_check(
                    &RealFilesystemReader,
                    params.as_deref(),
                    pool.as_deref(),
                    stdin.lock(),
                    stdout.lock(),
                )?
            };
            Ok(state.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_collect() {
        let cli = Cli::parse_from(["zpool-iostat-agent"]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_check_arguments() {
        let cli = Cli::parse_from([
            "zpool-iostat-agent",
            "check",
            "--params",
            "/tmp/params.json",
            "--pool",
            "tank",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Check { params, pool }) => {
                assert_eq!(params, Some(PathBuf::from("/tmp/params.json")));
                assert_eq!(pool.as_deref(), Some("tank"));
            }
            _ => panic!("Expected check subcommand"),
        }
    }

    #[test]
    fn test_collect_config_argument() {
        let cli = Cli::parse_from(["zpool-iostat-agent", "collect", "--config", "/tmp/z.json"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Collect { config: Some(ref path) }) if path == &PathBuf::from("/tmp/z.json")
        ));
    }
}
