use async_trait::async_trait;
use log::debug;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tokio::time;

use crate::demo::data::DEMO_ZPOOL_IOSTAT;

/// What a finished command left behind
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Ways a command can fail before producing an exit status
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("command not found: {command}")]
    NotFound { command: String },

    #[error("command timed out after {timeout:?}")]
    TimedOut { timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Abstraction for command execution to enable testing without real commands
#[async_trait]
pub trait CommandExecutor {
    /// Run `command` to completion. The child must not outlive the call,
    /// whether it finishes, times out or fails.
    async fn execute_with_timeout(
        &self,
        command: &str,
        args: &[&str],
        timeout_duration: Duration,
    ) -> Result<CommandOutput, ExecError>;
}

/// Real command executor using tokio::process::Command
pub struct RealCommandExecutor;

#[async_trait]
impl CommandExecutor for RealCommandExecutor {
    async fn execute_with_timeout(
        &self,
        command: &str,
        args: &[&str],
        timeout_duration: Duration,
    ) -> Result<CommandOutput, ExecError> {
        debug!("Running {} {:?} (timeout {:?})", command, args, timeout_duration);

        let child = TokioCommand::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ExecError::NotFound {
                    command: command.to_string(),
                },
                _ => ExecError::Io(e),
            })?;

        // On timeout the wait future is dropped together with the child,
        // and kill_on_drop terminates it.
        match time::timeout(timeout_duration, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                Ok(CommandOutput {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            Err(_) => Err(ExecError::TimedOut {
                timeout: timeout_duration,
            }),
        }
    }
}

/// Demo command executor that returns predefined responses
pub struct DemoCommandExecutor;

impl DemoCommandExecutor {
    fn get_demo_response(&self, command: &str, args: &[&str]) -> Option<&'static str> {
        match (command, args) {
            ("zpool", ["iostat", flags, _, "1"]) if flags.starts_with('-') => {
                Some(DEMO_ZPOOL_IOSTAT)
            }
            _ => None,
        }
    }
}

#[async_trait]
impl CommandExecutor for DemoCommandExecutor {
    async fn execute_with_timeout(
        &self,
        command: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<CommandOutput, ExecError> {
        match self.get_demo_response(command, args) {
            Some(response) => Ok(CommandOutput {
                code: Some(0),
                stdout: response.to_string(),
                stderr: String::new(),
            }),
            None => Ok(CommandOutput {
                code: Some(2),
                stdout: String::new(),
                stderr: format!("Demo: Command not mocked: {} {:?}", command, args),
            }),
        }
    }
}

/// Returns one scripted outcome and remembers every invocation
#[cfg(test)]
pub struct ScriptedExecutor {
    outcome: fn() -> Result<CommandOutput, ExecError>,
    pub calls: std::sync::Mutex<Vec<(String, Vec<String>, Duration)>>,
}

#[cfg(test)]
impl ScriptedExecutor {
    pub fn new(outcome: fn() -> Result<CommandOutput, ExecError>) -> Self {
        Self {
            outcome,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute_with_timeout(
        &self,
        command: &str,
        args: &[&str],
        timeout_duration: Duration,
    ) -> Result<CommandOutput, ExecError> {
        self.calls.lock().unwrap().push((
            command.to_string(),
            args.iter().map(|s| s.to_string()).collect(),
            timeout_duration,
        ));
        (self.outcome)()
    }
}
