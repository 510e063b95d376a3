use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Failed to spawn command: {0}")]
    Spawn(String),
    #[error("Command exited nonzero: {0}")]
    NonZeroExit(String),
    #[error("Timeout")]
    Timeout,
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Boundary to the controlled device. The device is a single shared,
/// stateful resource; callers must issue commands strictly ordered, never
/// concurrently.
#[async_trait]
pub trait DeviceCommander: Send + Sync {
    /// Runs one device command and returns its captured text output.
    async fn run(&self, args: &[String], timeout: Duration)
        -> Result<CommandOutput, ExecutorError>;

    /// Runs one device command and returns raw stdout bytes. Used for
    /// binary transfers such as `exec-out screencap -p`.
    async fn run_raw(&self, args: &[String], timeout: Duration) -> Result<Vec<u8>, ExecutorError>;
}

/// Executes commands through the `adb` binary, optionally pinned to one
/// device serial.
pub struct AdbExecutor {
    program: String,
    serial: Option<String>,
}

impl AdbExecutor {
    pub fn new(serial: Option<String>) -> Self {
        Self {
            program: "adb".to_string(),
            serial,
        }
    }

    /// Substitutes the underlying binary; used by tests to run against
    /// ordinary shell utilities instead of a live device.
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
            serial: None,
        }
    }

    fn command(&self, args: &[String]) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.args(args);
        cmd.kill_on_drop(true);
        cmd
    }

    async fn output(
        &self,
        args: &[String],
        timeout: Duration,
    ) -> Result<std::process::Output, ExecutorError> {
        tracing::debug!(program = %self.program, ?args, "running device command");

        let output = tokio::time::timeout(timeout, self.command(args).output())
            .await
            .map_err(|_| ExecutorError::Timeout)?
            .map_err(|e| ExecutorError::Spawn(e.to_string()))?;

        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(ExecutorError::NonZeroExit(stderr))
        }
    }
}

#[async_trait]
impl DeviceCommander for AdbExecutor {
    async fn run(
        &self,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutorError> {
        let output = self.output(args, timeout).await?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn run_raw(&self, args: &[String], timeout: Duration) -> Result<Vec<u8>, ExecutorError> {
        let output = self.output(args, timeout).await?;
        Ok(output.stdout)
    }
}
