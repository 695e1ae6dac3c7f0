use std::process::Stdio;

use crate::tool::{ToolCommand, ToolError};

/// Abstraction over external tool execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ToolExecutor: Send + Sync {
    /// Execute a command and capture stdout.
    async fn exec(&self, cmd: &ToolCommand) -> Result<String, ToolError>;

    /// Execute a command, streaming its output to the terminal unchanged.
    ///
    /// Both of the tool's streams go to stderr, keeping stdout for fnpack's
    /// own summary.
    async fn exec_streaming(&self, cmd: &ToolCommand) -> Result<(), ToolError>;
}

/// Executor that spawns real processes.
pub struct RealExecutor;

impl RealExecutor {
    fn command(cmd: &ToolCommand) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(dir) = &cmd.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

fn spawn_error(cmd: &ToolCommand, e: std::io::Error) -> ToolError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ToolError::NotFound {
            program: cmd.program.clone(),
            source: e,
        }
    } else {
        ToolError::Launch {
            program: cmd.program.clone(),
            source: e,
        }
    }
}

impl ToolExecutor for RealExecutor {
    async fn exec(&self, cmd: &ToolCommand) -> Result<String, ToolError> {
        tracing::debug!(command = %cmd, "exec");

        let output = Self::command(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| spawn_error(cmd, e))?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ToolError::InvalidUtf8 {
                program: cmd.program.clone(),
                source: e,
            })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ToolError::CommandFailed {
                program: cmd.program.clone(),
                args: cmd.args.clone(),
                detail: format!("{}: {}", output.status, stderr.trim()),
            })
        }
    }

    async fn exec_streaming(&self, cmd: &ToolCommand) -> Result<(), ToolError> {
        tracing::debug!(command = %cmd, "exec (streaming)");

        let status = Self::command(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::from(std::io::stderr()))
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| spawn_error(cmd, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::CommandFailed {
                program: cmd.program.clone(),
                args: cmd.args.clone(),
                detail: status.to_string(),
            })
        }
    }
}
