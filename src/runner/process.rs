//! Subprocess-backed script runner
//!
//! Spawns the configured control/remote script, collects stdout and stderr
//! until exit, and kills the process if it outlives its time budget.

use crate::error::DispatchError;
use crate::runner::traits::{ScriptOutput, ScriptRunner};
use async_trait::async_trait;
use bytes::Bytes;
use rflights_shared::{timing, ScriptKind};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error};

/// Configuration for the process runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Script used for status/set/sync commands
    pub control_script: PathBuf,
    /// Script used for button presses
    pub remote_script: PathBuf,
    /// Optional interpreter; scripts are executed directly when absent
    pub interpreter: Option<PathBuf>,
    /// Hard limit for one invocation
    pub timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            control_script: PathBuf::from("control.py"),
            remote_script: PathBuf::from("remote.py"),
            interpreter: None,
            timeout: Duration::from_secs(timing::DEFAULT_SCRIPT_TIMEOUT_SECS),
        }
    }
}

/// Runs scripts as child processes
pub struct ProcessRunner {
    config: RunnerConfig,
}

impl ProcessRunner {
    /// Create a new process runner
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    fn script_for(&self, kind: ScriptKind) -> &Path {
        match kind {
            ScriptKind::Control => &self.config.control_script,
            ScriptKind::Remote => &self.config.remote_script,
        }
    }

    fn build_command(&self, kind: ScriptKind, args: &[String]) -> Command {
        let script = self.script_for(kind);
        let mut cmd = match &self.config.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(script);
                cmd
            }
            None => Command::new(script),
        };

        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ScriptRunner for ProcessRunner {
    async fn run(&self, kind: ScriptKind, args: &[String]) -> Result<ScriptOutput, DispatchError> {
        let mut child = self.build_command(kind, args).spawn()?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let collect = async {
            tokio::try_join!(read_pipe(stdout), read_pipe(stderr), child.wait())
        };
        let result = timeout(self.config.timeout, collect).await;

        let (stdout, stderr, status) = match result {
            Ok(collected) => collected?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    error!("[{}] Failed to kill timed out script: {}", kind, e);
                }
                return Err(DispatchError::Timeout(self.config.timeout));
            }
        };

        if !stderr.is_empty() {
            debug!(
                "[{}] stderr: {}",
                kind,
                String::from_utf8_lossy(&stderr).trim_end()
            );
        }

        let exit_code = status.code().unwrap_or(-1);
        if exit_code != 0 {
            return Err(DispatchError::ScriptExit(exit_code));
        }

        Ok(ScriptOutput {
            exit_code,
            stdout: Bytes::from(stdout),
        })
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

/// Read a child pipe to EOF
async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;
    use tempfile::TempDir;

    /// Write control/remote shell scripts into a temp dir and build a runner for them
    fn sh_runner(control: &str, remote: &str, timeout: Duration) -> (TempDir, ProcessRunner) {
        let dir = tempfile::tempdir().expect("tempdir");
        let control_script = dir.path().join("control.sh");
        let remote_script = dir.path().join("remote.sh");
        std::fs::write(&control_script, control).expect("write control");
        std::fs::write(&remote_script, remote).expect("write remote");

        let runner = ProcessRunner::new(RunnerConfig {
            control_script,
            remote_script,
            interpreter: Some(PathBuf::from("/bin/sh")),
            timeout,
        });
        (dir, runner)
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_captures_stdout_and_argv() {
        let (_dir, runner) = sh_runner("echo \"$@\"\n", "exit 0\n", Duration::from_secs(5));

        let output = runner
            .run(ScriptKind::Control, &args(&["--light", "tao95", "--status"]))
            .await
            .expect("run failed");

        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout.as_ref(), b"--light tao95 --status\n");
    }

    #[tokio::test]
    async fn test_remote_kind_uses_remote_script() {
        let (_dir, runner) = sh_runner(
            "echo control\n",
            "echo remote \"$@\"\n",
            Duration::from_secs(5),
        );

        let output = runner
            .run(ScriptKind::Remote, &args(&["--light", "txone", "--button", "2"]))
            .await
            .expect("run failed");

        assert_eq!(output.stdout.as_ref(), b"remote --light txone --button 2\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_error() {
        let (_dir, runner) = sh_runner("echo partial\nexit 3\n", "exit 0\n", Duration::from_secs(5));

        let result = runner.run(ScriptKind::Control, &[]).await;
        assert!(matches!(result, Err(DispatchError::ScriptExit(3))));
    }

    #[tokio::test]
    async fn test_stderr_does_not_affect_result() {
        let (_dir, runner) = sh_runner(
            "echo 'something went sideways' >&2\nexit 0\n",
            "exit 0\n",
            Duration::from_secs(5),
        );

        let output = runner.run(ScriptKind::Control, &[]).await.expect("run failed");
        assert!(output.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_kills_script() {
        let (_dir, runner) = sh_runner("sleep 10\n", "exit 0\n", Duration::from_millis(200));

        let started = Instant::now();
        let result = runner.run(ScriptKind::Control, &[]).await;

        assert!(matches!(result, Err(DispatchError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_spawn_error() {
        let runner = ProcessRunner::new(RunnerConfig {
            interpreter: Some(PathBuf::from("/nonexistent/interpreter")),
            ..Default::default()
        });

        let result = runner.run(ScriptKind::Control, &[]).await;
        assert!(matches!(result, Err(DispatchError::Spawn(_))));
    }
}
