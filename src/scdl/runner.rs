use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::error::DownloadError;

/// Result of one external-process run: the exit code (if the process
/// terminated normally) and its combined stdout/stderr text.
#[derive(Debug)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub output: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Narrow seam around subprocess execution so tests can substitute a fake
/// runner instead of spawning real processes.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        extra_env: &[(String, String)],
        timeout: Duration,
    ) -> Result<ProcessOutput, DownloadError>;
}

/// Production runner backed by `tokio::process::Command`.
pub struct TokioRunner;

#[async_trait]
impl ProcessRunner for TokioRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        extra_env: &[(String, String)],
        timeout: Duration,
    ) -> Result<ProcessOutput, DownloadError> {
        debug!("running {} {:?}", program.display(), args);

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // If the timeout fires we drop the wait future; make sure the
            // child does not keep downloading in the background.
            .kill_on_drop(true);
        for (key, value) in extra_env {
            command.env(key, value);
        }

        let child = command.spawn().map_err(|source| DownloadError::SpawnFailed {
            program: program.display().to_string(),
            source,
        })?;

        let waited = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| DownloadError::Timeout(timeout.as_secs()))?;
        let out = waited.map_err(DownloadError::Io)?;

        let mut combined = String::from_utf8_lossy(&out.stdout).into_owned();
        if !out.stderr.is_empty() {
            combined.push_str(&String::from_utf8_lossy(&out.stderr));
        }

        Ok(ProcessOutput {
            exit_code: out.status.code(),
            output: combined,
        })
    }
}
