mod collect;
mod error;
mod locate;
mod runner;

pub use error::DownloadError;
pub use runner::{ProcessOutput, ProcessRunner, TokioRunner};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Audio format requested by the client. `Original` leaves the choice to
/// scdl (useful for Go+ content, which needs an auth token anyway).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Opus,
    Original,
}

/// Per-invocation tuning. The format flags are mutually exclusive;
/// `only_mp3` wins if both are set, matching scdl's own precedence.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub only_mp3: bool,
    pub prefer_opus: bool,
    pub extra_args: Vec<String>,
}

impl From<AudioFormat> for DownloadOptions {
    fn from(format: AudioFormat) -> Self {
        Self {
            only_mp3: format == AudioFormat::Mp3,
            prefer_opus: format == AudioFormat::Opus,
            extra_args: Vec::new(),
        }
    }
}

/// Wrapper around the scdl CLI: creates an isolated workspace per
/// invocation, runs the tool, and returns the audio files it produced.
pub struct ScdlClient {
    runner: Arc<dyn ProcessRunner>,
    auth_token: Option<String>,
    timeout: Duration,
}

impl ScdlClient {
    pub fn new(auth_token: Option<String>, timeout: Duration) -> Self {
        Self::with_runner(Arc::new(TokioRunner), auth_token, timeout)
    }

    /// Construct with an injected runner. Used by tests to avoid spawning
    /// real subprocesses.
    pub fn with_runner(
        runner: Arc<dyn ProcessRunner>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            auth_token,
            timeout,
        }
    }

    /// Download `url` into a fresh workspace under `parent` and return the
    /// audio files scdl produced there.
    ///
    /// The workspace (`scdl_<uuid>`) isolates this invocation's artifacts --
    /// covers, text sidecars, logs -- from anything else under `parent`.
    pub async fn download(
        &self,
        url: &str,
        parent: &Path,
        options: &DownloadOptions,
    ) -> Result<Vec<PathBuf>, DownloadError> {
        tokio::fs::create_dir_all(parent).await?;
        let workspace = parent.join(format!("scdl_{}", Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&workspace).await?;

        let program = locate::resolve_scdl_executable();
        let args = build_args(url, &workspace, options, self.auth_token.as_deref());

        // scdl also reads the token from its environment; forward ours if
        // the variable is not already set for the whole process.
        let mut extra_env = Vec::new();
        if let Some(token) = &self.auth_token {
            if std::env::var_os("SCDL_AUTH_TOKEN").is_none() {
                extra_env.push(("SCDL_AUTH_TOKEN".to_string(), token.clone()));
            }
        }

        info!("invoking scdl for {}", url);
        let out = self
            .runner
            .run(&program, &args, &extra_env, self.timeout)
            .await?;

        if !out.success() {
            warn!(
                "scdl exited with {:?} for {}",
                out.exit_code, url
            );
            return Err(DownloadError::ProcessFailed {
                code: out.exit_code.unwrap_or(-1),
                output: out.output,
            });
        }

        let files = collect::collect_audio_files(&workspace)?;
        if files.is_empty() {
            // scdl exits 0 when it skips already-downloaded or unsupported
            // content; the caller still has nothing to serve.
            return Err(DownloadError::NoAudioProduced);
        }

        info!("scdl produced {} audio file(s) for {}", files.len(), url);
        Ok(files)
    }
}

fn build_args(
    url: &str,
    workspace: &Path,
    options: &DownloadOptions,
    auth_token: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        "-l".to_string(),
        url.to_string(),
        "--path".to_string(),
        workspace.display().to_string(),
        "--hide-progress".to_string(),
    ];

    if options.prefer_opus && !options.only_mp3 {
        args.push("--opus".to_string());
    } else if options.only_mp3 {
        args.push("--onlymp3".to_string());
    }

    args.extend(options.extra_args.iter().cloned());

    if let Some(token) = auth_token {
        args.push("--auth-token".to_string());
        args.push(token.to_string());
    }

    args
}
