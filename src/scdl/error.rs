use thiserror::Error;

/// Everything that can go wrong between "we have a URL" and "we have audio
/// files on disk". Handlers map all of these to a client error; the
/// variants exist so tests and logs can tell the failure modes apart.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to launch {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scdl timed out after {0} seconds")]
    Timeout(u64),

    #[error("scdl failed (code {code}):\n{output}")]
    ProcessFailed { code: i32, output: String },

    #[error("no audio files were produced by scdl for the given URL")]
    NoAudioProduced,

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}
