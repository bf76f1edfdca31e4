use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

/// Create a uniquely named directory under the system temp dir and return
/// its path. The caller owns the tree and is responsible for deleting it.
pub fn fresh_temp_root(prefix: &str) -> std::io::Result<PathBuf> {
    let root = std::env::temp_dir().join(format!("{prefix}{}", Uuid::new_v4().simple()));
    std::fs::create_dir_all(&root)?;
    Ok(root)
}

/// Best-effort recursive delete. Failures are logged and swallowed: a
/// half-removed temp tree must never turn into a client-facing error.
pub fn cleanup_directory(path: &Path) {
    if !path.exists() {
        return;
    }
    match std::fs::remove_dir_all(path) {
        Ok(()) => debug!("removed temp directory {}", path.display()),
        Err(err) => warn!("failed to remove {}: {}", path.display(), err),
    }
}

/// Drop guard that deletes a directory tree when it goes out of scope.
///
/// Handlers move one of these into the response body stream, so the temp
/// root survives exactly until the body has been fully sent (or the client
/// has gone away) and is then removed.
pub struct DirCleanup(PathBuf);

impl DirCleanup {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }
}

impl Drop for DirCleanup {
    fn drop(&mut self) {
        cleanup_directory(&self.0);
    }
}
