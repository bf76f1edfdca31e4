use std::path::PathBuf;

use tracing::debug;

#[cfg(windows)]
const SIBLING_CANDIDATES: &[&str] = &["scdl.exe", "scdl.cmd", "scdl"];
#[cfg(not(windows))]
const SIBLING_CANDIDATES: &[&str] = &["scdl"];

/// Work out how to invoke scdl.
///
/// Prefers a binary sitting next to the current executable (the usual layout
/// when both are installed into the same virtualenv-style prefix), then a
/// PATH lookup, then the bare name. Never fails: a missing binary surfaces
/// later as a spawn error with the full context attached.
pub fn resolve_scdl_executable() -> PathBuf {
    if let Ok(current) = std::env::current_exe() {
        if let Some(dir) = current.parent() {
            for name in SIBLING_CANDIDATES {
                let candidate = dir.join(name);
                if candidate.exists() {
                    debug!("using sibling scdl executable: {}", candidate.display());
                    return candidate;
                }
            }
        }
    }

    if let Ok(found) = which::which("scdl") {
        debug!("using scdl from PATH: {}", found.display());
        return found;
    }

    // Last resort: let the spawn attempt report the failure.
    PathBuf::from("scdl")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_always_returns_something() {
        let exec = resolve_scdl_executable();
        assert!(!exec.as_os_str().is_empty());
    }

    #[test]
    fn test_fallback_is_bare_name_or_real_path() {
        let exec = resolve_scdl_executable();
        // Either an existing file was found or we fell back to the bare name.
        assert!(exec.exists() || exec == PathBuf::from("scdl"));
    }
}
