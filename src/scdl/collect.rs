use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File extensions scdl is known to produce for audio content. Everything
/// else in a workspace (covers, playlist text files, logs) is ignored.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "opus", "flac", "wav", "ogg"];

/// Recursively collect every regular file under `dir` whose extension
/// matches the audio allow-list, case-insensitively. Order is whatever the
/// directory walk yields; callers wanting "most recent first" sort by
/// modification time themselves.
pub fn collect_audio_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_audio = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                AUDIO_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false);
        if is_audio {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_collects_only_audio_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("track.mp3"));
        touch(&dir.path().join("cover.jpg"));
        touch(&dir.path().join("playlist.txt"));
        touch(&dir.path().join("song.flac"));

        let mut files = collect_audio_files(dir.path()).unwrap();
        files.sort();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["song.flac", "track.mp3"]);
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Track.MP3"));
        touch(&dir.path().join("b-side.Opus"));
        touch(&dir.path().join("cover.JPG"));

        let files = collect_audio_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_recurses_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("artist").join("album");
        fs::create_dir_all(&nested).unwrap();
        touch(&nested.join("deep.ogg"));
        touch(&dir.path().join("top.wav"));

        let files = collect_audio_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_idempotent_over_unmodified_tree() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.mp3"));
        touch(&dir.path().join("b.m4a"));

        let mut first = collect_audio_files(dir.path()).unwrap();
        let mut second = collect_audio_files(dir.path()).unwrap();
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }

    #[test]
    fn test_files_without_extension_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("README"));
        let files = collect_audio_files(dir.path()).unwrap();
        assert!(files.is_empty());
    }
}
