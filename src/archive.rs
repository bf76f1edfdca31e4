use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write a zip of everything under `src_dir` to `dest`. Entry paths are
/// relative to `src_dir`, so its immediate children become the archive's
/// top-level entries. Directory entries are emitted too, keeping empty
/// directories intact.
pub fn zip_directory(src_dir: &Path, dest: &Path) -> Result<()> {
    let file = File::create(dest)
        .with_context(|| format!("failed to create archive at {}", dest.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for entry in WalkDir::new(src_dir) {
        let entry = entry.context("failed to walk download tree")?;
        let path = entry.path();
        if path == src_dir {
            continue;
        }
        let relative = path
            .strip_prefix(src_dir)
            .context("entry escaped the download tree")?;
        // Zip entry names always use forward slashes.
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(&name, options)
                .with_context(|| format!("failed to add directory {name}"))?;
        } else if entry.file_type().is_file() {
            zip.start_file(&name, options)
                .with_context(|| format!("failed to add file {name}"))?;
            let mut source = File::open(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            io::copy(&mut source, &mut zip)
                .with_context(|| format!("failed to write {name}"))?;
        }
    }

    zip.finish().context("failed to finalize archive")?.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Read;

    #[test]
    fn test_subdirectories_become_top_level_entries() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("downloads");
        let item_1 = src.join("item_001");
        let item_2 = src.join("item_002");
        std::fs::create_dir_all(&item_1).unwrap();
        std::fs::create_dir_all(&item_2).unwrap();
        std::fs::write(item_1.join("a.mp3"), b"first").unwrap();
        std::fs::write(item_2.join("b.mp3"), b"second").unwrap();

        let dest = dir.path().join("bundle.zip");
        zip_directory(&src, &dest).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let names: HashSet<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains("item_001/a.mp3"));
        assert!(names.contains("item_002/b.mp3"));
    }

    #[test]
    fn test_file_contents_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("downloads");
        std::fs::create_dir_all(src.join("item_001")).unwrap();
        std::fs::write(src.join("item_001").join("track.mp3"), b"audio-bytes").unwrap();

        let dest = dir.path().join("bundle.zip");
        zip_directory(&src, &dest).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut entry = archive.by_name("item_001/track.mp3").unwrap();
        let mut body = Vec::new();
        entry.read_to_end(&mut body).unwrap();
        assert_eq!(body, b"audio-bytes");
    }

    #[test]
    fn test_empty_directories_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("downloads");
        std::fs::create_dir_all(src.join("item_001")).unwrap();

        let dest = dir.path().join("bundle.zip");
        zip_directory(&src, &dest).unwrap();

        let archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
    }
}
