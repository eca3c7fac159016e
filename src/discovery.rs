//! Photo discovery.
//!
//! Lists the input directory (not recursively), keeps files whose extension
//! is configured, and orders them by file name. With the screenshot tool's
//! naming scheme that is capture order.

use std::path::Path;

use reel_core::config::AlbumConfig;
use reel_core::{Error, Result};
use reel_media::Photo;
use tracing::{debug, warn};
use walkdir::WalkDir;

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Discover the album's photos in lexicographic file-name order.
///
/// Photos whose file name cannot produce a fingerprint are skipped with a
/// warning. A missing or unreadable input directory is fatal.
pub fn discover_photos(input: &Path, album: &AlbumConfig) -> Result<Vec<Photo>> {
    let meta = std::fs::metadata(input).map_err(|e| Error::filesystem(input, e))?;
    if !meta.is_dir() {
        return Err(Error::Validation(format!(
            "input {} is not a directory",
            input.display()
        )));
    }

    let mut photos = Vec::new();

    for entry in WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(input).to_path_buf();
            match e.into_io_error() {
                Some(io) => Error::filesystem(path, io),
                None => Error::Internal(format!("walking {}", path.display())),
            }
        })?;

        let path = entry.path();
        if !entry.file_type().is_file() || !has_extension(path, &album.extensions) {
            continue;
        }

        match Photo::new(path, &album.fingerprint) {
            Ok(photo) => photos.push(photo),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping photo"),
        }
    }

    debug!(count = photos.len(), input = %input.display(), "photos discovered");
    Ok(photos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn album() -> AlbumConfig {
        AlbumConfig::default()
    }

    #[test]
    fn lists_png_files_in_name_order() {
        let dir = tempdir().unwrap();
        for name in [
            "VRChat_1920x1080_2024-01-02_00-00-00.000.png",
            "VRChat_1920x1080_2024-01-01_00-00-00.000.png",
            "VRChat_1920x1080_2024-01-03_00-00-00.000.PNG",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("sub.png")).unwrap();

        let photos = discover_photos(dir.path(), &album()).unwrap();
        let fps: Vec<&str> = photos.iter().map(|p| p.fingerprint().as_str()).collect();
        assert_eq!(
            fps,
            vec![
                "2024-01-01_00-00-00.000",
                "2024-01-02_00-00-00.000",
                "2024-01-03_00-00-00.000",
            ]
        );
    }

    #[test]
    fn does_not_recurse() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/a.png"), b"").unwrap();
        assert!(discover_photos(dir.path(), &album()).unwrap().is_empty());
    }

    #[test]
    fn skips_unusable_fingerprints() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("VRChat_1920x1080_2024,01.png"), b"").unwrap();
        fs::write(dir.path().join("VRChat_1920x1080_2024-01.png"), b"").unwrap();
        let photos = discover_photos(dir.path(), &album()).unwrap();
        assert_eq!(photos.len(), 1);
    }

    #[test]
    fn missing_input_is_filesystem_error() {
        let dir = tempdir().unwrap();
        let err = discover_photos(&dir.path().join("missing"), &album()).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }

    #[test]
    fn file_input_is_validation_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.png");
        fs::write(&file, b"").unwrap();
        assert!(matches!(
            discover_photos(&file, &album()),
            Err(Error::Validation(_))
        ));
    }
}
