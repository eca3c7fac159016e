//! Output directory layout and all-or-nothing file replacement.

use std::io::Write;
use std::path::{Path, PathBuf};

use reel_core::{Error, Result};
use tempfile::NamedTempFile;

/// Where every artifact of an album build lives.
///
/// ```text
/// <output>/png/img-<seg>_<frame>.png     rendered frames
/// <output>/png/<prefix>.index            resume cache
/// <output>/png/<prefix>.freshness        freshness token
/// <output>/video/video-<seg>_<n>.ts      media units
/// <output>/video/<prefix>.m3u8           full manifest
/// <output>/video/<prefix>_<block>.m3u8   block playlists
/// ```
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    prefix: String,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("png")
    }

    pub fn media_dir(&self) -> PathBuf {
        self.root.join("video")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.media_dir().join(format!("{}.m3u8", self.prefix))
    }

    pub fn block_path(&self, file_name: &str) -> PathBuf {
        self.media_dir().join(file_name)
    }

    pub fn resume_cache_path(&self) -> PathBuf {
        self.frames_dir().join(format!("{}.index", self.prefix))
    }

    pub fn freshness_path(&self) -> PathBuf {
        self.frames_dir().join(format!("{}.freshness", self.prefix))
    }

    /// Create the frame and media directories.
    pub fn create_dirs(&self) -> Result<()> {
        for dir in [self.frames_dir(), self.media_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| Error::filesystem(&dir, e))?;
        }
        Ok(())
    }
}

/// A set of file replacements and removals applied together.
///
/// Every file is written and synced to a temp file next to its target while
/// staging, so a full disk or an unwritable target fails before anything is
/// committed. [`commit`](Self::commit) then removes the staged paths and
/// renames the temp files into place in staging order; stage the files the
/// next run trusts last. Dropping an uncommitted set deletes its temp files.
#[derive(Debug, Default)]
pub struct StagedWrites {
    files: Vec<(NamedTempFile, PathBuf)>,
    removals: Vec<PathBuf>,
}

impl StagedWrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `contents` as the new `path`.
    pub fn write(&mut self, path: impl Into<PathBuf>, contents: &[u8]) -> Result<()> {
        let path = path.into();
        reject_directory(&path)?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::filesystem(dir, e))?;
        tmp.write_all(contents)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| Error::filesystem(tmp.path(), e))?;

        self.files.push((tmp, path));
        Ok(())
    }

    /// Stage the removal of `path`. A path that is gone by commit time is
    /// fine.
    pub fn remove(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        reject_directory(&path)?;
        self.removals.push(path);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.removals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply the removals, then rename every staged file into place.
    pub fn commit(self) -> Result<()> {
        for path in &self.removals {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::filesystem(path, e)),
            }
        }

        for (tmp, path) in self.files {
            tmp.persist(&path)
                .map_err(|e| Error::filesystem(&path, e.error))?;
        }
        Ok(())
    }
}

fn reject_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(Error::filesystem(
            path,
            std::io::Error::new(std::io::ErrorKind::Other, "is a directory"),
        ));
    }
    Ok(())
}
