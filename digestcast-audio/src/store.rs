//! Date-keyed audio artifacts on disk
//!
//! The filesystem is the only record of what has been generated; nothing
//! here caches existence.

use crate::error::AudioError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Audio artifact extension
pub const AUDIO_EXTENSION: &str = "mp3";

/// Directory of `<YYYY-MM-DD>.mp3` files
#[derive(Debug, Clone)]
pub struct AudioStore {
    directory: PathBuf,
}

impl AudioStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the artifact for a `YYYY-MM-DD` date
    pub fn path_for(&self, date: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", date, AUDIO_EXTENSION))
    }

    /// Whether the artifact for `date` is present; unreadable paths count as absent
    pub fn exists(&self, date: &str) -> bool {
        fs::metadata(self.path_for(date))
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    pub fn file_size(&self, date: &str) -> Option<u64> {
        fs::metadata(self.path_for(date))
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
    }

    /// Remove the artifact for `date`. Returns `false` if there was nothing to remove.
    pub fn delete(&self, date: &str) -> Result<bool, AudioError> {
        let path = self.path_for(date);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted audio file: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AudioError::storage(path, e)),
        }
    }
}

/// Directory a file at `path` lives in; bare file names resolve to `.`
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Stage `bytes` in a temporary sibling of `target`, then rename it into place.
///
/// Replaces any existing file at `target`. On failure the staged file is
/// removed and `target` is left as it was.
pub(crate) fn write_atomically(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut staged = tempfile::Builder::new()
        .prefix(".audio-")
        .suffix(".part")
        .tempfile_in(parent_dir(target))?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}
