use crate::utils::error::{Result, ThumbnailError};
use std::fs::{self, File};
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// A base image path owned by one workflow invocation. The file, if any, is
/// removed when the guard is dropped.
#[derive(Debug)]
pub struct TempImage {
    path: PathBuf,
}

impl TempImage {
    pub fn new_in(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("thumbnail_base_{}.png", Uuid::new_v4().simple())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temporary image {}: {}", self.path.display(), e);
            }
        }
    }
}

pub fn save_file(path: &Path, filedata: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| write_failed(path, e))?;
    file.write_all(filedata).map_err(|e| write_failed(path, e))?;
    Ok(())
}

/// Writes `filedata` next to `path` and renames it into place, so `path`
/// either holds the complete content or does not exist.
pub fn atomic_save_file(path: &Path, filedata: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ThumbnailError::WriteFailed(format!("invalid path {}", path.display())))?;
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let written = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(filedata)?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&temp_path, path));

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(write_failed(path, e));
    }
    Ok(())
}

fn write_failed(path: &Path, e: std::io::Error) -> ThumbnailError {
    ThumbnailError::WriteFailed(format!("{}: {}", path.display(), e))
}
