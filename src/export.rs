//! Writing generated images to disk.
//!
//! File names follow `generated-image-<timestamp>.png` for a single save and
//! `generated-image-<index>-<timestamp>.png` for bulk saves, where the
//! timestamp is Unix milliseconds and the index is 1-based over the saved
//! set.

use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, StudioError};
use crate::models::GeneratedArtifact;

/// How many fresh timestamps to try before giving up on a free file name.
const MAX_NAME_ATTEMPTS: usize = 20;

pub fn single_file_name(timestamp_ms: i64) -> String {
    format!("generated-image-{}.png", timestamp_ms)
}

pub fn bulk_file_name(index: usize, timestamp_ms: i64) -> String {
    format!("generated-image-{}-{}.png", index, timestamp_ms)
}

pub async fn save_artifact(dir: &Path, artifact: &GeneratedArtifact) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = write_new(dir, single_file_name, artifact.bytes()).await?;
    log::info!("Saved image to {}", path.display());
    Ok(path)
}

/// Write each artifact in the order given (the pick order of the
/// selection), numbered from 1.
pub async fn save_selected<'a, I>(dir: &Path, artifacts: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = &'a GeneratedArtifact>,
{
    tokio::fs::create_dir_all(dir).await?;
    let mut written = Vec::new();

    for (i, artifact) in artifacts.into_iter().enumerate() {
        let index = i + 1;
        let path = write_new(dir, |ts| bulk_file_name(index, ts), artifact.bytes()).await?;
        written.push(path);
    }

    log::info!("Saved {} selected images to {}", written.len(), dir.display());
    Ok(written)
}

/// Create a file that did not exist before. A name already taken (two saves
/// in the same millisecond) is retried with the next timestamp.
async fn write_new<F>(dir: &Path, name: F, bytes: &[u8]) -> Result<PathBuf>
where
    F: Fn(i64) -> String,
{
    for _ in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(name(Utc::now().timestamp_millis()));
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                file.write_all(bytes).await?;
                file.flush().await?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::debug!("{} exists, retrying", path.display());
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(StudioError::IoError(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("No free file name in {}", dir.display()),
    )))
}
