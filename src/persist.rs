//! Whole-file JSON persistence shared by the state store and the cooldown ledger.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum PersistError {
    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Corrupt(#[from] CorruptError),

    #[error("couldn't encode data: {0}")]
    #[event(level = ERROR)]
    Encode(serde_json::Error),
}

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
#[error("couldn't write {path}: {source}")]
#[event(level = ERROR)]
pub struct WriteError {
    path: String,

    #[field(print = Display)]
    source: std::io::Error,
}

impl WriteError {
    fn new(path: &Path, source: std::io::Error) -> Self {
        Self {
            path: path.display().to_string(),
            source,
        }
    }
}

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
#[error("{path} is malformed: {source}")]
#[event(level = ERROR)]
pub struct CorruptError {
    path: String,

    #[field(print = Display)]
    source: serde_json::Error,
}

/// Reads a JSON file.
///
/// A missing or unreadable file yields `None`. A file that is present but doesn't
/// decode is an error, so a broken file never turns into a partial view.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!("no file yet, starting empty");
            return Ok(None);
        }
        Err(err) => {
            warn!(%err, "file could not be read, starting empty");
            return Ok(None);
        }
    };

    let value = serde_json::from_slice(&bytes).map_err(|source| CorruptError {
        path: path.display().to_string(),
        source,
    })?;

    debug!(len = bytes.len(), "loaded");

    Ok(Some(value))
}

/// Writes `value` to a sibling temporary file, syncs it, and renames it over
/// `path`, so a crash mid-write leaves the previous contents intact.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub(crate) async fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), PersistError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(PersistError::Encode)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| WriteError::new(parent, err))?;
    }

    let temp = temp_path(path);
    write_synced(&temp, &bytes)
        .await
        .map_err(|err| WriteError::new(&temp, err))?;
    tokio::fs::rename(&temp, path)
        .await
        .map_err(|err| WriteError::new(path, err))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        // the rename only survives a power loss once the directory is flushed
        if let Err(err) = sync_dir(parent).await {
            warn!(%err, "directory could not be synced");
        }
    }

    debug!(len = bytes.len(), "written");

    Ok(())
}

/// Writes `bytes` and waits until they reach the disk.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn sync_dir(path: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(path).await?.sync_all().await
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
