//! Key-value backend storing one file per key.

use crate::backend::{BackendFuture, KvBackend};
use purgatory_types::StoreError;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Longest key accepted as a file name.
const MAX_KEY_LEN: usize = 128;

/// File-based backend. Each entry is a `<key>.json` file in `dir`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend, ensuring the directory exists.
    pub async fn new(dir: PathBuf) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Path for `key`, or `None` if the key cannot safely name a file.
    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        is_valid_key(key).then(|| self.dir.join(format!("{key}.json")))
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl KvBackend for FileBackend {
    fn get<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Option<String>> {
        Box::pin(async move {
            let Some(path) = self.entry_path(key) else {
                tracing::debug!("Rejecting malformed key {key:?} on read");
                return Ok(None);
            };
            match tokio::fs::read_to_string(&path).await {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn put<'a>(&'a self, key: &'a str, value: String) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let path = self.entry_path(key).ok_or_else(|| StoreError::InvalidKey {
                key: key.to_string(),
            })?;
            // Atomic write: .tmp → rename
            let tmp_path = path.with_extension("tmp");
            tokio::fs::write(&tmp_path, value).await?;
            tokio::fs::rename(&tmp_path, &path).await?;
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}
