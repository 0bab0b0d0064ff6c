use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// A JSON-file-backed collection of records.
///
/// The whole collection lives in memory behind a `RwLock`; every
/// mutation is written back to disk before the write guard is released,
/// so concurrent requests cannot interleave partial writes. Files are
/// replaced via a temp file + rename so a crash mid-write cannot leave
/// a truncated collection behind.
pub struct JsonCollection<T> {
    path: PathBuf,
    items: RwLock<Vec<T>>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Loads the collection from `path`. A missing file yields an empty
    /// collection; a present but unreadable file is an error.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let items = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Failed to parse collection file: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read collection file: {}", path.display()));
            }
        };

        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    /// Runs a read-only closure against the current records.
    pub async fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let guard = self.items.read().await;
        f(&guard)
    }

    /// Runs a mutating closure and persists the result before releasing
    /// the write lock.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R> {
        let mut guard = self.items.write().await;
        let out = f(&mut guard);
        self.persist(&guard).await?;
        Ok(out)
    }

    async fn persist(&self, items: &[T]) -> Result<()> {
        let json = serde_json::to_vec_pretty(items).context("Failed to serialize collection")?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("Failed to write collection file: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace collection file: {}", self.path.display()))
    }
}
