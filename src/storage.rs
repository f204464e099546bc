use async_trait::async_trait;
use baladiya_core::validate::RESERVED_CHARS;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use relative_path::{Component, RelativePath, RelativePathBuf};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Where uploads land. Each variant is a directory under the storage root.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Prefix {
    PageBlocks,
    Pages,
    News,
}

impl Prefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prefix::PageBlocks => "page-blocks",
            Prefix::Pages => "pages",
            Prefix::News => "news_images",
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on `{0}`")]
    Io(String, #[source] std::io::Error),
    #[error("path `{0}` points outside of the storage root")]
    OutsideRoot(String),
}

/// File storage. Paths handed out are relative to the store and are the only
/// thing the database keeps.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, prefix: Prefix, file_name: &str, data: Bytes) -> Result<String, StorageError>;

    /// Deleting a missing file is not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

pub fn hash_file(file: impl AsRef<[u8]>) -> u64 {
    seahash::hash(file.as_ref())
}

/// `<base64 content hash>_<cleaned original name>`, so the same upload twice
/// lands on the same path.
pub fn new_filename(file: impl AsRef<[u8]>, filename: &str) -> (u64, String) {
    let hash = hash_file(file);
    let encoded = URL_SAFE_NO_PAD.encode(hash.to_le_bytes());
    (hash, format!("{encoded}_{}", clean_filename(filename)))
}

fn clean_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_control() || c.is_whitespace() || RESERVED_CHARS.contains(&c) {
                '-'
            } else {
                c
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn checked_relative(path: &str) -> Result<RelativePathBuf, StorageError> {
    let normalized = RelativePath::new(path.trim_start_matches('/')).normalize();
    let escapes = normalized
        .components()
        .next()
        .map_or(true, |c| c == Component::ParentDir);
    if escapes {
        return Err(StorageError::OutsideRoot(path.to_string()));
    }
    Ok(normalized)
}

/// Best-effort removal. A failed delete is logged and otherwise ignored.
pub async fn discard(blobs: &dyn BlobStore, path: &str) {
    if let Err(why) = blobs.delete(path).await {
        warn!(path, error = %why, "could not delete stored file");
    }
}

#[derive(Clone, Debug)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn absolute(&self, path: &str) -> Result<PathBuf, StorageError> {
        Ok(checked_relative(path)?.to_path(&self.root))
    }
}

#[async_trait]
impl BlobStore for DiskStore {
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn put(&self, prefix: Prefix, file_name: &str, data: Bytes) -> Result<String, StorageError> {
        let (_, name) = new_filename(&data, file_name);
        let relative = checked_relative(&format!("{}/{name}", prefix.as_str()))?;
        let target = relative.to_path(&self.root);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|why| StorageError::Io(relative.to_string(), why))?;
        }
        tokio::fs::write(&target, &data)
            .await
            .map_err(|why| StorageError::Io(relative.to_string(), why))?;

        debug!(path = %relative, "stored file");
        Ok(relative.to_string())
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let target = self.absolute(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(why) if why.kind() == ErrorKind::NotFound => Ok(()),
            Err(why) => Err(StorageError::Io(path.to_string(), why)),
        }
    }
}
