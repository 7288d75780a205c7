//! Filesystem-backed object store
//!
//! Layout under the base path:
//!
//! ```text
//! objects/<key>        # raw object bytes
//! meta/<key>.json      # sidecar: content type recorded at upload
//! ```
//!
//! The keyspace is flat and keys are validated ([`ObjectKey`]), so no path
//! inside the base directory can escape it. The etag is derived from size +
//! mtime; objects are never rewritten in place, so it is stable for the
//! lifetime of the key.

use crate::error::{Result, StoreError};
use crate::key::ObjectKey;
use crate::store::{ByteStream, ObjectMeta, ObjectStore};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Sidecar metadata stored next to each object
#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    content_type: Option<String>,
}

/// Local filesystem object store
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    base_path: PathBuf,
}

impl FsObjectStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Create the storage directories
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(self.base_path.join("objects")).await?;
        fs::create_dir_all(self.base_path.join("meta")).await?;
        Ok(())
    }

    fn object_path(&self, key: &ObjectKey) -> PathBuf {
        self.base_path.join("objects").join(key.as_str())
    }

    fn sidecar_path(&self, key: &ObjectKey) -> PathBuf {
        self.base_path
            .join("meta")
            .join(format!("{}.json", key.as_str()))
    }

    async fn read_sidecar(&self, key: &ObjectKey) -> Result<Option<String>> {
        let raw = match fs::read(self.sidecar_path(key)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let sidecar: Sidecar =
            serde_json::from_slice(&raw).map_err(|e| StoreError::Metadata {
                key: key.as_str().to_string(),
                message: e.to_string(),
            })?;
        Ok(sidecar.content_type)
    }

    /// Size + mtime validator, hex pair. Stable because objects are
    /// write-once.
    fn etag_for(metadata: &std::fs::Metadata) -> String {
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());
        format!("\"{:x}-{:x}\"", metadata.len(), mtime)
    }

    async fn remove_if_exists(path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn head(&self, key: &ObjectKey) -> Result<Option<ObjectMeta>> {
        let metadata = match fs::metadata(self.object_path(key)).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let content_type = self.read_sidecar(key).await?;

        Ok(Some(ObjectMeta {
            size: metadata.len(),
            content_type,
            etag: Self::etag_for(&metadata),
        }))
    }

    async fn read(&self, key: &ObjectKey) -> Result<ByteStream> {
        let file = fs::File::open(self.object_path(key)).await?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn read_range(&self, key: &ObjectKey, offset: u64, length: u64) -> Result<ByteStream> {
        let mut file = fs::File::open(self.object_path(key)).await?;
        file.seek(SeekFrom::Start(offset)).await?;
        Ok(Box::pin(ReaderStream::new(file.take(length))))
    }

    async fn put(&self, key: &ObjectKey, content_type: Option<&str>, data: Bytes) -> Result<()> {
        let object_path = self.object_path(key);
        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&object_path, &data).await?;

        let sidecar = Sidecar {
            content_type: content_type.map(str::to_string),
        };
        let raw = serde_json::to_vec(&sidecar).map_err(|e| StoreError::Metadata {
            key: key.as_str().to_string(),
            message: e.to_string(),
        })?;
        let sidecar_path = self.sidecar_path(key);
        if let Some(parent) = sidecar_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&sidecar_path, raw).await?;

        tracing::debug!(key = %key, size = data.len(), "stored object");
        Ok(())
    }

    async fn delete(&self, key: &ObjectKey) -> Result<()> {
        Self::remove_if_exists(&self.object_path(key)).await?;
        Self::remove_if_exists(&self.sidecar_path(key)).await?;
        tracing::debug!(key = %key, "deleted object");
        Ok(())
    }
}
