//! The object store trait and its data types

use crate::error::Result;
use crate::key::ObjectKey;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Streaming object body (chunks of bytes, IO errors surface per-chunk)
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + 'static>>;

/// Metadata for a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object size in bytes
    pub size: u64,

    /// Content type recorded at upload, if any (may be generic)
    pub content_type: Option<String>,

    /// Strong-enough validator for caching; stable while the object exists
    pub etag: String,
}

/// Random-access object store keyed by filename
///
/// Objects are immutable once written. Concurrent reads of the same key are
/// safe; `delete` of an absent key is not an error.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Look up object metadata. `Ok(None)` when the key does not exist.
    async fn head(&self, key: &ObjectKey) -> Result<Option<ObjectMeta>>;

    /// Stream the full object body.
    async fn read(&self, key: &ObjectKey) -> Result<ByteStream>;

    /// Stream exactly `length` bytes starting at `offset`.
    ///
    /// The caller validates the window against the object size; reading past
    /// the end yields a short stream.
    async fn read_range(&self, key: &ObjectKey, offset: u64, length: u64) -> Result<ByteStream>;

    /// Write a new object. Keys are minted per upload; overwriting an
    /// existing key is not part of the upload flow.
    async fn put(&self, key: &ObjectKey, content_type: Option<&str>, data: Bytes) -> Result<()>;

    /// Remove an object. Idempotent: deleting an absent key succeeds.
    async fn delete(&self, key: &ObjectKey) -> Result<()>;
}
