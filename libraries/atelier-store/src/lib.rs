//! Atelier - Object Store Adapter
//!
//! Wraps an opaque binary object store keyed by filename. Objects are
//! immutable once written: a fresh key is minted per upload and readers may
//! cache aggressively.
//!
//! This crate provides:
//! - The [`ObjectStore`] trait: `head`, `read`, `read_range`, `put`, `delete`
//! - [`FsObjectStore`]: a flat-keyspace filesystem implementation
//! - Content-type resolution for stored objects with generic/absent types
//!
//! Range reads are byte-exact: `read_range(key, offset, length)` yields
//! exactly `length` bytes starting at `offset` (the caller validates the
//! window against [`ObjectMeta::size`] first).

mod error;
mod fs;
mod key;
pub mod media_type;
mod store;

pub use error::{Result, StoreError};
pub use fs::FsObjectStore;
pub use media_type::resolve_content_type;
pub use key::ObjectKey;
pub use store::{ByteStream, ObjectMeta, ObjectStore};
