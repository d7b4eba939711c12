//! Platform abstraction traits for the editing core.
//!
//! These traits define the interface between the editor logic and the
//! outside world: the remote object store attachments live in, and the
//! system clipboard. Hosts implement them; the core never does I/O itself.

use std::future::Future;

use bytes::Bytes;
use smol_str::SmolStr;

use crate::error::StoreError;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Binary payload headed for the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentBlob {
    pub mime_type: SmolStr,
    pub data: Bytes,
}

/// Where the store put an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Public URL, `.../<bucket>/<owner>/<file>`.
    pub url: String,
    /// Path within the bucket, `<owner>/<file>`.
    pub path: String,
}

/// Remote object store holding attachment images.
///
/// Futures are polled on the host's single-threaded executor, so they need
/// not be `Send`.
pub trait ObjectStore {
    /// Upload a blob on behalf of `owner_id`.
    fn upload(
        &self,
        blob: AttachmentBlob,
        owner_id: &str,
    ) -> impl Future<Output = Result<StoredObject, StoreError>>;

    /// Delete the object at `path` (relative to the bucket).
    fn delete(&self, path: &str) -> impl Future<Output = Result<(), StoreError>>;

    /// Fetch the bytes behind a public URL.
    fn download(&self, url: &str) -> impl Future<Output = Result<Bytes, StoreError>>;
}

/// System clipboard access.
pub trait ClipboardPlatform {
    /// Write an image payload.
    fn write_image(
        &self,
        mime_type: &str,
        data: Bytes,
    ) -> impl Future<Output = Result<(), PlatformError>>;
}
