//! Error types for the editing core.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors reported by a remote object store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The store rejected or failed the request.
    #[error("storage request failed: {0}")]
    Request(String),

    /// The object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Not authenticated with the store.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl From<&str> for StoreError {
    fn from(s: &str) -> Self {
        StoreError::Request(s.to_string())
    }
}

impl From<String> for StoreError {
    fn from(s: String) -> Self {
        StoreError::Request(s)
    }
}

/// Errors from the attachment pipeline.
///
/// Upload failures are user-visible; the `Display` text is the notice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttachmentError {
    /// Uploading a pasted image failed. The document was not changed.
    #[error("image upload failed: {0}")]
    Upload(#[source] StoreError),

    /// The pasted image exceeds the configured size limit.
    #[error("image is too large ({size} bytes, limit {limit})")]
    TooLarge { size: usize, limit: usize },

    /// Deleting the stored object failed. Local removal already happened.
    #[error("failed to delete stored image {path}: {source}")]
    Delete {
        path: String,
        #[source]
        source: StoreError,
    },

    /// Fetching image bytes for the clipboard failed.
    #[error("failed to fetch image: {0}")]
    Download(#[source] StoreError),

    /// Writing the image to the clipboard failed.
    #[error("failed to copy image: {0}")]
    Clipboard(#[source] PlatformError),

    /// The attachment URL does not follow the storage naming convention.
    #[error("attachment url has no storage path: {0}")]
    UnknownPath(String),
}

/// Configuration could not be loaded.
#[derive(Error, Debug)]
#[error("invalid editor config: {0}")]
pub struct ConfigError(#[from] pub serde_json::Error);
