//! scribe-editor-core: rich note editing logic without framework dependencies.
//!
//! This crate provides:
//! - `DocumentSyncEngine` - cursor-preserving sync between a caller-owned value and the surface
//! - `Surface` - node model (text, line breaks, image attachments) with stable node ids
//! - `MediaAttachmentPipeline` - paste, upload, select, delete and copy of inline images
//! - `ActiveFieldRouter` - routes dictated text to the title or the body
//! - `EditorAction` - platform-agnostic editing operations
//! - `ObjectStore`, `ClipboardPlatform` - traits hosts implement for I/O

pub mod actions;
pub mod attachments;
pub mod config;
pub mod error;
pub mod markup;
pub mod platform;
pub mod router;
pub mod surface;
pub mod sync;
pub mod types;

pub use actions::{EditorAction, execute_action};
pub use attachments::{
    ClipboardItem, ClipboardPayload, CopyOutcome, CopyTask, DeleteTask, EditorKey, KeyOutcome,
    MediaAttachmentPipeline, PasteOutcome, Placement, UploadTask, storage_path,
};
pub use config::{DEFAULT_BUCKET, DEFAULT_MAX_UPLOAD_BYTES, EditorConfig};
pub use error::{AttachmentError, ConfigError, StoreError};
pub use platform::{AttachmentBlob, ClipboardPlatform, ObjectStore, PlatformError, StoredObject};
pub use router::{ActiveField, ActiveFieldRouter, FocusSignal, RoutedTranscript};
pub use smol_str::SmolStr;
pub use surface::Surface;
pub use sync::{ChangeCallback, DocumentSyncEngine, RenderOutcome};
pub use types::{AttachmentRef, NodeContent, NodeId, Position, SurfaceNode, SurfaceSelection};
