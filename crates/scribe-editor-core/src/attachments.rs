//! Inline image attachments: paste, upload, place, select, delete, copy.
//!
//! The pipeline never holds the engine across an await. Every task it hands
//! out keeps a [`Weak`] handle and only borrows the engine once the remote
//! call has resolved, so the edit lands on the document as it is at that
//! moment. If the editor was torn down in the meantime the result is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bytes::Bytes;
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use mime_sniffer::MimeTypeSniffer;
use smol_str::SmolStr;
use url::Url;

use crate::config::EditorConfig;
use crate::error::AttachmentError;
use crate::platform::{AttachmentBlob, ClipboardPlatform, ObjectStore};
use crate::sync::DocumentSyncEngine;
use crate::types::NodeId;

const OCTET_STREAM: &str = "application/octet-stream";

/// One item of a paste payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardItem {
    Text(String),
    Binary { mime_type: SmolStr, data: Bytes },
}

/// What the platform handed over on paste.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub items: Vec<ClipboardItem>,
}

impl ClipboardPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.items.push(ClipboardItem::Text(text.into()));
        self
    }

    pub fn with_binary(mut self, mime_type: &str, data: impl Into<Bytes>) -> Self {
        self.items.push(ClipboardItem::Binary {
            mime_type: SmolStr::new(mime_type),
            data: data.into(),
        });
        self
    }

    /// The first item that is an image.
    ///
    /// Binary items with an `image/*` type count, as do untyped or
    /// `application/octet-stream` items whose bytes sniff as an image.
    pub fn first_image(&self) -> Option<AttachmentBlob> {
        self.items.iter().find_map(|item| match item {
            ClipboardItem::Binary { mime_type, data } => {
                image_mime(mime_type, data).map(|mime_type| AttachmentBlob {
                    mime_type,
                    data: data.clone(),
                })
            }
            ClipboardItem::Text(_) => None,
        })
    }
}

fn image_mime(declared: &str, data: &Bytes) -> Option<SmolStr> {
    if declared.starts_with("image/") {
        return Some(SmolStr::new(declared));
    }
    if declared.is_empty() || declared == OCTET_STREAM {
        let sniffed = data.sniff_mime_type()?;
        if sniffed.starts_with("image/") {
            return Some(SmolStr::new(sniffed));
        }
    }
    None
}

/// Keys the pipeline cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorKey {
    Backspace,
    Delete,
    Other(SmolStr),
}

/// Where an uploaded image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The attachment node was inserted.
    Placed { node: NodeId, url: SmolStr },
    /// The upload finished after the editor went away.
    Discarded { url: SmolStr },
}

pub type UploadTask = LocalBoxFuture<'static, Result<Placement, AttachmentError>>;
pub type DeleteTask = LocalBoxFuture<'static, Result<(), AttachmentError>>;
pub type CopyTask = LocalBoxFuture<'static, Result<(), AttachmentError>>;

/// Result of [`MediaAttachmentPipeline::handle_paste`].
pub enum PasteOutcome {
    /// Not an image; let the surface paste normally.
    Default,
    /// The paste was taken over. Suppress default insertion and spawn the task.
    Intercepted(UploadTask),
}

/// Result of [`MediaAttachmentPipeline::handle_key`].
pub enum KeyOutcome {
    Default,
    /// The key removed the selected attachment. The task, if any, deletes the
    /// stored object; its failure is only logged.
    Handled(Option<DeleteTask>),
}

/// Result of [`MediaAttachmentPipeline::handle_copy`].
pub enum CopyOutcome {
    Default,
    Intercepted(CopyTask),
}

impl std::fmt::Debug for PasteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Intercepted(_) => write!(f, "Intercepted(..)"),
        }
    }
}

impl std::fmt::Debug for KeyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Handled(task) => write!(f, "Handled(delete task: {})", task.is_some()),
        }
    }
}

impl std::fmt::Debug for CopyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Intercepted(_) => write!(f, "Intercepted(..)"),
        }
    }
}

/// Derive the in-bucket path from a public attachment URL.
///
/// `https://store/note-images/u1/abc.png` with bucket `note-images` gives
/// `u1/abc.png`. Query and fragment are not part of the path.
pub fn storage_path(url: &str, bucket: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    segments.by_ref().find(|segment| *segment == bucket)?;
    let path = segments.collect::<Vec<_>>().join("/");
    if path.is_empty() { None } else { Some(path) }
}

/// Image attachment pipeline over an object store.
pub struct MediaAttachmentPipeline<S> {
    store: Rc<S>,
    owner_id: SmolStr,
    config: EditorConfig,
}

impl<S> std::fmt::Debug for MediaAttachmentPipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaAttachmentPipeline")
            .field("owner_id", &self.owner_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: ObjectStore + 'static> MediaAttachmentPipeline<S> {
    pub fn new(store: Rc<S>, owner_id: impl Into<SmolStr>, config: EditorConfig) -> Self {
        Self {
            store,
            owner_id: owner_id.into(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &Rc<S> {
        &self.store
    }

    /// Take over an image paste.
    ///
    /// Returns [`PasteOutcome::Default`] when the payload holds no image.
    pub fn handle_paste(
        &self,
        engine: &Rc<RefCell<DocumentSyncEngine>>,
        payload: &ClipboardPayload,
    ) -> PasteOutcome {
        let Some(blob) = payload.first_image() else {
            return PasteOutcome::Default;
        };

        let size = blob.data.len();
        let limit = self.config.max_upload_bytes;
        if size > limit {
            tracing::warn!(target: "scribe::attachments", size, limit, "pasted image over size limit");
            return PasteOutcome::Intercepted(
                async move { Err(AttachmentError::TooLarge { size, limit }) }.boxed_local(),
            );
        }

        tracing::debug!(
            target: "scribe::attachments",
            mime = %blob.mime_type,
            size,
            "intercepted image paste"
        );
        let task = upload_and_place(
            Rc::clone(&self.store),
            self.owner_id.clone(),
            Rc::downgrade(engine),
            blob,
        );
        PasteOutcome::Intercepted(task.boxed_local())
    }

    /// Select an attachment. Anything that is not an attachment on the
    /// surface is refused.
    pub fn select(&self, engine: &Rc<RefCell<DocumentSyncEngine>>, id: NodeId) -> bool {
        let selected = engine.borrow_mut().select_attachment(id);
        if !selected {
            tracing::trace!(target: "scribe::attachments", %id, "not an attachment, selection refused");
        }
        selected
    }

    pub fn clear_selection(&self, engine: &Rc<RefCell<DocumentSyncEngine>>) {
        engine.borrow_mut().clear_attachment_selection();
    }

    /// Delete or Backspace on a selected attachment removes it right away
    /// and hands back the remote delete.
    pub fn handle_key(&self, engine: &Rc<RefCell<DocumentSyncEngine>>, key: &EditorKey) -> KeyOutcome {
        if !matches!(key, EditorKey::Backspace | EditorKey::Delete) {
            return KeyOutcome::Default;
        }
        let Some(selected) = engine.borrow().selected_attachment() else {
            return KeyOutcome::Default;
        };

        let path = storage_path(&selected.url, &self.config.bucket);
        // Local removal first, whatever the store later says.
        engine.borrow_mut().remove_attachment(selected.id);

        let Some(path) = path else {
            let error = AttachmentError::UnknownPath(selected.url.to_string());
            tracing::warn!(target: "scribe::attachments", %error, "removed attachment without deleting stored object");
            return KeyOutcome::Handled(None);
        };

        tracing::debug!(target: "scribe::attachments", id = %selected.id, %path, "attachment removed, deleting stored object");
        let store = Rc::clone(&self.store);
        let task = async move {
            match store.delete(&path).await {
                Ok(()) => Ok(()),
                Err(source) => {
                    let error = AttachmentError::Delete { path, source };
                    tracing::warn!(target: "scribe::attachments", %error, "stored object left behind");
                    Err(error)
                }
            }
        };
        KeyOutcome::Handled(Some(task.boxed_local()))
    }

    /// Copy the selected attachment's image to the clipboard.
    ///
    /// Only taken over when an attachment is selected and no text is
    /// selected; a text selection wins.
    pub fn handle_copy<C: ClipboardPlatform + 'static>(
        &self,
        engine: &Rc<RefCell<DocumentSyncEngine>>,
        clipboard: Rc<C>,
    ) -> CopyOutcome {
        let selected = {
            let engine = engine.borrow();
            if engine.has_text_selection() {
                return CopyOutcome::Default;
            }
            match engine.selected_attachment() {
                Some(selected) => selected,
                None => return CopyOutcome::Default,
            }
        };

        let store = Rc::clone(&self.store);
        let url = selected.url;
        let task = async move {
            let data = store.download(&url).await.map_err(|source| {
                tracing::warn!(target: "scribe::attachments", %url, %source, "image download failed");
                AttachmentError::Download(source)
            })?;
            let mime = data.sniff_mime_type().unwrap_or("image/png").to_string();
            tracing::debug!(target: "scribe::attachments", %url, %mime, size = data.len(), "copying image");
            clipboard.write_image(&mime, data).await.map_err(|source| {
                tracing::warn!(target: "scribe::attachments", %source, "clipboard write failed");
                AttachmentError::Clipboard(source)
            })
        };
        CopyOutcome::Intercepted(task.boxed_local())
    }
}

async fn upload_and_place<S: ObjectStore>(
    store: Rc<S>,
    owner_id: SmolStr,
    engine: Weak<RefCell<DocumentSyncEngine>>,
    blob: AttachmentBlob,
) -> Result<Placement, AttachmentError> {
    let stored = store.upload(blob, &owner_id).await.map_err(|source| {
        tracing::warn!(target: "scribe::attachments", %source, "image upload failed");
        AttachmentError::Upload(source)
    })?;
    let url = SmolStr::new(&stored.url);

    let Some(engine) = engine.upgrade() else {
        tracing::debug!(target: "scribe::attachments", %url, "editor gone, upload result discarded");
        return Ok(Placement::Discarded { url });
    };

    let placed = engine.borrow_mut().insert_attachment(&url);
    match placed {
        Some(node) => {
            tracing::debug!(target: "scribe::attachments", %node, %url, path = %stored.path, "image placed");
            Ok(Placement::Placed { node, url })
        }
        None => Ok(Placement::Discarded { url }),
    }
}
