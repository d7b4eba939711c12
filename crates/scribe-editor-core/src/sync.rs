//! Two-way synchronization between the caller's canonical value and the live
//! surface.
//!
//! The engine never owns the truth. It keeps the last value it rendered or
//! emitted so redundant re-renders from the caller are no-ops: rewriting the
//! surface with identical content would still throw away the user's cursor.
//!
//! Every mutation made through the engine (typing, dictation, attachments)
//! emits the whole serialized surface through the change callback.

use std::ops::Range;

use smol_str::SmolStr;

use crate::actions::{EditorAction, execute_action};
use crate::markup;
use crate::router::{ActiveField, FocusSignal};
use crate::surface::Surface;
use crate::types::{AttachmentRef, NodeContent, NodeId, Position, SurfaceNode, SurfaceSelection};

/// Receives the full canonical value after every mutation.
///
/// The callback must not call back into the engine; hosts typically store
/// the value and schedule a re-render.
pub type ChangeCallback = Box<dyn FnMut(&str)>;

/// Result of [`DocumentSyncEngine::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The value matched what is already on the surface. Nothing was touched.
    Unchanged,
    /// The surface was rewritten.
    Rewritten {
        /// Whether the cursor landed back in its old container.
        cursor_restored: bool,
    },
}

/// Cursor-preserving synchronization engine for one editable surface.
pub struct DocumentSyncEngine {
    surface: Surface,
    selection: Option<SurfaceSelection>,
    selected_attachment: Option<NodeId>,
    last_rendered: String,
    focused: bool,
    on_change: ChangeCallback,
}

impl std::fmt::Debug for DocumentSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSyncEngine")
            .field("surface", &self.surface)
            .field("selection", &self.selection)
            .field("selected_attachment", &self.selected_attachment)
            .field("last_rendered", &self.last_rendered)
            .field("focused", &self.focused)
            .finish()
    }
}

impl DocumentSyncEngine {
    /// Mount the engine with the caller's initial value.
    pub fn new(value: &str, on_change: impl FnMut(&str) + 'static) -> Self {
        Self {
            surface: Surface::from_markup(value),
            selection: None,
            selected_attachment: None,
            last_rendered: value.to_string(),
            focused: false,
            on_change: Box::new(on_change),
        }
    }

    /// Bring the surface in line with the caller's value.
    ///
    /// A value equal to the last rendered or emitted one is a no-op. Otherwise
    /// the surface is rewritten and the cursor is put back into the container
    /// it was in, clamped to that container's new length. If the container did
    /// not survive the rewrite the selection is dropped.
    pub fn render(&mut self, next: &str) -> RenderOutcome {
        if next == self.last_rendered {
            tracing::trace!(target: "scribe::sync", "render skipped, value unchanged");
            return RenderOutcome::Unchanged;
        }

        let captured = self.selection.map(|sel| sel.focus);
        self.surface.reconcile(markup::parse(next));
        self.last_rendered = next.to_string();

        if let Some(id) = self.selected_attachment
            && self.attachment_url(id).is_none()
        {
            self.selected_attachment = None;
        }

        let cursor_restored = match captured {
            Some(pos) => match self.surface.node(pos.node) {
                Some(node) => {
                    let offset = pos.offset.min(node.max_offset());
                    self.selection = Some(SurfaceSelection::collapsed(Position::new(pos.node, offset)));
                    tracing::trace!(
                        target: "scribe::sync",
                        node = %pos.node,
                        offset,
                        "cursor restored after render"
                    );
                    true
                }
                None => {
                    tracing::trace!(target: "scribe::sync", node = %pos.node, "cursor container gone after render");
                    self.selection = None;
                    false
                }
            },
            None => false,
        };

        RenderOutcome::Rewritten { cursor_restored }
    }

    /// Insert text at the live selection.
    ///
    /// With a selection, its contents are replaced and the cursor collapses
    /// right after the inserted text. Without one, the text is appended at the
    /// end of the document. Works the same whether or not the surface has
    /// focus, so non-UI sources like dictation can call it.
    pub fn insert_at_cursor(&mut self, text: &str) -> bool {
        self.insert_at(self.selection, text)
    }

    /// Insert text at an explicit selection (see [`Self::insert_at_cursor`]).
    ///
    /// Newlines in `text` become line breaks. Returns false for empty text.
    pub fn insert_at(&mut self, selection: Option<SurfaceSelection>, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.clear_attachment_selection();
        let contents = markup::text_to_contents(text);
        match selection.and_then(|sel| self.selection_range(sel)) {
            Some(range) => {
                let end = self.replace_range(range, contents);
                self.set_cursor_offset(end);
            }
            None => {
                if selection.is_some() {
                    tracing::debug!(target: "scribe::sync", "selection not on surface, appending");
                }
                let before = self.selection_anchor_focus();
                let end = self.surface.len();
                self.surface.insert(end, contents);
                self.restore_selection(before, |off| off);
            }
        }
        self.emit_change();
        true
    }

    /// Place an attachment followed by a line break at the live selection
    /// (replacing selected contents) or at the end, and put the cursor after
    /// the line break. Returns the new attachment's id.
    pub fn insert_attachment(&mut self, url: &str) -> Option<NodeId> {
        let contents = vec![
            NodeContent::Attachment {
                url: SmolStr::new(url),
            },
            NodeContent::LineBreak,
        ];
        let range = match self.selection.and_then(|sel| self.selection_range(sel)) {
            Some(range) => range,
            None => self.surface.len()..self.surface.len(),
        };
        let start = range.start;
        let end = self.replace_range(range, contents);
        self.set_cursor_offset(end);

        let id = self.surface.node_starting_at(start).map(|n| n.id);
        tracing::debug!(target: "scribe::sync", ?id, url, "attachment placed");
        self.emit_change();
        id
    }

    /// Remove an attachment node. Returns its URL, or `None` if `id` is not an
    /// attachment on the surface.
    pub fn remove_attachment(&mut self, id: NodeId) -> Option<SmolStr> {
        let url = self.attachment_url(id)?;
        let before = self.selection_anchor_focus();
        let at = self.surface.remove(id)?;
        self.restore_selection(before, |off| if off > at { off - 1 } else { off });
        if self.selected_attachment == Some(id) {
            self.selected_attachment = None;
        }
        self.emit_change();
        Some(url)
    }

    /// Mark an attachment selected, deselecting any other.
    pub fn select_attachment(&mut self, id: NodeId) -> bool {
        if self.attachment_url(id).is_none() {
            return false;
        }
        if let Some(prev) = self.selected_attachment.replace(id)
            && prev != id
        {
            tracing::trace!(target: "scribe::sync", %prev, next = %id, "attachment selection moved");
        }
        true
    }

    pub fn clear_attachment_selection(&mut self) {
        if let Some(id) = self.selected_attachment.take() {
            tracing::trace!(target: "scribe::sync", %id, "attachment deselected");
        }
    }

    /// The selected attachment, if any.
    pub fn selected_attachment(&self) -> Option<AttachmentRef> {
        let id = self.selected_attachment?;
        let url = self.attachment_url(id)?;
        Some(AttachmentRef {
            id,
            url,
            selected: true,
        })
    }

    /// All attachments in document order.
    pub fn attachments(&self) -> impl Iterator<Item = AttachmentRef> + '_ {
        self.surface.nodes().iter().filter_map(|node| match &node.content {
            NodeContent::Attachment { url } => Some(AttachmentRef {
                id: node.id,
                url: url.clone(),
                selected: self.selected_attachment == Some(node.id),
            }),
            _ => None,
        })
    }

    /// The serialized surface.
    pub fn value(&self) -> String {
        self.surface.to_markup()
    }

    /// The value last rendered from, or emitted to, the caller.
    pub fn last_rendered(&self) -> &str {
        &self.last_rendered
    }

    /// Plain text of the surface (see [`Surface::text_content`]).
    pub fn text_content(&self) -> String {
        self.surface.text_content()
    }

    pub fn nodes(&self) -> &[SurfaceNode] {
        self.surface.nodes()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Length of the document in units.
    pub fn len(&self) -> usize {
        self.surface.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surface.is_empty()
    }

    pub fn selection(&self) -> Option<SurfaceSelection> {
        self.selection
    }

    /// Set the live selection, as reported by the host.
    ///
    /// Selections pointing at nodes that are not on the surface are dropped.
    /// Moving the caret deselects any selected attachment.
    pub fn set_selection(&mut self, selection: Option<SurfaceSelection>) {
        self.clear_attachment_selection();
        self.selection = selection.filter(|sel| self.selection_range(*sel).is_some());
    }

    /// Document offset of the cursor (selection focus).
    pub fn cursor_offset(&self) -> Option<usize> {
        self.surface.offset_of(self.selection?.focus)
    }

    /// Collapse the selection at a document offset.
    pub fn set_cursor_offset(&mut self, offset: usize) {
        self.clear_attachment_selection();
        self.selection = self
            .surface
            .position_at(offset)
            .map(SurfaceSelection::collapsed);
    }

    /// Select between two document offsets. Returns false if the surface is
    /// empty and there is nothing to select.
    pub fn set_selection_offsets(&mut self, anchor: usize, focus: usize) -> bool {
        self.clear_attachment_selection();
        self.selection = self
            .surface
            .position_at(anchor)
            .zip(self.surface.position_at(focus))
            .map(|(anchor, focus)| SurfaceSelection::new(anchor, focus));
        self.selection.is_some()
    }

    /// Apply an editing action (see [`execute_action`]).
    pub fn apply(&mut self, action: &EditorAction) -> bool {
        execute_action(self, action)
    }

    /// Ordered document range of the live selection.
    pub fn selection_offsets(&self) -> Option<Range<usize>> {
        self.selection.and_then(|sel| self.selection_range(sel))
    }

    /// Whether a non-empty text selection exists.
    pub fn has_text_selection(&self) -> bool {
        self.selection_offsets().is_some_and(|r| !r.is_empty())
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The surface gained focus.
    pub fn focus(&mut self) -> FocusSignal {
        self.focused = true;
        FocusSignal::Focus(ActiveField::Body)
    }

    /// The surface lost focus.
    pub fn blur(&mut self) -> FocusSignal {
        self.focused = false;
        FocusSignal::Blur(ActiveField::Body)
    }

    pub(crate) fn selection_range(&self, sel: SurfaceSelection) -> Option<Range<usize>> {
        let a = self.surface.offset_of(sel.anchor)?;
        let f = self.surface.offset_of(sel.focus)?;
        Some(a.min(f)..a.max(f))
    }

    /// Replace a document range with contents; returns the end offset of the
    /// inserted contents.
    pub(crate) fn replace_range(&mut self, range: Range<usize>, contents: Vec<NodeContent>) -> usize {
        self.surface.delete(range.clone());
        self.surface.insert(range.start, contents)
    }

    pub(crate) fn delete_range(&mut self, range: Range<usize>) {
        self.surface.delete(range.clone());
        self.set_cursor_offset(range.start);
    }

    /// Selection as document offsets `(anchor, focus)`.
    fn selection_anchor_focus(&self) -> Option<(usize, usize)> {
        let sel = self.selection?;
        Some((
            self.surface.offset_of(sel.anchor)?,
            self.surface.offset_of(sel.focus)?,
        ))
    }

    /// Re-anchor a captured selection after an edit that did not move the
    /// cursor itself. `map` translates old offsets into new ones.
    fn restore_selection(&mut self, offsets: Option<(usize, usize)>, map: impl Fn(usize) -> usize) {
        self.selection = offsets.and_then(|(anchor, focus)| {
            Some(SurfaceSelection::new(
                self.surface.position_at(map(anchor))?,
                self.surface.position_at(map(focus))?,
            ))
        });
    }

    pub(crate) fn emit_change(&mut self) {
        let value = self.surface.to_markup();
        tracing::trace!(target: "scribe::sync", bytes = value.len(), "emitting value");
        self.last_rendered = value;
        (self.on_change)(&self.last_rendered);
    }

    fn attachment_url(&self, id: NodeId) -> Option<SmolStr> {
        match &self.surface.node(id)?.content {
            NodeContent::Attachment { url } => Some(url.clone()),
            _ => None,
        }
    }
}
