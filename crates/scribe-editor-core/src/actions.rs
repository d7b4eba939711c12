//! Editor actions.
//!
//! Platform-agnostic editing operations. Hosts translate their input events
//! (keystrokes, `beforeinput`, native input methods) into an [`EditorAction`]
//! and hand it to [`DocumentSyncEngine::apply`]. Actions operate on the live
//! selection; with no selection the cursor is taken to be at the end of the
//! document.

use std::ops::Range;

use smol_str::SmolStr;

use crate::sync::DocumentSyncEngine;

/// A semantic editing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Insert text, replacing the selection.
    Insert { text: SmolStr },
    /// Insert a line break.
    InsertLineBreak,
    /// Delete the selection, or the unit before the cursor.
    DeleteBackward,
    /// Delete the selection, or the unit after the cursor.
    DeleteForward,
    /// Delete the selection, or back to the start of the previous word.
    DeleteWordBackward,
    SelectAll,
    /// Collapse the cursor at an offset.
    MoveCursor { offset: usize },
    /// Move the focus to an offset, keeping the anchor.
    ExtendSelection { offset: usize },
}

impl EditorAction {
    pub fn insert(text: impl Into<SmolStr>) -> Self {
        Self::Insert { text: text.into() }
    }

    /// Whether the action can change the document (as opposed to only the
    /// selection).
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::SelectAll | Self::MoveCursor { .. } | Self::ExtendSelection { .. }
        )
    }
}

/// Execute an action on the engine. Returns whether anything happened.
///
/// Document changes are emitted through the engine's change callback.
pub fn execute_action(engine: &mut DocumentSyncEngine, action: &EditorAction) -> bool {
    let handled = match action {
        EditorAction::Insert { text } => return engine.insert_at_cursor(text),
        EditorAction::InsertLineBreak => return engine.insert_at_cursor("\n"),
        EditorAction::DeleteBackward => execute_delete_backward(engine),
        EditorAction::DeleteForward => execute_delete_forward(engine),
        EditorAction::DeleteWordBackward => execute_delete_word_backward(engine),
        EditorAction::SelectAll => execute_select_all(engine),
        EditorAction::MoveCursor { offset } => execute_move_cursor(engine, *offset),
        EditorAction::ExtendSelection { offset } => execute_extend_selection(engine, *offset),
    };
    if handled && action.is_mutation() {
        engine.emit_change();
    }
    tracing::trace!(target: "scribe::sync", ?action, handled, "action executed");
    handled
}

/// The live selection as a range, or a caret at the end of the document.
fn current_range(engine: &DocumentSyncEngine) -> Range<usize> {
    engine.selection_offsets().unwrap_or_else(|| {
        let len = engine.len();
        len..len
    })
}

fn execute_delete_backward(engine: &mut DocumentSyncEngine) -> bool {
    let range = current_range(engine);
    if !range.is_empty() {
        engine.delete_range(range);
        return true;
    }
    if range.start == 0 {
        return false;
    }
    engine.delete_range(range.start - 1..range.start);
    true
}

fn execute_delete_forward(engine: &mut DocumentSyncEngine) -> bool {
    let range = current_range(engine);
    if !range.is_empty() {
        engine.delete_range(range);
        return true;
    }
    if range.start >= engine.len() {
        return false;
    }
    engine.delete_range(range.start..range.start + 1);
    true
}

fn execute_delete_word_backward(engine: &mut DocumentSyncEngine) -> bool {
    let range = current_range(engine);
    if !range.is_empty() {
        engine.delete_range(range);
        return true;
    }
    let cursor = range.start;
    let word_start = find_word_boundary_backward(&engine.text_content(), cursor);
    if word_start == cursor {
        return false;
    }
    engine.delete_range(word_start..cursor);
    true
}

/// Skip whitespace, then the word before it.
fn find_word_boundary_backward(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().take(offset).collect();
    let mut pos = chars.len();
    while pos > 0 && chars[pos - 1].is_whitespace() {
        pos -= 1;
    }
    while pos > 0 && !chars[pos - 1].is_whitespace() {
        pos -= 1;
    }
    pos
}

fn execute_select_all(engine: &mut DocumentSyncEngine) -> bool {
    let len = engine.len();
    engine.set_selection_offsets(0, len)
}

fn execute_move_cursor(engine: &mut DocumentSyncEngine, offset: usize) -> bool {
    let offset = offset.min(engine.len());
    engine.set_cursor_offset(offset);
    engine.selection().is_some()
}

fn execute_extend_selection(engine: &mut DocumentSyncEngine, offset: usize) -> bool {
    let offset = offset.min(engine.len());
    let anchor = engine
        .selection()
        .and_then(|sel| engine.surface().offset_of(sel.anchor))
        .unwrap_or(engine.len());
    engine.set_selection_offsets(anchor, offset)
}
