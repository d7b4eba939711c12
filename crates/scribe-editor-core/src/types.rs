//! Core surface types: node identity, positions, and selections.
//!
//! These types are framework-agnostic. A host maps them to and from its own
//! selection model (DOM ranges, native text views).

use std::fmt;

use smol_str::SmolStr;

/// Identity of a surface node (the "container" of a position).
///
/// Allocated by the surface, never reused within one surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a surface node holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeContent {
    /// A run of text. Never empty once normalized.
    Text(String),
    /// A hard line break.
    LineBreak,
    /// An inline image attachment.
    Attachment { url: SmolStr },
}

impl NodeContent {
    /// Length in document units: chars for text, 1 for anything else.
    pub fn len(&self) -> usize {
        match self {
            NodeContent::Text(text) => text.chars().count(),
            NodeContent::LineBreak | NodeContent::Attachment { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeContent::Text(_))
    }

    /// Whether two contents can share an identity across a re-render.
    pub fn same_kind(&self, other: &NodeContent) -> bool {
        match (self, other) {
            (NodeContent::Text(_), NodeContent::Text(_)) => true,
            (NodeContent::LineBreak, NodeContent::LineBreak) => true,
            (NodeContent::Attachment { url: a }, NodeContent::Attachment { url: b }) => a == b,
            _ => false,
        }
    }
}

/// A node of the live surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceNode {
    pub id: NodeId,
    pub content: NodeContent,
}

impl SurfaceNode {
    /// Largest valid offset inside this node.
    ///
    /// For text this is the char length; for line breaks and attachments
    /// offsets 0 and 1 mean "before" and "after" the node.
    pub fn max_offset(&self) -> usize {
        self.content.len()
    }
}

/// A point on the surface: a container node and an offset inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Selection with anchor and focus positions.
///
/// The anchor is where the selection started, the focus is where the cursor
/// is now. They may be in any document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSelection {
    pub anchor: Position,
    pub focus: Position,
}

impl SurfaceSelection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// Create a collapsed selection (cursor).
    pub fn collapsed(at: Position) -> Self {
        Self {
            anchor: at,
            focus: at,
        }
    }

    /// Check if the selection is collapsed (cursor only).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// A read-only view of an attachment on the surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentRef {
    pub id: NodeId,
    pub url: SmolStr,
    /// Whether this is the selected attachment.
    pub selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_len() {
        assert_eq!(NodeContent::Text("héllo".into()).len(), 5);
        assert_eq!(NodeContent::LineBreak.len(), 1);
        assert_eq!(NodeContent::Attachment { url: "x".into() }.len(), 1);
        assert!(NodeContent::Text(String::new()).is_empty());
    }

    #[test]
    fn test_same_kind() {
        let a = NodeContent::Attachment { url: "a".into() };
        let b = NodeContent::Attachment { url: "b".into() };
        assert!(a.same_kind(&a.clone()));
        assert!(!a.same_kind(&b));
        assert!(NodeContent::Text("x".into()).same_kind(&NodeContent::Text("y".into())));
        assert!(!NodeContent::LineBreak.same_kind(&NodeContent::Text("\n".into())));
    }

    #[test]
    fn test_selection_collapsed() {
        let at = Position::new(NodeId(3), 2);
        assert!(SurfaceSelection::collapsed(at).is_collapsed());
        assert!(!SurfaceSelection::new(at, Position::new(NodeId(3), 4)).is_collapsed());
    }
}
