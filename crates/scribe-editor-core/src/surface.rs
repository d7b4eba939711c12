//! The live editing surface: an ordered node list with stable node identity.
//!
//! Document offsets count one unit per text char, per line break and per
//! attachment. Positions name a container node and an offset inside it; they
//! convert to and from document offsets.
//!
//! After every edit the node list is normalized: empty text runs are removed
//! and adjacent text runs are merged into the first one, which keeps its id.

use std::ops::Range;

use crate::markup;
use crate::types::{NodeContent, NodeId, Position, SurfaceNode};

/// An ordered list of surface nodes.
#[derive(Clone, Debug, Default)]
pub struct Surface {
    nodes: Vec<SurfaceNode>,
    next_id: u64,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a surface from canonical markup.
    pub fn from_markup(markup: &str) -> Self {
        let mut surface = Self::new();
        let nodes: Vec<SurfaceNode> = markup::parse(markup)
            .into_iter()
            .map(|content| SurfaceNode {
                id: surface.alloc_id(),
                content,
            })
            .collect();
        surface.nodes = nodes;
        surface
    }

    pub fn nodes(&self) -> &[SurfaceNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&SurfaceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Total length in document units.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|n| n.content.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize to canonical markup.
    pub fn to_markup(&self) -> String {
        markup::serialize(self.nodes.iter().map(|n| &n.content))
    }

    /// Plain text: line breaks as `\n`, attachments as U+FFFC.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match &node.content {
                NodeContent::Text(text) => out.push_str(text),
                NodeContent::LineBreak => out.push('\n'),
                NodeContent::Attachment { .. } => out.push('\u{FFFC}'),
            }
        }
        out
    }

    /// Replace the contents, keeping node identities where they line up.
    ///
    /// Node `i` of the new list reuses the id of node `i` of the old list when
    /// both are the same kind (attachments must also share a URL); anything
    /// else gets a fresh id.
    pub fn reconcile(&mut self, contents: Vec<NodeContent>) {
        let old = std::mem::take(&mut self.nodes);
        let mut nodes = Vec::with_capacity(contents.len());
        for (i, content) in contents.into_iter().enumerate() {
            let id = match old.get(i) {
                Some(prev) if prev.content.same_kind(&content) => prev.id,
                _ => self.alloc_id(),
            };
            nodes.push(SurfaceNode { id, content });
        }
        self.nodes = nodes;
        self.normalize();
    }

    /// Document offset of a position, or `None` if its node is gone.
    ///
    /// The in-node offset is clamped to the node's length.
    pub fn offset_of(&self, pos: Position) -> Option<usize> {
        let mut acc = 0;
        for node in &self.nodes {
            if node.id == pos.node {
                return Some(acc + pos.offset.min(node.max_offset()));
            }
            acc += node.content.len();
        }
        None
    }

    /// Position for a document offset, clamped to the end of the surface.
    ///
    /// At a boundary, the end of a preceding text run is preferred, so text
    /// typed there extends that run. Returns `None` on an empty surface.
    pub fn position_at(&self, offset: usize) -> Option<Position> {
        let mut acc = 0;
        for node in &self.nodes {
            let len = node.content.len();
            let end = acc + len;
            if node.content.is_text() {
                if offset <= end {
                    return Some(Position::new(node.id, offset.saturating_sub(acc)));
                }
            } else if offset <= acc {
                return Some(Position::new(node.id, 0));
            }
            acc = end;
        }
        self.nodes
            .last()
            .map(|last| Position::new(last.id, last.max_offset()))
    }

    /// Insert contents at a document offset. Returns the offset just after
    /// the inserted contents.
    pub fn insert(&mut self, offset: usize, contents: Vec<NodeContent>) -> usize {
        let offset = offset.min(self.len());
        let inserted: usize = contents.iter().map(NodeContent::len).sum();
        let index = self.split_at(offset);
        let new_nodes: Vec<SurfaceNode> = contents
            .into_iter()
            .map(|content| SurfaceNode {
                id: self.alloc_id(),
                content,
            })
            .collect();
        self.nodes.splice(index..index, new_nodes);
        self.normalize();
        offset + inserted
    }

    /// Delete a range of document units.
    pub fn delete(&mut self, range: Range<usize>) {
        let len = self.len();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start >= end {
            return;
        }
        let mut acc = 0;
        self.nodes.retain_mut(|node| {
            let node_start = acc;
            let node_len = node.content.len();
            acc += node_len;
            let node_end = acc;
            if node_end <= start || node_start >= end {
                return true;
            }
            match &mut node.content {
                NodeContent::Text(text) => {
                    let from = start.saturating_sub(node_start);
                    let to = (end - node_start).min(node_len);
                    *text = text
                        .chars()
                        .take(from)
                        .chain(text.chars().skip(to))
                        .collect();
                    true
                }
                _ => false,
            }
        });
        self.normalize();
    }

    /// The node covering the unit starting at `offset`, if that unit is a
    /// whole node (a line break or attachment) or the first char of a node.
    pub fn node_starting_at(&self, offset: usize) -> Option<&SurfaceNode> {
        let mut acc = 0;
        for node in &self.nodes {
            if acc == offset {
                return Some(node);
            }
            if acc > offset {
                break;
            }
            acc += node.content.len();
        }
        None
    }

    /// Remove a node entirely. Returns the document offset it occupied.
    pub fn remove(&mut self, id: NodeId) -> Option<usize> {
        let offset = self.offset_of(Position::new(id, 0))?;
        let len = self.node(id)?.content.len();
        self.delete(offset..offset + len);
        Some(offset)
    }

    /// Make sure a node boundary exists at `offset`; returns the index of the
    /// first node at or after it.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut acc = 0;
        for i in 0..self.nodes.len() {
            let len = self.nodes[i].content.len();
            if offset == acc {
                return i;
            }
            if offset < acc + len {
                let at = offset - acc;
                let id = self.alloc_id();
                if let NodeContent::Text(text) = &mut self.nodes[i].content {
                    let split = text.char_indices().nth(at).map_or(text.len(), |(b, _)| b);
                    let tail = text.split_off(split);
                    self.nodes.insert(
                        i + 1,
                        SurfaceNode {
                            id,
                            content: NodeContent::Text(tail),
                        },
                    );
                }
                return i + 1;
            }
            acc += len;
        }
        self.nodes.len()
    }

    fn normalize(&mut self) {
        self.nodes.retain(|n| !n.content.is_empty());
        let mut merged: Vec<SurfaceNode> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.drain(..) {
            if let (Some(prev), NodeContent::Text(text)) = (merged.last_mut(), &node.content)
                && let NodeContent::Text(prev_text) = &mut prev.content
            {
                prev_text.push_str(text);
                continue;
            }
            merged.push(node);
        }
        self.nodes = merged;
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(surface: &Surface) -> Vec<NodeId> {
        surface.nodes().iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_offsets_round_trip() {
        let surface = Surface::from_markup(r#"ab<br><img src="u">cd"#);
        assert_eq!(surface.len(), 6);
        assert_eq!(surface.text_content(), "ab\n\u{FFFC}cd");
        for offset in 0..=surface.len() {
            let pos = surface.position_at(offset).unwrap();
            assert_eq!(surface.offset_of(pos), Some(offset), "offset {offset}");
        }
    }

    #[test]
    fn test_position_prefers_text_end() {
        let surface = Surface::from_markup("ab<br>");
        let text_id = surface.nodes()[0].id;
        let br_id = surface.nodes()[1].id;
        assert_eq!(surface.position_at(2), Some(Position::new(text_id, 2)));
        assert_eq!(surface.position_at(3), Some(Position::new(br_id, 1)));
        assert_eq!(surface.position_at(99), Some(Position::new(br_id, 1)));
        assert_eq!(Surface::new().position_at(0), None);
    }

    #[test]
    fn test_insert_inside_text_merges() {
        let mut surface = Surface::from_markup("hd");
        let id = surface.nodes()[0].id;
        let end = surface.insert(1, vec![NodeContent::Text("ello worl".into())]);
        assert_eq!(end, 10);
        assert_eq!(surface.text_content(), "hello world");
        assert_eq!(ids(&surface), vec![id]);
    }

    #[test]
    fn test_insert_nodes_splits_text() {
        let mut surface = Surface::from_markup("abcd");
        let end = surface.insert(
            2,
            vec![NodeContent::Attachment { url: "u".into() }, NodeContent::LineBreak],
        );
        assert_eq!(end, 4);
        assert_eq!(surface.to_markup(), r#"ab<img src="u"><br>cd"#);
    }

    #[test]
    fn test_delete_across_nodes() {
        let mut surface = Surface::from_markup(r#"ab<br><img src="u">cd"#);
        surface.delete(1..5);
        assert_eq!(surface.to_markup(), "ad");
        assert_eq!(surface.nodes().len(), 1);
    }

    #[test]
    fn test_remove_node() {
        let mut surface = Surface::from_markup(r#"x<img src="u"><br>"#);
        let img = surface.nodes()[1].id;
        assert_eq!(surface.remove(img), Some(1));
        assert_eq!(surface.to_markup(), "x<br>");
        assert_eq!(surface.remove(img), None);
    }

    #[test]
    fn test_reconcile_keeps_matching_ids() {
        let mut surface = Surface::from_markup(r#"one<br><img src="a">"#);
        let before = ids(&surface);
        surface.reconcile(markup::parse(r#"one more<br><img src="b">"#));
        let after = ids(&surface);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[1]);
        assert_ne!(after[2], before[2]);
    }
}
