//! Arena-backed document tree.
//!
//! Nodes are stored in a flat `Vec` and linked through [`NodeId`] handles.
//! Once built, the tree is only ever read through [`NodeRef`], a cheap copyable
//! view that can walk to the parent, siblings and children of a node.

use std::fmt;

use crate::node::{NodeType, NodeValue};

/// Handle of a node inside a [`Document`].
///
/// Handles are only meaningful for the document that created them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
struct NodeData {
    value: NodeValue,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    previous: Option<NodeId>,
    next: Option<NodeId>,
}

impl NodeData {
    fn new(value: NodeValue, parent: Option<NodeId>) -> Self {
        Self {
            value,
            parent,
            first_child: None,
            last_child: None,
            previous: None,
            next: None,
        }
    }
}

/// A parsed document: the root [`NodeValue::Document`] node and its descendants.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Handle of the root node.
    pub const ROOT: NodeId = NodeId(0);

    /// Create an empty document containing only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeValue::Document, None)],
        }
    }

    /// Read-only view of the root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            document: self,
            id: Self::ROOT,
        }
    }

    /// Read-only view of a node, or `None` if the handle is not from this document.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { document: self, id })
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no content besides the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Append a new node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not created by this document.
    pub fn append(&mut self, parent: NodeId, value: NodeValue) -> NodeId {
        let id = NodeId(self.nodes.len());
        let previous = self.nodes[parent.0].last_child;

        let mut data = NodeData::new(value, Some(parent));
        data.previous = previous;
        self.nodes.push(data);

        match previous {
            Some(prev) => self.nodes[prev.0].next = Some(id),
            None => self.nodes[parent.0].first_child = Some(id),
        }
        self.nodes[parent.0].last_child = Some(id);
        id
    }

    /// Mutable access to a node's value while the tree is being built.
    pub(crate) fn value_mut(&mut self, id: NodeId) -> &mut NodeValue {
        &mut self.nodes[id.0].value
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }
}

/// Copyable read-only view of a node and its position in the tree.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    document: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// Handle of this node.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The document this node belongs to.
    #[must_use]
    pub fn document(self) -> &'a Document {
        self.document
    }

    /// Payload of this node.
    #[must_use]
    pub fn value(self) -> &'a NodeValue {
        &self.document.data(self.id).value
    }

    /// Dispatch tag of this node.
    #[must_use]
    pub fn node_type(self) -> NodeType {
        self.value().node_type()
    }

    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.link(self.document.data(self.id).parent)
    }

    #[must_use]
    pub fn first_child(self) -> Option<Self> {
        self.link(self.document.data(self.id).first_child)
    }

    #[must_use]
    pub fn last_child(self) -> Option<Self> {
        self.link(self.document.data(self.id).last_child)
    }

    /// Previous sibling.
    #[must_use]
    pub fn previous_sibling(self) -> Option<Self> {
        self.link(self.document.data(self.id).previous)
    }

    /// Next sibling.
    #[must_use]
    pub fn next_sibling(self) -> Option<Self> {
        self.link(self.document.data(self.id).next)
    }

    /// Direct children in document order.
    #[must_use]
    pub fn children(self) -> Children<'a> {
        Children {
            next: self.first_child(),
        }
    }

    /// All descendants in pre-order, excluding the node itself.
    #[must_use]
    pub fn descendants(self) -> Descendants<'a> {
        Descendants {
            root: self.id,
            next: self.first_child(),
        }
    }

    fn link(self, id: Option<NodeId>) -> Option<Self> {
        id.map(|id| Self {
            document: self.document,
            id,
        })
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.document, other.document) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("value", self.value())
            .finish()
    }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
    next: Option<NodeRef<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_sibling();
        Some(current)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    root: NodeId,
    next: Option<NodeRef<'a>>,
}

impl<'a> Descendants<'a> {
    fn successor(&self, current: NodeRef<'a>) -> Option<NodeRef<'a>> {
        if let Some(child) = current.first_child() {
            return Some(child);
        }
        let mut node = current;
        loop {
            if node.id == self.root {
                return None;
            }
            if let Some(sibling) = node.next_sibling() {
                return Some(sibling);
            }
            node = node.parent()?;
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.successor(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> NodeValue {
        NodeValue::Text(s.to_owned())
    }

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.root().node_type(), NodeType::Document);
        assert!(doc.root().parent().is_none());
    }

    #[test]
    fn test_append_links_siblings() {
        let mut doc = Document::new();
        let a = doc.append(Document::ROOT, NodeValue::Paragraph);
        let b = doc.append(Document::ROOT, NodeValue::ThematicBreak);
        let c = doc.append(Document::ROOT, NodeValue::Paragraph);

        let root = doc.root();
        assert_eq!(root.first_child().map(NodeRef::id), Some(a));
        assert_eq!(root.last_child().map(NodeRef::id), Some(c));

        let middle = doc.get(b).unwrap();
        assert_eq!(middle.previous_sibling().map(NodeRef::id), Some(a));
        assert_eq!(middle.next_sibling().map(NodeRef::id), Some(c));
        assert_eq!(middle.parent(), Some(root));
    }

    #[test]
    fn test_children_in_order() {
        let mut doc = Document::new();
        let p = doc.append(Document::ROOT, NodeValue::Paragraph);
        doc.append(p, text("a"));
        doc.append(p, NodeValue::SoftLineBreak);
        doc.append(p, text("b"));

        let types: Vec<NodeType> = doc.get(p).unwrap().children().map(NodeRef::node_type).collect();
        assert_eq!(
            types,
            vec![NodeType::Text, NodeType::SoftLineBreak, NodeType::Text]
        );
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut doc = Document::new();
        let p = doc.append(Document::ROOT, NodeValue::Paragraph);
        let em = doc.append(p, NodeValue::Emphasis);
        doc.append(em, text("x"));
        doc.append(p, text("y"));
        let q = doc.append(Document::ROOT, NodeValue::BlockQuote);
        doc.append(q, NodeValue::Paragraph);

        let types: Vec<NodeType> = doc.root().descendants().map(NodeRef::node_type).collect();
        assert_eq!(
            types,
            vec![
                NodeType::Paragraph,
                NodeType::Emphasis,
                NodeType::Text,
                NodeType::Text,
                NodeType::BlockQuote,
                NodeType::Paragraph,
            ]
        );
    }

    #[test]
    fn test_descendants_stay_within_subtree() {
        let mut doc = Document::new();
        let p = doc.append(Document::ROOT, NodeValue::Paragraph);
        doc.append(p, text("inside"));
        doc.append(Document::ROOT, NodeValue::ThematicBreak);

        let count = doc.get(p).unwrap().descendants().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_get_foreign_id() {
        let mut big = Document::new();
        let id = big.append(Document::ROOT, NodeValue::Paragraph);
        let small = Document::new();
        assert!(small.get(id).is_none());
    }
}
