//! Node arena backing an in-memory document.

use alloc::string::String;
use alloc::vec::Vec;
use domwatch_core::{Error, Result, SelectorElement, SelectorList};

/// Identifier of a node within one `Document`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) enum NodeKind {
    Document,
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// Arena of nodes. Nodes are never freed; detached subtrees keep their
/// children so they can still be queried after removal.
pub(crate) struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    /// Creates a tree holding only the document node.
    pub(crate) fn new() -> Self {
        Self {
            nodes: alloc::vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    #[inline]
    pub(crate) fn document(&self) -> NodeId {
        NodeId(0)
    }

    pub(crate) fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub(crate) fn get(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| Error::invalid_operation(alloc::format!("Unknown node {:?}", id)))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(id.index())
            .ok_or_else(|| Error::invalid_operation(alloc::format!("Unknown node {:?}", id)))
    }

    pub(crate) fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id.index()).map(|n| &n.kind),
            Some(NodeKind::Element { .. })
        )
    }

    pub(crate) fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.index())?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub(crate) fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id.index())?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index())?.parent
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Returns true if `ancestor` is `node` or one of its ancestors.
    pub(crate) fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Unlinks a node from its parent, returning the former parent.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.nodes[parent.index()].children.retain(|c| *c != id);
        self.nodes[id.index()].parent = None;
        Some(parent)
    }

    /// Links a detached node under `parent` at `index`.
    pub(crate) fn insert(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let children = &mut self.nodes[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Descendants of `scope` in document order, excluding `scope`.
    pub(crate) fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Returns true if the element matches the parsed selector list.
    pub(crate) fn matches(&self, id: NodeId, selectors: &SelectorList) -> bool {
        self.is_element(id) && selectors.matches(&TreeElement { tree: self, id })
    }
}

/// An element viewed through the tree, for selector matching.
pub(crate) struct TreeElement<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> SelectorElement for TreeElement<'a> {
    fn local_name(&self) -> &str {
        self.tree.tag(self.id).unwrap_or("")
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.tree.attribute(self.id, name)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.tree.parent(self.id)?;
        self.tree.is_element(parent).then(|| TreeElement {
            tree: self.tree,
            id: parent,
        })
    }

    fn previous_sibling_element(&self) -> Option<Self> {
        let parent = self.tree.parent(self.id)?;
        let siblings = self.tree.children(parent);
        let position = siblings.iter().position(|c| *c == self.id)?;
        siblings[..position]
            .iter()
            .rev()
            .find(|c| self.tree.is_element(**c))
            .map(|c| TreeElement {
                tree: self.tree,
                id: *c,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &mut Tree, tag: &str) -> NodeId {
        tree.push(NodeKind::Element {
            tag: tag.into(),
            attributes: Vec::new(),
        })
    }

    #[test]
    fn test_descendants_document_order() {
        let mut tree = Tree::new();
        let doc = tree.document();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        let c = element(&mut tree, "c");
        let d = element(&mut tree, "d");
        tree.insert(doc, a, 0);
        tree.insert(a, b, 0);
        tree.insert(b, c, 0);
        tree.insert(a, d, 1);

        assert_eq!(tree.descendants(doc), alloc::vec![a, b, c, d]);
        assert_eq!(tree.descendants(b), alloc::vec![c]);
    }

    #[test]
    fn test_detach_keeps_subtree() {
        let mut tree = Tree::new();
        let doc = tree.document();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.insert(doc, a, 0);
        tree.insert(a, b, 0);

        assert_eq!(tree.detach(a), Some(doc));
        assert!(tree.children(doc).is_empty());
        assert_eq!(tree.children(a), &[b]);
        assert!(!tree.is_inclusive_ancestor(doc, b));
        assert!(tree.is_inclusive_ancestor(a, b));
        assert_eq!(tree.detach(a), None);
    }

    #[test]
    fn test_unknown_node() {
        let tree = Tree::new();
        assert!(tree.get(NodeId(42)).is_err());
        assert!(!tree.is_element(NodeId(42)));
        assert!(tree.children(NodeId(42)).is_empty());
    }
}
