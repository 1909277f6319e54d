//! An in-memory element tree implementing [`Dom`].
//!
//! [`Document`] is a shared handle: clones see the same tree. It starts with an
//! `<html>` root holding an empty `<body>`. Elements are created detached and only
//! become visible to selector queries once appended under the root.

mod error;

pub use error::{DocumentError, DocumentErrorExt};

use crate::dom::Dom;
use crate::selector::{ElementTree, SelectorError, SelectorList};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Identity of an element within one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug)]
struct NodeData {
    tag: String,
    attributes: FxHashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: FxHashMap::default(),
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
    body: NodeId,
}

impl Tree {
    fn new() -> Self {
        let mut html = NodeData::new("html");
        let mut body = NodeData::new("body");
        let root = NodeId(0);
        let body_id = NodeId(1);
        html.children.push(body_id);
        body.parent = Some(root);
        Self { nodes: vec![html, body], root, body: body_id }
    }

    fn get(&self, node: NodeId) -> Result<&NodeData, DocumentError> {
        self.nodes.get(node.0).ok_or(DocumentError::NodeNotFound { node, context: None })
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut NodeData, DocumentError> {
        self.nodes.get_mut(node.0).ok_or(DocumentError::NodeNotFound { node, context: None })
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if self.nodes.get(ancestor.0).is_none() {
            return false;
        }
        let mut current = self.nodes.get(node.0).map(|_| node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Pre-order walk from the root.
    fn attached(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }
}

impl ElementTree for Tree {
    type Node = NodeId;

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn local_name(&self, node: NodeId) -> &str {
        self.nodes.get(node.0).map_or("", |n| n.tag.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node.0).and_then(|n| n.attributes.get(name)).map(String::as_str)
    }
}

/// A shared, thread-safe in-memory document.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Arc<RwLock<Tree>>,
}

impl Default for Document {
    fn default() -> Self {
        Self { tree: Arc::new(RwLock::new(Tree::new())) }
    }
}

impl Document {
    /// Creates a document containing `<html><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The `<html>` root element.
    #[must_use]
    pub fn document_element(&self) -> NodeId {
        self.tree.read().root
    }

    #[must_use]
    pub fn body(&self) -> NodeId {
        self.tree.read().body
    }

    /// Creates a detached element.
    #[must_use]
    pub fn create_element(&self, tag: &str) -> NodeId {
        let mut tree = self.tree.write();
        let id = NodeId(tree.nodes.len());
        tree.nodes.push(NodeData::new(tag));
        trace!(node = %id, tag, "Element created");
        id
    }

    /// Creates an element and appends it to `parent`.
    ///
    /// # Errors
    /// Returns [`DocumentError::NodeNotFound`] if `parent` is unknown.
    pub fn append_element(&self, parent: NodeId, tag: &str) -> Result<NodeId, DocumentError> {
        self.tree.read().get(parent)?;
        let child = self.create_element(tag);
        self.append_child(parent, child)?;
        Ok(child)
    }

    /// Moves `child` (and its subtree) to the end of `parent`'s children.
    ///
    /// # Errors
    /// Returns [`DocumentError::NodeNotFound`] for unknown ids, and
    /// [`DocumentError::HierarchyRequest`] if `child` is the root or an ancestor-or-self
    /// of `parent`.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        let mut tree = self.tree.write();
        tree.get(parent)?;
        tree.get(child)?;

        if child == tree.root {
            return Err(DocumentError::HierarchyRequest {
                message: "the document element cannot be moved".into(),
                context: None,
            });
        }
        if tree.contains(child, parent) {
            return Err(DocumentError::HierarchyRequest {
                message: format!("{child} is an ancestor of {parent}").into(),
                context: None,
            });
        }

        tree.detach(child);
        tree.get_mut(parent)?.children.push(child);
        tree.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detaches `node` and its subtree from the document. The node stays usable and can be
    /// appended again.
    ///
    /// # Errors
    /// Returns [`DocumentError::NodeNotFound`] for unknown ids, and
    /// [`DocumentError::HierarchyRequest`] for the root.
    pub fn remove(&self, node: NodeId) -> Result<(), DocumentError> {
        let mut tree = self.tree.write();
        tree.get(node)?;
        if node == tree.root {
            return Err(DocumentError::HierarchyRequest {
                message: "the document element cannot be removed".into(),
                context: None,
            });
        }
        tree.detach(node);
        Ok(())
    }

    /// Sets an attribute. Names are case-insensitive and stored lowercase.
    ///
    /// # Errors
    /// Returns [`DocumentError::NodeNotFound`] if `node` is unknown.
    pub fn set_attribute(
        &self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let mut tree = self.tree.write();
        tree.get_mut(node)?.attributes.insert(name.to_ascii_lowercase(), value.into());
        Ok(())
    }

    /// Shorthand for `set_attribute(node, "id", id)`.
    ///
    /// # Errors
    /// Returns [`DocumentError::NodeNotFound`] if `node` is unknown.
    pub fn set_id(&self, node: NodeId, id: impl Into<String>) -> Result<(), DocumentError> {
        self.set_attribute(node, "id", id)
    }

    /// Adds `class` to the node's class list if not already present.
    ///
    /// # Errors
    /// Returns [`DocumentError::NodeNotFound`] if `node` is unknown.
    pub fn add_class(&self, node: NodeId, class: &str) -> Result<(), DocumentError> {
        let mut tree = self.tree.write();
        let data = tree.get_mut(node)?;
        let classes = data.attributes.entry("class".to_owned()).or_default();
        if !classes.split_ascii_whitespace().any(|c| c == class) {
            if !classes.is_empty() {
                classes.push(' ');
            }
            classes.push_str(class);
        }
        Ok(())
    }

    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree.read().attribute(node, &name.to_ascii_lowercase()).map(str::to_owned)
    }

    #[must_use]
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.tree.read().nodes.get(node.0).map(|n| n.tag.clone())
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.read().parent_element(node)
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.read().nodes.get(node.0).map(|n| n.children.clone()).unwrap_or_default()
    }

    /// Whether `node` is attached under the document element.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        let tree = self.tree.read();
        tree.contains(tree.root, node)
    }

    /// The first element matching `selectors`, in document order.
    ///
    /// # Errors
    /// Returns a [`SelectorError`] if the selector string cannot be parsed.
    pub fn query_selector(&self, selectors: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.query_selector_all(selectors)?.into_iter().next())
    }
}

impl Dom for Document {
    type Node = NodeId;

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.tree.read().contains(*ancestor, *node)
    }

    fn query_selector_all(&self, selectors: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selectors)?;
        let tree = self.tree.read();
        Ok(tree.attached().into_iter().filter(|&id| list.matches(&*tree, id)).collect())
    }
}
