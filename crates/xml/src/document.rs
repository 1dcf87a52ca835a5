//! Arena-backed XML document.
//!
//! Invariants:
//! - `NodeId(0)` is the document node; it is never moved or removed.
//! - A live node has at most one parent, and is listed exactly once in that
//!   parent's `children`.
//! - Appending never creates a cycle.
//! - Removed nodes stay in the arena as dead slots; their ids are rejected.
//! - Attribute order is insertion order; names are unique per element.

use crate::error::XmlError;
use crate::names::{is_reserved_target, is_valid_name};
use crate::serialize::{WriteOptions, write_document};
use std::fmt;

/// Handle to a node inside one [`XmlDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    CData(String),
    Instruction {
        target: String,
        content: String,
    },
    /// Detached container used to collect nodes before they are attached.
    Buffer,
}

impl NodeKind {
    fn accepts_children(&self) -> bool {
        matches!(
            self,
            NodeKind::Document | NodeKind::Element { .. } | NodeKind::Buffer
        )
    }
}

/// Construction options for a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentOptions {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
    /// Merge adjacent text writes into a single text node.
    pub coalesce_text: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: None,
            standalone: None,
            coalesce_text: true,
        }
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    live: bool,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            live: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct XmlDocument {
    nodes: Vec<NodeData>,
    options: DocumentOptions,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    pub fn with_options(options: DocumentOptions) -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document)],
            options,
        }
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of live nodes, including the document node.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.live).count()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.live(id).map(|node| &node.kind)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attributes(&self, id: NodeId) -> Option<&[(String, String)]> {
        match self.kind(id)? {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn attribute_value(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content of a text, comment, or CDATA node.
    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) | NodeKind::Comment(text) | NodeKind::CData(text) => Some(text),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.live(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.live(id).map_or(&[], |node| node.children.as_slice())
    }

    /// First element child of the document node.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| matches!(self.kind(id), Some(NodeKind::Element { .. })))
    }

    pub fn element(&mut self, parent: NodeId, name: &str) -> Result<NodeId, XmlError> {
        if !is_valid_name(name) {
            return Err(XmlError::InvalidName(name.to_string()));
        }
        self.ensure_parent(parent)?;
        let id = self.push(NodeKind::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        });
        self.link(parent, id);
        Ok(id)
    }

    pub fn attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), XmlError> {
        if !is_valid_name(name) {
            return Err(XmlError::InvalidName(name.to_string()));
        }
        let data = self.live_mut(node)?;
        let NodeKind::Element { attributes, .. } = &mut data.kind else {
            return Err(XmlError::NotAnElement(node));
        };
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Appends text to `parent`. Empty text is ignored.
    pub fn text(&mut self, parent: NodeId, text: &str) -> Result<(), XmlError> {
        self.ensure_parent(parent)?;
        if text.is_empty() {
            return Ok(());
        }
        if self.options.coalesce_text
            && let Some(last) = self.last_text_child(parent)
            && let NodeKind::Text(existing) = &mut self.nodes[last.index()].kind
        {
            existing.push_str(text);
            return Ok(());
        }
        let id = self.push(NodeKind::Text(text.to_string()));
        self.link(parent, id);
        Ok(())
    }

    pub fn comment(&mut self, parent: NodeId, text: &str) -> Result<(), XmlError> {
        if text.contains("--") || text.ends_with('-') {
            return Err(XmlError::InvalidComment(text.to_string()));
        }
        self.leaf(parent, NodeKind::Comment(text.to_string()))
    }

    pub fn cdata(&mut self, parent: NodeId, text: &str) -> Result<(), XmlError> {
        if text.contains("]]>") {
            return Err(XmlError::InvalidCData(text.to_string()));
        }
        self.leaf(parent, NodeKind::CData(text.to_string()))
    }

    pub fn instruction(
        &mut self,
        parent: NodeId,
        target: &str,
        content: &str,
    ) -> Result<(), XmlError> {
        if !is_valid_name(target) || is_reserved_target(target) || content.contains("?>") {
            return Err(XmlError::InvalidInstruction {
                target: target.to_string(),
                content: content.to_string(),
            });
        }
        self.leaf(
            parent,
            NodeKind::Instruction {
                target: target.to_string(),
                content: content.to_string(),
            },
        )
    }

    /// Deep-copies every top-level node of `fragment` under `parent`.
    ///
    /// The fragment is left untouched and can be imported again.
    pub fn import(&mut self, parent: NodeId, fragment: &XmlDocument) -> Result<(), XmlError> {
        self.ensure_parent(parent)?;
        let top = fragment.children(NodeId::ROOT);
        log::trace!(target: "xml.sink", "import {} top-level nodes under {parent:?}", top.len());
        for &child in top {
            match fragment.kind(child) {
                Some(NodeKind::Text(text)) => self.text(parent, text)?,
                Some(_) => self.copy_subtree(fragment, child, parent),
                None => {}
            }
        }
        Ok(())
    }

    /// Creates a detached buffer node.
    pub fn detached(&mut self) -> NodeId {
        self.push(NodeKind::Buffer)
    }

    /// Moves `child` (and its subtree) to the end of `parent`'s children.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), XmlError> {
        if child == NodeId::ROOT {
            return Err(XmlError::DocumentRoot);
        }
        self.ensure_parent(parent)?;
        self.live(child).ok_or(XmlError::UnknownNode(child))?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(XmlError::Cycle { parent, child });
        }
        self.unlink(child);

        if self.options.coalesce_text
            && let NodeKind::Text(moved) = &self.nodes[child.index()].kind
            && let Some(last) = self.last_text_child(parent)
        {
            let moved = moved.clone();
            if let NodeKind::Text(existing) = &mut self.nodes[last.index()].kind {
                existing.push_str(&moved);
            }
            self.nodes[child.index()].live = false;
            return Ok(());
        }
        self.link(parent, child);
        Ok(())
    }

    /// Detaches `node` and marks its whole subtree as removed.
    pub fn remove(&mut self, node: NodeId) -> Result<(), XmlError> {
        if node == NodeId::ROOT {
            return Err(XmlError::DocumentRoot);
        }
        self.live(node).ok_or(XmlError::UnknownNode(node))?;
        self.unlink(node);
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            let data = &mut self.nodes[id.index()];
            data.live = false;
            data.parent = None;
            pending.append(&mut data.children);
        }
        Ok(())
    }

    pub fn serialize(&self, options: &WriteOptions) -> String {
        write_document(self, options)
    }

    fn live(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index()).filter(|node| node.live)
    }

    fn live_mut(&mut self, id: NodeId) -> Result<&mut NodeData, XmlError> {
        self.nodes
            .get_mut(id.index())
            .filter(|node| node.live)
            .ok_or(XmlError::UnknownNode(id))
    }

    fn ensure_parent(&self, parent: NodeId) -> Result<(), XmlError> {
        let data = self.live(parent).ok_or(XmlError::UnknownNode(parent))?;
        if !data.kind.accepts_children() {
            return Err(XmlError::NotAParent(parent));
        }
        Ok(())
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind));
        id
    }

    fn leaf(&mut self, parent: NodeId, kind: NodeKind) -> Result<(), XmlError> {
        self.ensure_parent(parent)?;
        let id = self.push(kind);
        self.link(parent, id);
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    fn unlink(&mut self, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.index()].parent.take() {
            self.nodes[old_parent.index()]
                .children
                .retain(|&id| id != child);
        }
    }

    fn last_text_child(&self, parent: NodeId) -> Option<NodeId> {
        let last = *self.nodes[parent.index()].children.last()?;
        matches!(self.nodes[last.index()].kind, NodeKind::Text(_)).then_some(last)
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.nodes[node.index()].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn copy_subtree(&mut self, source: &XmlDocument, from: NodeId, parent: NodeId) {
        // Iterative to keep deep fragments off the call stack.
        let mut pending = vec![(from, parent)];
        while let Some((src, dst_parent)) = pending.pop() {
            let Some(data) = source.live(src) else {
                continue;
            };
            let id = self.push(data.kind.clone());
            self.link(dst_parent, id);
            for &child in data.children.iter().rev() {
                pending.push((child, id));
            }
        }
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize(&WriteOptions::default()))
    }
}
