use crate::{NodeId, XmlDocument, XmlError};
use std::fmt;

/// Output sink contract for renderers.
///
/// Node handles are cheap copies; the sink owns every node. Renderers write
/// through these operations only and never hold on to sink internals.
pub trait XmlSink {
    type Node: Copy + Eq + fmt::Debug + 'static;

    fn root(&self) -> Self::Node;

    fn element(&mut self, parent: Self::Node, name: &str) -> Result<Self::Node, XmlError>;

    fn attribute(&mut self, node: Self::Node, name: &str, value: &str) -> Result<(), XmlError>;

    fn text(&mut self, parent: Self::Node, text: &str) -> Result<(), XmlError>;

    fn comment(&mut self, parent: Self::Node, text: &str) -> Result<(), XmlError>;

    fn cdata(&mut self, parent: Self::Node, text: &str) -> Result<(), XmlError>;

    fn instruction(
        &mut self,
        parent: Self::Node,
        target: &str,
        content: &str,
    ) -> Result<(), XmlError>;

    /// Imports the top-level nodes of an already-built document.
    fn import(&mut self, parent: Self::Node, fragment: &XmlDocument) -> Result<(), XmlError>;

    /// Creates a node that is not attached anywhere yet.
    fn detached(&mut self) -> Self::Node;

    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Moves `child` to the end of `parent`'s children.
    fn append(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), XmlError>;

    fn remove(&mut self, node: Self::Node) -> Result<(), XmlError>;
}

impl XmlSink for XmlDocument {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    fn element(&mut self, parent: NodeId, name: &str) -> Result<NodeId, XmlError> {
        XmlDocument::element(self, parent, name)
    }

    fn attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), XmlError> {
        XmlDocument::attribute(self, node, name, value)
    }

    fn text(&mut self, parent: NodeId, text: &str) -> Result<(), XmlError> {
        XmlDocument::text(self, parent, text)
    }

    fn comment(&mut self, parent: NodeId, text: &str) -> Result<(), XmlError> {
        XmlDocument::comment(self, parent, text)
    }

    fn cdata(&mut self, parent: NodeId, text: &str) -> Result<(), XmlError> {
        XmlDocument::cdata(self, parent, text)
    }

    fn instruction(&mut self, parent: NodeId, target: &str, content: &str) -> Result<(), XmlError> {
        XmlDocument::instruction(self, parent, target, content)
    }

    fn import(&mut self, parent: NodeId, fragment: &XmlDocument) -> Result<(), XmlError> {
        XmlDocument::import(self, parent, fragment)
    }

    fn detached(&mut self) -> NodeId {
        XmlDocument::detached(self)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        XmlDocument::children(self, node).to_vec()
    }

    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), XmlError> {
        XmlDocument::append(self, parent, child)
    }

    fn remove(&mut self, node: NodeId) -> Result<(), XmlError> {
        XmlDocument::remove(self, node)
    }
}
