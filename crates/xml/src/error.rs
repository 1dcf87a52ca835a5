use crate::NodeId;
use std::fmt;

/// Well-formedness and arena errors reported by [`crate::XmlDocument`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlError {
    InvalidName(String),
    InvalidComment(String),
    InvalidCData(String),
    InvalidInstruction { target: String, content: String },
    UnknownNode(NodeId),
    NotAParent(NodeId),
    NotAnElement(NodeId),
    Cycle { parent: NodeId, child: NodeId },
    DocumentRoot,
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlError::InvalidName(name) => write!(f, "invalid XML name: {name:?}"),
            XmlError::InvalidComment(text) => {
                write!(f, "comment text must not contain \"--\" or end in '-': {text:?}")
            }
            XmlError::InvalidCData(text) => {
                write!(f, "CDATA text must not contain \"]]>\": {text:?}")
            }
            XmlError::InvalidInstruction { target, content } => write!(
                f,
                "invalid processing instruction: target={target:?} content={content:?}"
            ),
            XmlError::UnknownNode(id) => write!(f, "unknown or removed node: {id:?}"),
            XmlError::NotAParent(id) => write!(f, "node cannot have children: {id:?}"),
            XmlError::NotAnElement(id) => write!(f, "node is not an element: {id:?}"),
            XmlError::Cycle { parent, child } => write!(
                f,
                "appending {child:?} under {parent:?} would create a cycle"
            ),
            XmlError::DocumentRoot => f.write_str("the document root cannot be moved or removed"),
        }
    }
}

impl std::error::Error for XmlError {}
