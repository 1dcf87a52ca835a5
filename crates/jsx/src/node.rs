//! Renderable values.
//!
//! A [`Node`] is whatever may appear as an element child or a component
//! result: primitives, elements, sequences, pre-built XML documents, foreign
//! element shapes, and pending computations that only the async engine can
//! resolve.

use crate::context::Scoped;
use crate::element::{ComponentKind, Element};
use crate::error::RenderError;
use crate::foreign::ForeignElement;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use xml::XmlDocument;

pub type PendingFuture = LocalBoxFuture<'static, Result<Node, RenderError>>;

/// A computation that eventually produces a [`Node`] or fails.
///
/// Clones share one evaluation: the underlying future runs at most once and
/// every clone observes the same outcome. The evaluation runs under the
/// context of the branch that polls it first, on every poll.
#[derive(Clone)]
pub struct Pending(Shared<PendingFuture>);

impl Pending {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<Node, RenderError>> + 'static,
    {
        Pending(Scoped::first_poll(future.boxed_local()).boxed_local().shared())
    }

    pub fn ready(node: impl Into<Node>) -> Self {
        Pending::new(futures::future::ready(Ok(node.into())))
    }

    pub fn failed(err: RenderError) -> Self {
        Pending::new(futures::future::ready(Err(err)))
    }

    pub(crate) fn into_future(self) -> Shared<PendingFuture> {
        self.0
    }
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pending")
    }
}

#[derive(Clone, Default)]
pub enum Node {
    /// Null-ish; renders nothing.
    #[default]
    Empty,
    /// Ignored by both engines.
    Bool(bool),
    Text(Rc<str>),
    Number(f64),
    Element(Rc<Element>),
    List(Rc<[Node]>),
    Pending(Pending),
    /// A pre-built document whose top-level nodes are imported.
    Document(Rc<XmlDocument>),
    Foreign(Rc<dyn ForeignElement>),
}

/// Classification of a [`Node`], as the engines dispatch on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Tag,
    Component,
    Builtin,
    Foreign,
    Document,
    Primitive,
    List,
    Pending,
    Nullish,
}

impl Node {
    pub fn text(text: impl Into<Rc<str>>) -> Self {
        Node::Text(text.into())
    }

    pub fn list(items: impl IntoIterator<Item = Node>) -> Self {
        Node::List(items.into_iter().collect())
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Node, RenderError>> + 'static,
    {
        Node::Pending(Pending::new(future))
    }

    pub fn foreign(element: impl ForeignElement + 'static) -> Self {
        Node::Foreign(Rc::new(element))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Empty | Node::Bool(_) => NodeKind::Nullish,
            Node::Text(_) | Node::Number(_) => NodeKind::Primitive,
            Node::Element(element) => match &**element {
                Element::Tag(_) => NodeKind::Tag,
                Element::Component(component) => match component.component.kind() {
                    ComponentKind::Builtin(_) => NodeKind::Builtin,
                    _ => NodeKind::Component,
                },
            },
            Node::List(_) => NodeKind::List,
            Node::Pending(_) => NodeKind::Pending,
            Node::Document(_) => NodeKind::Document,
            Node::Foreign(_) => NodeKind::Foreign,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Node::Empty => true,
            Node::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Appends `child` as a sibling after the current content.
    pub(crate) fn appended(self, child: Node) -> Node {
        match self {
            Node::Empty => child,
            Node::List(items) => {
                let mut items = items.to_vec();
                items.push(child);
                Node::List(items.into())
            }
            single => Node::List(Rc::from([single, child])),
        }
    }

    /// Short human-readable description, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Node::Empty => "null".to_string(),
            Node::Bool(value) => value.to_string(),
            Node::Text(text) => format!("{text:?}"),
            Node::Number(value) => format_number(*value),
            Node::Element(element) => match &**element {
                Element::Tag(tag) => format!("<{}>", tag.name),
                Element::Component(component) => format!("<{}>", component.component.name()),
            },
            Node::List(items) => format!("list of {} nodes", items.len()),
            Node::Pending(_) => "pending computation".to_string(),
            Node::Document(_) => "xml document".to_string(),
            Node::Foreign(foreign) => foreign.describe(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Empty => f.write_str("Empty"),
            Node::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Node::Number(value) => f.debug_tuple("Number").field(value).finish(),
            Node::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Node::List(items) => f.debug_list().entries(items.iter()).finish(),
            Node::Pending(pending) => fmt::Debug::fmt(pending, f),
            Node::Document(doc) => f.debug_tuple("Document").field(&doc.to_string()).finish(),
            Node::Foreign(foreign) => f.debug_tuple("Foreign").field(&foreign.describe()).finish(),
        }
    }
}

/// Formats a number the way text children print: integral values without a
/// fractional part, non-finite values by name.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        (if value > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if value == 0.0 {
        // Covers -0.0 as well.
        "0".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Concatenates the text content of `node` for comment and CDATA bodies.
///
/// Strings and numbers concatenate; nulls and booleans are skipped; sequences
/// are flattened. Anything else is rejected.
pub(crate) fn join_text(node: &Node) -> Result<String, RenderError> {
    let mut out = String::new();
    push_text(node, &mut out)?;
    Ok(out)
}

fn push_text(node: &Node, out: &mut String) -> Result<(), RenderError> {
    match node {
        Node::Empty | Node::Bool(_) => {}
        Node::Text(text) => out.push_str(text),
        Node::Number(value) => out.push_str(&format_number(*value)),
        Node::List(items) => {
            for item in items.iter() {
                push_text(item, out)?;
            }
        }
        Node::Foreign(foreign) => push_text(&foreign.to_node()?, out)?,
        other => return Err(RenderError::unsupported(other.describe())),
    }
    Ok(())
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.into())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text.into())
    }
}

impl From<Rc<str>> for Node {
    fn from(text: Rc<str>) -> Self {
        Node::Text(text)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<()> for Node {
    fn from((): ()) -> Self {
        Node::Empty
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::Number(value as f64)
                }
            }
        )*
    };
}

number_from!(f64, f32, i32, i64, u32, u64, usize);

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(Rc::new(element))
    }
}

impl From<XmlDocument> for Node {
    fn from(doc: XmlDocument) -> Self {
        Node::Document(Rc::new(doc))
    }
}

impl From<Rc<XmlDocument>> for Node {
    fn from(doc: Rc<XmlDocument>) -> Self {
        Node::Document(doc)
    }
}

impl From<Pending> for Node {
    fn from(pending: Pending) -> Self {
        Node::Pending(pending)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Empty, Into::into)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Node::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Node>, const N: usize> From<[T; N]> for Node {
    fn from(items: [T; N]) -> Self {
        Node::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Node>> FromIterator<T> for Node {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Node::List(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::comment;
    use crate::element::tag;

    #[test]
    fn numbers_print_without_spurious_fraction() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn join_text_flattens_and_skips_nullish() {
        let node = Node::from(vec![
            Node::from("a"),
            Node::Empty,
            Node::from(vec![Node::from(2), Node::from(true), Node::from("b")]),
        ]);
        assert_eq!(join_text(&node).unwrap(), "a2b");
    }

    #[test]
    fn join_text_converts_foreign_sequences() {
        let parts = Node::foreign(serde_json::json!(["<b>", 1, null, ["c"]]));
        assert_eq!(join_text(&parts).unwrap(), "<b>1c");

        let nested_tag = Node::foreign(serde_json::json!(["a", {"type": "x"}]));
        let err = join_text(&nested_tag).unwrap_err();
        assert_eq!(err.to_string(), "unsupported element type: <x>");
    }

    #[test]
    fn join_text_rejects_elements() {
        let err = join_text(&tag("x").into()).unwrap_err();
        assert_eq!(err.to_string(), "unsupported element type: <x>");
    }

    #[test]
    fn kinds_follow_the_dispatch_rules() {
        assert_eq!(Node::Empty.kind(), NodeKind::Nullish);
        assert_eq!(Node::from(false).kind(), NodeKind::Nullish);
        assert_eq!(Node::from(3).kind(), NodeKind::Primitive);
        assert_eq!(Node::from(tag("a")).kind(), NodeKind::Tag);
        assert_eq!(Node::from(comment("c")).kind(), NodeKind::Builtin);
        assert_eq!(Node::from(vec![1, 2]).kind(), NodeKind::List);
        assert_eq!(Node::from(Pending::ready("x")).kind(), NodeKind::Pending);
        assert_eq!(Node::from(XmlDocument::new()).kind(), NodeKind::Document);
    }

    #[test]
    fn appending_builds_sibling_lists() {
        let node = Node::Empty.appended("a".into());
        assert!(matches!(node, Node::Text(_)));
        let node = node.appended("b".into()).appended("c".into());
        let Node::List(items) = &node else {
            panic!("expected list, got {node:?}");
        };
        assert_eq!(items.len(), 3);
    }
}
