//! Synchronous render engine.
//!
//! Walks the tree depth-first and writes straight into the sink. Pending
//! computations cannot be waited on here and are rejected; use
//! [`crate::render_async`] for trees that contain them.

use crate::context::ContextSnapshot;
use crate::cursor::CursorStack;
use crate::element::{ComponentElement, ComponentKind, Element, TagElement};
use crate::error::RenderError;
use crate::node::{Node, format_number};
use xml::{DocumentOptions, XmlDocument, XmlSink};

/// Per-render configuration shared by both engines.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    pub document: DocumentOptions,
    /// Start from the context visible to the component that is currently
    /// running, instead of the declared defaults. Used for renders nested
    /// inside a component.
    pub inherit_context: bool,
}

impl RenderOptions {
    pub fn inheriting() -> Self {
        RenderOptions {
            inherit_context: true,
            ..Self::default()
        }
    }

    pub(crate) fn initial_context(&self) -> ContextSnapshot {
        if self.inherit_context {
            ContextSnapshot::current()
        } else {
            ContextSnapshot::seeded()
        }
    }
}

/// Renders `node` into a new document.
pub fn render(node: impl Into<Node>) -> Result<XmlDocument, RenderError> {
    render_with(node, &RenderOptions::default())
}

pub fn render_with(
    node: impl Into<Node>,
    options: &RenderOptions,
) -> Result<XmlDocument, RenderError> {
    let mut doc = XmlDocument::with_options(options.document.clone());
    render_into(&mut doc, &node.into(), options.initial_context())?;
    Ok(doc)
}

/// Renders `node` under the root of an existing sink.
pub fn render_into<S: XmlSink>(
    sink: &mut S,
    node: &Node,
    context: ContextSnapshot,
) -> Result<(), RenderError> {
    let mut cursor = CursorStack::with_root(sink.root());
    log::trace!(target: "jsx.render", "render {}", node.describe());
    Renderer { sink }.node(node, &mut cursor, &context)
}

struct Renderer<'s, S> {
    sink: &'s mut S,
}

impl<S: XmlSink> Renderer<'_, S> {
    fn node(
        &mut self,
        node: &Node,
        cursor: &mut CursorStack<S::Node>,
        context: &ContextSnapshot,
    ) -> Result<(), RenderError> {
        match node {
            Node::Empty | Node::Bool(_) => Ok(()),
            Node::Text(text) => Ok(self.sink.text(cursor.current()?, text)?),
            Node::Number(value) => Ok(self.sink.text(cursor.current()?, &format_number(*value))?),
            Node::List(items) => {
                for item in items.iter() {
                    self.node(item, cursor, context)?;
                }
                Ok(())
            }
            Node::Element(element) => match &**element {
                Element::Tag(tag) => self.tag(tag, cursor, context),
                Element::Component(component) => self.component(component, cursor, context),
            },
            Node::Document(fragment) => Ok(self.sink.import(cursor.current()?, fragment)?),
            Node::Foreign(foreign) => {
                let converted = foreign.to_node()?;
                self.node(&converted, cursor, context)
            }
            Node::Pending(_) => Err(RenderError::unsupported(
                "pending computation (render it with render_async)",
            )),
        }
    }

    fn tag(
        &mut self,
        tag: &TagElement,
        cursor: &mut CursorStack<S::Node>,
        context: &ContextSnapshot,
    ) -> Result<(), RenderError> {
        let element = tag.open(self.sink, cursor.current()?)?;
        if tag.children.is_empty() {
            return Ok(());
        }
        cursor.scoped(element, |cursor| self.node(&tag.children, cursor, context))
    }

    fn component(
        &mut self,
        element: &ComponentElement,
        cursor: &mut CursorStack<S::Node>,
        context: &ContextSnapshot,
    ) -> Result<(), RenderError> {
        match element.component.kind() {
            ComponentKind::Builtin(builtin) => builtin.emit(element, self.sink, cursor.current()?),
            ComponentKind::Fragment => self.node(&element.children, cursor, context),
            ComponentKind::Provider { key, value } => {
                let scoped = context.with_value(*key, value.clone());
                self.node(&element.children, cursor, &scoped)
            }
            ComponentKind::Function(render) => {
                log::trace!(target: "jsx.render", "call component {}", element.component.name());
                let props = element.props_for(context.clone());
                let result = context.enter(|| render(props))?;
                self.node(&result, cursor, context)
            }
        }
    }
}
