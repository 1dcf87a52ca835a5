//! Asynchronous render engine.
//!
//! Same tree semantics as the synchronous engine, plus pending computations.
//! A pending value moves from pending to evaluating when its branch first
//! polls it, and settles as either a node (rendered in place) or a failure
//! (which fails the whole render).
//!
//! Children of a sequence run concurrently. Each child writes into its own
//! detached buffer node through its own cursor copy; once every child has
//! settled, the buffers' contents are moved into the parent in declaration
//! order and the buffers are removed. Output order therefore never depends on
//! completion order.
//!
//! The engine is single-threaded: the sink sits in a `RefCell` that is only
//! borrowed inside synchronous write segments, never across an await.

use crate::context::{ContextSnapshot, Scoped};
use crate::cursor::CursorStack;
use crate::element::{ComponentElement, ComponentKind, Element, TagElement};
use crate::error::RenderError;
use crate::node::{Node, format_number};
use crate::render::RenderOptions;
use futures::future::{FutureExt, LocalBoxFuture, try_join_all};
use std::cell::RefCell;
use std::rc::Rc;
use xml::{XmlDocument, XmlSink};

pub async fn render_async(node: impl Into<Node>) -> Result<XmlDocument, RenderError> {
    render_async_with(node, &RenderOptions::default()).await
}

pub async fn render_async_with(
    node: impl Into<Node>,
    options: &RenderOptions,
) -> Result<XmlDocument, RenderError> {
    let doc = XmlDocument::with_options(options.document.clone());
    render_async_into(doc, node.into(), options.initial_context()).await
}

/// Renders `node` under the root of `sink` and hands the sink back.
pub async fn render_async_into<S: XmlSink>(
    sink: S,
    node: Node,
    context: ContextSnapshot,
) -> Result<S, RenderError> {
    let sink = RefCell::new(sink);
    {
        let renderer = AsyncRenderer { sink: &sink };
        let cursor = CursorStack::with_root(renderer.write(|sink| Ok(sink.root()))?);
        log::trace!(target: "jsx.render_async", "render {}", node.describe());
        renderer.node(node, cursor, context).await?;
    }
    Ok(sink.into_inner())
}

struct AsyncRenderer<'s, S> {
    sink: &'s RefCell<S>,
}

impl<S> Clone for AsyncRenderer<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for AsyncRenderer<'_, S> {}

impl<'s, S: XmlSink + 's> AsyncRenderer<'s, S> {
    /// Runs one synchronous write segment against the sink.
    fn write<R>(self, f: impl FnOnce(&mut S) -> Result<R, RenderError>) -> Result<R, RenderError> {
        f(&mut self.sink.borrow_mut())
    }

    fn node(
        self,
        node: Node,
        cursor: CursorStack<S::Node>,
        context: ContextSnapshot,
    ) -> LocalBoxFuture<'s, Result<(), RenderError>> {
        async move {
            match node {
                Node::Empty | Node::Bool(_) => Ok(()),
                Node::Text(text) => self.write(|sink| Ok(sink.text(cursor.current()?, &text)?)),
                Node::Number(value) => self.write(|sink| {
                    Ok(sink.text(cursor.current()?, &format_number(value))?)
                }),
                Node::List(items) => self.sequence(items, cursor, context).await,
                Node::Element(element) => match &*element {
                    Element::Tag(tag) => self.tag(tag, cursor, context).await,
                    Element::Component(component) => {
                        self.component(component, cursor, context).await
                    }
                },
                Node::Document(fragment) => {
                    self.write(|sink| Ok(sink.import(cursor.current()?, &fragment)?))
                }
                Node::Foreign(foreign) => {
                    let converted = foreign.to_node()?;
                    self.node(converted, cursor, context).await
                }
                Node::Pending(pending) => {
                    let settled = Scoped::new(context.clone(), pending.into_future()).await?;
                    self.node(settled, cursor, context).await
                }
            }
        }
        .boxed_local()
    }

    async fn tag(
        self,
        tag: &TagElement,
        cursor: CursorStack<S::Node>,
        context: ContextSnapshot,
    ) -> Result<(), RenderError> {
        let element = self.write(|sink| tag.open(sink, cursor.current()?))?;
        if tag.children.is_empty() {
            return Ok(());
        }
        self.node(tag.children.clone(), cursor.pushed(element), context)
            .await
    }

    async fn component(
        self,
        element: &ComponentElement,
        cursor: CursorStack<S::Node>,
        context: ContextSnapshot,
    ) -> Result<(), RenderError> {
        match element.component.kind() {
            ComponentKind::Builtin(builtin) => {
                self.write(|sink| builtin.emit(element, sink, cursor.current()?))
            }
            ComponentKind::Fragment => self.node(element.children.clone(), cursor, context).await,
            ComponentKind::Provider { key, value } => {
                let scoped = context.with_value(*key, value.clone());
                self.node(element.children.clone(), cursor, scoped).await
            }
            ComponentKind::Function(render) => {
                log::trace!(
                    target: "jsx.render_async",
                    "call component {}",
                    element.component.name()
                );
                let props = element.props_for(context.clone());
                let result = context.enter(|| render(props))?;
                self.node(result, cursor, context).await
            }
        }
    }

    async fn sequence(
        self,
        items: Rc<[Node]>,
        cursor: CursorStack<S::Node>,
        context: ContextSnapshot,
    ) -> Result<(), RenderError> {
        match &*items {
            [] => return Ok(()),
            [single] => return self.node(single.clone(), cursor, context).await,
            _ => {}
        }
        let parent = cursor.current()?;
        let buffers = self.write(|sink| {
            Ok(items.iter().map(|_| sink.detached()).collect::<Vec<_>>())
        })?;
        let branches = items.iter().zip(&buffers).map(|(item, &buffer)| {
            self.node(item.clone(), cursor.pushed(buffer), context.clone())
        });
        try_join_all(branches).await?;

        log::trace!(
            target: "jsx.render_async",
            "splice {} branches into {parent:?}",
            buffers.len()
        );
        self.write(|sink| {
            for buffer in buffers {
                for child in sink.children(buffer) {
                    sink.append(parent, child)?;
                }
                sink.remove(buffer)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests;
