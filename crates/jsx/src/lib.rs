//! Declarative element trees rendered to XML.
//!
//! Trees are built from [`tag`] elements, components, built-ins, and
//! primitive values, then written into an [`xml::XmlSink`] by one of two
//! engines: [`render`] walks the tree synchronously, and [`render_async`]
//! additionally resolves pending computations, running sibling subtrees
//! concurrently while keeping output in declaration order.
//!
//! Context values bound by a provider are visible to every component below
//! it, across suspensions, and never leak into sibling branches or into
//! other renders running at the same time.

mod builtin;
mod context;
mod cursor;
mod element;
mod error;
mod foreign;
mod node;
mod render;
mod render_async;

pub use crate::builtin::{Builtin, cdata, comment, fragment, instruction};
pub use crate::context::{
    Context, ContextKey, ContextSnapshot, ContextValue, declare_context, read_context,
};
pub use crate::cursor::CursorStack;
pub use crate::element::{
    AttrValue, Attributes, Component, ComponentElement, ComponentFn, ComponentKind, Element,
    Props, TagElement, async_component, component, tag,
};
pub use crate::error::RenderError;
pub use crate::foreign::{ForeignElement, HostElement, HostType, from_json};
pub use crate::node::{Node, NodeKind, Pending, PendingFuture, format_number};
pub use crate::render::{RenderOptions, render, render_into, render_with};
pub use crate::render_async::{render_async, render_async_into, render_async_with};
