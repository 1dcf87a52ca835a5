//! Element shapes produced outside this crate.
//!
//! A foreign element converts itself into a native [`Node`] when an engine
//! reaches it. Two adapters ship here: [`HostElement`], modeled on the
//! element objects of component-based UI libraries, and `serde_json::Value`
//! for trees that arrive as JSON.

mod json;

pub use json::from_json;

use crate::builtin::fragment;
use crate::element::{AttrValue, Attributes, Component, ComponentElement, Element, TagElement};
use crate::error::RenderError;
use crate::node::Node;
use std::rc::Rc;

pub trait ForeignElement {
    fn to_node(&self) -> Result<Node, RenderError>;

    /// Bounded description used in error messages.
    fn describe(&self) -> String;
}

#[derive(Clone, Debug)]
pub enum HostType {
    Tag(Rc<str>),
    Function(Component),
    /// Class-style components cannot be rendered.
    Class(Rc<str>),
    Fragment,
    /// Wraps another type without changing how it renders.
    Memo(Box<HostType>),
    ForwardRef(Component),
}

#[derive(Clone, Debug)]
pub struct HostElement {
    pub host_type: HostType,
    pub props: Attributes,
    pub key: Option<AttrValue>,
    pub reference: Option<AttrValue>,
    pub children: Node,
}

impl HostElement {
    pub fn new(host_type: HostType) -> Self {
        HostElement {
            host_type,
            props: Attributes::new(),
            key: None,
            reference: None,
            children: Node::Empty,
        }
    }

    pub fn prop(mut self, name: impl Into<Rc<str>>, value: impl Into<AttrValue>) -> Self {
        self.props.set(name, value);
        self
    }

    pub fn key(mut self, key: impl Into<AttrValue>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<AttrValue>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children = self.children.appended(child.into());
        self
    }

    fn convert(&self, host_type: &HostType) -> Result<Node, RenderError> {
        match host_type {
            HostType::Tag(name) => Ok(Element::Tag(TagElement {
                name: name.clone(),
                key: self.key.clone(),
                reference: self.reference.clone(),
                attributes: self.props.clone(),
                children: self.children.clone(),
            })
            .into()),
            HostType::Function(component) | HostType::ForwardRef(component) => {
                Ok(Element::Component(ComponentElement {
                    component: component.clone(),
                    key: self.key.clone(),
                    reference: self.reference.clone(),
                    props: self.props.clone(),
                    children: self.children.clone(),
                })
                .into())
            }
            HostType::Class(name) => Err(RenderError::UnsupportedComponentKind(name.to_string())),
            HostType::Fragment => Ok(fragment(self.children.clone()).into()),
            HostType::Memo(inner) => self.convert(inner),
        }
    }
}

impl ForeignElement for HostElement {
    fn to_node(&self) -> Result<Node, RenderError> {
        self.convert(&self.host_type)
    }

    fn describe(&self) -> String {
        let mut host_type = &self.host_type;
        while let HostType::Memo(inner) = host_type {
            host_type = &**inner;
        }
        match host_type {
            HostType::Tag(name) => format!("host <{name}>"),
            HostType::Function(component) | HostType::ForwardRef(component) => {
                format!("host <{}>", component.name())
            }
            HostType::Class(name) => format!("host class {name}"),
            HostType::Fragment | HostType::Memo(_) => "host fragment".to_string(),
        }
    }
}

impl From<HostElement> for Node {
    fn from(element: HostElement) -> Self {
        Node::foreign(element)
    }
}
