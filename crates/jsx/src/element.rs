use crate::builtin::Builtin;
use crate::context::{ContextKey, ContextSnapshot, ContextValue};
use crate::error::RenderError;
use crate::node::{Node, Pending, format_number};
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use xml::XmlSink;

/// Attribute and prop values.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Text(Rc<str>),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(text) => f.write_str(text),
            AttrValue::Integer(value) => write!(f, "{value}"),
            AttrValue::Float(value) => f.write_str(&format_number(*value)),
            AttrValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(text: &str) -> Self {
        AttrValue::Text(text.into())
    }
}

impl From<String> for AttrValue {
    fn from(text: String) -> Self {
        AttrValue::Text(text.into())
    }
}

impl From<Rc<str>> for AttrValue {
    fn from(text: Rc<str>) -> Self {
        AttrValue::Text(text)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

macro_rules! integer_attr_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(value: $ty) -> Self {
                    AttrValue::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_attr_from!(i32, i64, u32, u8);

macro_rules! wide_attr_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AttrValue {
                /// Values beyond `i64` keep their exact digits as text.
                fn from(value: $ty) -> Self {
                    i64::try_from(value)
                        .map(AttrValue::Integer)
                        .unwrap_or_else(|_| AttrValue::Text(value.to_string().into()))
                }
            }
        )*
    };
}

wide_attr_from!(u64, usize);

/// Ordered attribute list with unique names.
///
/// Setting an existing name replaces its value in place, so declaration order
/// is the output order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(Rc<str>, AttrValue)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<Rc<str>>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(existing, _)| &**existing == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(name, value)| (&**name, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<Rc<str>>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}

#[derive(Clone, Debug)]
pub enum Element {
    Tag(TagElement),
    Component(ComponentElement),
}

/// An XML element with a tag name.
///
/// `key` and `reference` are ordinary attributes on output, written first
/// (`key`, then `ref`) ahead of the declared attributes.
#[derive(Clone, Debug)]
pub struct TagElement {
    pub name: Rc<str>,
    pub key: Option<AttrValue>,
    pub reference: Option<AttrValue>,
    pub attributes: Attributes,
    pub children: Node,
}

pub fn tag(name: impl Into<Rc<str>>) -> TagElement {
    TagElement {
        name: name.into(),
        key: None,
        reference: None,
        attributes: Attributes::new(),
        children: Node::Empty,
    }
}

impl TagElement {
    pub fn attr(mut self, name: impl Into<Rc<str>>, value: impl Into<AttrValue>) -> Self {
        self.attributes.set(name, value);
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

    /// Replaces all children.
    pub fn children(mut self, children: impl Into<Node>) -> Self {
        self.children = children.into();
        self
    }

    /// Attributes in output order.
    pub fn output_attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        let key = self.key.as_ref().map(|value| ("key", value));
        let reference = self.reference.as_ref().map(|value| ("ref", value));
        key.into_iter()
            .chain(reference)
            .chain(self.attributes.iter())
    }

    pub(crate) fn open<S: XmlSink>(
        &self,
        sink: &mut S,
        parent: S::Node,
    ) -> Result<S::Node, RenderError> {
        let element = sink.element(parent, &self.name)?;
        for (name, value) in self.output_attributes() {
            sink.attribute(element, name, &value.to_string())?;
        }
        Ok(element)
    }
}

impl From<TagElement> for Node {
    fn from(tag: TagElement) -> Self {
        Node::from(Element::Tag(tag))
    }
}

pub type ComponentFn = dyn Fn(Props) -> Result<Node, RenderError>;

/// A named unit that the engines expand.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    kind: ComponentKind,
}

#[derive(Clone)]
pub enum ComponentKind {
    /// User code: props in, node (possibly pending) out.
    Function(Rc<ComponentFn>),
    /// Renders its children directly into the parent.
    Fragment,
    /// Binds a context value for its subtree.
    Provider { key: ContextKey, value: ContextValue },
    Builtin(Builtin),
}

impl Component {
    pub fn new<F>(name: impl Into<Rc<str>>, render: F) -> Self
    where
        F: Fn(Props) -> Result<Node, RenderError> + 'static,
    {
        Component {
            name: name.into(),
            kind: ComponentKind::Function(Rc::new(render)),
        }
    }

    pub(crate) fn with_kind(name: impl Into<Rc<str>>, kind: ComponentKind) -> Self {
        Component {
            name: name.into(),
            kind,
        }
    }

    pub fn fragment() -> Self {
        Component::with_kind("Fragment", ComponentKind::Fragment)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Starts an element that instantiates this component.
    pub fn element(&self) -> ComponentElement {
        ComponentElement {
            component: self.clone(),
            key: None,
            reference: None,
            props: Attributes::new(),
            children: Node::Empty,
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            ComponentKind::Function(_) => "function",
            ComponentKind::Fragment => "fragment",
            ComponentKind::Provider { .. } => "provider",
            ComponentKind::Builtin(_) => "builtin",
        };
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

/// Declares a synchronous component.
pub fn component<F>(name: impl Into<Rc<str>>, render: F) -> Component
where
    F: Fn(Props) -> Result<Node, RenderError> + 'static,
{
    Component::new(name, render)
}

/// Declares a component whose result is computed asynchronously.
///
/// Elements of such components render only through the async engine.
pub fn async_component<F, Fut>(name: impl Into<Rc<str>>, render: F) -> Component
where
    F: Fn(Props) -> Fut + 'static,
    Fut: Future<Output = Result<Node, RenderError>> + 'static,
{
    Component::new(name, move |props| Ok(Node::Pending(Pending::new(render(props)))))
}

#[derive(Clone, Debug)]
pub struct ComponentElement {
    pub component: Component,
    pub key: Option<AttrValue>,
    pub reference: Option<AttrValue>,
    pub props: Attributes,
    pub children: Node,
}

impl ComponentElement {
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

    pub fn children(mut self, children: impl Into<Node>) -> Self {
        self.children = children.into();
        self
    }

    pub(crate) fn props_for(&self, context: ContextSnapshot) -> Props {
        Props {
            values: self.props.clone(),
            key: self.key.clone(),
            reference: self.reference.clone(),
            children: self.children.clone(),
            context,
        }
    }
}

impl From<ComponentElement> for Node {
    fn from(element: ComponentElement) -> Self {
        Node::from(Element::Component(element))
    }
}

/// What a function component receives.
#[derive(Clone)]
pub struct Props {
    values: Attributes,
    key: Option<AttrValue>,
    reference: Option<AttrValue>,
    children: Node,
    context: ContextSnapshot,
}

impl Props {
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> &Attributes {
        &self.values
    }

    pub fn key(&self) -> Option<&AttrValue> {
        self.key.as_ref()
    }

    pub fn reference(&self) -> Option<&AttrValue> {
        self.reference.as_ref()
    }

    pub fn children(&self) -> Node {
        self.children.clone()
    }

    /// The context visible to this component instance.
    pub fn context(&self) -> &ContextSnapshot {
        &self.context
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("values", &self.values)
            .field("key", &self.key)
            .field("reference", &self.reference)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
