//! Element trees in JSON form.
//!
//! Objects have the shape `{"type": ..., "props": {...}, "key": ..., "ref": ...}`
//! where `props.children` holds the children. `type` is a tag name, one of the
//! reserved names `#fragment`, `#comment`, `#cdata` and `#instruction`, or
//! `{"class": "Name"}` for a class component (always rejected). Strings,
//! numbers, booleans, null and arrays map to the matching primitive nodes.

use super::ForeignElement;
use crate::builtin::{Builtin, fragment};
use crate::element::{AttrValue, Attributes, ComponentElement, TagElement, tag};
use crate::error::{RenderError, truncate_description};
use crate::node::Node;
use serde_json::{Map, Value};

impl ForeignElement for Value {
    fn to_node(&self) -> Result<Node, RenderError> {
        from_json(self)
    }

    fn describe(&self) -> String {
        let text = serde_json::to_string(self).unwrap_or_else(|_| "<json>".to_string());
        truncate_description(text)
    }
}

/// Converts one level of a JSON tree; nested elements convert lazily, when
/// an engine reaches them.
pub fn from_json(value: &Value) -> Result<Node, RenderError> {
    match value {
        Value::Null => Ok(Node::Empty),
        Value::Bool(flag) => Ok(Node::Bool(*flag)),
        Value::Number(number) => number
            .as_f64()
            .map(Node::Number)
            .ok_or_else(|| RenderError::unsupported(value.describe())),
        Value::String(text) => Ok(Node::from(text.as_str())),
        Value::Array(items) => Ok(Node::list(items.iter().map(child_node))),
        Value::Object(object) => element(value, object),
    }
}

fn child_node(value: &Value) -> Node {
    match value {
        Value::Object(_) | Value::Array(_) => Node::foreign(value.clone()),
        // Primitives cannot fail to convert.
        other => from_json(other).unwrap_or_default(),
    }
}

fn element(value: &Value, object: &Map<String, Value>) -> Result<Node, RenderError> {
    let empty = Map::new();
    let props = match object.get("props") {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(props)) => props,
        Some(_) => return Err(RenderError::unsupported(value.describe())),
    };
    let children = props.get("children").map(child_node).unwrap_or_default();
    let key = object.get("key").map(attr_value).transpose()?.flatten();
    let reference = object.get("ref").map(attr_value).transpose()?.flatten();
    let mut attributes = Attributes::new();
    for (name, prop) in props {
        if name == "children" {
            continue;
        }
        if let Some(prop) = attr_value(prop)? {
            attributes.set(name.as_str(), prop);
        }
    }

    let element: ComponentElement = match object.get("type") {
        Some(Value::String(name)) => match name.as_str() {
            "#fragment" => fragment(children),
            "#comment" => Builtin::Comment.component().element().children(children),
            "#cdata" => Builtin::CData.component().element().children(children),
            "#instruction" => {
                let mut element = Builtin::Instruction.component().element();
                element.props = attributes;
                element
            }
            _ => {
                return Ok(TagElement {
                    key,
                    reference,
                    attributes,
                    children,
                    ..tag(name.as_str())
                }
                .into());
            }
        },
        Some(Value::Object(kind)) => match kind.get("class") {
            Some(Value::String(class)) => {
                return Err(RenderError::UnsupportedComponentKind(class.clone()));
            }
            _ => return Err(RenderError::unsupported(value.describe())),
        },
        _ => return Err(RenderError::unsupported(value.describe())),
    };
    Ok(element.into())
}

fn attr_value(value: &Value) -> Result<Option<AttrValue>, RenderError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(AttrValue::Bool(*flag))),
        Value::String(text) => Ok(Some(AttrValue::from(text.as_str()))),
        Value::Number(number) => match number.as_i64() {
            Some(int) => Ok(Some(AttrValue::Integer(int))),
            None => number
                .as_f64()
                .map(|float| Some(AttrValue::Float(float)))
                .ok_or_else(|| RenderError::unsupported(value.describe())),
        },
        Value::Array(_) | Value::Object(_) => Err(RenderError::unsupported(value.describe())),
    }
}
