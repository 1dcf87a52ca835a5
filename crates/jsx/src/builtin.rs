//! Comment, CDATA and processing-instruction components.

use crate::element::{Component, ComponentElement, ComponentKind};
use crate::error::RenderError;
use crate::node::{Node, join_text};
use xml::XmlSink;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    /// `<!--children-->`
    Comment,
    /// `<![CDATA[children]]>`
    CData,
    /// `<?target content?>`
    Instruction,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Comment => "Comment",
            Builtin::CData => "CData",
            Builtin::Instruction => "Instruction",
        }
    }

    pub fn component(self) -> Component {
        Component::with_kind(self.name(), ComponentKind::Builtin(self))
    }

    /// Writes the node for `element` under `at`.
    pub(crate) fn emit<S: XmlSink>(
        self,
        element: &ComponentElement,
        sink: &mut S,
        at: S::Node,
    ) -> Result<(), RenderError> {
        match self {
            Builtin::Comment => sink.comment(at, &join_text(&element.children)?)?,
            Builtin::CData => sink.cdata(at, &join_text(&element.children)?)?,
            Builtin::Instruction => {
                let target = element
                    .props
                    .get("target")
                    .ok_or_else(|| {
                        RenderError::unsupported("processing instruction without a target")
                    })?
                    .to_string();
                let content = element
                    .props
                    .get("content")
                    .map(ToString::to_string)
                    .unwrap_or_default();
                sink.instruction(at, &target, &content)?;
            }
        }
        Ok(())
    }
}

pub fn comment(text: impl Into<Node>) -> ComponentElement {
    Builtin::Comment.component().element().children(text)
}

pub fn cdata(text: impl Into<Node>) -> ComponentElement {
    Builtin::CData.component().element().children(text)
}

/// A processing instruction; empty `content` writes `<?target?>`.
pub fn instruction(target: &str, content: &str) -> ComponentElement {
    Builtin::Instruction
        .component()
        .element()
        .prop("target", target)
        .prop("content", content)
}

/// Groups children without a wrapping element.
pub fn fragment(children: impl Into<Node>) -> ComponentElement {
    Component::fragment().element().children(children)
}
