use crate::context::ContextKey;
use std::error::Error;
use std::fmt;
use std::rc::Rc;
use xml::XmlError;

const MAX_DESCRIPTION_CHARS: usize = 64;

/// Failure of a render, in either engine.
///
/// Failures raised by user components are carried unchanged in
/// [`RenderError::Component`]: their `Display` output and `source()` chain are
/// forwarded as-is, and [`RenderError::downcast_ref`] recovers the original.
#[derive(Clone, Debug)]
pub enum RenderError {
    /// A value the renderer does not know how to write, with a bounded
    /// description of it.
    UnsupportedElementType(String),
    /// A class-style foreign component, named.
    UnsupportedComponentKind(String),
    ContextNotFound(ContextKey),
    Component(Rc<dyn Error>),
    Xml(XmlError),
    EmptyCursorStack,
}

impl RenderError {
    /// Wraps a failure raised inside a user component.
    pub fn component<E: Error + 'static>(err: E) -> Self {
        RenderError::Component(Rc::new(err))
    }

    pub fn unsupported(description: impl Into<String>) -> Self {
        RenderError::UnsupportedElementType(truncate_description(description.into()))
    }

    /// Returns the component failure as its concrete type, if it is one.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            RenderError::Component(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnsupportedElementType(desc) => {
                write!(f, "unsupported element type: {desc}")
            }
            RenderError::UnsupportedComponentKind(name) => {
                write!(f, "class components are not supported: {name}")
            }
            RenderError::ContextNotFound(key) => write!(f, "context not found: {key}"),
            RenderError::Component(err) => fmt::Display::fmt(err, f),
            RenderError::Xml(err) => fmt::Display::fmt(err, f),
            RenderError::EmptyCursorStack => f.write_str("cursor stack is empty"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RenderError::Component(err) => err.source(),
            RenderError::Xml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<XmlError> for RenderError {
    fn from(err: XmlError) -> Self {
        RenderError::Xml(err)
    }
}

pub(crate) fn truncate_description(description: String) -> String {
    match description.char_indices().nth(MAX_DESCRIPTION_CHARS) {
        Some((cut, _)) => {
            let mut short = description[..cut].to_string();
            short.push_str("...");
            short
        }
        None => description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Async component error")
        }
    }

    impl Error for Boom {}

    #[test]
    fn component_failures_keep_their_message_and_type() {
        let err = RenderError::component(Boom);
        assert_eq!(err.to_string(), "Async component error");
        assert!(err.downcast_ref::<Boom>().is_some());
        assert!(err.clone().downcast_ref::<Boom>().is_some());
        assert!(RenderError::EmptyCursorStack.downcast_ref::<Boom>().is_none());
    }

    #[test]
    fn descriptions_are_bounded() {
        let err = RenderError::unsupported("x".repeat(200));
        let RenderError::UnsupportedElementType(desc) = &err else {
            panic!("unexpected variant: {err:?}");
        };
        assert_eq!(desc.chars().count(), MAX_DESCRIPTION_CHARS + 3);
        assert!(desc.ends_with("..."));
        assert_eq!(truncate_description("short".into()), "short");
    }

    #[test]
    fn xml_errors_convert_and_chain() {
        let err: RenderError = XmlError::InvalidName("1a".into()).into();
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "invalid XML name: \"1a\"");
    }
}
