//! XML output documents.
//!
//! The renderer never owns output nodes itself: it writes through the
//! [`XmlSink`] contract, and [`XmlDocument`] is the arena-backed sink used by
//! default. Documents serialize with [`XmlDocument::serialize`].

mod document;
mod error;
mod escape;
mod names;
mod serialize;
mod sink;

pub use crate::document::{DocumentOptions, NodeId, NodeKind, XmlDocument};
pub use crate::error::XmlError;
pub use crate::names::is_valid_name;
pub use crate::serialize::WriteOptions;
pub use crate::sink::XmlSink;
