//! Render declarative element trees to XML.
//!
//! ```
//! use jsx_xml::{WriteOptions, comment, render, tag};
//!
//! let doc = render(
//!     tag("root")
//!         .attr("version", 2)
//!         .child(comment("generated"))
//!         .child(tag("item").child("hello")),
//! )
//! .unwrap();
//! assert_eq!(
//!     doc.serialize(&WriteOptions::headless()),
//!     r#"<root version="2"><!--generated--><item>hello</item></root>"#
//! );
//! ```

pub use jsx::*;
pub use xml::{
    DocumentOptions, NodeId, NodeKind as XmlNodeKind, WriteOptions, XmlDocument, XmlError, XmlSink,
    is_valid_name,
};
