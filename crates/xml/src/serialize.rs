//! Text serialization of [`XmlDocument`].
//!
//! Compact output concatenates nodes without whitespace. Pretty output puts
//! every node on its own line, indented by depth, except that an element whose
//! children are all text stays on one line.

use crate::document::{NodeId, NodeKind, XmlDocument};
use crate::escape::{escape_attribute_into, escape_text_into};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Omit the `<?xml ...?>` declaration.
    pub headless: bool,
    pub pretty_print: bool,
    pub indent: String,
    pub newline: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            headless: false,
            pretty_print: false,
            indent: "  ".to_string(),
            newline: "\n".to_string(),
        }
    }
}

impl WriteOptions {
    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Self::default()
        }
    }

    pub fn pretty() -> Self {
        Self {
            pretty_print: true,
            ..Self::default()
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }
}

pub(crate) fn write_document(doc: &XmlDocument, options: &WriteOptions) -> String {
    let mut writer = Writer {
        doc,
        options,
        out: String::new(),
    };
    let mut first = true;
    if !options.headless {
        writer.declaration();
        first = false;
    }
    for &child in doc.children(doc.root()) {
        if options.pretty_print && !first {
            writer.out.push_str(&options.newline);
        }
        writer.node(child, 0);
        first = false;
    }
    writer.out
}

struct Writer<'a> {
    doc: &'a XmlDocument,
    options: &'a WriteOptions,
    out: String,
}

impl Writer<'_> {
    fn declaration(&mut self) {
        let doc_options = self.doc.options();
        self.out.push_str("<?xml version=\"");
        escape_attribute_into(&mut self.out, &doc_options.version);
        self.out.push('"');
        if let Some(encoding) = &doc_options.encoding {
            self.out.push_str(" encoding=\"");
            escape_attribute_into(&mut self.out, encoding);
            self.out.push('"');
        }
        if let Some(standalone) = doc_options.standalone {
            self.out.push_str(if standalone {
                " standalone=\"yes\""
            } else {
                " standalone=\"no\""
            });
        }
        self.out.push_str("?>");
    }

    fn indent(&mut self, depth: usize) {
        if self.options.pretty_print {
            for _ in 0..depth {
                self.out.push_str(&self.options.indent);
            }
        }
    }

    fn node(&mut self, id: NodeId, depth: usize) {
        self.indent(depth);
        self.inline(id, depth);
    }

    /// Writes `id` at the current position, without leading indentation.
    fn inline(&mut self, id: NodeId, depth: usize) {
        let doc = self.doc;
        let Some(kind) = doc.kind(id) else {
            return;
        };
        match kind {
            NodeKind::Element { name, attributes } => {
                self.out.push('<');
                self.out.push_str(name);
                for (key, value) in attributes {
                    self.out.push(' ');
                    self.out.push_str(key);
                    self.out.push_str("=\"");
                    escape_attribute_into(&mut self.out, value);
                    self.out.push('"');
                }
                let children = doc.children(id);
                if children.is_empty() {
                    self.out.push_str("/>");
                    return;
                }
                self.out.push('>');
                self.children(children, depth);
                self.out.push_str("</");
                self.out.push_str(name);
                self.out.push('>');
            }
            NodeKind::Text(text) => escape_text_into(&mut self.out, text),
            NodeKind::Comment(text) => {
                self.out.push_str("<!--");
                self.out.push_str(text);
                self.out.push_str("-->");
            }
            NodeKind::CData(text) => {
                self.out.push_str("<![CDATA[");
                self.out.push_str(text);
                self.out.push_str("]]>");
            }
            NodeKind::Instruction { target, content } => {
                self.out.push_str("<?");
                self.out.push_str(target);
                if !content.is_empty() {
                    self.out.push(' ');
                    self.out.push_str(content);
                }
                self.out.push_str("?>");
            }
            NodeKind::Document | NodeKind::Buffer => {
                for &child in doc.children(id) {
                    self.inline(child, depth);
                }
            }
        }
    }

    fn children(&mut self, children: &[NodeId], depth: usize) {
        let all_text = children
            .iter()
            .all(|&child| matches!(self.doc.kind(child), Some(NodeKind::Text(_))));
        if !self.options.pretty_print || all_text {
            for &child in children {
                self.inline(child, depth + 1);
            }
            return;
        }
        for &child in children {
            self.out.push_str(&self.options.newline);
            self.node(child, depth + 1);
        }
        self.out.push_str(&self.options.newline);
        self.indent(depth);
    }
}
