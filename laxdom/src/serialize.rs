//! Serialization back to markup.
//!
//! Output mirrors what was scanned rather than HTML5 serialization rules:
//!
//! - Text is written raw, exactly as stored (entities stay encoded)
//! - Attributes are written as their raw attribute string
//! - Void elements never get end tags
//! - The document node writes only its children

use indextree::NodeId;
use std::fmt::Write;

use crate::arena_dom::{Document, NodeKind};
use crate::tags;

/// Quote an attribute value for a regenerated attribute string.
///
/// Double quotes become `&quot;`, then the value is written as a JSON string
/// literal.
pub fn quote_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

struct Serializer<'a, W: Write> {
    doc: &'a Document,
    out: &'a mut W,
}

impl<'a, W: Write> Serializer<'a, W> {
    fn new(doc: &'a Document, out: &'a mut W) -> Self {
        Self { doc, out }
    }

    fn write_children(&mut self, id: NodeId) {
        for child in id.children(&self.doc.arena) {
            self.write_node(child);
        }
    }

    fn write_node(&mut self, id: NodeId) {
        match &self.doc.get(id).kind {
            NodeKind::Document => self.write_children(id),
            NodeKind::Element(element) => {
                let tag = element.raw_tag_name();
                let _ = write!(self.out, "<{tag}");
                if !element.raw_attrs().is_empty() {
                    let _ = write!(self.out, " {}", element.raw_attrs());
                }
                let _ = write!(self.out, ">");
                if tags::is_void_element(tag) {
                    return;
                }
                self.write_children(id);
                let _ = write!(self.out, "</{tag}>");
            }
            NodeKind::Text(text) => {
                let _ = write!(self.out, "{}", text.raw_text());
            }
            NodeKind::Comment(body) => {
                let _ = write!(self.out, "<!--{body}-->");
            }
        }
    }
}

impl Document {
    /// Markup of the node itself and everything below it.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        Serializer::new(self, &mut out).write_node(id);
        out
    }

    /// Markup of the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        Serializer::new(self, &mut out).write_children(id);
        out
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.outer_html(self.root)
    }

    /// Write the markup of `id` into any [`std::fmt::Write`] sink.
    pub fn write_html<W: Write>(&self, id: NodeId, out: &mut W) {
        Serializer::new(self, out).write_node(id);
    }
}
