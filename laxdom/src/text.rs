//! Text nodes and the text-extraction algorithms.
//!
//! Text is stored raw, exactly as scanned (entities still encoded). Decoding
//! only happens in the accessors that promise decoded text.

use indextree::NodeId;
use regex::Regex;
use std::cell::OnceCell;
use std::sync::LazyLock;

use crate::arena_dom::{Document, NodeKind};
use crate::tags;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"));

/// Decode HTML entities.
pub fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Trim `text`, keeping a single space on a side whose adjacent whitespace is
/// not a line break. Text with no visible characters is returned unchanged.
pub(crate) fn trim_text(text: &str) -> String {
    let Some(start) = text.find(|c: char| !c.is_whitespace()) else {
        return text.to_string();
    };
    let end = text
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(text.len(), |(i, c)| i + c.len_utf8());

    let keeps_space = |c: Option<char>| c.is_some_and(|c| c != '\r' && c != '\n');
    let leading = keeps_space(text[..start].chars().next_back());
    let trailing = keeps_space(text[end..].chars().next());

    let mut out = String::with_capacity(end - start + 2);
    if leading {
        out.push(' ');
    }
    out.push_str(&text[start..end]);
    if trailing {
        out.push(' ');
    }
    out
}

/// Payload of a text node.
#[derive(Debug, Clone, Default)]
pub struct TextData {
    raw: String,
    trimmed_raw: OnceCell<String>,
    trimmed: OnceCell<String>,
}

impl TextData {
    pub fn new(raw: impl Into<String>) -> Self {
        TextData {
            raw: raw.into(),
            ..Default::default()
        }
    }

    /// Text as scanned, entities still encoded.
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    /// Text with entities decoded.
    pub fn text(&self) -> String {
        decode(&self.raw)
    }

    /// Whether the text consists only of whitespace and `&nbsp;` entities.
    pub fn is_whitespace(&self) -> bool {
        self.raw
            .split("&nbsp;")
            .all(|part| part.chars().all(char::is_whitespace))
    }

    /// Raw text, trimmed.
    pub fn trimmed_raw_text(&self) -> &str {
        self.trimmed_raw.get_or_init(|| trim_text(&self.raw))
    }

    /// Decoded text, trimmed.
    pub fn trimmed_text(&self) -> &str {
        self.trimmed.get_or_init(|| trim_text(&decode(&self.raw)))
    }

    pub fn set_raw_text(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
        self.trimmed_raw = OnceCell::new();
        self.trimmed = OnceCell::new();
    }
}

#[derive(Default)]
struct Blocks {
    done: Vec<String>,
    current: String,
    pending_space: bool,
}

impl Blocks {
    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.done.push(std::mem::take(&mut self.current));
            self.pending_space = false;
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.pending_space {
            self.current.push(' ');
            self.pending_space = false;
        }
        self.current.push_str(text);
    }

    fn finish(mut self) -> String {
        self.done.push(self.current);
        let joined = self
            .done
            .iter()
            .map(|block| WHITESPACE_RUN.replace_all(block, " "))
            .collect::<Vec<_>>()
            .join("\n");
        joined.trim_end().to_string()
    }
}

impl Document {
    /// Concatenated raw text of every text node below `id`, in document order.
    ///
    /// For a text or comment node this is its own content.
    pub fn raw_text(&self, id: NodeId) -> String {
        match &self.get(id).kind {
            NodeKind::Text(text) => text.raw_text().to_string(),
            NodeKind::Comment(body) => body.clone(),
            NodeKind::Document | NodeKind::Element(_) => id
                .descendants(&self.arena)
                .filter_map(|n| match &self.get(n).kind {
                    NodeKind::Text(text) => Some(text.raw_text()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// [`raw_text`](Self::raw_text) with entities decoded.
    pub fn text(&self, id: NodeId) -> String {
        decode(&self.raw_text(id))
    }

    /// Same as [`text`](Self::text).
    pub fn text_content(&self, id: NodeId) -> String {
        self.text(id)
    }

    /// Same as [`raw_text`](Self::raw_text).
    pub fn inner_text(&self, id: NodeId) -> String {
        self.raw_text(id)
    }

    /// Decoded text laid out as lines: block-level elements start a new line,
    /// whitespace inside a line collapses to single spaces.
    pub fn structured_text(&self, id: NodeId) -> String {
        let mut blocks = Blocks::default();
        self.collect_blocks(id, &mut blocks);
        blocks.finish()
    }

    fn collect_blocks(&self, id: NodeId, blocks: &mut Blocks) {
        match &self.get(id).kind {
            NodeKind::Text(text) => {
                if text.is_whitespace() {
                    blocks.pending_space = true;
                } else {
                    blocks.push_text(text.trimmed_text());
                }
            }
            NodeKind::Comment(_) => {}
            NodeKind::Document => {
                for child in id.children(&self.arena) {
                    self.collect_blocks(child, blocks);
                }
            }
            NodeKind::Element(element) => {
                let block = tags::is_block_element(element.raw_tag_name());
                if block {
                    blocks.break_line();
                }
                for child in id.children(&self.arena) {
                    self.collect_blocks(child, blocks);
                }
                if block {
                    blocks.break_line();
                }
            }
        }
    }

    /// Indented outline of the elements below and including `id`.
    ///
    /// Each element is printed as its tag name with `#id` and `.class`
    /// suffixes; non-whitespace text children print as `#text`. The document
    /// node itself prints no line of its own.
    pub fn structure(&self, id: NodeId) -> String {
        let mut lines = Vec::new();
        self.write_structure(id, 0, &mut lines);
        lines.join("\n")
    }

    fn write_structure(&self, id: NodeId, depth: usize, lines: &mut Vec<String>) {
        let child_depth = match &self.get(id).kind {
            NodeKind::Element(element) => {
                let mut line = format!("{}{}", "  ".repeat(depth), element.raw_tag_name());
                if !element.id().is_empty() {
                    line.push('#');
                    line.push_str(element.id());
                }
                for class in element.class_list() {
                    line.push('.');
                    line.push_str(class);
                }
                lines.push(line);
                depth + 1
            }
            NodeKind::Document => depth,
            NodeKind::Text(_) | NodeKind::Comment(_) => return,
        };
        for child in id.children(&self.arena) {
            match &self.get(child).kind {
                NodeKind::Element(_) => self.write_structure(child, child_depth, lines),
                NodeKind::Text(text) if !text.is_whitespace() => {
                    lines.push(format!("{}#text", "  ".repeat(child_depth)));
                }
                _ => {}
            }
        }
    }

    /// Drop whitespace-only text nodes below `id` and trim the rest in place.
    ///
    /// Dropped nodes are freed from the arena.
    pub fn remove_whitespace(&mut self, id: NodeId) {
        let children: Vec<NodeId> = id.children(&self.arena).collect();
        for child in children {
            if self.is_element(child) {
                self.remove_whitespace(child);
                continue;
            }
            let Some(text) = self.text_data(child) else {
                continue;
            };
            if text.is_whitespace() {
                child.remove_subtree(&mut self.arena);
            } else {
                let trimmed = text.trimmed_raw_text().to_string();
                if let Some(text) = self.text_data_mut(child) {
                    text.set_raw_text(trimmed);
                }
            }
        }
    }

    /// Cut the content below `id` at the first text or comment that matches
    /// `pattern`.
    ///
    /// The matching node is truncated at the match start and its following
    /// siblings are freed. Siblings of its ancestors are kept.
    pub fn trim_right(&mut self, id: NodeId, pattern: &Regex) {
        let children: Vec<NodeId> = id.children(&self.arena).collect();
        for (i, &child) in children.iter().enumerate() {
            if self.is_element(child) {
                self.trim_right(child, pattern);
                continue;
            }
            let cut = match &mut self.get_mut(child).kind {
                NodeKind::Text(text) => match pattern.find(text.raw_text()) {
                    Some(m) => {
                        let kept = text.raw_text()[..m.start()].to_string();
                        text.set_raw_text(kept);
                        true
                    }
                    None => false,
                },
                NodeKind::Comment(body) => match pattern.find(body) {
                    Some(m) => {
                        body.truncate(m.start());
                        true
                    }
                    None => false,
                },
                NodeKind::Element(_) | NodeKind::Document => false,
            };
            if cut {
                for &rest in &children[i + 1..] {
                    rest.remove_subtree(&mut self.arena);
                }
                break;
            }
        }
    }
}
