//! Lenient, single-pass HTML tree builder.
//!
//! The builder scans the input with one regular expression that matches either
//! a comment or a start/end tag, and keeps an explicit stack of open elements.
//! Text between two matches is appended to the element on top of the stack.
//! Misnesting is resolved with small lookup tables ([`crate::tags`]) instead of
//! the HTML5 tree-construction algorithm, and whatever is still open when the
//! scan ends is repaired by a separate recovery pass.
//!
//! Malformed markup never fails: every input yields a tree.

use compact_str::CompactString;
use indexmap::IndexMap;
use indextree::{Arena, NodeId};
use regex::Regex;
use smallvec::{SmallVec, smallvec};
use std::ops::Range;
use std::sync::LazyLock;

use crate::arena_dom::{Document, NodeData, NodeKind};
use crate::element::{ElementData, KeyAttributes};
use crate::tags;
use crate::text::TextData;
use crate::tracing_macros::{debug, trace};

/// Name of the element the input is wrapped in before scanning.
const FRAME_TAG: &str = "laxdom-document-frame";

/// A comment, or a start/end tag with its attribute payload.
///
/// Groups: 1 = `/` for end tags, 2 = tag name, 3 = attribute payload,
/// 4 = `/` for self-closing tags.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<!--(?s:.)*?-->|<(/?)([a-z][-.:0-9_a-z]*)\s*((?:.*?[\s\d/'"])|(?:.*?\w))??(/?)>"#,
    )
    .expect("markup pattern is valid")
});

/// Stack of open elements. Index 0 is always the root.
pub type OpenElements = SmallVec<[NodeId; 16]>;

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Lower-case tag names as they are scanned.
    pub lower_case_tag_name: bool,

    /// Keep comments as comment nodes instead of dropping them.
    pub comment: bool,

    /// Elements whose content is captured verbatim up to the matching end tag.
    /// `true` keeps the content as a text node, `false` discards it.
    pub block_text_elements: IndexMap<CompactString, bool>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            lower_case_tag_name: false,
            comment: false,
            block_text_elements: tags::DEFAULT_BLOCK_TEXT_ELEMENTS
                .iter()
                .map(|&tag| (CompactString::from(tag), true))
                .collect(),
        }
    }
}

impl ParseOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower-case tag names while parsing.
    pub fn lower_case_tag_name(mut self) -> Self {
        self.lower_case_tag_name = true;
        self
    }

    /// Keep comments in the tree.
    pub fn with_comments(mut self) -> Self {
        self.comment = true;
        self
    }

    /// Treat `tag` as a block-text element. With `keep_text` false its
    /// content is discarded.
    pub fn with_block_text_element(mut self, tag: &str, keep_text: bool) -> Self {
        self.block_text_elements
            .insert(CompactString::from(tag), keep_text);
        self
    }

    /// Scan the content of every element as markup, including `script`.
    pub fn without_block_text_elements(mut self) -> Self {
        self.block_text_elements.clear();
        self
    }

    /// Whether `tag` is a block-text element, and if so whether it keeps its text.
    pub(crate) fn block_text(&self, tag: &str) -> Option<bool> {
        self.block_text_elements
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(tag))
            .map(|(_, &keep)| keep)
    }
}

/// A document straight out of the scan, before recovery.
#[derive(Debug, Clone)]
pub struct PartialParse {
    pub document: Document,

    /// Elements left open when the scan ended. Index 0 is the root.
    pub open_elements: OpenElements,
}

impl PartialParse {
    /// Repair whatever is still open and return the finished document.
    pub fn recover(mut self) -> Document {
        recover(&mut self.document.arena, self.open_elements);
        self.document
    }
}

/// Parse `html` with default options.
///
/// # Example
///
/// ```rust
/// let doc = laxdom::parse("<p>one<p>two");
/// assert_eq!(doc.to_html(), "<p>one</p><p>two</p>");
/// ```
pub fn parse(html: &str) -> Document {
    parse_with_options(html, ParseOptions::default())
}

/// Parse `html` with the given options.
pub fn parse_with_options(html: &str, options: ParseOptions) -> Document {
    base_parse(html, options).recover()
}

/// Scan `html` without running the recovery pass.
pub fn base_parse(html: &str, options: ParseOptions) -> PartialParse {
    let mut document = Document::with_options(options);
    let root = document.root;
    document.get_mut(root).range = Some(0..html.len());
    let open_elements = TreeBuilder::new(&mut document.arena, &document.options, root).run(html);
    PartialParse {
        document,
        open_elements,
    }
}

impl Document {
    /// Parse a fragment into this document's arena using its options.
    ///
    /// Returns the top-level nodes of the fragment, detached.
    pub(crate) fn parse_fragment(&mut self, html: &str) -> Vec<NodeId> {
        let holder = self.arena.new_node(NodeData::new(NodeKind::Document));
        let open = TreeBuilder::new(&mut self.arena, &self.options, holder).run(html);
        recover(&mut self.arena, open);

        let nodes: Vec<NodeId> = holder.children(&self.arena).collect();
        for &node in &nodes {
            node.detach(&mut self.arena);
        }
        holder.remove(&mut self.arena);
        nodes
    }
}

struct TreeBuilder<'a> {
    arena: &'a mut Arena<NodeData>,
    options: &'a ParseOptions,
    stack: OpenElements,
    /// Stack depth of the innermost open anchor.
    anchor_depth: Option<usize>,
    /// Offset of the user input inside the wrapped text.
    offset: usize,
    /// Length of the user input.
    len: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(arena: &'a mut Arena<NodeData>, options: &'a ParseOptions, root: NodeId) -> Self {
        TreeBuilder {
            arena,
            options,
            stack: smallvec![root],
            anchor_depth: None,
            offset: FRAME_TAG.len() + 2,
            len: 0,
        }
    }

    fn run(mut self, html: &str) -> OpenElements {
        self.len = html.len();
        let wrapped = format!("<{FRAME_TAG}>{html}</{FRAME_TAG}>");
        let data_end = self.offset + html.len();

        let mut cursor = 0;
        let mut last_text_pos: Option<usize> = None;
        while let Some(caps) = MARKUP.captures_at(&wrapped, cursor) {
            let Some(whole) = caps.get(0) else {
                break;
            };
            let (tag_start, tag_end) = (whole.start(), whole.end());
            cursor = tag_end;

            if let Some(text_start) = last_text_pos
                && text_start < tag_start
            {
                self.append_text(&wrapped[text_start..tag_start], text_start, tag_start);
            }
            last_text_pos = Some(tag_end);

            let Some(name) = caps.get(2).map(|m| m.as_str()) else {
                // comment
                if self.options.comment {
                    let body = &wrapped[tag_start + 4..tag_end - 3];
                    let range = self.range(tag_start, tag_end);
                    self.append(NodeKind::Comment(body.to_string()), range);
                }
                continue;
            };
            if name == FRAME_TAG {
                continue;
            }

            let name: CompactString = if self.options.lower_case_tag_name {
                name.to_lowercase().into()
            } else {
                name.into()
            };
            let is_end_tag = caps.get(1).is_some_and(|m| !m.is_empty());
            let self_closing = caps.get(4).is_some_and(|m| !m.is_empty());
            let mut closes = is_end_tag;

            if !is_end_tag {
                let mut payload = caps.get(3).map_or("", |m| m.as_str());
                if tag_end == wrapped.len() {
                    // an unterminated last tag runs into the frame's end tag
                    payload = strip_frame_closer(payload);
                }
                let element = self.open_element(&name, payload, self_closing, tag_start, tag_end);

                if let Some(keep_text) = self.options.block_text(&name) {
                    let closer = format!("</{name}>");
                    let body_start = tag_end.min(data_end);
                    let close_at = find_ignore_ascii_case(&wrapped[body_start..data_end], &closer)
                        .map(|i| i + body_start);
                    let text_end = close_at.unwrap_or(data_end);
                    if keep_text {
                        let text = &wrapped[body_start..text_end];
                        if text.chars().any(|c| !c.is_whitespace()) {
                            let node = self.arena.new_node(NodeData {
                                kind: NodeKind::Text(TextData::new(text)),
                                range: Some(self.range(body_start, text_end)),
                            });
                            element.append(node, self.arena);
                        }
                    }
                    match close_at {
                        Some(at) => cursor = at + closer.len(),
                        None => {
                            debug!(tag = %name, "unterminated block-text element");
                            cursor = wrapped.len();
                        }
                    }
                    last_text_pos = Some(cursor.min(data_end));
                    closes = true;
                }
            }

            if closes || self_closing || tags::is_void_element(&name) {
                self.close(&name, is_end_tag, last_text_pos.unwrap_or(tag_end).max(tag_end));
            }
        }
        self.stack
    }

    /// Handle a start tag: implicit closes, the anchor guard, then push.
    fn open_element(
        &mut self,
        name: &CompactString,
        payload: &str,
        self_closing: bool,
        tag_start: usize,
        tag_end: usize,
    ) -> NodeId {
        if !self_closing
            && self
                .current_tag()
                .is_some_and(|open| tags::is_closed_by_opening(open, name))
        {
            trace!(opening = %name, "implicitly closing current element");
            self.stack.pop();
        }

        if tags::is_anchor(name) {
            if let Some(depth) = self.anchor_depth {
                trace!(depth, "closing open anchor before a new one");
                self.stack.truncate(depth);
            }
            self.anchor_depth = Some(self.stack.len());
        }

        let key = KeyAttributes::scan(payload);
        let element = ElementData::from_parts(name.clone(), key, payload.to_string());
        let range = self.range(tag_start, tag_end);
        let node = self.append(NodeKind::Element(element), range);
        self.stack.push(node);
        node
    }

    /// Handle an end tag, a self-closing tag, or a void element.
    ///
    /// End tags match open elements ignoring ASCII case, so `</span>` closes
    /// `<SPAN>` whether or not tag names are lower-cased.
    fn close(&mut self, name: &str, is_end_tag: bool, end: usize) {
        if tags::is_anchor(name) {
            self.anchor_depth = None;
        }
        while let Some(&top) = self.stack.last() {
            let Some(open) = self.current_tag() else {
                if is_end_tag {
                    debug!(tag = %name, "ignoring unmatched end tag");
                }
                break;
            };
            if open.eq_ignore_ascii_case(name) {
                let end = self.range(0, end).end;
                if let Some(range) = &mut self.arena[top].get_mut().range {
                    range.end = end;
                }
                self.stack.pop();
                break;
            }
            if tags::is_closed_by_closing(open, name) {
                trace!(open = %open, closing = %name, "implicitly closing on the way up");
                self.stack.pop();
                continue;
            }
            if is_end_tag {
                debug!(tag = %name, "ignoring unmatched end tag");
            }
            break;
        }
    }

    fn current(&self) -> NodeId {
        self.stack[self.stack.len() - 1]
    }

    /// Tag of the element on top of the stack. `None` when only the root is left.
    fn current_tag(&self) -> Option<&str> {
        if self.stack.len() < 2 {
            return None;
        }
        match &self.arena[self.current()].get().kind {
            NodeKind::Element(element) => Some(element.raw_tag_name()),
            _ => None,
        }
    }

    fn append(&mut self, kind: NodeKind, range: Range<usize>) -> NodeId {
        let node = self.arena.new_node(NodeData {
            kind,
            range: Some(range),
        });
        self.current().append(node, self.arena);
        node
    }

    fn append_text(&mut self, text: &str, start: usize, end: usize) {
        let range = self.range(start, end);
        self.append(NodeKind::Text(TextData::new(text)), range);
    }

    /// Map a range of the wrapped text to the user input.
    fn range(&self, start: usize, end: usize) -> Range<usize> {
        let clamp = |pos: usize| pos.saturating_sub(self.offset).min(self.len);
        clamp(start)..clamp(end)
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let (haystack, needle) = (haystack.as_bytes(), needle.as_bytes());
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

fn strip_frame_closer(payload: &str) -> &str {
    payload
        .strip_suffix(FRAME_TAG)
        .and_then(|rest| rest.strip_suffix("</"))
        .map_or(payload, str::trim_end)
}

/// Collapse the open-element stack into a single tree under its first entry.
///
/// Elements left open are flattened away with their children promoted into
/// their place. When an open element sits directly inside an open element
/// with the same tag (`<div><div>x`), its children move after that parent
/// instead, and the parent is considered closed too.
fn recover(arena: &mut Arena<NodeData>, mut stack: OpenElements) {
    while stack.len() > 1 {
        let Some(last) = stack.pop() else {
            break;
        };
        let Some(&one_before) = stack.last() else {
            break;
        };
        let Some(parent) = arena[last].parent() else {
            continue;
        };
        if arena[parent].parent().is_none() {
            trace!("leaving outermost open element in place");
            continue;
        }

        if parent == one_before && same_tag(arena, last, one_before) {
            debug!("repairing duplicate open tag");
            let mut anchor = one_before;
            let children: Vec<NodeId> = last.children(arena).collect();
            for child in children {
                anchor.insert_after(child, arena);
                anchor = child;
            }
            last.remove(arena);
            stack.pop();
        } else {
            debug!("flattening unclosed element");
            last.remove(arena);
        }
    }
}

fn same_tag(arena: &Arena<NodeData>, a: NodeId, b: NodeId) -> bool {
    match (&arena[a].get().kind, &arena[b].get().kind) {
        (NodeKind::Element(a), NodeKind::Element(b)) => {
            a.raw_tag_name().eq_ignore_ascii_case(b.raw_tag_name())
        }
        _ => false,
    }
}
