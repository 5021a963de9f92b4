//! Arena-based, mutable DOM.
//!
//! This module provides the Document representation produced by the parser.
//! Key features:
//! - **indextree Arena**: every node of a document, attached or detached,
//!   lives in one arena and is addressed by a stable [`NodeId`]
//! - **Weak back-references**: parent and sibling links are indices, so there
//!   are no reference cycles and parent lookup is O(1)
//! - **Detached subtrees**: removed nodes stay allocated until re-attached or
//!   explicitly [discarded](Document::discard)

use facet::Facet;
use indextree::{Arena, NodeId};
use std::ops::Range;
use std::str::FromStr;

use crate::element::ElementData;
use crate::error::DomError;
use crate::parser::ParseOptions;
use crate::tags;
use crate::text::TextData;
use crate::tracing_macros::trace;

/// A parsed or hand-built document.
#[derive(Debug, Clone)]
pub struct Document {
    /// THE tree - all nodes live here
    pub arena: Arena<NodeData>,

    /// Synthetic root node, never part of the serialized markup.
    pub root: NodeId,

    /// Options used to parse fragments inserted by the editing APIs.
    pub(crate) options: ParseOptions,
}

/// Node data stored in the arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,

    /// Byte range in the parsed input. `None` for nodes created by hand.
    pub range: Option<Range<usize>>,
}

impl NodeData {
    pub fn new(kind: NodeKind) -> Self {
        NodeData { kind, range: None }
    }
}

/// Node types
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The synthetic root.
    Document,
    Element(ElementData),
    Text(TextData),
    /// Comment body, without the `<!--` and `-->` delimiters.
    Comment(String),
}

/// DOM node type numbers.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
}

/// Content for [`Document::set_content`] and [`Document::replace_with`].
#[derive(Debug, Clone)]
pub enum Content<'a> {
    /// An existing node, moved into place.
    Node(NodeId),
    /// Existing nodes, moved into place in order.
    Nodes(Vec<NodeId>),
    /// Markup, parsed with the document's options. Markup that yields no
    /// nodes becomes a single text node holding the literal string.
    Html(&'a str),
}

impl From<NodeId> for Content<'_> {
    fn from(id: NodeId) -> Self {
        Content::Node(id)
    }
}

impl<'a> From<&'a str> for Content<'a> {
    fn from(html: &'a str) -> Self {
        Content::Html(html)
    }
}

/// Where [`Document::insert_adjacent_html`] puts the new nodes.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InsertPosition {
    /// Before the node, as siblings.
    BeforeBegin,
    /// As the first children.
    AfterBegin,
    /// As the last children.
    BeforeEnd,
    /// After the node, as siblings.
    AfterEnd,
}

impl FromStr for InsertPosition {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beforebegin" => Ok(InsertPosition::BeforeBegin),
            "afterbegin" => Ok(InsertPosition::AfterBegin),
            "beforeend" => Ok(InsertPosition::BeforeEnd),
            "afterend" => Ok(InsertPosition::AfterEnd),
            _ => Err(DomError::invalid_arguments(format!(
                "the value provided ('{s}') is not one of 'beforebegin', 'afterbegin', 'beforeend', or 'afterend'"
            ))),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with default parse options.
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub(crate) fn with_options(options: ParseOptions) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeData::new(NodeKind::Document));
        Document {
            arena,
            root,
            options,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Options used to parse this document and any fragments inserted into it.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Get immutable reference to node data
    pub fn get(&self, id: NodeId) -> &NodeData {
        self.arena[id].get()
    }

    /// Get mutable reference to node data
    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        self.arena[id].get_mut()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.get(id).kind
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        match self.kind(id) {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
        }
    }

    /// Byte range of the node in the parsed input.
    pub fn range(&self, id: NodeId) -> Option<Range<usize>> {
        self.get(id).range.clone()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.get_mut(id).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Element data, or [`DomError::NotAnElement`].
    pub fn try_element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.element_mut(id).ok_or(DomError::NotAnElement)
    }

    pub fn text_data(&self, id: NodeId) -> Option<&TextData> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn text_data_mut(&mut self, id: NodeId) -> Option<&mut TextData> {
        match &mut self.get_mut(id).kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element(_))
    }

    /// Tag name of an element, as scanned.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::raw_tag_name)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    /// Iterate children of a node
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// Children of a node, collected.
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).collect()
    }

    /// Element children of a node.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|&c| self.is_element(c))
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].first_child()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].last_child()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].next_sibling()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].previous_sibling()
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        id.following_siblings(&self.arena)
            .skip(1)
            .find(|&s| self.is_element(s))
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        id.preceding_siblings(&self.arena)
            .skip(1)
            .find(|&s| self.is_element(s))
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena).skip(1)
    }

    /// Parent, grandparent and so on, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.ancestors(&self.arena).skip(1)
    }

    /// First element below `id` whose `id` attribute equals `value`.
    pub fn get_element_by_id(&self, id: NodeId, value: &str) -> Option<NodeId> {
        self.descendants(id)
            .find(|&n| self.element(n).is_some_and(|e| e.id() == value))
    }

    /// Elements below `id` with the given tag name (ASCII case-insensitive).
    /// `*` matches every element.
    pub fn get_elements_by_tag_name(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|&n| {
                self.tag(n)
                    .is_some_and(|t| tag == "*" || t.eq_ignore_ascii_case(tag))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Allocate a detached element with no attributes.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_element_with_attributes(tag, "")
    }

    /// Allocate a detached element from a raw attribute string.
    pub fn create_element_with_attributes(&mut self, tag: &str, raw_attrs: &str) -> NodeId {
        self.arena.new_node(NodeData::new(NodeKind::Element(ElementData::new(
            tag, raw_attrs,
        ))))
    }

    /// Allocate a detached text node holding raw (entity-encoded) text.
    pub fn create_text(&mut self, raw: &str) -> NodeId {
        self.arena
            .new_node(NodeData::new(NodeKind::Text(TextData::new(raw))))
    }

    pub fn create_comment(&mut self, body: &str) -> NodeId {
        self.arena
            .new_node(NodeData::new(NodeKind::Comment(body.to_string())))
    }

    /// Free a node and its whole subtree. The node is detached first if needed.
    ///
    /// Every `NodeId` inside the subtree becomes invalid.
    pub fn discard(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        id.remove_subtree(&mut self.arena);
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Check that `node` may become a child of `parent`.
    fn ensure_insertable(&self, parent: NodeId, node: NodeId) -> Result<(), DomError> {
        if matches!(self.kind(node), NodeKind::Document) {
            return Err(DomError::Hierarchy {
                reason: "the document root cannot be inserted".to_string(),
            });
        }
        if matches!(self.kind(parent), NodeKind::Text(_) | NodeKind::Comment(_)) {
            return Err(DomError::Hierarchy {
                reason: "text and comment nodes cannot have children".to_string(),
            });
        }
        if parent.ancestors(&self.arena).any(|a| a == node) {
            return Err(DomError::Hierarchy {
                reason: "a node cannot be inserted into its own subtree".to_string(),
            });
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it from its
    /// current parent if it has one. Returns `child`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        self.ensure_insertable(parent, child)?;
        parent.checked_append(child, &mut self.arena)?;
        Ok(child)
    }

    /// Detach `child` from `parent`. Returns the now detached `child`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild);
        }
        child.detach(&mut self.arena);
        Ok(child)
    }

    /// Detach `id` from its parent, if any. Returns `id`.
    pub fn remove(&mut self, id: NodeId) -> NodeId {
        id.detach(&mut self.arena);
        id
    }

    /// Put `new` where `old` is among `parent`'s children. `old` is detached.
    pub fn exchange_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<(), DomError> {
        if self.parent(old) != Some(parent) {
            return Err(DomError::NotAChild);
        }
        if old == new {
            return Ok(());
        }
        self.ensure_insertable(parent, new)?;
        old.checked_insert_before(new, &mut self.arena)?;
        old.detach(&mut self.arena);
        Ok(())
    }

    /// Replace `id` with the given items, in order. Returns the inserted nodes.
    pub fn replace_with<'c>(
        &mut self,
        id: NodeId,
        items: impl IntoIterator<Item = Content<'c>>,
    ) -> Result<Vec<NodeId>, DomError> {
        let parent = self.parent(id).ok_or(DomError::NoParent)?;
        let items: Vec<Content<'c>> = items.into_iter().collect();
        for item in &items {
            match item {
                Content::Node(node) => self.ensure_insertable(parent, *node)?,
                Content::Nodes(nodes) => {
                    for &node in nodes {
                        self.ensure_insertable(parent, node)?;
                    }
                }
                Content::Html(_) => {}
            }
        }

        let mut inserted = Vec::new();
        for item in items {
            inserted.extend(self.materialize(item));
        }
        let mut keeps_self = false;
        for &node in &inserted {
            if node == id {
                keeps_self = true;
                continue;
            }
            id.checked_insert_before(node, &mut self.arena)?;
        }
        if !keeps_self {
            id.detach(&mut self.arena);
        }
        trace!(count = inserted.len(), "replaced node");
        Ok(inserted)
    }

    /// Parse `html` with the document's options and insert the nodes
    /// relative to `id`.
    ///
    /// `position` is one of `beforebegin`, `afterbegin`, `beforeend` or
    /// `afterend`. Markup that yields no nodes inserts nothing.
    pub fn insert_adjacent_html(
        &mut self,
        id: NodeId,
        position: &str,
        html: &str,
    ) -> Result<(), DomError> {
        let position: InsertPosition = position.parse()?;
        let parent = self.parent(id);
        match position {
            InsertPosition::BeforeBegin | InsertPosition::AfterEnd if parent.is_none() => {
                return Err(DomError::NoParent);
            }
            InsertPosition::AfterBegin | InsertPosition::BeforeEnd
                if matches!(self.kind(id), NodeKind::Text(_) | NodeKind::Comment(_)) =>
            {
                return Err(DomError::NotAnElement);
            }
            _ => {}
        }

        let nodes = self.parse_fragment(html);
        match position {
            InsertPosition::BeforeBegin => {
                for node in nodes {
                    id.checked_insert_before(node, &mut self.arena)?;
                }
            }
            InsertPosition::AfterEnd => {
                let mut anchor = id;
                for node in nodes {
                    anchor.checked_insert_after(node, &mut self.arena)?;
                    anchor = node;
                }
            }
            InsertPosition::AfterBegin => {
                for node in nodes.into_iter().rev() {
                    id.checked_prepend(node, &mut self.arena)?;
                }
            }
            InsertPosition::BeforeEnd => {
                for node in nodes {
                    id.checked_append(node, &mut self.arena)?;
                }
            }
        }
        Ok(())
    }

    /// Replace the children of `id` with `content`.
    pub fn set_content(&mut self, id: NodeId, content: Content<'_>) -> Result<(), DomError> {
        if matches!(self.kind(id), NodeKind::Text(_) | NodeKind::Comment(_)) {
            return Err(DomError::NotAnElement);
        }
        match &content {
            Content::Node(node) => self.ensure_insertable(id, *node)?,
            Content::Nodes(nodes) => {
                for &node in nodes {
                    self.ensure_insertable(id, node)?;
                }
            }
            Content::Html(_) => {}
        }
        let nodes = self.materialize(content);
        self.clear_children(id);
        for node in nodes {
            id.checked_append(node, &mut self.arena)?;
        }
        Ok(())
    }

    /// Replace the children of `id` with the nodes parsed from `html`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<(), DomError> {
        self.set_content(id, Content::Html(html))
    }

    /// Replace the children of `id` with one text node holding `text`
    /// verbatim. On a text or comment node, replace its content instead.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        match &mut self.get_mut(id).kind {
            NodeKind::Text(data) => {
                data.set_raw_text(text);
                return;
            }
            NodeKind::Comment(body) => {
                *body = text.to_string();
                return;
            }
            NodeKind::Document | NodeKind::Element(_) => {}
        }
        self.clear_children(id);
        let node = self.create_text(text);
        id.append(node, &mut self.arena);
    }

    /// Same as [`set_text_content`](Self::set_text_content).
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.set_text_content(id, text);
    }

    /// Detach every child of `id`.
    fn clear_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = id.children(&self.arena).collect();
        for child in children {
            child.detach(&mut self.arena);
        }
    }

    /// Turn content into detached (or about to be moved) nodes.
    fn materialize(&mut self, content: Content<'_>) -> Vec<NodeId> {
        match content {
            Content::Node(node) => vec![node],
            Content::Nodes(nodes) => nodes,
            Content::Html(html) => self.parse_fragment_or_text(html),
        }
    }

    /// Parse `html` into detached nodes, falling back to one text node holding
    /// the literal string when the markup yields nothing.
    pub(crate) fn parse_fragment_or_text(&mut self, html: &str) -> Vec<NodeId> {
        let nodes = self.parse_fragment(html);
        if nodes.is_empty() {
            vec![self.create_text(html)]
        } else {
            nodes
        }
    }

    /// Whether `id` is a void element.
    pub fn is_void(&self, id: NodeId) -> bool {
        self.tag(id).is_some_and(tags::is_void_element)
    }
}
