//! Tree access for CSS selector engines.
//!
//! laxdom does not match selectors itself. A [`SelectorEngine`] is supplied by
//! the caller and walks the tree through a [`TreeAdapter`]: [`DomAdapter`]
//! exposes the whole document, [`PathAdapter`] exposes only the chain from an
//! ancestor down to one element and backs [`Document::closest`].

use indextree::NodeId;
use std::collections::HashMap;

use crate::arena_dom::{Document, NodeKind};

/// Node predicate handed to the adapter's search helpers.
pub type Test<'t> = &'t dyn Fn(NodeId) -> bool;

/// What a selector engine needs to know about the tree.
pub trait TreeAdapter {
    /// Whether the node is an element.
    fn is_tag(&self, node: NodeId) -> bool;

    /// Lower-cased tag name, or an empty string for non-elements.
    fn name(&self, node: NodeId) -> String;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// The node's parent's children, including the node itself.
    fn siblings(&self, node: NodeId) -> Vec<NodeId>;

    /// Decoded attribute value, looked up case-insensitively.
    fn attribute_value(&self, node: NodeId, name: &str) -> Option<&str>;

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute_value(node, name).is_some()
    }

    /// Decoded text of the node and everything below it.
    fn text(&self, node: NodeId) -> String;

    /// Whether any element in `nodes` or below them passes `test`.
    fn exists_one(&self, test: Test<'_>, nodes: &[NodeId]) -> bool {
        nodes.iter().any(|&node| {
            self.is_tag(node) && (test(node) || self.exists_one(test, &self.children(node)))
        })
    }

    /// First element in `nodes` or below them, in document order, that passes `test`.
    fn find_one(&self, test: Test<'_>, nodes: &[NodeId]) -> Option<NodeId> {
        for &node in nodes {
            if !self.is_tag(node) {
                continue;
            }
            if test(node) {
                return Some(node);
            }
            if let Some(found) = self.find_one(test, &self.children(node)) {
                return Some(found);
            }
        }
        None
    }

    /// Every element in `nodes` or below them, in document order, that passes `test`.
    fn find_all(&self, test: Test<'_>, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut found = Vec::new();
        for &node in nodes {
            if !self.is_tag(node) {
                continue;
            }
            if test(node) {
                found.push(node);
            }
            found.extend(self.find_all(test, &self.children(node)));
        }
        found
    }

    /// Drop nodes that are duplicates of, or descendants of, other nodes in the list.
    fn remove_subsets(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut kept: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for (i, &node) in nodes.iter().enumerate() {
            if nodes[..i].contains(&node) {
                continue;
            }
            let mut ancestor = self.parent(node);
            let mut covered = false;
            while let Some(a) = ancestor {
                if nodes.contains(&a) {
                    covered = true;
                    break;
                }
                ancestor = self.parent(a);
            }
            if !covered {
                kept.push(node);
            }
        }
        kept
    }
}

/// A CSS selector engine.
///
/// `context` holds the nodes to search: each of them and everything below
/// them is a candidate.
pub trait SelectorEngine {
    /// Selector parse error.
    type Error;

    fn select_one(
        &self,
        selector: &str,
        context: &[NodeId],
        adapter: &dyn TreeAdapter,
    ) -> Result<Option<NodeId>, Self::Error>;

    fn select_all(
        &self,
        selector: &str,
        context: &[NodeId],
        adapter: &dyn TreeAdapter,
    ) -> Result<Vec<NodeId>, Self::Error>;
}

/// Adapter over the full document tree.
#[derive(Debug, Clone, Copy)]
pub struct DomAdapter<'a> {
    doc: &'a Document,
}

impl<'a> DomAdapter<'a> {
    pub fn new(doc: &'a Document) -> Self {
        DomAdapter { doc }
    }
}

impl TreeAdapter for DomAdapter<'_> {
    fn is_tag(&self, node: NodeId) -> bool {
        self.doc.is_element(node)
    }

    fn name(&self, node: NodeId) -> String {
        self.doc
            .element(node)
            .map(|e| e.local_name())
            .unwrap_or_default()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.doc.child_nodes(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.doc.parent(node)
    }

    fn siblings(&self, node: NodeId) -> Vec<NodeId> {
        match self.doc.parent(node) {
            Some(parent) => self.doc.child_nodes(parent),
            None => vec![node],
        }
    }

    fn attribute_value(&self, node: NodeId, name: &str) -> Option<&str> {
        self.doc.element(node)?.get_attribute(name)
    }

    fn text(&self, node: NodeId) -> String {
        self.doc.text(node)
    }
}

/// Adapter that shows a single downward path through the tree.
///
/// Every node on the path has exactly one child, the next node towards the
/// target, and no siblings. Parents and attributes are the real ones, so
/// combinators still resolve against the actual ancestor chain.
#[derive(Debug, Clone)]
pub struct PathAdapter<'a> {
    base: DomAdapter<'a>,
    next_on_path: HashMap<NodeId, NodeId>,
}

impl<'a> PathAdapter<'a> {
    /// Path from the outermost ancestor of `target` down to `target`.
    pub fn new(doc: &'a Document, target: NodeId) -> Self {
        let mut next_on_path = HashMap::new();
        let mut below = target;
        for ancestor in doc.ancestors(target) {
            next_on_path.insert(ancestor, below);
            below = ancestor;
        }
        PathAdapter {
            base: DomAdapter::new(doc),
            next_on_path,
        }
    }
}

impl TreeAdapter for PathAdapter<'_> {
    fn is_tag(&self, node: NodeId) -> bool {
        self.base.is_tag(node)
    }

    fn name(&self, node: NodeId) -> String {
        self.base.name(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.next_on_path.get(&node).copied().into_iter().collect()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.base.parent(node)
    }

    fn siblings(&self, node: NodeId) -> Vec<NodeId> {
        vec![node]
    }

    fn attribute_value(&self, node: NodeId, name: &str) -> Option<&str> {
        self.base.attribute_value(node, name)
    }

    fn text(&self, node: NodeId) -> String {
        self.base.text(node)
    }

    fn find_one(&self, test: Test<'_>, nodes: &[NodeId]) -> Option<NodeId> {
        for &node in nodes {
            if test(node) {
                return Some(node);
            }
            if let Some(&next) = self.next_on_path.get(&node)
                && let Some(found) = self.find_one(test, &[next])
            {
                return Some(found);
            }
        }
        None
    }

    fn find_all(&self, _test: Test<'_>, _nodes: &[NodeId]) -> Vec<NodeId> {
        Vec::new()
    }
}

impl Document {
    /// Adapter over this document for a selector engine.
    pub fn adapter(&self) -> DomAdapter<'_> {
        DomAdapter::new(self)
    }

    /// First element below `id` matching `selector`.
    pub fn query_selector<E: SelectorEngine + ?Sized>(
        &self,
        id: NodeId,
        engine: &E,
        selector: &str,
    ) -> Result<Option<NodeId>, E::Error> {
        engine.select_one(selector, &self.child_nodes(id), &self.adapter())
    }

    /// Every element below `id` matching `selector`, in document order.
    pub fn query_selector_all<E: SelectorEngine + ?Sized>(
        &self,
        id: NodeId,
        engine: &E,
        selector: &str,
    ) -> Result<Vec<NodeId>, E::Error> {
        engine.select_all(selector, &self.child_nodes(id), &self.adapter())
    }

    /// `id` itself or its nearest ancestor matching `selector`.
    ///
    /// Each ancestor is searched through a [`PathAdapter`], so the engine
    /// only ever sees the chain leading to `id`. Ancestors are visited from
    /// the nearest outwards and each visit walks the path below it again.
    pub fn closest<E: SelectorEngine + ?Sized>(
        &self,
        id: NodeId,
        engine: &E,
        selector: &str,
    ) -> Result<Option<NodeId>, E::Error> {
        let adapter = PathAdapter::new(self, id);
        for candidate in id.ancestors(&self.arena) {
            if matches!(self.kind(candidate), NodeKind::Document) {
                break;
            }
            if let Some(found) = engine.select_one(selector, &[candidate], &adapter)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}
