//! Lenient HTML parser with an arena-based, mutable DOM.
//!
//! laxdom provides:
//! - **Parsing**: a single-pass, regex-driven tree builder that accepts any
//!   input and repairs misnested markup instead of failing
//! - **Arena DOM**: every node lives in an `indextree` arena and is addressed
//!   by a stable [`NodeId`]
//! - **Editing**: DOM-style mutation (`append_child`, `replace_with`,
//!   `insert_adjacent_html`, attribute and class-list edits)
//! - **Extraction**: serialization, block-aware plain text, structure dumps
//! - **Selectors**: a tree adapter for a caller-supplied CSS selector engine
//!
//! # Example
//!
//! ```rust
//! use laxdom::parse;
//!
//! let mut doc = parse("<ul><li class=\"a\">one<li>two</ul>");
//! let items = doc.get_elements_by_tag_name(doc.root(), "li");
//! assert_eq!(items.len(), 2);
//!
//! let first = doc.element_mut(items[0]).unwrap();
//! first.class_list_mut().add("b").unwrap();
//! assert_eq!(first.get_attribute("class"), Some("a b"));
//!
//! assert_eq!(doc.to_html(), "<ul><li class=\"a b\">one</li><li>two</li></ul>");
//! assert_eq!(doc.structured_text(doc.root()), "one\ntwo");
//! ```

mod tracing_macros;

pub mod arena_dom;
pub mod class_list;
pub mod element;
mod error;
mod parser;
pub mod select;
pub mod serialize;
pub mod tags;
pub mod text;

pub use indextree::NodeId;

// Re-export parsing functions
pub use parser::{OpenElements, ParseOptions, PartialParse, base_parse, parse, parse_with_options};

// Re-export DOM types at crate root for convenience
pub use arena_dom::{Content, Document, InsertPosition, NodeData, NodeKind, NodeType};
pub use class_list::ClassList;
pub use element::ElementData;
pub use error::DomError;
pub use select::{DomAdapter, PathAdapter, SelectorEngine, TreeAdapter};
pub use serialize::quote_attribute;
pub use text::{TextData, decode};
