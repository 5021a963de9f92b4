//! Errors surfaced by the mutation APIs.
//!
//! Malformed markup is never an error: the parser always produces a tree.
//! Everything here is a caller contract violation, reported before the tree
//! is touched.

use facet::Facet;

/// Errors that can occur when editing a [`Document`](crate::Document).
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum DomError {
    /// invalid arguments: {reason}
    InvalidArguments { reason: String },

    /// the token '{token}' contains HTML space characters, which are not valid in tokens
    InvalidToken { token: String },

    /// node has no parent
    NoParent,

    /// node is not an element
    NotAnElement,

    /// node is not a child of the given parent
    NotAChild,

    /// invalid tree operation: {reason}
    Hierarchy { reason: String },
}

impl DomError {
    pub(crate) fn invalid_arguments(reason: impl Into<String>) -> Self {
        DomError::InvalidArguments {
            reason: reason.into(),
        }
    }
}

impl From<indextree::NodeError> for DomError {
    fn from(err: indextree::NodeError) -> Self {
        DomError::Hierarchy {
            reason: err.to_string(),
        }
    }
}
