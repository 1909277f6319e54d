use super::NodeId;
use std::borrow::Cow;

/// Errors raised by [`Document`](super::Document) tree mutations.
#[outclick_derive::outclick_error]
#[derive(Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The id does not belong to this document.
    #[error("Node not found{}: {node}", format_context(context))]
    NodeNotFound { node: NodeId, context: Option<Cow<'static, str>> },

    /// The mutation would break the tree (cycles, moving the root).
    #[error("Hierarchy request error{}: {message}", format_context(context))]
    HierarchyRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
