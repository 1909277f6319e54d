use crate::selector::SelectorError;
use std::fmt::Debug;
use std::hash::Hash;

/// The document operations the detector relies on.
///
/// Implementations are cheap handles: cloning one must yield another view of the same
/// document, since every registered listener keeps its own clone.
pub trait Dom: Debug + Clone + Send + Sync + 'static {
    /// Identity of a node. Equality must mean "same node".
    type Node: Debug + Clone + Eq + Hash + Send + Sync + 'static;

    /// Ancestor-or-self containment: `true` when `node` is `ancestor` or lies in its subtree.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// All elements matching `selectors`, in document order.
    ///
    /// # Errors
    /// Returns a [`SelectorError`] if the selector string cannot be parsed.
    fn query_selector_all(&self, selectors: &str) -> Result<Vec<Self::Node>, SelectorError>;
}
