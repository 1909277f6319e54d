use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A dispatched event: its type name and the node it was aimed at.
///
/// `target` is `None` for events without a node target (or aimed at a node that no
/// longer exists).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<N> {
    kind: String,
    target: Option<N>,
}

impl<N> Event<N> {
    pub fn new(kind: impl Into<String>, target: N) -> Self {
        Self { kind: kind.into(), target: Some(target) }
    }

    /// An event without a target node.
    pub fn untargeted(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), target: None }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub const fn target(&self) -> Option<&N> {
        self.target.as_ref()
    }
}

/// A listener callback. Identity is the `Arc` allocation, so removal needs the same
/// `Arc` that was added.
pub type Listener<N> = Arc<dyn Fn(&Event<N>) + Send + Sync>;

/// A global (window-level) listener table.
///
/// Cloning yields another handle to the same table.
pub struct EventTarget<N> {
    listeners: Arc<RwLock<FxHashMap<String, Vec<Listener<N>>>>>,
}

impl<N> Clone for EventTarget<N> {
    fn clone(&self) -> Self {
        Self { listeners: Arc::clone(&self.listeners) }
    }
}

impl<N> Default for EventTarget<N> {
    fn default() -> Self {
        Self { listeners: Arc::new(RwLock::new(FxHashMap::default())) }
    }
}

impl<N> fmt::Debug for EventTarget<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        let mut map = f.debug_map();
        for (kind, list) in listeners.iter() {
            map.entry(kind, &list.len());
        }
        map.finish()
    }
}

impl<N> EventTarget<N> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener for `kind`.
    ///
    /// Returns `false` without adding anything if the same listener is already registered
    /// for `kind`.
    pub fn add_event_listener(&self, kind: &str, listener: Listener<N>) -> bool {
        let mut listeners = self.listeners.write();
        let list = listeners.entry(kind.to_owned()).or_default();
        if list.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return false;
        }
        list.push(listener);
        trace!(event = kind, listeners = list.len(), "Listener added");
        true
    }

    /// Removes `listener` from `kind`. Returns whether it was registered.
    pub fn remove_event_listener(&self, kind: &str, listener: &Listener<N>) -> bool {
        let mut listeners = self.listeners.write();
        let Some(list) = listeners.get_mut(kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| !Arc::ptr_eq(l, listener));
        let removed = list.len() != before;
        if list.is_empty() {
            listeners.remove(kind);
        }
        if removed {
            trace!(event = kind, "Listener removed");
        }
        removed
    }

    /// Invokes every listener registered for the event's type and returns how many ran.
    ///
    /// The listener list is copied before the first call and no lock is held while
    /// listeners run, so they may add or remove listeners. Listeners added during a
    /// dispatch are not called for it; listeners removed during it are skipped.
    pub fn dispatch(&self, event: &Event<N>) -> usize {
        let snapshot: Vec<Listener<N>> =
            self.listeners.read().get(event.kind()).cloned().unwrap_or_default();

        let mut ran = 0;
        for listener in &snapshot {
            if !self.is_registered(event.kind(), listener) {
                continue;
            }
            listener(event);
            ran += 1;
        }
        ran
    }

    fn is_registered(&self, kind: &str, listener: &Listener<N>) -> bool {
        self.listeners
            .read()
            .get(kind)
            .is_some_and(|list| list.iter().any(|l| Arc::ptr_eq(l, listener)))
    }

    #[must_use]
    pub fn listener_count(&self, kind: &str) -> usize {
        self.listeners.read().get(kind).map_or(0, Vec::len)
    }
}
