use crate::dom::Dom;
use crate::options::ClickOutsideOptions;
use crate::target::{Event, EventTarget, Listener};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::hash::Hash;
use std::mem;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// A callback run against its component when an outside event is detected.
pub type Callback<C> = Arc<dyn Fn(&C) + Send + Sync>;

/// Returns `true` when `target` counts as outside `element`.
///
/// A target is outside when neither `element` nor any of the `excluded` nodes contains it
/// (ancestor-or-self). A missing target is contained by nothing, so it is always outside.
pub fn is_outside<D: Dom>(
    dom: &D,
    target: Option<&D::Node>,
    element: &D::Node,
    excluded: &[D::Node],
) -> bool {
    let Some(target) = target else {
        return true;
    };
    !dom.contains(element, target) && !excluded.iter().any(|node| dom.contains(node, target))
}

type Registry<N> = RwLock<FxHashMap<RegistrationKey<N>, Registration<N>>>;

/// Handle to the listeners created by one [`ClickOutside::register`] call.
///
/// Holds the exact listener references that were attached, so [`Registration::dispose`]
/// detaches precisely those. Dropping the handle does not detach anything.
#[must_use = "Keep the registration to dispose of it later, or use ClickOutside::remove."]
pub struct Registration<N> {
    inner: Arc<RegistrationInner<N>>,
}

struct RegistrationInner<N> {
    window: EventTarget<N>,
    listeners: Mutex<Vec<(String, Listener<N>)>>,
    registry: Weak<Registry<N>>,
    key: RegistrationKey<N>,
}

impl<N> Clone for Registration<N> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<N> fmt::Debug for Registration<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.inner.listeners.lock();
        f.debug_struct("Registration")
            .field("events", &listeners.iter().map(|(kind, _)| kind.as_str()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<N: Eq + Hash> Registration<N> {
    /// Event types this registration is still listening to.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.inner.listeners.lock().iter().map(|(kind, _)| kind.clone()).collect()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.inner.listeners.lock().is_empty()
    }

    /// Detaches every listener, forgets the registration in its detector and returns how
    /// many listeners were removed.
    ///
    /// Disposing again (from this handle or a clone) removes nothing.
    pub fn dispose(&self) -> usize {
        let listeners = mem::take(&mut *self.inner.listeners.lock());
        let removed = listeners
            .iter()
            .filter(|(kind, listener)| self.inner.window.remove_event_listener(kind, listener))
            .count();

        if let Some(registry) = self.inner.registry.upgrade() {
            let mut registry = registry.write();
            // A newer registration may have taken over the key.
            let owned =
                registry.get(&self.inner.key).is_some_and(|entry| Arc::ptr_eq(&entry.inner, &self.inner));
            if owned {
                registry.remove(&self.inner.key);
            }
        }
        removed
    }
}

/// Outside-click detector bound to one document and its global event target.
///
/// Cloning yields another handle sharing the same registrations.
///
/// # Example
///
/// ```rust
/// use outclick::{ClickOutside, ClickOutsideOptions, Document, Event};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// # fn main() -> Result<(), outclick::DocumentError> {
/// let doc = Document::new();
/// let menu = doc.append_element(doc.body(), "div")?;
/// let outside = doc.append_element(doc.body(), "p")?;
///
/// let detector = ClickOutside::new(doc);
/// let closed = Arc::new(AtomicUsize::new(0));
/// let close: outclick::Callback<AtomicUsize> = Arc::new(|count: &AtomicUsize| {
///     count.fetch_add(1, Ordering::SeqCst);
/// });
///
/// let registration =
///     detector.register(&closed, menu, &close, &ClickOutsideOptions::default());
///
/// detector.window().dispatch(&Event::new("click", menu));
/// detector.window().dispatch(&Event::new("click", outside));
/// assert_eq!(closed.load(Ordering::SeqCst), 1);
///
/// registration.dispose();
/// detector.window().dispatch(&Event::new("click", outside));
/// assert_eq!(closed.load(Ordering::SeqCst), 1);
/// # Ok(())
/// # }
/// ```
pub struct ClickOutside<D: Dom> {
    dom: D,
    window: EventTarget<D::Node>,
    registry: Arc<Registry<D::Node>>,
}

impl<D: Dom> Clone for ClickOutside<D> {
    fn clone(&self) -> Self {
        Self {
            dom: self.dom.clone(),
            window: self.window.clone(),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<D: Dom> fmt::Debug for ClickOutside<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickOutside")
            .field("window", &self.window)
            .field("registrations", &self.registry.read().len())
            .finish_non_exhaustive()
    }
}

impl<D: Dom> ClickOutside<D> {
    /// Creates a detector with its own, empty global event target.
    #[must_use]
    pub fn new(dom: D) -> Self {
        Self::with_target(dom, EventTarget::new())
    }

    /// Creates a detector that listens on an existing global event target.
    #[must_use]
    pub fn with_target(dom: D, window: EventTarget<D::Node>) -> Self {
        Self { dom, window, registry: Arc::new(RwLock::new(FxHashMap::default())) }
    }

    #[must_use]
    pub const fn dom(&self) -> &D {
        &self.dom
    }

    /// The global event target listeners are attached to.
    #[must_use]
    pub const fn window(&self) -> &EventTarget<D::Node> {
        &self.window
    }

    /// Number of live registrations, i.e. those not yet removed or disposed.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.registry.read().len()
    }

    /// Calls `callback` with `component` whenever a trigger event lands outside `element`.
    ///
    /// The exclusion selector is resolved once, now; elements matching it later are not
    /// excluded. An invalid selector is logged and treated as no exclusions. One listener
    /// is attached per trigger event.
    ///
    /// The component is held weakly: the first trigger event (inside or outside) after every
    /// strong reference to it is gone disposes of the whole registration instead of calling
    /// back.
    ///
    /// Registering the same component, element and callback again replaces the previous
    /// registration.
    pub fn register<C>(
        &self,
        component: &Arc<C>,
        element: D::Node,
        callback: &Callback<C>,
        options: &ClickOutsideOptions,
    ) -> Registration<D::Node>
    where
        C: Send + Sync + 'static,
    {
        let excluded: Arc<[D::Node]> = self.excluded_nodes(options).into();
        let key = RegistrationKey::new(component, element.clone(), callback);
        let registration = Registration {
            inner: Arc::new(RegistrationInner {
                window: self.window.clone(),
                listeners: Mutex::new(Vec::new()),
                registry: Arc::downgrade(&self.registry),
                key: key.clone(),
            }),
        };

        for kind in options.trigger_events() {
            let listener = self.listener(component, &element, callback, &excluded, &registration);
            self.window.add_event_listener(&kind, Arc::clone(&listener));
            registration.inner.listeners.lock().push((kind, listener));
        }

        debug!(
            element = ?element,
            events = ?registration.events(),
            excluded = excluded.len(),
            "Registered outside-click listeners"
        );

        let previous = self.registry.write().insert(key, registration.clone());
        if let Some(previous) = previous {
            let removed = previous.dispose();
            debug!(removed, "Replaced an existing outside-click registration");
        }

        registration
    }

    /// Detaches the listeners created by the matching [`ClickOutside::register`] call.
    ///
    /// The registration is found by component, element and callback identity; `options`
    /// is accepted for symmetry with `register` and does not need to match. Returns
    /// `true` if any listener was detached.
    pub fn remove<C>(
        &self,
        component: &Arc<C>,
        element: D::Node,
        callback: &Callback<C>,
        options: &ClickOutsideOptions,
    ) -> bool {
        let key = RegistrationKey::new(component, element, callback);
        let Some(registration) = self.registry.write().remove(&key) else {
            debug!(element = ?key.element, "No outside-click registration to remove");
            return false;
        };

        let registered = registration.events();
        if registered != options.trigger_events() {
            debug!(
                registered = ?registered,
                requested = ?options.trigger_events(),
                "Trigger events differ from registration; removing what was registered"
            );
        }

        let removed = registration.dispose();
        debug!(element = ?key.element, removed, "Removed outside-click listeners");
        removed > 0
    }

    fn listener<C>(
        &self,
        component: &Arc<C>,
        element: &D::Node,
        callback: &Callback<C>,
        excluded: &Arc<[D::Node]>,
        registration: &Registration<D::Node>,
    ) -> Listener<D::Node>
    where
        C: Send + Sync + 'static,
    {
        let dom = self.dom.clone();
        let element = element.clone();
        let excluded = Arc::clone(excluded);
        let component: Weak<C> = Arc::downgrade(component);
        let callback = Arc::clone(callback);
        let registration = Arc::downgrade(&registration.inner);

        Arc::new(move |event: &Event<D::Node>| {
            let Some(component) = component.upgrade() else {
                if let Some(inner) = registration.upgrade() {
                    let removed = Registration { inner }.dispose();
                    debug!(event = event.kind(), removed, "Component dropped; listeners detached");
                }
                return;
            };
            if !is_outside(&dom, event.target(), &element, &excluded) {
                trace!(event = event.kind(), "Event inside element or exclusion; ignored");
                return;
            }
            callback(&component);
        })
    }

    fn excluded_nodes(&self, options: &ClickOutsideOptions) -> Vec<D::Node> {
        let Some(selector) = options.exclude() else {
            return Vec::new();
        };

        match self.dom.query_selector_all(selector) {
            Ok(nodes) => {
                trace!(selector, excluded = nodes.len(), "Resolved exclusion selector");
                nodes
            },
            Err(error) => {
                warn!(
                    selector,
                    %error,
                    "Exclude selector will not be evaluated. Check the selector syntax."
                );
                Vec::new()
            },
        }
    }
}
