//! Attach/detach hook composition.
//!
//! [`click_outside`] takes a component's existing lifecycle hooks and returns new ones
//! that register the outside-click check when the component is connected and remove it
//! when it is disconnected. The original hooks still run, after the detector.

use crate::detector::{Callback, ClickOutside};
use crate::dom::Dom;
use crate::options::ClickOutsideOptions;
use std::fmt;
use std::sync::Arc;

/// A component that renders into a document element.
pub trait Component: Send + Sync + 'static {
    type Node;

    /// The element that defines "inside" for this instance.
    ///
    /// Read each time a hook runs, so it must return the same element on connect and on
    /// disconnect for removal to find the registration.
    fn host(&self) -> Self::Node;
}

/// A lifecycle hook, called with the live instance.
pub type Hook<C> = Arc<dyn Fn(&Arc<C>) + Send + Sync>;

/// Optional connected/disconnected hooks of a component.
pub struct LifecycleHooks<C> {
    connected: Option<Hook<C>>,
    disconnected: Option<Hook<C>>,
}

impl<C> Default for LifecycleHooks<C> {
    fn default() -> Self {
        Self { connected: None, disconnected: None }
    }
}

impl<C> Clone for LifecycleHooks<C> {
    fn clone(&self) -> Self {
        Self { connected: self.connected.clone(), disconnected: self.disconnected.clone() }
    }
}

impl<C> fmt::Debug for LifecycleHooks<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("connected", &self.connected.is_some())
            .field("disconnected", &self.disconnected.is_some())
            .finish()
    }
}

impl<C> LifecycleHooks<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_connected(mut self, hook: impl Fn(&Arc<C>) + Send + Sync + 'static) -> Self {
        self.connected = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_disconnected(mut self, hook: impl Fn(&Arc<C>) + Send + Sync + 'static) -> Self {
        self.disconnected = Some(Arc::new(hook));
        self
    }

    /// Runs the connected hook, if any.
    pub fn connected(&self, instance: &Arc<C>) {
        if let Some(hook) = &self.connected {
            hook(instance);
        }
    }

    /// Runs the disconnected hook, if any.
    pub fn disconnected(&self, instance: &Arc<C>) {
        if let Some(hook) = &self.disconnected {
            hook(instance);
        }
    }
}

/// Wraps `hooks` so that `method` runs whenever a trigger event lands outside the
/// instance's [`Component::host`].
///
/// On connect the detector registers first, then the original connected hook runs. On
/// disconnect the detector removes the registration, then the original disconnected hook
/// runs. `method` is fixed here, so every instance passed to the returned hooks shares
/// it and removal always finds the matching registration.
///
/// # Example
///
/// ```rust
/// use outclick::{ClickOutside, ClickOutsideOptions, Component, Document, Event, LifecycleHooks, NodeId, click_outside};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct Dropdown {
///     host: NodeId,
///     open: AtomicBool,
/// }
///
/// impl Component for Dropdown {
///     type Node = NodeId;
///     fn host(&self) -> NodeId {
///         self.host
///     }
/// }
///
/// # fn main() -> Result<(), outclick::DocumentError> {
/// let doc = Document::new();
/// let host = doc.append_element(doc.body(), "x-dropdown")?;
/// let detector = ClickOutside::new(doc.clone());
///
/// let hooks = click_outside(
///     &detector,
///     |dropdown: &Dropdown| dropdown.open.store(false, Ordering::SeqCst),
///     ClickOutsideOptions::default(),
///     LifecycleHooks::new(),
/// );
///
/// let dropdown = Arc::new(Dropdown { host, open: AtomicBool::new(true) });
/// hooks.connected(&dropdown);
///
/// detector.window().dispatch(&Event::new("click", doc.body()));
/// assert!(!dropdown.open.load(Ordering::SeqCst));
///
/// hooks.disconnected(&dropdown);
/// assert_eq!(detector.registration_count(), 0);
/// # Ok(())
/// # }
/// ```
pub fn click_outside<D, C>(
    detector: &ClickOutside<D>,
    method: impl Fn(&C) + Send + Sync + 'static,
    options: ClickOutsideOptions,
    hooks: LifecycleHooks<C>,
) -> LifecycleHooks<C>
where
    D: Dom,
    C: Component<Node = D::Node>,
{
    let method: Callback<C> = Arc::new(method);
    let options = Arc::new(options);
    let LifecycleHooks { connected, disconnected } = hooks;

    let attach: Hook<C> = {
        let detector = detector.clone();
        let method = Arc::clone(&method);
        let options = Arc::clone(&options);
        Arc::new(move |instance: &Arc<C>| {
            let _registration = detector.register(instance, instance.host(), &method, &options);
            if let Some(hook) = &connected {
                hook(instance);
            }
        })
    };

    let detach: Hook<C> = {
        let detector = detector.clone();
        Arc::new(move |instance: &Arc<C>| {
            detector.remove(instance, instance.host(), &method, &options);
            if let Some(hook) = &disconnected {
                hook(instance);
            }
        })
    };

    LifecycleHooks { connected: Some(attach), disconnected: Some(detach) }
}
