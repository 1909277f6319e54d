//! # Outclick
//!
//! Detects events that land outside an element and calls back into the component
//! that owns it. Typical use: closing a dropdown or popover when the user clicks
//! anywhere else.
//!
//! ## Overview
//!
//! * [`ClickOutside`] attaches one listener per trigger event (default `click`) to a
//!   global [`EventTarget`] and checks each event's target against the element.
//! * [`ClickOutsideOptions`] selects the trigger events and an optional exclusion
//!   selector; nodes matching it at registration time also count as "inside".
//! * [`click_outside`] wraps a component's [`LifecycleHooks`] so registration follows
//!   connect/disconnect.
//! * The document is abstracted by the [`Dom`] trait; [`Document`] is the bundled
//!   in-memory implementation with a small CSS selector engine.
//!
//! Logging goes through `tracing`: an invalid exclusion selector is reported with
//! `warn!`, registration bookkeeping with `debug!`.
//!
//! # Example
//!
//! ```rust
//! use outclick::{Callback, ClickOutside, ClickOutsideOptions, Document, Event};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! # fn main() -> Result<(), outclick::DocumentError> {
//! let doc = Document::new();
//! let panel = doc.append_element(doc.body(), "div")?;
//! doc.set_id(panel, "box")?;
//! let popup = doc.append_element(doc.body(), "div")?;
//! doc.set_id(popup, "popup")?;
//! let popup_item = doc.append_element(popup, "button")?;
//!
//! let detector = ClickOutside::new(doc.clone());
//! let hits = Arc::new(AtomicUsize::new(0));
//! let on_outside: Callback<AtomicUsize> = Arc::new(|hits: &AtomicUsize| {
//!     hits.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! let options = ClickOutsideOptions::new().with_exclude("#popup");
//! let _registration = detector.register(&hits, panel, &on_outside, &options);
//!
//! detector.window().dispatch(&Event::new("click", popup_item));
//! assert_eq!(hits.load(Ordering::SeqCst), 0);
//!
//! detector.window().dispatch(&Event::new("click", doc.body()));
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! # Ok(())
//! # }
//! ```

mod detector;
mod document;
mod dom;
mod lifecycle;
mod options;
pub mod selector;
mod target;

pub use detector::{Callback, ClickOutside, Registration, is_outside};
pub use document::{Document, DocumentError, DocumentErrorExt, NodeId};
pub use dom::Dom;
pub use lifecycle::{Component, Hook, LifecycleHooks, click_outside};
pub use options::{ClickOutsideOptions, DEFAULT_TRIGGER_EVENT};
pub use selector::{SelectorError, SelectorErrorExt};
pub use target::{Event, EventTarget, Listener};
