#![allow(dead_code)]

use outclick::{Callback, ClickOutside, Component, Document, Event, NodeId};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// `<body><div id="box"><span/></div><div id="popup"><button/></div><p/></body>`
#[derive(Debug)]
pub struct Page {
    pub doc: Document,
    pub detector: ClickOutside<Document>,
    pub panel: NodeId,
    pub panel_child: NodeId,
    pub popup: NodeId,
    pub popup_button: NodeId,
    pub paragraph: NodeId,
}

impl Page {
    /// Builds the sample page.
    /// # Panics
    /// * If the document rejects one of the fixed mutations.
    #[must_use]
    pub fn new() -> Self {
        let doc = Document::new();
        let body = doc.body();

        let panel = doc.append_element(body, "div").expect("append #box");
        doc.set_id(panel, "box").expect("id #box");
        let panel_child = doc.append_element(panel, "span").expect("append span");

        let popup = doc.append_element(body, "div").expect("append #popup");
        doc.set_id(popup, "popup").expect("id #popup");
        let popup_button = doc.append_element(popup, "button").expect("append button");

        let paragraph = doc.append_element(body, "p").expect("append p");

        let detector = ClickOutside::new(doc.clone());
        Self { doc, detector, panel, panel_child, popup, popup_button, paragraph }
    }

    pub fn click(&self, target: NodeId) -> usize {
        self.fire("click", target)
    }

    pub fn fire(&self, kind: &str, target: NodeId) -> usize {
        self.detector.window().dispatch(&Event::new(kind, target))
    }
}

/// Component that counts how often it was told about an outside event.
#[derive(Debug)]
pub struct Counter {
    pub host: NodeId,
    pub hits: AtomicUsize,
}

impl Counter {
    #[must_use]
    pub fn new(host: NodeId) -> Arc<Self> {
        Arc::new(Self { host, hits: AtomicUsize::new(0) })
    }

    pub fn bump(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Component for Counter {
    type Node = NodeId;

    fn host(&self) -> NodeId {
        self.host
    }
}

#[must_use]
pub fn bump() -> Callback<Counter> {
    Arc::new(Counter::bump)
}
