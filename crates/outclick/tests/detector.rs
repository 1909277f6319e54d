mod fixtures;

use fixtures::{Counter, Page, bump};
use outclick::{Callback, ClickOutsideOptions, Event, NodeId, Registration};
use outclick_logger::{LevelFilter, LogCapture, Logger};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn outside_click_fires_once_inside_never() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let callback = bump();
    let _registration =
        page.detector.register(&counter, page.panel, &callback, &ClickOutsideOptions::default());

    page.click(page.panel);
    page.click(page.panel_child);
    assert_eq!(counter.hits(), 0, "clicks inside the element must not fire");

    page.click(page.paragraph);
    assert_eq!(counter.hits(), 1);

    page.fire("keyup", page.paragraph);
    assert_eq!(counter.hits(), 1, "only the default click trigger is registered");
}

#[test]
fn excluded_subtree_counts_as_inside() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let options = ClickOutsideOptions::new().with_exclude("#popup");
    let _registration = page.detector.register(&counter, page.panel, &bump(), &options);

    page.click(page.popup_button);
    page.click(page.popup);
    assert_eq!(counter.hits(), 0);

    page.click(page.doc.body());
    assert_eq!(counter.hits(), 1);
}

#[test]
fn every_trigger_event_fires_independently() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let options = ClickOutsideOptions::new().with_trigger_events("click, keyup");
    let registration = page.detector.register(&counter, page.panel, &bump(), &options);

    assert_eq!(registration.events(), vec!["click", "keyup"]);

    page.fire("click", page.paragraph);
    page.fire("keyup", page.paragraph);
    page.fire("keydown", page.paragraph);
    assert_eq!(counter.hits(), 2);
}

#[test]
fn invalid_exclude_selector_warns_and_excludes_nothing() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let options = ClickOutsideOptions::new().with_exclude(":::bad");

    let capture = LogCapture::new();
    let dispatch = Logger::builder()
        .name("outclick-tests")
        .level(LevelFilter::WARN)
        .dispatch(capture.clone())
        .expect("dispatch should build");

    let _registration = tracing::dispatcher::with_default(&dispatch, || {
        page.detector.register(&counter, page.panel, &bump(), &options)
    });

    assert_eq!(capture.count("Exclude selector will not be evaluated"), 1);
    assert!(capture.contains(":::bad"), "warning should name the selector: {}", capture.contents());

    page.click(page.popup_button);
    assert_eq!(counter.hits(), 1);
}

#[test]
fn remove_stops_further_callbacks() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let callback = bump();
    let options = ClickOutsideOptions::new().with_trigger_events("click,keyup");

    let _registration = page.detector.register(&counter, page.panel, &callback, &options);
    assert_eq!(page.detector.window().listener_count("click"), 1);

    assert!(page.detector.remove(&counter, page.panel, &callback, &options));
    assert_eq!(page.detector.window().listener_count("click"), 0);
    assert_eq!(page.detector.window().listener_count("keyup"), 0);

    page.click(page.paragraph);
    page.fire("keyup", page.paragraph);
    assert_eq!(counter.hits(), 0);

    assert!(!page.detector.remove(&counter, page.panel, &callback, &options));
}

#[test]
fn remove_only_matches_same_identity() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let callback = bump();
    let options = ClickOutsideOptions::default();
    let _registration = page.detector.register(&counter, page.panel, &callback, &options);

    let lookalike = bump();
    assert!(!page.detector.remove(&counter, page.panel, &lookalike, &options));
    assert!(!page.detector.remove(&counter, page.popup, &callback, &options));

    page.click(page.paragraph);
    assert_eq!(counter.hits(), 1);
}

#[test]
fn remove_ignores_options_mismatch() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let callback = bump();
    let registered = ClickOutsideOptions::new().with_trigger_events("click, keyup");
    let _registration = page.detector.register(&counter, page.panel, &callback, &registered);

    let other = ClickOutsideOptions::new().with_exclude("#popup");
    assert!(page.detector.remove(&counter, page.panel, &callback, &other));
    assert_eq!(page.detector.window().listener_count("keyup"), 0);
}

#[test]
fn dispose_detaches_exact_listeners() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let registration =
        page.detector.register(&counter, page.panel, &bump(), &ClickOutsideOptions::default());

    let other = Counter::new(page.popup);
    let _kept =
        page.detector.register(&other, page.popup, &bump(), &ClickOutsideOptions::default());

    assert!(registration.is_active());
    assert_eq!(registration.dispose(), 1);
    assert!(!registration.is_active());
    assert_eq!(registration.dispose(), 0);

    page.click(page.paragraph);
    assert_eq!(counter.hits(), 0);
    assert_eq!(other.hits(), 1);
}

#[test]
fn exclusion_list_is_a_snapshot() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let options = ClickOutsideOptions::new().with_exclude(".overlay");

    let early = page.doc.append_element(page.doc.body(), "div").expect("append");
    page.doc.add_class(early, "overlay").expect("class");

    let _registration = page.detector.register(&counter, page.panel, &bump(), &options);

    let late = page.doc.append_element(page.doc.body(), "div").expect("append");
    page.doc.add_class(late, "overlay").expect("class");

    page.click(early);
    assert_eq!(counter.hits(), 0);
    page.click(late);
    assert_eq!(counter.hits(), 1, "elements matching after registration are not excluded");
}

#[test]
fn untargeted_event_counts_as_outside() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let options = ClickOutsideOptions::new().with_exclude("#popup");
    let _registration = page.detector.register(&counter, page.panel, &bump(), &options);

    page.detector.window().dispatch(&Event::untargeted("click"));
    assert_eq!(counter.hits(), 1);
}

#[test]
fn detached_element_treats_everything_else_as_outside() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let _registration =
        page.detector.register(&counter, page.panel, &bump(), &ClickOutsideOptions::default());

    page.doc.remove(page.panel).expect("remove");
    page.click(page.panel_child);
    assert_eq!(counter.hits(), 0, "containment still follows the detached subtree");

    page.click(page.paragraph);
    assert_eq!(counter.hits(), 1);
}

#[test]
fn registering_again_replaces_previous_listeners() {
    let page = Page::new();
    let counter = Counter::new(page.panel);
    let callback = bump();
    let options = ClickOutsideOptions::default();

    let first = page.detector.register(&counter, page.panel, &callback, &options);
    let _second = page.detector.register(&counter, page.panel, &callback, &options);

    assert!(!first.is_active());
    assert_eq!(page.detector.registration_count(), 1);

    page.click(page.paragraph);
    assert_eq!(counter.hits(), 1);
}

#[test]
fn dropped_component_is_not_called() {
    let page = Page::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let callback: Callback<Counter> = Arc::new(move |_: &Counter| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let counter = Counter::new(page.panel);
    let _registration =
        page.detector.register(&counter, page.panel, &callback, &ClickOutsideOptions::default());

    page.click(page.paragraph);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    drop(counter);
    assert_eq!(page.click(page.paragraph), 1, "the listener itself still runs");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert_eq!(page.detector.window().listener_count("click"), 0);
    assert_eq!(page.detector.registration_count(), 0);
    assert_eq!(page.click(page.paragraph), 0);
}

#[test]
fn dropped_component_detaches_on_inside_event_too() {
    let page = Page::new();
    let options = ClickOutsideOptions::new().with_trigger_events("click, keyup");
    let counter = Counter::new(page.panel);
    let _registration = page.detector.register(&counter, page.panel, &bump(), &options);
    drop(counter);

    page.click(page.panel_child);
    assert_eq!(page.detector.window().listener_count("click"), 0);
    assert_eq!(page.detector.window().listener_count("keyup"), 0);
}

#[test]
fn removal_from_another_callback_takes_effect_immediately() {
    let page = Page::new();
    let options = ClickOutsideOptions::default();

    let inner = Counter::new(page.popup);
    let inner_callback = bump();

    let outer = Counter::new(page.panel);
    let removed = Arc::new(AtomicUsize::new(0));
    let outer_callback: Callback<Counter> = {
        let detector = page.detector.clone();
        let inner = Arc::clone(&inner);
        let inner_callback = Arc::clone(&inner_callback);
        let options = options.clone();
        let removed = Arc::clone(&removed);
        Arc::new(move |component: &Counter| {
            component.bump();
            if detector.remove(&inner, inner.host, &inner_callback, &options) {
                removed.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let _outer = page.detector.register(&outer, page.panel, &outer_callback, &options);
    let _inner = page.detector.register(&inner, page.popup, &inner_callback, &options);

    assert_eq!(page.click(page.paragraph), 1);
    assert_eq!(removed.load(Ordering::SeqCst), 1);
    assert_eq!(outer.hits(), 1);
    assert_eq!(inner.hits(), 0, "a removed registration must not run in the same dispatch");
}

#[test]
fn callback_may_dispose_its_own_registration() {
    let page = Page::new();
    let counter = Counter::new(page.panel);

    let slot: Arc<Mutex<Option<Registration<NodeId>>>> = Arc::default();
    let pending = Arc::clone(&slot);
    let callback: Callback<Counter> = Arc::new(move |component: &Counter| {
        component.bump();
        if let Some(registration) = pending.lock().take() {
            registration.dispose();
        }
    });

    let registration =
        page.detector.register(&counter, page.panel, &callback, &ClickOutsideOptions::default());
    *slot.lock() = Some(registration);

    page.click(page.paragraph);
    page.click(page.paragraph);
    assert_eq!(counter.hits(), 1);
    assert_eq!(page.detector.window().listener_count("click"), 0);
}
