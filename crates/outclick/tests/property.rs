mod fixtures;

use fixtures::{Counter, bump};
use outclick::{ClickOutside, ClickOutsideOptions, Document, Event, NodeId};
use proptest::prelude::*;

/// Random tree under `<body>`: node `i` hangs off slot `parents[i]`, where slot 0 is the
/// body and slot `k > 0` is node `k - 1`.
fn tree() -> impl Strategy<Value = (Vec<usize>, Vec<bool>)> {
    (1_usize..24).prop_flat_map(|len| {
        let parents = (0..len).map(|i| 0..=i).collect::<Vec<_>>();
        (parents, prop::collection::vec(any::<bool>(), len))
    })
}

/// Ancestor-or-self test on the slot encoding.
fn within(parents: &[usize], ancestor: usize, node: usize) -> bool {
    let mut current = Some(node);
    while let Some(index) = current {
        if index == ancestor {
            return true;
        }
        current = parents[index].checked_sub(1);
    }
    false
}

proptest! {
    #[test]
    fn fires_only_outside_element_and_exclusions(
        (parents, marked) in tree(),
        element_pick in any::<prop::sample::Index>(),
        target_pick in any::<prop::sample::Index>(),
    ) {
        let doc = Document::new();
        let mut nodes: Vec<NodeId> = Vec::with_capacity(parents.len());
        for (index, &slot) in parents.iter().enumerate() {
            let parent = if slot == 0 { doc.body() } else { nodes[slot - 1] };
            let node = doc.append_element(parent, "div").expect("append");
            if marked[index] {
                doc.add_class(node, "overlay").expect("class");
            }
            nodes.push(node);
        }

        let element = element_pick.index(nodes.len());
        let target = target_pick.index(nodes.len());

        let detector = ClickOutside::new(doc.clone());
        let counter = Counter::new(nodes[element]);
        let options = ClickOutsideOptions::new().with_exclude(".overlay");
        let _registration = detector.register(&counter, nodes[element], &bump(), &options);

        detector.window().dispatch(&Event::new("click", nodes[target]));

        let excluded = (0..nodes.len()).any(|i| marked[i] && within(&parents, i, target));
        let expected = !within(&parents, element, target) && !excluded;
        prop_assert_eq!(counter.hits(), usize::from(expected));
    }

    #[test]
    fn body_click_fires_unless_body_excluded(trigger in "[a-z]{1,8}") {
        let doc = Document::new();
        let element = doc.append_element(doc.body(), "div").expect("append");
        let detector = ClickOutside::new(doc.clone());
        let counter = Counter::new(element);
        let options = ClickOutsideOptions::new().with_trigger_events(format!(" {trigger} ,"));
        let _registration = detector.register(&counter, element, &bump(), &options);

        detector.window().dispatch(&Event::new(trigger.as_str(), doc.body()));
        detector.window().dispatch(&Event::new(trigger.as_str(), element));
        prop_assert_eq!(counter.hits(), 1);
    }
}
