//! Property-based tests for recursive-descent expansion.

use domwatch_dom::{Document, NodeId};
use domwatch_observer::{Descent, DescentPolicy, EventKind, ObserverManager, SubscribeOptions};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Builds a detached `<div>` subtree from a shape: each entry is
/// `(depth, marked)`, nested under the previous entry when depth grows.
fn build(doc: &Document, shape: &[(usize, bool)]) -> (NodeId, Vec<NodeId>) {
    let root = doc.create_element("div");
    let mut stack = vec![root];
    let mut marked = Vec::new();
    for (depth, is_marked) in shape {
        stack.truncate((*depth).min(stack.len() - 1) + 1);
        let parent = *stack.last().unwrap();
        let node = doc.create_element("span");
        if *is_marked {
            doc.set_attribute(node, "class", "hit").unwrap();
            marked.push(node);
        }
        doc.append_child(parent, node).unwrap();
        stack.push(node);
    }
    (root, marked)
}

fn run(shape: &[(usize, bool)], descent: Descent, kind: EventKind) -> (Vec<NodeId>, Vec<NodeId>) {
    let doc = Document::with_body();
    let body = doc.body().unwrap();
    let (root, marked) = build(&doc, shape);
    if kind == EventKind::Remove {
        doc.append_child(body, root).unwrap();
    }

    let manager = ObserverManager::new(doc.clone());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_c = seen.clone();
    manager
        .subscribe(
            &body,
            SubscribeOptions::selector(".hit")
                .descent(DescentPolicy::uniform(descent))
                .on(kind, move |event| seen_c.borrow_mut().push(event.node)),
        )
        .unwrap();

    match kind {
        EventKind::Remove => doc.remove(root).unwrap(),
        _ => doc.append_child(body, root).unwrap(),
    }
    doc.flush();

    let seen = seen.borrow().clone();
    (seen, marked)
}

fn shape_strategy() -> impl Strategy<Value = Vec<(usize, bool)>> {
    prop::collection::vec((0usize..4, any::<bool>()), 0..24)
}

proptest! {
    #[test]
    fn all_reports_every_match_in_order(shape in shape_strategy()) {
        let (seen, marked) = run(&shape, Descent::All, EventKind::Add);
        prop_assert_eq!(seen, marked);
    }

    #[test]
    fn single_reports_first_match(shape in shape_strategy()) {
        let (seen, marked) = run(&shape, Descent::Single, EventKind::Add);
        prop_assert_eq!(seen, marked.first().copied().into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn none_reports_nothing(shape in shape_strategy()) {
        let (seen, _) = run(&shape, Descent::None, EventKind::Add);
        prop_assert!(seen.is_empty());
    }

    #[test]
    fn removed_subtree_matches_added(shape in shape_strategy()) {
        let (seen, marked) = run(&shape, Descent::All, EventKind::Remove);
        prop_assert_eq!(seen, marked);
    }
}
