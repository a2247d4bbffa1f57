//! Integration tests for subscriptions, dispatch order and the waiters,
//! driven through the in-memory document.

use domwatch_dom::{Document, NodeId};
use domwatch_observer::{
    on_body_ready, wait_for_element, Change, Descent, DescentPolicy, EventKind, MutationEvent,
    ObserverManager, SubscribeOptions, SubscriptionHandle, WaitOptions,
};
use futures::FutureExt;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<(&'static str, MutationEvent<NodeId>)>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn recording(log: &Log, tag: &'static str, options: SubscribeOptions<NodeId>) -> SubscribeOptions<NodeId> {
    let log = log.clone();
    options.on_any(move |event| log.borrow_mut().push((tag, event.clone())))
}

/// Builds `<ul><li class="item"/>...</ul>` detached, with `count` items.
fn list(doc: &Document, count: usize) -> (NodeId, Vec<NodeId>) {
    let ul = doc.create_element("ul");
    let items = doc.create_elements("li", count);
    for item in &items {
        doc.set_attribute(*item, "class", "item").unwrap();
    }
    doc.append_all(ul, &items).unwrap();
    (ul, items)
}

#[test]
fn test_unsubscribe_any_number_of_times() {
    let doc = Document::with_body();
    let manager = ObserverManager::new(doc.clone());
    let body = doc.body().unwrap();

    for selector in ["div", "ul > li", "#main", "[data-x]", "a, b"] {
        let handle = manager
            .subscribe(&body, SubscribeOptions::selector(selector).on_add(|_| {}))
            .unwrap();
        handle.unsubscribe();
        handle.unsubscribe();
        handle.unsubscribe();
        assert!(!handle.is_active());
    }
    assert_eq!(manager.instance_count(), 0);
}

#[test]
fn test_identical_options_are_distinct() {
    let doc = Document::with_body();
    let manager = ObserverManager::new(doc.clone());
    let body = doc.body().unwrap();
    let events = log();

    let a = manager
        .subscribe(&body, recording(&events, "a", SubscribeOptions::selector("p")))
        .unwrap();
    let _b = manager
        .subscribe(&body, recording(&events, "b", SubscribeOptions::selector("p")))
        .unwrap();
    a.unsubscribe();
    a.unsubscribe();

    let instance = manager.get(&body).unwrap();
    assert_eq!(instance.subscriber_count(), 1);

    let p = doc.create_element("p");
    doc.append_child(body, p).unwrap();
    doc.flush();
    let tags: Vec<&str> = events.borrow().iter().map(|(tag, _)| *tag).collect();
    assert_eq!(tags, vec!["b"]);
}

#[test]
fn test_evicted_instance_never_dispatches() {
    let doc = Document::with_body();
    let manager = ObserverManager::new(doc.clone());
    let body = doc.body().unwrap();
    let events = log();

    let handle = manager
        .subscribe(&body, recording(&events, "old", SubscribeOptions::match_all()))
        .unwrap();
    let stale = manager.get(&body).unwrap();

    // queued but not yet delivered
    let div = doc.create_element("div");
    doc.append_child(body, div).unwrap();
    handle.unsubscribe();

    let fresh = manager.get_or_create(&body);
    assert!(!fresh.ptr_eq(&stale));
    assert!(!fresh.is_started());

    doc.flush();
    assert!(events.borrow().is_empty());
}

#[test]
fn test_descent_policies_on_inserted_subtree() {
    let doc = Document::with_body();
    let manager = ObserverManager::new(doc.clone());
    let body = doc.body().unwrap();
    let events = log();

    for (tag, descent) in [("none", Descent::None), ("single", Descent::Single), ("all", Descent::All)] {
        manager
            .subscribe(
                &body,
                recording(
                    &events,
                    tag,
                    SubscribeOptions::selector(".item").descent(DescentPolicy::uniform(descent)),
                ),
            )
            .unwrap();
    }

    let (ul, items) = list(&doc, 3);
    doc.append_child(body, ul).unwrap();
    doc.flush();

    let events = events.borrow();
    let single: Vec<NodeId> = events.iter().filter(|(t, _)| *t == "single").map(|(_, e)| e.node).collect();
    let all: Vec<(NodeId, Descent)> =
        events.iter().filter(|(t, _)| *t == "all").map(|(_, e)| (e.node, e.descent)).collect();

    assert!(events.iter().all(|(t, _)| *t != "none"));
    assert_eq!(single, vec![items[0]]);
    assert_eq!(all, items.iter().map(|i| (*i, Descent::All)).collect::<Vec<_>>());
}

#[test]
fn test_registration_order_across_subscribers() {
    let doc = Document::with_body();
    let manager = ObserverManager::new(doc.clone());
    let body = doc.body().unwrap();
    let events = log();

    manager
        .subscribe(&body, recording(&events, "first", SubscribeOptions::selector("li")))
        .unwrap();
    manager
        .subscribe(&body, recording(&events, "second", SubscribeOptions::match_all()))
        .unwrap();

    let a = doc.create_element("li");
    let b = doc.create_element("li");
    doc.append_child(body, a).unwrap();
    doc.append_child(body, b).unwrap();
    doc.flush();

    let order: Vec<(&str, NodeId)> = events.borrow().iter().map(|(t, e)| (*t, e.node)).collect();
    assert_eq!(order, vec![("first", a), ("second", a), ("first", b), ("second", b)]);
}

#[test]
fn test_attribute_old_values_across_batches() {
    let doc = Document::with_body();
    let manager = ObserverManager::new(doc.clone());
    let body = doc.body().unwrap();
    let div = doc.create_element("div");
    doc.set_attribute(div, "class", "a").unwrap();
    doc.append_child(body, div).unwrap();

    let changes = Rc::new(RefCell::new(Vec::new()));
    let changes_c = changes.clone();
    manager
        .subscribe(
            &body,
            SubscribeOptions::selector("div").on_attribute(move |event| changes_c.borrow_mut().push(event.change.clone())),
        )
        .unwrap();

    doc.set_attribute(div, "class", "b").unwrap();
    doc.set_attribute(div, "title", "t1").unwrap();
    doc.flush();
    doc.set_attribute(div, "class", "c").unwrap();
    doc.set_attribute(div, "title", "t2").unwrap();
    doc.remove_attribute(div, "title").unwrap();
    doc.flush();

    let expected = [
        ("class", Some("a")),
        ("title", None),
        ("class", Some("b")),
        ("title", Some("t1")),
        ("title", Some("t2")),
    ]
    .into_iter()
    .map(|(name, old)| Change::AttributeChanged {
        name: name.into(),
        old_value: old.map(Into::into),
    })
    .collect::<Vec<_>>();
    assert_eq!(*changes.borrow(), expected);
}

#[test]
fn test_moved_node_reports_remove_then_add() {
    let doc = Document::with_body();
    let manager = ObserverManager::new(doc.clone());
    let body = doc.body().unwrap();
    let left = doc.create_element("section");
    let right = doc.create_element("section");
    let p = doc.create_element("p");
    doc.append_child(body, left).unwrap();
    doc.append_child(body, right).unwrap();
    doc.append_child(left, p).unwrap();

    let events = log();
    manager
        .subscribe(&body, recording(&events, "p", SubscribeOptions::selector("p")))
        .unwrap();
    doc.append_child(right, p).unwrap();
    doc.flush();

    let kinds: Vec<EventKind> = events.borrow().iter().map(|(_, e)| e.kind()).collect();
    assert_eq!(kinds, vec![EventKind::Remove, EventKind::Add]);
}

#[test]
fn test_unsubscribe_mid_batch_stops_others() {
    let doc = Document::with_body();
    let manager = ObserverManager::new(doc.clone());
    let body = doc.body().unwrap();
    let events = log();

    let victim: Rc<RefCell<Option<SubscriptionHandle<Document>>>> = Rc::new(RefCell::new(None));
    let victim_c = victim.clone();
    let events_c = events.clone();
    manager
        .subscribe(
            &body,
            SubscribeOptions::match_all().on_add(move |event| {
                events_c.borrow_mut().push(("killer", event.clone()));
                if let Some(handle) = victim_c.borrow().as_ref() {
                    handle.unsubscribe();
                }
            }),
        )
        .unwrap();
    let handle = manager
        .subscribe(&body, recording(&events, "victim", SubscribeOptions::match_all()))
        .unwrap();
    *victim.borrow_mut() = Some(handle);

    let a = doc.create_element("a");
    let b = doc.create_element("b");
    doc.append_all(body, &[a, b]).unwrap();
    doc.flush();

    let tags: Vec<&str> = events.borrow().iter().map(|(t, _)| *t).collect();
    assert_eq!(tags, vec!["killer", "killer"]);
}

#[test]
fn test_subscribe_during_dispatch_starts_next_batch() {
    let doc = Document::with_body();
    let manager = ObserverManager::new(doc.clone());
    let body = doc.body().unwrap();
    let events = log();

    let manager_c = manager.clone();
    let events_c = events.clone();
    let added = Rc::new(RefCell::new(false));
    manager
        .subscribe(
            &body,
            SubscribeOptions::match_all().on_add(move |_| {
                if !added.replace(true) {
                    manager_c
                        .subscribe_default(recording(&events_c, "late", SubscribeOptions::match_all()))
                        .unwrap();
                }
            }),
        )
        .unwrap();

    let a = doc.create_element("a");
    let b = doc.create_element("b");
    doc.append_all(body, &[a, b]).unwrap();
    doc.flush();
    assert!(events.borrow().is_empty());

    let c = doc.create_element("i");
    doc.append_child(body, c).unwrap();
    doc.flush();
    let nodes: Vec<NodeId> = events.borrow().iter().map(|(_, e)| e.node).collect();
    assert_eq!(nodes, vec![c]);
}

#[test]
fn test_wait_for_element_inserted_before_timeout() {
    let doc = Document::with_body();
    let body = doc.body().unwrap();
    let wait = wait_for_element(&doc, "#x", WaitOptions::default().timeout(50)).unwrap();

    let doc_c = doc.clone();
    doc.set_timeout(20, move || {
        let x = doc_c.create_element("div");
        doc_c.set_attribute(x, "id", "x").unwrap();
        doc_c.append_child(body, x).unwrap();
    });

    doc.advance(20);
    assert_eq!(doc.now(), 20);
    assert!(wait.is_settled());
    let found = wait.now_or_never().flatten().unwrap();
    assert_eq!(doc.attribute(found, "id").as_deref(), Some("x"));
}

#[test]
fn test_wait_for_element_times_out_first() {
    let doc = Document::with_body();
    let body = doc.body().unwrap();
    let wait = wait_for_element(&doc, "#x", WaitOptions::default().timeout(50)).unwrap();

    let doc_c = doc.clone();
    doc.set_timeout(200, move || {
        let x = doc_c.create_element("div");
        doc_c.set_attribute(x, "id", "x").unwrap();
        doc_c.append_child(body, x).unwrap();
    });

    doc.advance(50);
    assert!(wait.is_settled());
    assert_eq!(doc.watch_count(), 0);

    doc.advance(200);
    assert_eq!(wait.now_or_never(), Some(None));
}

#[test]
fn test_on_body_ready_fires_once_at_insertion() {
    let doc = Document::new();
    let fired = Rc::new(RefCell::new(Vec::new()));
    let fired_c = fired.clone();
    let doc_c = doc.clone();
    let _cancel = on_body_ready(&doc, move |body| fired_c.borrow_mut().push((body, doc_c.now()))).unwrap();

    let doc_c = doc.clone();
    doc.set_timeout(30, move || {
        let body = doc_c.create_element("body");
        doc_c.append_child(doc_c.document_element(), body).unwrap();
    });
    doc.advance(100);

    let fired = fired.borrow();
    assert_eq!(fired.len(), 1);
    assert_eq!(Some(fired[0].0), doc.body());
    assert_eq!(fired[0].1, 30);
}
